//! Execution plan construction: posture + market snapshot to a
//! venue-compliant order list, or refusals explaining why not.

mod builder;
mod sizing;

pub use builder::{ExecutionPlanBuilder, PlanPolicy};
pub use sizing::floor_to_step;
