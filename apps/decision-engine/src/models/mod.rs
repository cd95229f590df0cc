//! Data model for the decision pipeline.
//!
//! Leaf-first: `facts` is the statistics input, `posture` is the
//! classifier output, `market` is the per-run price/rule snapshot,
//! `plan` is the builder output, `settlement` is the simulator output.

pub mod facts;
pub mod market;
pub mod plan;
pub mod posture;
pub mod settlement;
