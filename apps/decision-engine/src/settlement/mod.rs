//! Paper settlement: simulate a plan against a balance snapshot.

mod simulator;

pub use simulator::{SettlementError, SettlementSimulator};
