//! Regime classification: market statistics to risk posture.

mod classifier;

pub use classifier::RegimeClassifier;
