//! Top-level engine errors and process exit mapping.

use std::path::PathBuf;

use crate::settlement::SettlementError;
use crate::validate::PlanValidationError;

/// Anything that can abort an engine run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An input file could not be read.
    #[error("failed to read input {path}: {source}")]
    InputLoad {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An input file could not be parsed.
    #[error("failed to parse input {path}: {source}")]
    InputParse {
        /// Path that failed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A built plan failed its own invariants.
    #[error(transparent)]
    PlanInvalid(#[from] PlanValidationError),

    /// Settlement hit a hard error.
    #[error(transparent)]
    Settlement(#[from] SettlementError),

    /// An output file could not be written.
    #[error("failed to write output {path}: {source}")]
    OutputWrite {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Process exit code for this error.
    ///
    /// Plan validation failures exit with 1; every operational failure
    /// (load, parse, settlement, write) exits with 2 so callers can
    /// distinguish "the plan is wrong" from "the run is broken".
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::PlanInvalid(_) => 1,
            _ => 2,
        }
    }
}
