// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Decision Engine - Rust Core Library
//!
//! Deterministic decision-and-execution pipeline for the Umbra trading
//! system. Turns precomputed market statistics into a bounded, auditable
//! set of dry-run trade instructions without ever touching a live venue.
//!
//! # Pipeline
//!
//! - `regime`: classifies volatility/correlation statistics into a risk
//!   posture (regime, risk score, exposure limits, allowed symbols)
//! - `planner`: combines a posture with a market snapshot into a
//!   venue-compliant order list or a structured list of refusals,
//!   all-or-nothing at the plan level
//! - `settlement`: paper-settles a plan against a portfolio balance
//!   snapshot under the same all-or-nothing discipline
//!
//! Everything is a pure function of its explicit inputs plus wall-clock
//! time (audit timestamps only). The two network reads (prices, exchange
//! rules) sit behind ports in `marketdata` so the sizing core stays
//! deterministic and replayable.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Immutable engine configuration and budget override resolution.
pub mod config;

/// Top-level error type and process exit-code mapping.
pub mod error;

/// Market data ports and adapters (prices, exchange rules).
pub mod marketdata;

/// Data model: facts pack, posture, market snapshot, plan, settlement.
pub mod models;

/// Execution plan builder and per-symbol sizing.
pub mod planner;

/// Human-readable plan rendering.
pub mod preview;

/// Regime classifier.
pub mod regime;

/// Paper settlement simulator.
pub mod settlement;

/// Shadow run: build a plan and settle it in one pass.
pub mod shadow;

/// Tracing setup for the binary.
pub mod telemetry;

/// Structural validation gate for emitted plan documents.
pub mod validate;

pub use config::{EngineConfig, resolve_budget};
pub use error::EngineError;
pub use marketdata::{BinancePublicClient, MarketDataError, MockMarketData, PriceSource, RuleSource};
pub use models::facts::FactsPack;
pub use models::market::{MarketSnapshot, SymbolRule};
pub use models::plan::{Order, PlanAction, PlanDocument, PlanInputs, Refusal, RefusalCode};
pub use models::posture::{Posture, Regime, StrategyMode};
pub use models::settlement::{ExecutionMode, PortfolioState, SettlementReport};
pub use planner::{ExecutionPlanBuilder, PlanPolicy};
pub use regime::RegimeClassifier;
pub use settlement::{SettlementError, SettlementSimulator};
