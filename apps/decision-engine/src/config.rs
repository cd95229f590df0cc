//! Engine configuration.
//!
//! The engine is deliberately configuration-light: venue, quote currency
//! and the notional floor are compiled in, and the only runtime knob is
//! the per-run budget override, resolved here from a raw string so the
//! binary edge stays the single place that touches the environment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::plan::{Refusal, RefusalCode};

/// Compiled-in engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Venue identifier stamped into plans.
    pub venue: String,
    /// Quote currency every order is denominated in.
    pub quote_currency: String,
    /// Plan document schema version.
    pub schema_version: String,
    /// Default per-run budget in quote currency.
    pub notional_budget_quote: Decimal,
    /// Venue-independent floor under which no order is worth placing.
    pub min_order_notional: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            venue: "binance".to_string(),
            quote_currency: "USDT".to_string(),
            schema_version: "1.3".to_string(),
            notional_budget_quote: dec!(50),
            min_order_notional: dec!(5),
        }
    }
}

/// Outcome of resolving the budget override against the default.
#[derive(Debug, Clone)]
pub struct BudgetResolution {
    /// Budget the plan build will use.
    pub budget: Decimal,
    /// Refusal to record when the override was present but unusable.
    pub refusal: Option<Refusal>,
}

/// Resolve the effective budget from an optional raw override.
///
/// An absent or empty override silently uses the default. A present
/// override that is not a positive decimal falls back to the default
/// and records a plan-wide `BAD_BUDGET_OVERRIDE` refusal; the build
/// continues.
#[must_use]
pub fn resolve_budget(config: &EngineConfig, override_raw: Option<&str>) -> BudgetResolution {
    let raw = match override_raw {
        Some(raw) if !raw.trim().is_empty() => raw.trim(),
        _ => {
            return BudgetResolution {
                budget: config.notional_budget_quote,
                refusal: None,
            }
        }
    };

    match raw.parse::<Decimal>() {
        Ok(value) if value > Decimal::ZERO => BudgetResolution {
            budget: value,
            refusal: None,
        },
        _ => {
            tracing::warn!(raw, "unusable budget override, using default");
            BudgetResolution {
                budget: config.notional_budget_quote,
                refusal: Some(Refusal::plan_wide(
                    RefusalCode::BadBudgetOverride,
                    format!(
                        "Invalid budget override {raw:?}; using default {}.",
                        config.notional_budget_quote
                    ),
                )),
            }
        }
    }
}
