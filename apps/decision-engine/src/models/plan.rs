//! Execution plan document: orders, refusals and audit context.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market::{ExchangeRulesSnapshot, PricingSnapshot};

/// What the plan instructs the downstream executor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    /// Execute the order list.
    Rebalance,
    /// Nothing to execute.
    NoAction,
}

/// Order side. v0 only emits BUY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy the base asset.
    Buy,
    /// Sell the base asset (not emitted by v0 plans).
    Sell,
}

/// Order type. v0 only emits MARKET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market order.
    Market,
}

/// A single venue-compliant buy instruction.
///
/// Carries every input used by sizing so the plan is auditable on its
/// own. Invariants: `quantity_base` is an exact multiple of
/// `step_size_used`, rounded toward zero from the raw quotient;
/// `quantity_base >= min_qty_used`; when `min_notional_used > 0`,
/// `quantity_base * price_used >= min_notional_used`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Venue symbol (e.g. "BTCUSDT").
    pub symbol: String,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Per-order budget in quote currency.
    pub notional_quote: Decimal,
    /// Price the sizing used.
    pub price_used: Decimal,
    /// Quantity after flooring to the step size.
    pub quantity_base: Decimal,
    /// Step size the sizing used.
    pub step_size_used: Decimal,
    /// Minimum quantity the sizing used.
    pub min_qty_used: Decimal,
    /// Minimum notional the sizing used.
    pub min_notional_used: Decimal,
    /// Human-readable rationale (strategy mode, risk score).
    pub rationale: String,
}

/// Why a symbol (or the whole plan) did not produce an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefusalCode {
    /// Budget override present but not a positive number.
    BadBudgetOverride,
    /// Strategy mode is an explicit do-nothing.
    StrategyDoNothing,
    /// Max gross exposure is zero.
    ZeroGrossExposure,
    /// Allowed universe is empty.
    NoAllowedSymbols,
    /// Strategy mode not in the closed set.
    UnrecognizedStrategyMode,
    /// Per-order or realized notional below the floor.
    BelowMinNotional,
    /// Price unavailable or non-positive.
    NoPrice,
    /// Exchange rules unavailable.
    NoExchangeRules,
    /// Exchange rule fields not parseable as exact decimals.
    BadExchangeRules,
    /// Quantity floored to zero at the step size.
    RoundingToZero,
    /// Quantity below the venue minimum.
    BelowMinQty,
}

impl RefusalCode {
    /// Wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadBudgetOverride => "BAD_BUDGET_OVERRIDE",
            Self::StrategyDoNothing => "STRATEGY_DO_NOTHING",
            Self::ZeroGrossExposure => "ZERO_GROSS_EXPOSURE",
            Self::NoAllowedSymbols => "NO_ALLOWED_SYMBOLS",
            Self::UnrecognizedStrategyMode => "UNRECOGNIZED_STRATEGY_MODE",
            Self::BelowMinNotional => "BELOW_MIN_NOTIONAL",
            Self::NoPrice => "NO_PRICE",
            Self::NoExchangeRules => "NO_EXCHANGE_RULES",
            Self::BadExchangeRules => "BAD_EXCHANGE_RULES",
            Self::RoundingToZero => "ROUNDING_TO_ZERO",
            Self::BelowMinQty => "BELOW_MIN_QTY",
        }
    }
}

impl std::fmt::Display for RefusalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Symbol marker for plan-wide refusals.
pub const PLAN_WIDE: &str = "*";

/// A structured, non-fatal record explaining a skipped order.
///
/// Refusals are append-only within one build, never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refusal {
    /// Refusal code.
    pub code: RefusalCode,
    /// Affected symbol, `"*"` for plan-wide.
    pub symbol: String,
    /// Human-readable message.
    pub message: String,
}

impl Refusal {
    /// Refusal scoped to one symbol.
    #[must_use]
    pub fn for_symbol(code: RefusalCode, symbol: &str, message: impl Into<String>) -> Self {
        Self {
            code,
            symbol: symbol.to_string(),
            message: message.into(),
        }
    }

    /// Plan-wide refusal.
    #[must_use]
    pub fn plan_wide(code: RefusalCode, message: impl Into<String>) -> Self {
        Self {
            code,
            symbol: PLAN_WIDE.to_string(),
            message: message.into(),
        }
    }

    /// True when the refusal concerns a single symbol.
    #[must_use]
    pub fn is_symbol_scoped(&self) -> bool {
        self.symbol != PLAN_WIDE
    }
}

/// The decision part of the plan document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// What to do.
    pub action: PlanAction,
    /// Ordered buy instructions. Non-empty iff `action` is rebalance.
    pub orders: Vec<Order>,
}

/// Paths/identifiers of the source snapshots, for audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanInputs {
    /// Where the facts pack came from.
    pub facts_pack_path: String,
    /// Where the decision packet came from.
    pub decision_packet_path: String,
}

/// Budget context for the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSpec {
    /// Fixed quote currency.
    pub quote_currency: String,
    /// Per-run notional budget in quote currency.
    pub notional_budget_quote: Decimal,
}

/// Run mode. This engine only ever produces dry runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Fully computed and validated, never sent to a real venue.
    DryRun,
}

/// Complete execution plan document, the unit that gets validated and
/// written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDocument {
    /// Plan schema version.
    pub schema_version: String,
    /// Build timestamp.
    pub as_of_utc: DateTime<Utc>,
    /// Venue identifier.
    pub venue: String,
    /// Run mode, always dry run.
    pub mode: RunMode,
    /// Source snapshot identifiers.
    pub inputs: PlanInputs,
    /// Budget context.
    pub portfolio: PortfolioSpec,
    /// Price snapshot used by sizing.
    pub pricing: PricingSnapshot,
    /// Exchange rule snapshot used by sizing.
    pub exchange_rules: ExchangeRulesSnapshot,
    /// The decision.
    pub plan: Plan,
    /// Every reason an order was not produced.
    pub refusals: Vec<Refusal>,
}

impl PlanDocument {
    /// True when any refusal is scoped to a concrete symbol.
    #[must_use]
    pub fn has_symbol_refusals(&self) -> bool {
        self.refusals.iter().any(Refusal::is_symbol_scoped)
    }
}
