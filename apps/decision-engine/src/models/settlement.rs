//! Paper settlement types: portfolio snapshot, fills and rejections.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::plan::{OrderSide, PlanAction};

/// How the simulator treats a batch of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Any single failure invalidates the entire batch. The only mode
    /// exercised by the surrounding system.
    #[default]
    AllOrNothing,
    /// Sequential execution, stopping acceptance of further orders at
    /// the first missing-price or insufficient-balance condition.
    BestEffort,
}

/// Why an order was rejected during settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Order side other than BUY.
    UnsupportedSide,
    /// Non-positive notional.
    BadNotional,
    /// `price_used` missing or non-positive.
    MissingPriceUsed,
    /// Cumulative quote spend exceeds the available balance.
    InsufficientBalance,
    /// Plan-wide marker appended when the whole batch is aborted.
    AllOrNothingAbort,
}

/// A single rejected order (or the plan-wide abort marker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Affected symbol, `"*"` for the abort marker.
    pub symbol: String,
    /// Rejection reason.
    pub reason: RejectReason,
}

impl Rejection {
    /// Rejection for one order.
    #[must_use]
    pub fn new(symbol: &str, reason: RejectReason) -> Self {
        Self {
            symbol: symbol.to_string(),
            reason,
        }
    }

    /// The plan-wide all-or-nothing abort marker.
    #[must_use]
    pub fn abort_marker() -> Self {
        Self {
            symbol: "*".to_string(),
            reason: RejectReason::AllOrNothingAbort,
        }
    }
}

/// A simulated fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedOrder {
    /// Venue symbol.
    pub symbol: String,
    /// Order side.
    pub side: OrderSide,
    /// Quote spent.
    pub notional_quote: Decimal,
    /// Price used.
    pub price_used: Decimal,
    /// Base quantity credited, `notional / price`.
    pub quantity_base_simulated: Decimal,
}

/// Portfolio balance snapshot consumed by the simulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Free balance per asset.
    #[serde(default)]
    pub balances: BTreeMap<String, Decimal>,
}

impl PortfolioState {
    /// Balance for an asset, zero when absent.
    #[must_use]
    pub fn balance(&self, asset: &str) -> Decimal {
        self.balances.get(asset).copied().unwrap_or(Decimal::ZERO)
    }
}

/// What would happen if the plan executed against the balance snapshot.
///
/// Built fresh per call from an immutable plan and balance snapshot; no
/// state persists between calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Resulting action: rebalance when anything was accepted.
    pub action: PlanAction,
    /// Simulated fills, in plan order.
    pub accepted_orders: Vec<AcceptedOrder>,
    /// Rejections, in evaluation order.
    pub rejected_orders: Vec<Rejection>,
    /// Balances after the accepted subset (input balances on abort).
    pub resulting_balances: BTreeMap<String, Decimal>,
}

impl SettlementReport {
    /// No-op report echoing the input balances unchanged.
    #[must_use]
    pub fn no_op(balances: BTreeMap<String, Decimal>) -> Self {
        Self {
            action: PlanAction::NoAction,
            accepted_orders: vec![],
            rejected_orders: vec![],
            resulting_balances: balances,
        }
    }
}
