//! Deterministic plan settlement against an in-memory balance sheet.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::plan::{Order, OrderSide, PlanAction, PlanDocument};
use crate::models::settlement::{
    AcceptedOrder, ExecutionMode, PortfolioState, RejectReason, Rejection, SettlementReport,
};

/// Hard settlement failures. Everything else is a structured rejection
/// inside the report.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    /// A symbol in the plan does not end in the plan's quote currency.
    /// Malformed input, not a market condition, so it aborts the run.
    #[error("unsupported symbol format (expected *{quote}): {symbol}")]
    UnsupportedSymbol {
        /// Offending symbol.
        symbol: String,
        /// Expected quote suffix.
        quote: String,
    },
}

/// Stateless settlement simulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementSimulator {
    mode: ExecutionMode,
}

impl SettlementSimulator {
    /// Simulator in the given execution mode.
    #[must_use]
    pub const fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    /// Simulate the plan against the balance snapshot.
    ///
    /// Neither input is mutated; an aborted all-or-nothing batch
    /// reports the input balances untouched.
    ///
    /// # Errors
    ///
    /// [`SettlementError::UnsupportedSymbol`] when an order's symbol
    /// does not carry the quote-currency suffix.
    pub fn simulate(
        &self,
        doc: &PlanDocument,
        state: &PortfolioState,
    ) -> Result<SettlementReport, SettlementError> {
        let quote = doc.portfolio.quote_currency.as_str();
        let orders = &doc.plan.orders;

        if doc.plan.action != PlanAction::Rebalance || orders.is_empty() {
            return Ok(SettlementReport::no_op(state.balances.clone()));
        }

        match self.mode {
            ExecutionMode::AllOrNothing => Self::simulate_all_or_nothing(doc, state, quote),
            ExecutionMode::BestEffort => Self::simulate_best_effort(doc, state, quote),
        }
    }

    fn simulate_all_or_nothing(
        doc: &PlanDocument,
        state: &PortfolioState,
        quote: &str,
    ) -> Result<SettlementReport, SettlementError> {
        let orders = &doc.plan.orders;
        let mut rejected: Vec<Rejection> = Vec::new();
        let mut required_total = Decimal::ZERO;

        // Pre-pass: structural problems and the cumulative quote spend.
        for order in orders {
            if order.side != OrderSide::Buy {
                rejected.push(Rejection::new(&order.symbol, RejectReason::UnsupportedSide));
                continue;
            }
            split_symbol(&order.symbol, quote)?;
            if order.notional_quote <= Decimal::ZERO {
                rejected.push(Rejection::new(&order.symbol, RejectReason::BadNotional));
                continue;
            }
            required_total += order.notional_quote;
        }

        if !rejected.is_empty() {
            return Ok(Self::aborted(state, rejected));
        }

        if required_total > state.balance(quote) {
            let rejections = orders
                .iter()
                .map(|o| Rejection::new(&o.symbol, RejectReason::InsufficientBalance))
                .collect();
            return Ok(Self::aborted(state, rejections));
        }

        // Apply on scratch balances so an abort leaves the input
        // snapshot untouched.
        let mut balances = state.balances.clone();
        let mut accepted: Vec<AcceptedOrder> = Vec::new();
        for order in orders {
            let Some(fill) = apply_order(order, quote, &mut balances)? else {
                rejected.push(Rejection::new(&order.symbol, RejectReason::MissingPriceUsed));
                return Ok(Self::aborted(state, rejected));
            };
            accepted.push(fill);
        }

        tracing::info!(
            accepted = accepted.len(),
            spent = %required_total,
            "all-or-nothing settlement accepted"
        );

        Ok(SettlementReport {
            action: PlanAction::Rebalance,
            accepted_orders: accepted,
            rejected_orders: vec![],
            resulting_balances: balances,
        })
    }

    fn simulate_best_effort(
        doc: &PlanDocument,
        state: &PortfolioState,
        quote: &str,
    ) -> Result<SettlementReport, SettlementError> {
        let mut balances = state.balances.clone();
        let mut accepted: Vec<AcceptedOrder> = Vec::new();
        let mut rejected: Vec<Rejection> = Vec::new();

        for order in &doc.plan.orders {
            if order.side != OrderSide::Buy {
                rejected.push(Rejection::new(&order.symbol, RejectReason::UnsupportedSide));
                continue;
            }
            if order.notional_quote <= Decimal::ZERO {
                rejected.push(Rejection::new(&order.symbol, RejectReason::BadNotional));
                continue;
            }
            if order.price_used <= Decimal::ZERO {
                rejected.push(Rejection::new(&order.symbol, RejectReason::MissingPriceUsed));
                break;
            }
            if balances.get(quote).copied().unwrap_or(Decimal::ZERO) < order.notional_quote {
                rejected.push(Rejection::new(
                    &order.symbol,
                    RejectReason::InsufficientBalance,
                ));
                break;
            }
            if let Some(fill) = apply_order(order, quote, &mut balances)? {
                accepted.push(fill);
            }
        }

        let action = if accepted.is_empty() {
            PlanAction::NoAction
        } else {
            PlanAction::Rebalance
        };

        Ok(SettlementReport {
            action,
            accepted_orders: accepted,
            rejected_orders: rejected,
            resulting_balances: balances,
        })
    }

    fn aborted(state: &PortfolioState, mut rejected: Vec<Rejection>) -> SettlementReport {
        tracing::warn!(rejections = rejected.len(), "settlement batch aborted");
        rejected.push(Rejection::abort_marker());
        SettlementReport {
            action: PlanAction::NoAction,
            accepted_orders: vec![],
            rejected_orders: rejected,
            resulting_balances: state.balances.clone(),
        }
    }
}

/// Split a venue symbol into base and quote, requiring the quote suffix
/// and a non-empty base.
fn split_symbol<'a>(symbol: &'a str, quote: &str) -> Result<&'a str, SettlementError> {
    match symbol.strip_suffix(quote) {
        Some(base) if !base.is_empty() => Ok(base),
        _ => Err(SettlementError::UnsupportedSymbol {
            symbol: symbol.to_string(),
            quote: quote.to_string(),
        }),
    }
}

/// Debit the quote spend, credit the base quantity. `None` when the
/// order carries no usable price.
fn apply_order(
    order: &Order,
    quote: &str,
    balances: &mut BTreeMap<String, Decimal>,
) -> Result<Option<AcceptedOrder>, SettlementError> {
    if order.price_used <= Decimal::ZERO {
        return Ok(None);
    }
    let base = split_symbol(&order.symbol, quote)?;
    let qty = order.notional_quote / order.price_used;

    *balances.entry(quote.to_string()).or_insert(Decimal::ZERO) -= order.notional_quote;
    *balances.entry(base.to_string()).or_insert(Decimal::ZERO) += qty;

    Ok(Some(AcceptedOrder {
        symbol: order.symbol.clone(),
        side: order.side,
        notional_quote: order.notional_quote,
        price_used: order.price_used,
        quantity_base_simulated: qty,
    }))
}
