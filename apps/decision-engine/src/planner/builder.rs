//! Plan builder: applies the refusal ladder and assembles the document.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::{resolve_budget, EngineConfig};
use crate::models::market::MarketSnapshot;
use crate::models::plan::{
    Order, Plan, PlanAction, PlanDocument, PlanInputs, PortfolioSpec, Refusal, RefusalCode,
    RunMode,
};
use crate::models::posture::Posture;

use super::sizing::size_symbol;

/// How symbol-level refusals affect the rest of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanPolicy {
    /// Any symbol-scoped refusal empties the order list: the plan
    /// either executes in full or not at all.
    #[default]
    AllOrNothing,
    /// Symbols that fail are refused individually; the rest still
    /// produce orders.
    PerSymbol,
}

/// Deterministic plan builder.
///
/// Holds no state between builds. Two builds over identical inputs
/// produce identical documents apart from the build timestamp, which
/// tests pin via [`ExecutionPlanBuilder::with_as_of`].
#[derive(Debug, Clone)]
pub struct ExecutionPlanBuilder {
    config: EngineConfig,
    policy: PlanPolicy,
    as_of: Option<DateTime<Utc>>,
}

impl ExecutionPlanBuilder {
    /// Builder with the given config and the all-or-nothing policy.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self {
            config,
            policy: PlanPolicy::AllOrNothing,
            as_of: None,
        }
    }

    /// Override the refusal policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: PlanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pin the build timestamp.
    #[must_use]
    pub const fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Build a plan document from a posture and a market snapshot.
    ///
    /// Never fails: every reason not to trade becomes a refusal record
    /// inside the returned document.
    #[must_use]
    pub fn build(
        &self,
        posture: &Posture,
        snapshot: &MarketSnapshot,
        inputs: PlanInputs,
        budget_override: Option<&str>,
    ) -> PlanDocument {
        let mut refusals: Vec<Refusal> = Vec::new();
        let mut orders: Vec<Order> = Vec::new();
        let mut action = PlanAction::NoAction;

        let resolution = resolve_budget(&self.config, budget_override);
        let budget = resolution.budget;
        if let Some(refusal) = resolution.refusal {
            refusals.push(refusal);
        }

        let mode = &posture.strategy_mode;
        if mode.is_do_nothing() {
            refusals.push(Refusal::plan_wide(
                RefusalCode::StrategyDoNothing,
                "Strategy mode is do_nothing. No action taken.",
            ));
        } else if posture.max_gross_exposure == 0.0 {
            refusals.push(Refusal::plan_wide(
                RefusalCode::ZeroGrossExposure,
                "Max gross exposure is zero. No action taken.",
            ));
        } else if posture.allowed_symbols.is_empty() {
            refusals.push(Refusal::plan_wide(
                RefusalCode::NoAllowedSymbols,
                "No allowed symbols. No action taken.",
            ));
        } else if mode.is_sizing_mode() {
            action = PlanAction::Rebalance;
            let count = Decimal::from(posture.allowed_symbols.len());
            let per_order_notional = (budget / count).round_dp(2);

            if per_order_notional < self.config.min_order_notional {
                for symbol in &posture.allowed_symbols {
                    refusals.push(Refusal::for_symbol(
                        RefusalCode::BelowMinNotional,
                        symbol,
                        format!(
                            "Per-order notional ({per_order_notional}) below minimum ({}). \
                             No orders created.",
                            self.config.min_order_notional
                        ),
                    ));
                }
            } else {
                let rationale = format!(
                    "{} strategy, risk_score={}",
                    mode.as_str(),
                    posture.risk_score
                );
                for symbol in &posture.allowed_symbols {
                    match size_symbol(
                        symbol,
                        per_order_notional,
                        snapshot.price(symbol),
                        snapshot.rule(symbol),
                        &rationale,
                    ) {
                        Ok(order) => orders.push(order),
                        Err(refusal) => refusals.push(refusal),
                    }
                }
            }
        } else {
            refusals.push(Refusal::plan_wide(
                RefusalCode::UnrecognizedStrategyMode,
                format!("Unrecognized strategy_mode: {mode}. No action taken."),
            ));
        }

        // Finalization. Under all-or-nothing a single failed symbol
        // invalidates the whole batch; either way an empty order list
        // always downgrades the action.
        if self.policy == PlanPolicy::AllOrNothing
            && refusals.iter().any(Refusal::is_symbol_scoped)
        {
            orders.clear();
        }
        if orders.is_empty() {
            action = PlanAction::NoAction;
        }

        tracing::info!(
            action = ?action,
            orders = orders.len(),
            refusals = refusals.len(),
            budget = %budget,
            "built execution plan"
        );

        PlanDocument {
            schema_version: self.config.schema_version.clone(),
            as_of_utc: self.as_of.unwrap_or_else(Utc::now),
            venue: self.config.venue.clone(),
            mode: RunMode::DryRun,
            inputs,
            portfolio: PortfolioSpec {
                quote_currency: self.config.quote_currency.clone(),
                notional_budget_quote: budget,
            },
            pricing: snapshot.pricing.clone(),
            exchange_rules: snapshot.exchange_rules.clone(),
            plan: Plan { action, orders },
            refusals,
        }
    }
}
