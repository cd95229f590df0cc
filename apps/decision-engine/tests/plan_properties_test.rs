//! Property tests for sizing, plan integrity and settlement.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use decision_engine::models::market::{
    ExchangeRulesSnapshot, MarketSnapshot, PricingSnapshot, SymbolRule,
};
use decision_engine::models::plan::{PlanAction, PlanInputs};
use decision_engine::models::posture::{KillSwitch, Posture, Regime, StrategyMode, TopRisk};
use decision_engine::planner::floor_to_step;
use decision_engine::validate::validate_plan_document;
use decision_engine::{
    EngineConfig, ExecutionMode, ExecutionPlanBuilder, PortfolioState, SettlementSimulator,
};

fn posture(allowed: Vec<String>) -> Posture {
    Posture {
        schema_version: "1.0".to_string(),
        as_of_utc: "2026-01-01T00:00:00Z".parse().unwrap(),
        regime: Regime::RiskOn,
        risk_score: 40,
        vol_target_annualised: 0.25,
        max_gross_exposure: 1.0,
        strategy_mode: StrategyMode::Trend,
        allowed_symbols: allowed,
        blocked_symbols: vec![],
        top_risks: vec![TopRisk {
            risk: "Volatility".to_string(),
            rationale: "Max realised volatility is 0.30.".to_string(),
        }],
        kill_switch: KillSwitch {
            max_daily_drawdown: 0.08,
            conditions: vec!["Daily drawdown breach".to_string()],
        },
    }
}

fn snapshot(entries: &[(String, Decimal, String)]) -> MarketSnapshot {
    let as_of = "2026-01-01T00:00:00Z".parse().unwrap();
    MarketSnapshot {
        pricing: PricingSnapshot {
            as_of_utc: as_of,
            source: "mock".to_string(),
            prices: entries
                .iter()
                .map(|(s, p, _)| (s.clone(), *p))
                .collect::<BTreeMap<_, _>>(),
        },
        exchange_rules: ExchangeRulesSnapshot {
            as_of_utc: as_of,
            source: "mock".to_string(),
            symbols: entries
                .iter()
                .map(|(s, _, step)| {
                    (
                        s.clone(),
                        SymbolRule {
                            step_size: step.clone(),
                            min_qty: "0".to_string(),
                            min_notional: "0".to_string(),
                            base_asset: s.trim_end_matches("USDT").to_string(),
                            quote_asset: "USDT".to_string(),
                        },
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        },
    }
}

/// Decimal in (0, ~10^6) built from an integer mantissa and scale.
fn positive_decimal() -> impl Strategy<Value = Decimal> {
    (1_i64..1_000_000_000, 0_u32..6).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn step_size() -> impl Strategy<Value = Decimal> {
    // Realistic venue grids: 1e-8 up to 1.
    (0_u32..9).prop_map(|exp| Decimal::new(1, exp))
}

proptest! {
    // Flooring never rounds up and always lands on the grid.
    #[test]
    fn prop_floor_to_step_is_safe(raw in positive_decimal(), step in step_size()) {
        let floored = floor_to_step(raw, step);
        prop_assert!(floored <= raw);
        prop_assert!(floored >= Decimal::ZERO);
        prop_assert_eq!(floored % step, Decimal::ZERO);
        // Never off by a whole step.
        prop_assert!(raw - floored < step);
    }

    // Whatever prices, steps and budget the builder sees, the emitted
    // document passes the structural gate.
    #[test]
    fn prop_built_plans_always_validate(
        price_a in positive_decimal(),
        price_b in positive_decimal(),
        step_a in step_size(),
        step_b in step_size(),
        budget in 1_u32..100_000,
    ) {
        let entries = vec![
            ("AAAUSDT".to_string(), price_a, step_a.to_string()),
            ("BBBUSDT".to_string(), price_b, step_b.to_string()),
        ];
        let doc = ExecutionPlanBuilder::new(EngineConfig::default())
            .with_as_of("2026-01-01T00:00:00Z".parse().unwrap())
            .build(
                &posture(vec!["AAAUSDT".to_string(), "BBBUSDT".to_string()]),
                &snapshot(&entries),
                PlanInputs::default(),
                Some(&budget.to_string()),
            );
        prop_assert!(validate_plan_document(&doc).is_ok());
        // Action and orders always agree.
        match doc.plan.action {
            PlanAction::Rebalance => prop_assert!(!doc.plan.orders.is_empty()),
            PlanAction::NoAction => prop_assert!(doc.plan.orders.is_empty()),
        }
        // An empty order list is always explained.
        if doc.plan.orders.is_empty() {
            prop_assert!(!doc.refusals.is_empty());
        }
    }

    // Accepted settlements conserve value at fill prices and never
    // overspend the quote balance.
    #[test]
    fn prop_settlement_conserves_value(
        price_a in positive_decimal(),
        price_b in positive_decimal(),
        budget in 10_u32..10_000,
        balance in 1_u32..100_000,
    ) {
        let entries = vec![
            ("AAAUSDT".to_string(), price_a, "0.00000001".to_string()),
            ("BBBUSDT".to_string(), price_b, "0.00000001".to_string()),
        ];
        let doc = ExecutionPlanBuilder::new(EngineConfig::default())
            .with_as_of("2026-01-01T00:00:00Z".parse().unwrap())
            .build(
                &posture(vec!["AAAUSDT".to_string(), "BBBUSDT".to_string()]),
                &snapshot(&entries),
                PlanInputs::default(),
                Some(&budget.to_string()),
            );

        let balance = Decimal::from(balance);
        let mut balances = BTreeMap::new();
        balances.insert("USDT".to_string(), balance);
        let state = PortfolioState { balances };

        let simulator = SettlementSimulator::new(ExecutionMode::AllOrNothing);
        let report = simulator.simulate(&doc, &state).unwrap();

        match report.action {
            PlanAction::Rebalance => {
                let spent: Decimal = report
                    .accepted_orders
                    .iter()
                    .map(|o| o.notional_quote)
                    .sum();
                prop_assert!(spent <= balance);
                prop_assert_eq!(
                    report.resulting_balances["USDT"],
                    balance - spent
                );
                // Value at fill prices is conserved up to the 28-digit
                // precision of the simulated quantity.
                let credited: Decimal = report
                    .accepted_orders
                    .iter()
                    .map(|o| o.quantity_base_simulated * o.price_used)
                    .sum();
                let drift = (credited - spent).abs();
                prop_assert!(drift <= dec!(0.000001) * (Decimal::ONE + spent));
            }
            PlanAction::NoAction => {
                prop_assert!(report.accepted_orders.is_empty());
                prop_assert_eq!(&report.resulting_balances, &state.balances);
            }
        }
    }

    // Identical inputs, identical documents, byte for byte.
    #[test]
    fn prop_builds_are_idempotent(
        price in positive_decimal(),
        step in step_size(),
        budget in 1_u32..100_000,
    ) {
        let entries = vec![("AAAUSDT".to_string(), price, step.to_string())];
        let p = posture(vec!["AAAUSDT".to_string()]);
        let s = snapshot(&entries);
        let builder = ExecutionPlanBuilder::new(EngineConfig::default())
            .with_as_of("2026-01-01T00:00:00Z".parse().unwrap());
        let raw = budget.to_string();

        let a = builder.build(&p, &s, PlanInputs::default(), Some(&raw));
        let b = builder.build(&p, &s, PlanInputs::default(), Some(&raw));
        prop_assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
