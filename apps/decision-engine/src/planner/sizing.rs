//! Per-symbol order sizing against venue lot rules.

use rust_decimal::Decimal;

use crate::models::market::SymbolRule;
use crate::models::plan::{Order, OrderSide, OrderType, Refusal, RefusalCode};

/// Floor a raw quantity to an exact multiple of the step size.
///
/// A non-positive step floors everything to zero; the caller turns that
/// into a refusal.
#[must_use]
pub fn floor_to_step(raw: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (raw / step).floor() * step
}

/// Size one symbol into an order, or explain why it cannot be.
///
/// The checks run in a fixed ladder and the first failure wins: price,
/// rule presence, rule parseability, rounding to zero, minimum
/// quantity, minimum notional. Never rounds a quantity up.
pub(crate) fn size_symbol(
    symbol: &str,
    per_order_notional: Decimal,
    price: Option<Decimal>,
    rule: Option<&SymbolRule>,
    rationale: &str,
) -> Result<Order, Refusal> {
    let price_used = match price {
        Some(p) if p > Decimal::ZERO => p,
        _ => {
            return Err(Refusal::for_symbol(
                RefusalCode::NoPrice,
                symbol,
                format!("No valid price for {symbol}. Order not created."),
            ))
        }
    };

    let Some(rule) = rule else {
        return Err(Refusal::for_symbol(
            RefusalCode::NoExchangeRules,
            symbol,
            format!("No exchange rules for {symbol}. Order not created."),
        ));
    };

    let Ok(parsed) = rule.parsed() else {
        return Err(Refusal::for_symbol(
            RefusalCode::BadExchangeRules,
            symbol,
            format!("Invalid exchange rules for {symbol}. Order not created."),
        ));
    };

    let raw_qty = per_order_notional / price_used;
    let qty = floor_to_step(raw_qty, parsed.step_size);

    if qty <= Decimal::ZERO {
        return Err(Refusal::for_symbol(
            RefusalCode::RoundingToZero,
            symbol,
            format!(
                "{symbol}: raw_qty={raw_qty}, qty={qty}, step_size={} rounded to zero.",
                parsed.step_size
            ),
        ));
    }

    if qty < parsed.min_qty {
        return Err(Refusal::for_symbol(
            RefusalCode::BelowMinQty,
            symbol,
            format!(
                "{symbol}: qty={qty} < min_qty={}. raw_qty={raw_qty}, step_size={}",
                parsed.min_qty, parsed.step_size
            ),
        ));
    }

    let notional = qty * price_used;
    if parsed.min_notional > Decimal::ZERO && notional < parsed.min_notional {
        return Err(Refusal::for_symbol(
            RefusalCode::BelowMinNotional,
            symbol,
            format!(
                "{symbol}: qty={qty}, notional={notional} < min_notional={}. \
                 raw_qty={raw_qty}, step_size={}, price_used={price_used}, \
                 effective_notional={notional}",
                parsed.min_notional, parsed.step_size
            ),
        ));
    }

    Ok(Order {
        symbol: symbol.to_string(),
        side: OrderSide::Buy,
        order_type: OrderType::Market,
        notional_quote: per_order_notional,
        price_used,
        quantity_base: qty,
        step_size_used: parsed.step_size,
        min_qty_used: parsed.min_qty,
        min_notional_used: parsed.min_notional,
        rationale: rationale.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rule(step: &str, min_qty: &str, min_notional: &str) -> SymbolRule {
        SymbolRule {
            step_size: step.to_string(),
            min_qty: min_qty.to_string(),
            min_notional: min_notional.to_string(),
            base_asset: "BTC".to_string(),
            quote_asset: "USDT".to_string(),
        }
    }

    #[test]
    fn test_floor_to_step_never_rounds_up() {
        assert_eq!(floor_to_step(dec!(0.000299), dec!(0.0001)), dec!(0.0002));
        assert_eq!(floor_to_step(dec!(0.0003), dec!(0.0001)), dec!(0.0003));
        assert_eq!(floor_to_step(dec!(0.00009), dec!(0.0001)), dec!(0.0000));
    }

    #[test]
    fn test_floor_to_step_zero_step() {
        assert_eq!(floor_to_step(dec!(1.5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(floor_to_step(dec!(1.5), dec!(-0.1)), Decimal::ZERO);
    }

    #[test]
    fn test_happy_path_order() {
        let r = rule("0.0001", "0.0001", "5");
        let order = size_symbol("BTCUSDT", dec!(25), Some(dec!(50000)), Some(&r), "trend")
            .unwrap();
        assert_eq!(order.quantity_base, dec!(0.0005));
        assert_eq!(order.price_used, dec!(50000));
        assert_eq!(order.notional_quote, dec!(25));
        assert_eq!(order.side, OrderSide::Buy);
        // 25 / 50000 = 0.0005, already on the grid.
        assert_eq!(order.quantity_base % order.step_size_used, Decimal::ZERO);
    }

    #[test]
    fn test_missing_price_refused() {
        let r = rule("0.0001", "0", "0");
        let refusal = size_symbol("BTCUSDT", dec!(25), None, Some(&r), "trend").unwrap_err();
        assert_eq!(refusal.code, RefusalCode::NoPrice);
        assert_eq!(refusal.symbol, "BTCUSDT");
    }

    #[test]
    fn test_non_positive_price_refused() {
        let r = rule("0.0001", "0", "0");
        let refusal =
            size_symbol("BTCUSDT", dec!(25), Some(Decimal::ZERO), Some(&r), "trend").unwrap_err();
        assert_eq!(refusal.code, RefusalCode::NoPrice);
    }

    #[test]
    fn test_missing_rule_refused() {
        let refusal = size_symbol("BTCUSDT", dec!(25), Some(dec!(50000)), None, "trend")
            .unwrap_err();
        assert_eq!(refusal.code, RefusalCode::NoExchangeRules);
    }

    #[test]
    fn test_unparseable_rule_refused() {
        let r = rule("garbage", "0", "0");
        let refusal = size_symbol("BTCUSDT", dec!(25), Some(dec!(50000)), Some(&r), "trend")
            .unwrap_err();
        assert_eq!(refusal.code, RefusalCode::BadExchangeRules);
    }

    #[test]
    fn test_rounding_to_zero_refused() {
        // 25 / 50000 = 0.0005 floors to zero on a 0.001 grid.
        let r = rule("0.001", "0", "0");
        let refusal = size_symbol("BTCUSDT", dec!(25), Some(dec!(50000)), Some(&r), "trend")
            .unwrap_err();
        assert_eq!(refusal.code, RefusalCode::RoundingToZero);
    }

    #[test]
    fn test_below_min_qty_refused() {
        let r = rule("0.0001", "0.01", "0");
        let refusal = size_symbol("BTCUSDT", dec!(25), Some(dec!(50000)), Some(&r), "trend")
            .unwrap_err();
        assert_eq!(refusal.code, RefusalCode::BelowMinQty);
        assert!(refusal.message.contains("min_qty=0.01"));
    }

    #[test]
    fn test_below_min_notional_refused() {
        // Flooring 25/50000 on a coarse grid drops realized notional
        // under the venue minimum of 25.
        let r = rule("0.0004", "0", "25");
        let refusal = size_symbol("BTCUSDT", dec!(25), Some(dec!(50000)), Some(&r), "trend")
            .unwrap_err();
        assert_eq!(refusal.code, RefusalCode::BelowMinNotional);
    }

    #[test]
    fn test_zero_min_notional_not_enforced() {
        let r = rule("0.0004", "0", "0");
        let order = size_symbol("BTCUSDT", dec!(25), Some(dec!(50000)), Some(&r), "trend")
            .unwrap();
        assert_eq!(order.quantity_base, dec!(0.0004));
    }
}
