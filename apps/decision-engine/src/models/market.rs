//! Per-run market snapshot: prices and exchange lot-size rules.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Venue-imposed quantization rules for one symbol.
///
/// Numeric fields are kept as wire strings and parsed to exact decimals
/// at sizing time; an unparseable field is a per-symbol refusal, not a
/// deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRule {
    /// Quantity granularity.
    pub step_size: String,
    /// Minimum order quantity.
    pub min_qty: String,
    /// Minimum order notional in quote currency.
    pub min_notional: String,
    /// Base asset (e.g. "BTC").
    pub base_asset: String,
    /// Quote asset (e.g. "USDT").
    pub quote_asset: String,
}

/// Exact-decimal view of a [`SymbolRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRule {
    /// Quantity granularity, > 0 expected.
    pub step_size: Decimal,
    /// Minimum order quantity, >= 0.
    pub min_qty: Decimal,
    /// Minimum order notional, >= 0.
    pub min_notional: Decimal,
}

impl SymbolRule {
    /// Parse the numeric fields as exact decimals.
    ///
    /// # Errors
    ///
    /// Returns the offending field name when a value does not parse.
    pub fn parsed(&self) -> Result<ParsedRule, &'static str> {
        let step_size = self.step_size.parse().map_err(|_| "step_size")?;
        let min_qty = self.min_qty.parse().map_err(|_| "min_qty")?;
        let min_notional = self.min_notional.parse().map_err(|_| "min_notional")?;
        Ok(ParsedRule {
            step_size,
            min_qty,
            min_notional,
        })
    }
}

/// Current prices for the allowed universe.
///
/// Absent entries mean "unknown", never zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSnapshot {
    /// Fetch timestamp.
    pub as_of_utc: DateTime<Utc>,
    /// Data source label, for audit.
    pub source: String,
    /// Price per symbol.
    pub prices: BTreeMap<String, Decimal>,
}

/// Exchange rules for the allowed universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRulesSnapshot {
    /// Fetch timestamp.
    pub as_of_utc: DateTime<Utc>,
    /// Data source label, for audit.
    pub source: String,
    /// Rules per symbol. Absent entries mean "unknown".
    pub symbols: BTreeMap<String, SymbolRule>,
}

/// One run's worth of market data, fetched once and then immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Price snapshot.
    pub pricing: PricingSnapshot,
    /// Lot-size rule snapshot.
    pub exchange_rules: ExchangeRulesSnapshot,
}

impl MarketSnapshot {
    /// Price for a symbol, if known.
    #[must_use]
    pub fn price(&self, symbol: &str) -> Option<Decimal> {
        self.pricing.prices.get(symbol).copied()
    }

    /// Rule for a symbol, if known.
    #[must_use]
    pub fn rule(&self, symbol: &str) -> Option<&SymbolRule> {
        self.exchange_rules.symbols.get(symbol)
    }
}
