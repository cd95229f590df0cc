//! Mock market data source for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::market::SymbolRule;

use super::{MarketDataError, PriceSource, RuleSource};

/// In-memory price and rule source with switchable failure modes.
#[derive(Debug, Default)]
pub struct MockMarketData {
    prices: RwLock<BTreeMap<String, Decimal>>,
    rules: RwLock<BTreeMap<String, SymbolRule>>,
    fail_prices: AtomicBool,
    fail_rules: AtomicBool,
}

impl MockMarketData {
    /// Create an empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price for a symbol.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.prices
            .write()
            .unwrap()
            .insert(symbol.to_string(), price);
    }

    /// Set the rule for a symbol from raw field strings.
    pub fn set_rule(&self, symbol: &str, step_size: &str, min_qty: &str, min_notional: &str) {
        let quote_len = symbol.len().saturating_sub(4);
        self.rules.write().unwrap().insert(
            symbol.to_string(),
            SymbolRule {
                step_size: step_size.to_string(),
                min_qty: min_qty.to_string(),
                min_notional: min_notional.to_string(),
                base_asset: symbol[..quote_len].to_string(),
                quote_asset: symbol[quote_len..].to_string(),
            },
        );
    }

    /// Make price fetches fail.
    pub fn fail_prices(&self, fail: bool) {
        self.fail_prices.store(fail, Ordering::SeqCst);
    }

    /// Make rule fetches fail.
    pub fn fail_rules(&self, fail: bool) {
        self.fail_rules.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PriceSource for MockMarketData {
    async fn fetch_prices(
        &self,
        symbols: &[String],
    ) -> Result<BTreeMap<String, Decimal>, MarketDataError> {
        if self.fail_prices.load(Ordering::SeqCst) {
            return Err(MarketDataError::Transport("mock price failure".to_string()));
        }
        let prices = self.prices.read().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| prices.get(s).map(|p| (s.clone(), *p)))
            .collect())
    }

    fn source(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl RuleSource for MockMarketData {
    async fn fetch_rules(
        &self,
        symbols: &[String],
    ) -> Result<BTreeMap<String, SymbolRule>, MarketDataError> {
        if self.fail_rules.load(Ordering::SeqCst) {
            return Err(MarketDataError::Transport("mock rule failure".to_string()));
        }
        let rules = self.rules.read().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| rules.get(s).map(|r| (s.clone(), r.clone())))
            .collect())
    }

    fn source(&self) -> &str {
        "mock"
    }
}
