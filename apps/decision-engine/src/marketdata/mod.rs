//! Market data ports and adapters.
//!
//! The planner consumes an immutable [`MarketSnapshot`]; everything
//! here exists to produce one. Source failures degrade to empty maps
//! so a venue outage becomes per-symbol refusals downstream instead of
//! a crashed run.

mod binance;
mod mock;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::market::{ExchangeRulesSnapshot, MarketSnapshot, PricingSnapshot, SymbolRule};

pub use binance::BinancePublicClient;
pub use mock::MockMarketData;

/// Market data fetch failures.
#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    /// The venue could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The venue responded with something unparseable.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Source of current prices for a symbol universe.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch prices for the given symbols. Symbols the source does not
    /// know are simply absent from the result.
    async fn fetch_prices(
        &self,
        symbols: &[String],
    ) -> Result<BTreeMap<String, Decimal>, MarketDataError>;

    /// Audit label stamped into the pricing snapshot.
    fn source(&self) -> &str;
}

/// Source of venue lot-size rules for a symbol universe.
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Fetch rules for the given symbols. Unknown symbols are absent.
    async fn fetch_rules(
        &self,
        symbols: &[String],
    ) -> Result<BTreeMap<String, SymbolRule>, MarketDataError>;

    /// Audit label stamped into the rules snapshot.
    fn source(&self) -> &str;
}

/// Fetch one run's market snapshot.
///
/// A failed fetch is logged and degraded to an empty map; the planner
/// then refuses the affected symbols with `NO_PRICE` or
/// `NO_EXCHANGE_RULES`.
pub async fn fetch_snapshot(
    price_source: &dyn PriceSource,
    rule_source: &dyn RuleSource,
    symbols: &[String],
    as_of: DateTime<Utc>,
) -> MarketSnapshot {
    let prices = match price_source.fetch_prices(symbols).await {
        Ok(prices) => prices,
        Err(err) => {
            tracing::warn!(error = %err, "price fetch failed, continuing without prices");
            BTreeMap::new()
        }
    };

    let rules = match rule_source.fetch_rules(symbols).await {
        Ok(rules) => rules,
        Err(err) => {
            tracing::warn!(error = %err, "rule fetch failed, continuing without rules");
            BTreeMap::new()
        }
    };

    MarketSnapshot {
        pricing: PricingSnapshot {
            as_of_utc: as_of,
            source: price_source.source().to_string(),
            prices,
        },
        exchange_rules: ExchangeRulesSnapshot {
            as_of_utc: as_of,
            source: rule_source.source().to_string(),
            symbols: rules,
        },
    }
}
