//! Binance public REST adapters for prices and exchange rules.
//!
//! Unauthenticated endpoints only: `/api/v3/ticker/price` and
//! `/api/v3/exchangeInfo`.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::market::SymbolRule;

use super::{MarketDataError, PriceSource, RuleSource};

const DEFAULT_BASE_URL: &str = "https://api.binance.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Conservative fallbacks for rules missing a filter.
const FALLBACK_STEP_SIZE: &str = "0.00000001";
const FALLBACK_MIN_QTY: &str = "0";
const FALLBACK_MIN_NOTIONAL: &str = "0";

/// Client for Binance's public market data endpoints.
#[derive(Debug, Clone)]
pub struct BinancePublicClient {
    http: reqwest::Client,
    base_url: String,
}

impl BinancePublicClient {
    /// Create a client against the production endpoint.
    ///
    /// # Errors
    ///
    /// [`MarketDataError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against an alternate base URL (test servers).
    ///
    /// # Errors
    ///
    /// [`MarketDataError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn with_base_url(base_url: &str) -> Result<Self, MarketDataError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MarketDataError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    symbol: String,
    price: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfoResponse {
    #[serde(default)]
    symbols: Vec<ExchangeSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeSymbol {
    symbol: String,
    base_asset: String,
    quote_asset: String,
    #[serde(default)]
    filters: Vec<RawFilter>,
}

/// One entry of the per-symbol filter list. Binance ships many filter
/// types; only the quantization ones are read, the rest deserialize
/// with every field `None`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilter {
    filter_type: String,
    step_size: Option<String>,
    min_qty: Option<String>,
    min_notional: Option<String>,
}

impl ExchangeSymbol {
    /// Fold the filter list into a [`SymbolRule`].
    ///
    /// `LOT_SIZE` supplies quantity granularity; `MIN_NOTIONAL` wins
    /// over the newer `NOTIONAL` filter when both are present.
    fn into_rule(self) -> SymbolRule {
        let mut step_size: Option<String> = None;
        let mut min_qty: Option<String> = None;
        let mut min_notional: Option<String> = None;

        for filter in self.filters {
            match filter.filter_type.as_str() {
                "LOT_SIZE" => {
                    step_size = filter.step_size;
                    min_qty = filter.min_qty;
                }
                "MIN_NOTIONAL" => {
                    min_notional = filter.min_notional;
                }
                "NOTIONAL" => {
                    if min_notional.is_none() {
                        min_notional = filter.min_notional;
                    }
                }
                _ => {}
            }
        }

        SymbolRule {
            step_size: step_size.unwrap_or_else(|| FALLBACK_STEP_SIZE.to_string()),
            min_qty: min_qty.unwrap_or_else(|| FALLBACK_MIN_QTY.to_string()),
            min_notional: min_notional.unwrap_or_else(|| FALLBACK_MIN_NOTIONAL.to_string()),
            base_asset: self.base_asset,
            quote_asset: self.quote_asset,
        }
    }
}

#[async_trait]
impl PriceSource for BinancePublicClient {
    async fn fetch_prices(
        &self,
        symbols: &[String],
    ) -> Result<BTreeMap<String, Decimal>, MarketDataError> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketDataError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| MarketDataError::Transport(e.to_string()))?;
        let tickers: Vec<TickerPrice> = response
            .json()
            .await
            .map_err(|e| MarketDataError::Decode(e.to_string()))?;

        let mut prices = BTreeMap::new();
        for ticker in tickers {
            if !symbols.contains(&ticker.symbol) {
                continue;
            }
            // Unparseable or non-positive prices are treated as absent.
            if let Ok(price) = ticker.price.parse::<Decimal>() {
                if price > Decimal::ZERO {
                    prices.insert(ticker.symbol, price);
                }
            }
        }
        tracing::debug!(requested = symbols.len(), found = prices.len(), "fetched prices");
        Ok(prices)
    }

    fn source(&self) -> &str {
        "binance_public"
    }
}

#[async_trait]
impl RuleSource for BinancePublicClient {
    async fn fetch_rules(
        &self,
        symbols: &[String],
    ) -> Result<BTreeMap<String, SymbolRule>, MarketDataError> {
        if symbols.is_empty() {
            return Ok(BTreeMap::new());
        }

        // The endpoint expects a compact JSON array, no spaces.
        let symbols_param = serde_json::to_string(symbols)
            .map_err(|e| MarketDataError::Decode(e.to_string()))?;
        let url = format!("{}/api/v3/exchangeInfo", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("symbols", symbols_param.as_str())])
            .send()
            .await
            .map_err(|e| MarketDataError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| MarketDataError::Transport(e.to_string()))?;
        let info: ExchangeInfoResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::Decode(e.to_string()))?;

        Ok(info
            .symbols
            .into_iter()
            .map(|s| (s.symbol.clone(), s.into_rule()))
            .collect())
    }

    fn source(&self) -> &str {
        "binance_exchange_info"
    }
}
