//! Facts pack: precomputed market statistics consumed by the classifier.
//!
//! The engine consumes these statistics; it never computes them. A facts
//! pack with missing fields is still classifiable - the classifier
//! degrades to 0.0 defaults rather than erroring.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pairwise correlation block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationBlock {
    /// Symbol order of the matrix rows/columns.
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Square matrix, symmetric expected, diagonal = 1.0.
    #[serde(default)]
    pub matrix: Vec<Vec<f64>>,
}

impl CorrelationBlock {
    /// Mean of all off-diagonal cells, 0.0 when there are fewer than
    /// two symbols.
    #[must_use]
    pub fn average_off_diagonal(&self) -> f64 {
        let n = self.matrix.len();
        let mut sum = 0.0;
        let mut count = 0u32;
        for (i, row) in self.matrix.iter().enumerate() {
            for (j, cell) in row.iter().enumerate().take(n) {
                if i != j {
                    sum += cell;
                    count += 1;
                }
            }
        }
        if count == 0 { 0.0 } else { sum / f64::from(count) }
    }
}

/// Precomputed statistics for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactsPack {
    /// Schema version of the producing pipeline.
    #[serde(default)]
    pub schema_version: String,
    /// Timestamp of the statistics snapshot. Stamped by the classifier
    /// when absent.
    #[serde(default)]
    pub as_of_utc: Option<DateTime<Utc>>,
    /// Trading universe, in presentation order.
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Annualised realised volatility per symbol.
    #[serde(default)]
    pub realised_vol_annualised: BTreeMap<String, f64>,
    /// Pairwise correlation statistics.
    #[serde(default)]
    pub correlation: CorrelationBlock,
    /// Data-quality warnings raised upstream.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl FactsPack {
    /// Volatility for a symbol, 0.0 when absent.
    #[must_use]
    pub fn vol_for(&self, symbol: &str) -> f64 {
        self.realised_vol_annualised
            .get(symbol)
            .copied()
            .unwrap_or(0.0)
    }

    /// Volatilities for the symbols that carry statistics, in universe
    /// order. Symbols without statistics are skipped.
    #[must_use]
    pub fn known_vols(&self) -> Vec<f64> {
        self.symbols
            .iter()
            .filter_map(|s| self.realised_vol_annualised.get(s).copied())
            .collect()
    }
}
