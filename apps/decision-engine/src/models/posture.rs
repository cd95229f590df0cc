//! Risk posture produced by the regime classifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discrete market-risk classification driving exposure limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Low volatility, low correlation - full exposure allowed.
    RiskOn,
    /// Mixed conditions - reduced exposure, no new positions.
    Neutral,
    /// Elevated volatility anywhere in the universe - de-risk.
    RiskOff,
}

impl Regime {
    /// Annualised volatility target for this regime.
    #[must_use]
    pub const fn vol_target_annualised(self) -> f64 {
        match self {
            Self::RiskOff => 0.10,
            Self::RiskOn => 0.25,
            Self::Neutral => 0.20,
        }
    }

    /// Maximum gross exposure as a fraction of equity.
    #[must_use]
    pub const fn max_gross_exposure(self) -> f64 {
        match self {
            Self::RiskOff => 0.20,
            Self::Neutral => 0.50,
            Self::RiskOn => 1.00,
        }
    }

    /// Strategy mode mandated by this regime.
    #[must_use]
    pub fn strategy_mode(self) -> StrategyMode {
        match self {
            Self::RiskOff => StrategyMode::ReduceRisk,
            Self::Neutral => StrategyMode::DoNothing,
            Self::RiskOn => StrategyMode::Trend,
        }
    }

    /// Kill-switch daily drawdown limit for this regime.
    #[must_use]
    pub const fn max_daily_drawdown(self) -> f64 {
        match self {
            Self::RiskOff => 0.03,
            Self::Neutral => 0.05,
            Self::RiskOn => 0.08,
        }
    }
}

/// Strategy mode. Closed variant set so the "anything else" branch is
/// exhaustive and testable; unknown wire values round-trip through
/// `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StrategyMode {
    /// Follow the prevailing trend.
    Trend,
    /// Fade moves back toward the mean.
    MeanRevert,
    /// Reduce existing risk.
    ReduceRisk,
    /// Explicitly take no action.
    DoNothing,
    /// Any other mode string, preserved verbatim for refusal messages.
    Unrecognized(String),
}

impl StrategyMode {
    /// Wire representation of the mode.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Trend => "trend",
            Self::MeanRevert => "mean_revert",
            Self::ReduceRisk => "reduce_risk",
            Self::DoNothing => "do_nothing",
            Self::Unrecognized(text) => text,
        }
    }

    /// True for the modes that proceed to order sizing.
    #[must_use]
    pub const fn is_sizing_mode(&self) -> bool {
        matches!(self, Self::Trend | Self::MeanRevert | Self::ReduceRisk)
    }

    /// True for the explicit do-nothing mode.
    #[must_use]
    pub const fn is_do_nothing(&self) -> bool {
        matches!(self, Self::DoNothing)
    }
}

impl From<String> for StrategyMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "trend" => Self::Trend,
            "mean_revert" => Self::MeanRevert,
            "reduce_risk" => Self::ReduceRisk,
            "do_nothing" => Self::DoNothing,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<StrategyMode> for String {
    fn from(value: StrategyMode) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named risk with a one-line rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopRisk {
    /// Risk label (e.g. "Volatility").
    pub risk: String,
    /// Rationale embedding the rounded observed value.
    pub rationale: String,
}

/// Kill-switch parameters attached to every posture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillSwitch {
    /// Daily drawdown limit as a fraction of equity.
    pub max_daily_drawdown: f64,
    /// Conditions that trigger the switch.
    pub conditions: Vec<String>,
}

/// Full classifier output: regime plus everything the planner consumes.
///
/// Invariant: `allowed_symbols` and `blocked_symbols` are disjoint, and
/// `blocked_symbols` is a subset of the original universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posture {
    /// Posture schema version.
    pub schema_version: String,
    /// Timestamp of the underlying statistics (or classification time).
    pub as_of_utc: DateTime<Utc>,
    /// Global regime.
    pub regime: Regime,
    /// Risk score in [0, 100].
    pub risk_score: u8,
    /// Annualised volatility target.
    pub vol_target_annualised: f64,
    /// Maximum gross exposure in [0, 1].
    pub max_gross_exposure: f64,
    /// Strategy mode.
    pub strategy_mode: StrategyMode,
    /// Tradeable universe, order preserved from the input.
    pub allowed_symbols: Vec<String>,
    /// Symbols excluded for excessive volatility.
    pub blocked_symbols: Vec<String>,
    /// Ordered risk summary (volatility, correlation, data quality).
    pub top_risks: Vec<TopRisk>,
    /// Kill-switch parameters.
    pub kill_switch: KillSwitch,
}
