//! Deterministic regime classifier.
//!
//! Maps a facts pack to a risk posture. This component never fails: on
//! missing statistics it degrades to 0.0 defaults rather than erroring,
//! so callers that need non-degenerate output must validate inputs
//! upstream.

use chrono::{DateTime, Utc};

use crate::models::facts::FactsPack;
use crate::models::posture::{KillSwitch, Posture, Regime, TopRisk};

/// Volatility above which any single symbol flips the regime to risk-off.
const RISK_OFF_VOL: f64 = 0.80;
/// All vols must sit below this (with low correlation) for risk-on.
const RISK_ON_VOL: f64 = 0.45;
/// Average correlation must sit below this for risk-on.
const RISK_ON_CORR: f64 = 0.60;
/// Elevated-volatility score bonus threshold.
const ELEVATED_VOL: f64 = 0.65;
/// Crowding score bonus threshold.
const CROWDED_CORR: f64 = 0.75;
/// Symbols above this volatility are blocked outright.
const BLOCK_VOL: f64 = 1.00;

/// Posture schema version emitted by this classifier.
const POSTURE_SCHEMA_VERSION: &str = "1.0";

/// Stateless classifier. Classification is a pure function of the facts
/// pack; the clock is read only to stamp a missing input timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegimeClassifier;

impl RegimeClassifier {
    /// Create a classifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Classify a facts pack, stamping the current time if the input
    /// carries no timestamp. The only clock read in the classifier.
    #[must_use]
    pub fn classify(&self, facts: &FactsPack) -> Posture {
        self.classify_at(facts, Utc::now())
    }

    /// Classify with an explicit fallback timestamp.
    #[must_use]
    pub fn classify_at(&self, facts: &FactsPack, now: DateTime<Utc>) -> Posture {
        let vols = facts.known_vols();
        let max_vol = vols.iter().copied().fold(0.0_f64, f64::max);
        let avg_corr = facts.correlation.average_off_diagonal();

        let regime = Self::regime(&vols, avg_corr);
        let risk_score = Self::risk_score(max_vol, avg_corr);

        let blocked_symbols: Vec<String> = facts
            .symbols
            .iter()
            .filter(|s| facts.vol_for(s) > BLOCK_VOL)
            .cloned()
            .collect();
        let allowed_symbols: Vec<String> = facts
            .symbols
            .iter()
            .filter(|s| !blocked_symbols.contains(s))
            .cloned()
            .collect();

        let mut top_risks = vec![
            TopRisk {
                risk: "Volatility".to_string(),
                rationale: format!("Max realised volatility is {max_vol:.2}."),
            },
            TopRisk {
                risk: "Correlation".to_string(),
                rationale: format!("Average pairwise correlation is {avg_corr:.2}."),
            },
        ];
        if !facts.warnings.is_empty() {
            top_risks.push(TopRisk {
                risk: "Data quality".to_string(),
                rationale: format!("Warnings present: {}", facts.warnings.join(", ")),
            });
        }

        tracing::debug!(
            regime = ?regime,
            risk_score,
            max_vol,
            avg_corr,
            blocked = blocked_symbols.len(),
            "classified facts pack"
        );

        Posture {
            schema_version: POSTURE_SCHEMA_VERSION.to_string(),
            as_of_utc: facts.as_of_utc.unwrap_or(now),
            regime,
            risk_score,
            vol_target_annualised: regime.vol_target_annualised(),
            max_gross_exposure: regime.max_gross_exposure(),
            strategy_mode: regime.strategy_mode(),
            allowed_symbols,
            blocked_symbols,
            top_risks,
            kill_switch: KillSwitch {
                max_daily_drawdown: regime.max_daily_drawdown(),
                conditions: vec![
                    "Schema validation failure".to_string(),
                    "Daily drawdown breach".to_string(),
                    "Missing data / insufficient samples".to_string(),
                ],
            },
        }
    }

    /// Risk-off always takes priority over the risk-on test.
    fn regime(vols: &[f64], avg_corr: f64) -> Regime {
        if vols.iter().any(|v| *v > RISK_OFF_VOL) {
            Regime::RiskOff
        } else if vols.iter().all(|v| *v < RISK_ON_VOL) && avg_corr < RISK_ON_CORR {
            Regime::RiskOn
        } else {
            Regime::Neutral
        }
    }

    /// Score starts at 50; the two volatility bonuses can stack.
    fn risk_score(max_vol: f64, avg_corr: f64) -> u8 {
        let mut score: i32 = 50;
        if max_vol > RISK_OFF_VOL {
            score += 20;
        }
        if max_vol > ELEVATED_VOL {
            score += 10;
        }
        if avg_corr > CROWDED_CORR {
            score += 10;
        }
        if max_vol < RISK_ON_VOL {
            score -= 10;
        }
        u8::try_from(score.clamp(0, 100)).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::facts::CorrelationBlock;
    use crate::models::posture::StrategyMode;
    use std::collections::BTreeMap;

    fn facts(vols: &[(&str, f64)], corr: &[Vec<f64>], warnings: &[&str]) -> FactsPack {
        FactsPack {
            schema_version: "1.0".to_string(),
            as_of_utc: Some("2026-01-01T00:00:00Z".parse().unwrap()),
            symbols: vols.iter().map(|(s, _)| (*s).to_string()).collect(),
            realised_vol_annualised: vols
                .iter()
                .map(|(s, v)| ((*s).to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            correlation: CorrelationBlock {
                symbols: vols.iter().map(|(s, _)| (*s).to_string()).collect(),
                matrix: corr.to_vec(),
            },
            warnings: warnings.iter().map(|w| (*w).to_string()).collect(),
        }
    }

    fn identity2(corr: f64) -> Vec<Vec<f64>> {
        vec![vec![1.0, corr], vec![corr, 1.0]]
    }

    #[test]
    fn test_risk_on_when_calm_and_uncorrelated() {
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 0.30), ("ETHUSDT", 0.40)],
            &identity2(0.2),
            &[],
        ));
        assert_eq!(posture.regime, Regime::RiskOn);
        assert_eq!(posture.strategy_mode, StrategyMode::Trend);
        assert_eq!(posture.max_gross_exposure, 1.00);
        assert_eq!(posture.vol_target_annualised, 0.25);
    }

    #[test]
    fn test_risk_off_beats_risk_on() {
        // One hot symbol flips to risk_off even if the other is calm.
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 0.85), ("ETHUSDT", 0.20)],
            &identity2(0.1),
            &[],
        ));
        assert_eq!(posture.regime, Regime::RiskOff);
        assert_eq!(posture.strategy_mode, StrategyMode::ReduceRisk);
    }

    #[test]
    fn test_neutral_when_correlation_high() {
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 0.30), ("ETHUSDT", 0.40)],
            &identity2(0.7),
            &[],
        ));
        assert_eq!(posture.regime, Regime::Neutral);
        assert_eq!(posture.strategy_mode, StrategyMode::DoNothing);
        assert_eq!(posture.max_gross_exposure, 0.50);
    }

    #[test]
    fn test_risk_score_bonuses_stack() {
        // max_vol 0.85 trips both the >0.80 and >0.65 bonuses: 50+20+10.
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 0.85), ("ETHUSDT", 0.20)],
            &identity2(0.1),
            &[],
        ));
        assert_eq!(posture.risk_score, 80);
    }

    #[test]
    fn test_risk_score_calm_discount() {
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 0.30), ("ETHUSDT", 0.40)],
            &identity2(0.2),
            &[],
        ));
        assert_eq!(posture.risk_score, 40);
    }

    #[test]
    fn test_risk_score_correlation_penalty() {
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 0.50), ("ETHUSDT", 0.50)],
            &identity2(0.8),
            &[],
        ));
        assert_eq!(posture.risk_score, 60);
    }

    #[test]
    fn test_blocked_symbols_excluded_from_allowed() {
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 1.10), ("ETHUSDT", 0.30)],
            &identity2(0.2),
            &[],
        ));
        assert_eq!(posture.blocked_symbols, vec!["BTCUSDT".to_string()]);
        assert_eq!(posture.allowed_symbols, vec!["ETHUSDT".to_string()]);
    }

    #[test]
    fn test_allowed_and_blocked_are_disjoint() {
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 1.10), ("ETHUSDT", 1.50), ("SOLUSDT", 0.30)],
            &[
                vec![1.0, 0.3, 0.3],
                vec![0.3, 1.0, 0.3],
                vec![0.3, 0.3, 1.0],
            ],
            &[],
        ));
        for blocked in &posture.blocked_symbols {
            assert!(!posture.allowed_symbols.contains(blocked));
        }
    }

    #[test]
    fn test_top_risks_embed_rounded_values() {
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 0.456), ("ETHUSDT", 0.20)],
            &identity2(0.333),
            &[],
        ));
        assert_eq!(posture.top_risks.len(), 2);
        assert!(posture.top_risks[0].rationale.contains("0.46"));
        assert!(posture.top_risks[1].rationale.contains("0.33"));
    }

    #[test]
    fn test_data_quality_risk_appended_for_warnings() {
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&facts(
            &[("BTCUSDT", 0.30)],
            &[vec![1.0]],
            &["short sample", "stale candle"],
        ));
        assert_eq!(posture.top_risks.len(), 3);
        assert_eq!(posture.top_risks[2].risk, "Data quality");
        assert!(
            posture.top_risks[2]
                .rationale
                .contains("short sample, stale candle")
        );
    }

    #[test]
    fn test_empty_universe_degrades_to_calm_defaults() {
        // No symbols: vols empty, all() is vacuously true, corr 0.0.
        let classifier = RegimeClassifier::new();
        let posture = classifier.classify(&FactsPack::default());
        assert_eq!(posture.regime, Regime::RiskOn);
        assert_eq!(posture.risk_score, 40);
        assert!(posture.allowed_symbols.is_empty());
        assert!(posture.blocked_symbols.is_empty());
    }

    #[test]
    fn test_missing_timestamp_stamped_from_clock() {
        let classifier = RegimeClassifier::new();
        let now = "2026-03-01T12:00:00Z".parse().unwrap();
        let mut input = facts(&[("BTCUSDT", 0.30)], &[vec![1.0]], &[]);
        input.as_of_utc = None;
        let posture = classifier.classify_at(&input, now);
        assert_eq!(posture.as_of_utc, now);
    }

    #[test]
    fn test_input_timestamp_preserved() {
        let classifier = RegimeClassifier::new();
        let now = "2026-03-01T12:00:00Z".parse().unwrap();
        let input = facts(&[("BTCUSDT", 0.30)], &[vec![1.0]], &[]);
        let posture = classifier.classify_at(&input, now);
        assert_eq!(posture.as_of_utc, input.as_of_utc.unwrap());
    }

    #[test]
    fn test_kill_switch_per_regime() {
        let classifier = RegimeClassifier::new();
        let risk_off = classifier.classify(&facts(
            &[("BTCUSDT", 0.85)],
            &[vec![1.0]],
            &[],
        ));
        assert_eq!(risk_off.kill_switch.max_daily_drawdown, 0.03);
        assert_eq!(risk_off.kill_switch.conditions.len(), 3);

        let neutral = classifier.classify(&facts(
            &[("BTCUSDT", 0.50)],
            &[vec![1.0]],
            &[],
        ));
        assert_eq!(neutral.kill_switch.max_daily_drawdown, 0.05);
    }
}
