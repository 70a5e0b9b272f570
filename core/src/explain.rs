//! Feature-contribution explanations for single predictions.
//!
//! Contribution is a named heuristic, not Shapley attribution: global
//! importance scaled by the local feature value, with engagement divided
//! by its 0-100 scale to keep magnitudes comparable to the raw-unit
//! features. Exact attribution was considered and rejected as too
//! expensive for what the rendered sentence needs.

use crate::{
    classifier::ChurnClassifier,
    error::ChurnResult,
    features::{FeatureName, FeatureVector},
};
use serde::{Deserialize, Serialize};

/// Probability floor of the high tier.
pub const HIGH_RISK_FLOOR: f64 = 0.6;
/// Probability floor of the medium tier.
pub const MEDIUM_RISK_FLOOR: f64 = 0.3;

const ENGAGEMENT_SCALE: f64 = 100.0;
const TOP_DRIVER_COUNT: usize = 3;

// Template thresholds for the secondary sentence.
const VERY_LOW_ENGAGEMENT: f64 = 30.0;
const BELOW_AVERAGE_ENGAGEMENT: f64 = 50.0;
const SLOW_SUPPORT_HOURS: f64 = 48.0;
const INACTIVITY_DAYS: f64 = 30.0;
const NEW_CUSTOMER_DAYS: f64 = 90.0;

// ── Public types ─────────────────────────────────────────────────────────────

/// Three-tier bucketing of churn probability. Tier floors are inclusive:
/// exactly 0.6 is high, exactly 0.3 is medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSegment {
    Low,
    Medium,
    High,
}

impl RiskSegment {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_FLOOR {
            Self::High
        } else if probability >= MEDIUM_RISK_FLOOR {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub churn_probability: f64,
    pub risk_segment:      RiskSegment,
}

/// One feature's share of the prediction, per the heuristic above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionEntry {
    pub feature:      FeatureName,
    pub value:        f64,
    pub importance:   f64,
    pub contribution: f64,
}

/// A prediction plus its ranked drivers and rendered rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationResult {
    pub churn_probability: f64,
    pub risk_segment:      RiskSegment,
    pub top_drivers:       Vec<ContributionEntry>,
    pub explanation:       String,
}

// ── Engine ───────────────────────────────────────────────────────────────────

pub struct ExplanationEngine;

impl ExplanationEngine {
    /// Explain one prediction. Pure computation over the vector and the
    /// trained classifier's importances; a classifier in its untrained
    /// state fails here with ModelNotTrained, surfaced verbatim.
    pub fn explain(
        vector: &FeatureVector,
        classifier: &dyn ChurnClassifier,
    ) -> ChurnResult<ExplanationResult> {
        let churn_probability = classifier.predict_proba(vector)?;
        let risk_segment = RiskSegment::from_probability(churn_probability);

        let importances = classifier.feature_importances()?;
        let mut contributions = Self::contributions(vector, &importances);
        contributions.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        contributions.truncate(TOP_DRIVER_COUNT);

        let explanation = Self::render(churn_probability, risk_segment, &contributions);

        Ok(ExplanationResult {
            churn_probability,
            risk_segment,
            top_drivers: contributions,
            explanation,
        })
    }

    /// contribution[i] = importance[i] × value[i], with engagement scaled
    /// down by 100 so its 0-100 range compares to the raw-unit features.
    pub fn contributions(vector: &FeatureVector, importances: &[f64]) -> Vec<ContributionEntry> {
        FeatureName::ALL
            .iter()
            .zip(importances)
            .map(|(&feature, &importance)| {
                let value = vector.get(feature);
                let scaled = match feature {
                    FeatureName::EngagementScore => value / ENGAGEMENT_SCALE,
                    _ => value,
                };
                ContributionEntry {
                    feature,
                    value,
                    importance,
                    contribution: importance * scaled,
                }
            })
            .collect()
    }

    fn render(probability: f64, segment: RiskSegment, drivers: &[ContributionEntry]) -> String {
        let mut text = format!(
            "This customer has {:.1}% churn risk ({}). ",
            probability * 100.0,
            segment.as_str(),
        );
        if let Some(top) = drivers.first() {
            if let Some(sentence) = Self::driver_sentence(top.feature, top.value) {
                text.push_str(&sentence);
            }
        }
        text
    }

    /// The secondary sentence keyed off the single top driver. A driver
    /// whose value matches no rule renders nothing — that is the designed
    /// fallback, not an error.
    fn driver_sentence(feature: FeatureName, value: f64) -> Option<String> {
        match feature {
            FeatureName::EngagementScore if value < VERY_LOW_ENGAGEMENT => Some(format!(
                "Primary concern: Very low engagement score ({value:.0}/100). "
            )),
            FeatureName::EngagementScore if value < BELOW_AVERAGE_ENGAGEMENT => Some(format!(
                "Primary concern: Below-average engagement score ({value:.0}/100). "
            )),
            FeatureName::SupportResponseTime if value > SLOW_SUPPORT_HOURS => Some(format!(
                "Primary concern: Slow support response time ({value:.1} hours). "
            )),
            FeatureName::DaysSinceLastActivity if value > INACTIVITY_DAYS => {
                Some(format!("Primary concern: Inactive for {value:.0} days. "))
            }
            FeatureName::Tenure if value < NEW_CUSTOMER_DAYS => Some(format!(
                "Primary concern: New customer (only {value:.0} days tenure). "
            )),
            _ => None,
        }
    }
}
