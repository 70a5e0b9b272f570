//! Explanation engine: segmentation boundaries, contribution ranking,
//! driver templates and the no-match fallback.

use churn_core::{
    classifier::ChurnClassifier,
    error::ChurnResult,
    explain::{ExplanationEngine, RiskSegment},
    features::{FeatureName, FeatureVector},
    metrics::TrainingMetrics,
};
use std::path::Path;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Fixed-output classifier so contribution and template behavior can be
/// pinned down exactly.
struct StubClassifier {
    probability: f64,
    importances: Vec<f64>,
}

impl StubClassifier {
    fn new(probability: f64, importances: [f64; 5]) -> Self {
        Self {
            probability,
            importances: importances.to_vec(),
        }
    }
}

impl ChurnClassifier for StubClassifier {
    fn train(&mut self, _: &[FeatureVector], _: &[bool]) -> ChurnResult<TrainingMetrics> {
        unimplemented!("stub never trains")
    }

    fn predict_proba(&self, _: &FeatureVector) -> ChurnResult<f64> {
        Ok(self.probability)
    }

    fn feature_importances(&self) -> ChurnResult<Vec<f64>> {
        Ok(self.importances.clone())
    }

    fn save(&self, _: &Path) -> ChurnResult<()> {
        Ok(())
    }
}

fn vector(values: [f64; 5]) -> FeatureVector {
    FeatureVector::from_array(values)
}

// ── Risk segmentation ────────────────────────────────────────────────────────

/// Tier floors are inclusive: exactly 0.6 is high, exactly 0.3 is medium.
#[test]
fn segmentation_boundaries_are_exact() {
    assert_eq!(RiskSegment::from_probability(0.6), RiskSegment::High);
    assert_eq!(RiskSegment::from_probability(0.599999), RiskSegment::Medium);
    assert_eq!(RiskSegment::from_probability(0.3), RiskSegment::Medium);
    assert_eq!(RiskSegment::from_probability(0.299999), RiskSegment::Low);
    assert_eq!(RiskSegment::from_probability(0.0), RiskSegment::Low);
    assert_eq!(RiskSegment::from_probability(1.0), RiskSegment::High);
}

// ── Contributions ────────────────────────────────────────────────────────────

/// Engagement is scaled by value/100; everything else by raw value.
#[test]
fn contribution_formula_scales_engagement_only() {
    let v = vector([20.0, 100.0, 10.0, 50.0, 5.0]);
    let importances = [0.5, 0.1, 0.1, 0.1, 0.2];

    let contributions = ExplanationEngine::contributions(&v, &importances);

    assert_eq!(contributions.len(), 5);
    assert!((contributions[0].contribution - 0.5 * 0.2).abs() < 1e-12);
    assert!((contributions[1].contribution - 0.1 * 100.0).abs() < 1e-12);
    assert!((contributions[4].contribution - 0.2 * 5.0).abs() < 1e-12);
}

/// Drivers are the top three by absolute contribution, in descending
/// order.
#[test]
fn top_drivers_are_ranked_by_absolute_contribution() {
    let stub = StubClassifier::new(0.5, [0.5, 0.1, 0.1, 0.1, 0.2]);
    let v = vector([20.0, 100.0, 10.0, 50.0, 5.0]);

    let result = ExplanationEngine::explain(&v, &stub).unwrap();

    assert_eq!(result.top_drivers.len(), 3);
    // tenure 0.1*100=10, revenue 0.1*50=5, support 0.1*10=1
    assert_eq!(result.top_drivers[0].feature, FeatureName::Tenure);
    assert_eq!(result.top_drivers[1].feature, FeatureName::Revenue);
    assert_eq!(result.top_drivers[2].feature, FeatureName::SupportResponseTime);
    assert!(result.top_drivers[0].contribution >= result.top_drivers[1].contribution.abs());
}

/// When engagement's scaled contribution exceeds every other feature's,
/// it is selected as the top driver.
#[test]
fn engagement_tops_ranking_when_scaled_contribution_wins() {
    let stub = StubClassifier::new(0.7, [0.9, 0.02, 0.02, 0.02, 0.04]);
    // engagement 0.9*0.25=0.225 vs tenure 0.02*8=0.16, others smaller.
    let v = vector([25.0, 8.0, 2.0, 3.0, 1.0]);

    let result = ExplanationEngine::explain(&v, &stub).unwrap();

    assert_eq!(result.top_drivers[0].feature, FeatureName::EngagementScore);
    assert!(
        result.explanation.contains("Very low engagement"),
        "engagement below 30 should trigger the very-low template: {}",
        result.explanation
    );
}

// ── Templates ────────────────────────────────────────────────────────────────

#[test]
fn explanation_states_probability_and_tier() {
    let stub = StubClassifier::new(0.65, [0.2, 0.2, 0.2, 0.2, 0.2]);
    let v = vector([50.0, 100.0, 1.0, 2.0, 1.0]);

    let result = ExplanationEngine::explain(&v, &stub).unwrap();

    assert_eq!(result.risk_segment, RiskSegment::High);
    assert!(
        result.explanation.starts_with("This customer has 65.0% churn risk (high). "),
        "unexpected lead sentence: {}",
        result.explanation
    );
}

#[test]
fn below_average_engagement_template() {
    // Engagement 40 with dominant importance: 0.9*0.4=0.36 beats the rest.
    let stub = StubClassifier::new(0.4, [0.9, 0.02, 0.02, 0.02, 0.04]);
    let v = vector([40.0, 3.0, 1.0, 2.0, 1.0]);

    let result = ExplanationEngine::explain(&v, &stub).unwrap();

    assert!(
        result.explanation.contains("Below-average engagement score (40/100)"),
        "got: {}",
        result.explanation
    );
}

#[test]
fn slow_support_template() {
    let stub = StubClassifier::new(0.5, [0.1, 0.1, 0.5, 0.1, 0.2]);
    let v = vector([80.0, 10.0, 72.0, 5.0, 1.0]);

    let result = ExplanationEngine::explain(&v, &stub).unwrap();

    assert_eq!(result.top_drivers[0].feature, FeatureName::SupportResponseTime);
    assert!(
        result.explanation.contains("Slow support response time (72.0 hours)"),
        "got: {}",
        result.explanation
    );
}

#[test]
fn inactivity_template() {
    let stub = StubClassifier::new(0.5, [0.1, 0.1, 0.1, 0.1, 0.6]);
    let v = vector([80.0, 10.0, 2.0, 5.0, 45.0]);

    let result = ExplanationEngine::explain(&v, &stub).unwrap();

    assert!(
        result.explanation.contains("Inactive for 45 days"),
        "got: {}",
        result.explanation
    );
}

#[test]
fn new_customer_template() {
    let stub = StubClassifier::new(0.5, [0.1, 0.6, 0.1, 0.1, 0.1]);
    let v = vector([80.0, 30.0, 2.0, 5.0, 1.0]);

    let result = ExplanationEngine::explain(&v, &stub).unwrap();

    assert_eq!(result.top_drivers[0].feature, FeatureName::Tenure);
    assert!(
        result.explanation.contains("New customer (only 30 days tenure)"),
        "got: {}",
        result.explanation
    );
}

/// A top driver matching no template renders only the lead sentence —
/// the designed fallback, not an error.
#[test]
fn unmatched_top_driver_falls_back_to_lead_sentence_only() {
    // Revenue dominates, and revenue has no template.
    let stub = StubClassifier::new(0.2, [0.05, 0.05, 0.05, 0.8, 0.05]);
    let v = vector([80.0, 400.0, 2.0, 5000.0, 1.0]);

    let result = ExplanationEngine::explain(&v, &stub).unwrap();

    assert_eq!(result.top_drivers[0].feature, FeatureName::Revenue);
    assert_eq!(
        result.explanation, "This customer has 20.0% churn risk (low). ",
        "no secondary sentence expected"
    );
}

/// A healthy top driver also renders no secondary sentence (engagement
/// at or above 50 has no template).
#[test]
fn healthy_engagement_renders_no_secondary_sentence() {
    let stub = StubClassifier::new(0.1, [0.9, 0.02, 0.02, 0.02, 0.04]);
    let v = vector([85.0, 3.0, 1.0, 2.0, 1.0]);

    let result = ExplanationEngine::explain(&v, &stub).unwrap();

    assert_eq!(result.explanation, "This customer has 10.0% churn risk (low). ");
}
