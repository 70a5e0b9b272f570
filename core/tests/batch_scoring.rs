//! Batch scoring: 1:1 output, order preservation, id fallback, and the
//! deliberate absence of explanations in bulk output.

use churn_core::{
    classifier::ChurnClassifier,
    error::ChurnResult,
    explain::RiskSegment,
    features::{FeatureVector, RawRecord},
    metrics::TrainingMetrics,
    scoring::ScoringService,
};
use std::path::Path;

/// Classifier that scores by engagement alone, so batch outputs are easy
/// to predict per record.
struct EngagementStub;

impl ChurnClassifier for EngagementStub {
    fn train(&mut self, _: &[FeatureVector], _: &[bool]) -> ChurnResult<TrainingMetrics> {
        unimplemented!("stub never trains")
    }

    fn predict_proba(&self, features: &FeatureVector) -> ChurnResult<f64> {
        Ok((1.0 - features.engagement_score / 100.0).clamp(0.0, 1.0))
    }

    fn feature_importances(&self) -> ChurnResult<Vec<f64>> {
        Ok(vec![1.0, 0.0, 0.0, 0.0, 0.0])
    }

    fn save(&self, _: &Path) -> ChurnResult<()> {
        Ok(())
    }
}

fn record(json: &str) -> RawRecord {
    serde_json::from_str(json).expect("test record must be valid JSON")
}

fn service() -> ScoringService {
    ScoringService::new(Box::new(EngagementStub))
}

#[test]
fn batch_output_is_one_to_one_and_ordered() {
    let records = vec![
        record(r#"{"customer_id": "a", "engagement_score": 90}"#),
        record(r#"{"customer_id": "b", "engagement_score": 50}"#),
        record(r#"{"customer_id": "c", "engagement_score": 10}"#),
    ];

    let scores = service().score_batch(&records).unwrap();

    assert_eq!(scores.len(), records.len());
    let ids: Vec<&str> = scores.iter().map(|s| s.customer_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"], "input order must be preserved");

    assert_eq!(scores[0].risk_segment, RiskSegment::Low);
    assert_eq!(scores[1].risk_segment, RiskSegment::Medium);
    assert_eq!(scores[2].risk_segment, RiskSegment::High);
}

/// Records without a customer_id get `customer_<index>`, 0-based over
/// the whole batch.
#[test]
fn missing_customer_id_falls_back_to_position() {
    let records = vec![
        record(r#"{"engagement_score": 90}"#),
        record(r#"{"customer_id": "known", "engagement_score": 50}"#),
        record(r#"{"engagement_score": 10}"#),
    ];

    let scores = service().score_batch(&records).unwrap();

    assert_eq!(scores[0].customer_id, "customer_0");
    assert_eq!(scores[1].customer_id, "known");
    assert_eq!(scores[2].customer_id, "customer_2");
}

/// Numeric ids survive as their text rendering rather than falling back.
#[test]
fn numeric_customer_id_is_kept_as_text() {
    let records = vec![record(r#"{"customer_id": 1234, "engagement_score": 70}"#)];

    let scores = service().score_batch(&records).unwrap();

    assert_eq!(scores[0].customer_id, "1234");
}

/// Batch rows carry probability and segment only; the explained path is
/// score_one.
#[test]
fn single_record_path_carries_the_explanation() {
    let svc = service();
    let rec = record(r#"{"customer_id": "solo", "engagement_score": 20}"#);

    let explained = svc.score_one(&rec).unwrap();
    assert_eq!(explained.risk_segment, RiskSegment::High);
    assert_eq!(explained.top_drivers.len(), 3);
    assert!(
        explained.explanation.contains("churn risk"),
        "explanation missing: {}",
        explained.explanation
    );

    let batch = svc.score_batch(std::slice::from_ref(&rec)).unwrap();
    assert_eq!(batch.len(), 1);
    assert!(
        (batch[0].churn_probability - explained.churn_probability).abs() < 1e-12,
        "single and batch paths must agree on the probability"
    );
}

/// An empty batch is a valid batch.
#[test]
fn empty_batch_yields_empty_output() {
    let scores = service().score_batch(&[]).unwrap();
    assert!(scores.is_empty());
}
