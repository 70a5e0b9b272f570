//! Scoring orchestration: prepare → classify → (single case) explain.
//!
//! Batch mode deliberately omits explanations. Contribution math is cheap
//! per record, but the rendered string is too verbose for bulk output,
//! so bulk callers get probability and segment only.

use crate::{
    classifier::ChurnClassifier,
    error::ChurnResult,
    explain::{ExplanationEngine, ExplanationResult, RiskSegment},
    features::{FeaturePreparer, RawRecord},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};

/// Raw-record key carrying the caller's customer identifier.
pub const CUSTOMER_ID_KEY: &str = "customer_id";

/// One row of batch output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchScore {
    pub customer_id:       CustomerId,
    pub churn_probability: f64,
    pub risk_segment:      RiskSegment,
}

pub struct ScoringService {
    preparer:   FeaturePreparer,
    classifier: Box<dyn ChurnClassifier>,
}

impl ScoringService {
    pub fn new(classifier: Box<dyn ChurnClassifier>) -> Self {
        Self {
            preparer: FeaturePreparer::new(),
            classifier,
        }
    }

    pub fn with_preparer(preparer: FeaturePreparer, classifier: Box<dyn ChurnClassifier>) -> Self {
        Self { preparer, classifier }
    }

    pub fn classifier(&self) -> &dyn ChurnClassifier {
        self.classifier.as_ref()
    }

    /// Score one record with a full explanation.
    pub fn score_one(&self, record: &RawRecord) -> ChurnResult<ExplanationResult> {
        let prepared = self.preparer.prepare_one(record);
        ExplanationEngine::explain(&prepared.vector, self.classifier.as_ref())
    }

    /// Score a batch. Output is 1:1 with input, same order; records
    /// without a customer_id get a positional placeholder.
    pub fn score_batch(&self, records: &[RawRecord]) -> ChurnResult<Vec<BatchScore>> {
        let prepared = self.preparer.prepare(records);
        let vectors: Vec<_> = prepared.iter().map(|p| p.vector).collect();
        let probabilities = self.classifier.predict_batch(&vectors)?;

        Ok(records
            .iter()
            .zip(probabilities)
            .enumerate()
            .map(|(index, (record, churn_probability))| BatchScore {
                customer_id: customer_id_or_placeholder(record, index),
                churn_probability,
                risk_segment: RiskSegment::from_probability(churn_probability),
            })
            .collect())
    }
}

/// The record's customer_id, or `customer_<index>` (0-based) when absent.
/// Numeric ids are kept by rendering them as text.
pub fn customer_id_or_placeholder(record: &RawRecord, index: usize) -> CustomerId {
    match record.get(CUSTOMER_ID_KEY) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => format!("customer_{index}"),
    }
}
