//! The classifier collaborator contract.
//!
//! RULE: The scoring core depends only on this trait — train, predict
//! probability, expose per-feature importances, persist. The algorithm
//! behind it is the collaborator's business; nothing in the core may
//! assume a particular model family.

use crate::{
    error::ChurnResult,
    features::FeatureVector,
    metrics::TrainingMetrics,
};
use std::path::Path;

pub trait ChurnClassifier {
    /// Fit on labeled vectors and return held-out evaluation metrics.
    /// Mutates the collaborator into its trained state; every other
    /// method requires that state.
    fn train(&mut self, features: &[FeatureVector], labels: &[bool]) -> ChurnResult<TrainingMetrics>;

    /// Churn probability in [0, 1] for one vector.
    /// Fails with ModelNotTrained before train() or a successful load.
    fn predict_proba(&self, features: &FeatureVector) -> ChurnResult<f64>;

    /// Probabilities for a batch, 1:1 with input order.
    fn predict_batch(&self, features: &[FeatureVector]) -> ChurnResult<Vec<f64>> {
        features.iter().map(|f| self.predict_proba(f)).collect()
    }

    /// Global per-feature importances, aligned 1:1 with the canonical
    /// feature order and summing to 1.
    fn feature_importances(&self) -> ChurnResult<Vec<f64>>;

    /// Persist the trained parameters as an opaque artifact at `path`.
    fn save(&self, path: &Path) -> ChurnResult<()>;
}
