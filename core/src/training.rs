//! Training orchestration: fetch → (fallback) generate → train → save →
//! score the book.
//!
//! Database trouble on the fetch is recoverable here — log it and train
//! on synthetic data alone. Inference-path errors (ModelNotTrained,
//! ModelNotFound) are never caught; they propagate to the caller verbatim.

use crate::{
    classifier::ChurnClassifier,
    config::ChurnConfig,
    error::{ChurnError, ChurnResult},
    explain::RiskSegment,
    features::FeaturePreparer,
    metrics::TrainingMetrics,
    scoring::customer_id_or_placeholder,
    store::CustomerStore,
    synthetic::SyntheticDataGenerator,
};
use std::path::Path;

/// What one training run produced, for logs and callers.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub metrics:              TrainingMetrics,
    pub training_samples:     usize,
    pub synthetic_churn_rate: f64,
    pub scored_customers:     usize,
    pub high_risk:            usize,
    pub medium_risk:          usize,
    pub low_risk:             usize,
}

/// Run the full training pipeline against `store`, leaving the trained
/// artifact at the configured model path and one prediction row per
/// fetched customer.
pub fn run_training<C: ChurnClassifier>(
    config: &ChurnConfig,
    classifier: &mut C,
    store: &CustomerStore,
) -> ChurnResult<TrainingSummary> {
    // 1. Customer rows, if the database cooperates. A failed fetch is a
    //    degraded run, not a dead one.
    let customers = match store.fetch_customers() {
        Ok(rows) => {
            log::info!("training: fetched {} customer rows", rows.len());
            rows
        }
        Err(ChurnError::DataAccess(e)) => {
            log::warn!("training: could not fetch customer data ({e}); continuing with synthetic data only");
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    // 2. Synthetic training data. Training always runs on the generated
    //    set — real rows are unlabeled and only get scored below.
    let dataset = SyntheticDataGenerator::generate(config.synthetic_samples, config.training_seed);
    log::info!(
        "training: generated {} synthetic samples (churn rate {:.2}%)",
        dataset.features.len(),
        dataset.churn_rate() * 100.0,
    );

    // 3. Fit and evaluate.
    let metrics = classifier.train(&dataset.features, &dataset.labels)?;

    // 4. Persist the artifact.
    classifier.save(Path::new(&config.model_path))?;

    // 5. Score the fetched book, one live prediction row per customer.
    let mut high_risk = 0;
    let mut medium_risk = 0;
    let mut low_risk = 0;

    if !customers.is_empty() {
        let preparer = FeaturePreparer::new();
        let prepared = preparer.prepare(&customers);
        let vectors: Vec<_> = prepared.iter().map(|p| p.vector).collect();
        let probabilities = classifier.predict_batch(&vectors)?;

        for (index, (record, probability)) in customers.iter().zip(&probabilities).enumerate() {
            let customer_id = customer_id_or_placeholder(record, index);
            let segment = RiskSegment::from_probability(*probability);
            match segment {
                RiskSegment::High => high_risk += 1,
                RiskSegment::Medium => medium_risk += 1,
                RiskSegment::Low => low_risk += 1,
            }
            store.upsert_prediction(&customer_id, *probability, segment, &config.model_version)?;
        }

        log::info!(
            "training: scored {} customers (high={high_risk} medium={medium_risk} low={low_risk})",
            customers.len(),
        );
    } else {
        log::info!("training: no customer rows to score");
    }

    Ok(TrainingSummary {
        metrics,
        training_samples: dataset.features.len(),
        synthetic_churn_rate: dataset.churn_rate(),
        scored_customers: customers.len(),
        high_risk,
        medium_risk,
        low_risk,
    })
}
