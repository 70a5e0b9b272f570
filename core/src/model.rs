//! Provided classifier collaborator: standardized logistic regression fit
//! by full-batch gradient descent.
//!
//! Trained/untrained is a tagged state, not a nullable field. Operations
//! that need trained parameters match on the state and fail with
//! ModelNotTrained otherwise; nothing mutates the parameters after
//! train() or load() returns.
//!
//! Training is fully deterministic: the train/test split shuffle draws
//! from a seeded stream and the descent itself has no randomness, so the
//! same data and seed always produce the same artifact.

use crate::{
    classifier::ChurnClassifier,
    error::{ChurnError, ChurnResult},
    features::{FeatureName, FeatureVector},
    metrics::{self, FeatureImportance, TrainingMetrics, DECISION_THRESHOLD},
    rng::{DrawStream, StreamSlot},
    types::FEATURE_COUNT,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version string written into artifacts and prediction rows.
pub const MODEL_VERSION: &str = "1.0";

const EPOCHS: usize = 1000;
const LEARNING_RATE: f64 = 0.5;
// Floor for per-feature std so constant columns don't divide by zero.
const STD_FLOOR: f64 = 1e-9;

/// Trained parameters — the serialized artifact, opaque to everyone else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParams {
    pub model_id:      String,
    pub model_version: String,
    pub trained_at:    DateTime<Utc>,
    pub weights:       [f64; FEATURE_COUNT],
    pub bias:          f64,
    pub feature_means: [f64; FEATURE_COUNT],
    pub feature_stds:  [f64; FEATURE_COUNT],
}

#[derive(Debug)]
enum ModelState {
    Untrained,
    Trained(ModelParams),
}

#[derive(Debug)]
pub struct LogisticModel {
    state:         ModelState,
    test_fraction: f64,
    split_seed:    u64,
}

impl Default for LogisticModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticModel {
    pub fn new() -> Self {
        Self {
            state:         ModelState::Untrained,
            test_fraction: 0.2,
            split_seed:    42,
        }
    }

    pub fn with_split(test_fraction: f64, split_seed: u64) -> Self {
        Self {
            state: ModelState::Untrained,
            test_fraction,
            split_seed,
        }
    }

    /// Load a previously saved artifact. Fails with ModelNotFound when no
    /// file exists at `path`; a file that exists but does not parse is a
    /// Serialization error, surfaced as-is.
    pub fn load(path: &Path) -> ChurnResult<Self> {
        if !path.exists() {
            return Err(ChurnError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let params: ModelParams = serde_json::from_str(&text)?;
        log::info!("model: loaded {} from {}", params.model_id, path.display());
        Ok(Self {
            state:         ModelState::Trained(params),
            test_fraction: 0.2,
            split_seed:    42,
        })
    }

    /// Trained parameters, or ModelNotTrained.
    pub fn params(&self) -> ChurnResult<&ModelParams> {
        match &self.state {
            ModelState::Trained(p) => Ok(p),
            ModelState::Untrained => Err(ChurnError::ModelNotTrained),
        }
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    fn standardize(params: &ModelParams, v: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let raw = v.as_array();
        let mut z = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            z[i] = (raw[i] - params.feature_means[i]) / params.feature_stds[i];
        }
        z
    }

    /// Deterministic shuffled train/test split: Fisher-Yates over the
    /// index vector, last `test_fraction` of the shuffle held out.
    fn split_indices(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let mut stream = DrawStream::new(self.split_seed, StreamSlot::TrainSplit as u64);
        let mut indices: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = stream.next_u64_below((i + 1) as u64) as usize;
            indices.swap(i, j);
        }

        let test_len = ((n as f64 * self.test_fraction).round() as usize).min(n.saturating_sub(1));
        let train_len = n - test_len;
        let test = indices.split_off(train_len);
        (indices, test)
    }
}

impl ChurnClassifier for LogisticModel {
    fn train(&mut self, features: &[FeatureVector], labels: &[bool]) -> ChurnResult<TrainingMetrics> {
        assert_eq!(features.len(), labels.len(), "features/labels length mismatch");
        assert!(!features.is_empty(), "cannot train on an empty dataset");

        let (train_idx, test_idx) = self.split_indices(features.len());

        // Standardization statistics come from the training slice only.
        let mut means = [0.0; FEATURE_COUNT];
        for &i in &train_idx {
            let row = features[i].as_array();
            for (m, x) in means.iter_mut().zip(row) {
                *m += x;
            }
        }
        for m in &mut means {
            *m /= train_idx.len() as f64;
        }

        let mut stds = [0.0; FEATURE_COUNT];
        for &i in &train_idx {
            let row = features[i].as_array();
            for (s, (x, m)) in stds.iter_mut().zip(row.iter().zip(&means)) {
                *s += (x - m) * (x - m);
            }
        }
        for s in &mut stds {
            *s = (*s / train_idx.len() as f64).sqrt().max(STD_FLOOR);
        }

        let standardized: Vec<[f64; FEATURE_COUNT]> = features
            .iter()
            .map(|v| {
                let raw = v.as_array();
                let mut z = [0.0; FEATURE_COUNT];
                for i in 0..FEATURE_COUNT {
                    z[i] = (raw[i] - means[i]) / stds[i];
                }
                z
            })
            .collect();

        // Full-batch gradient descent on the logistic loss.
        let mut weights = [0.0; FEATURE_COUNT];
        let mut bias = 0.0;
        let n_train = train_idx.len() as f64;

        for _ in 0..EPOCHS {
            let mut grad_w = [0.0; FEATURE_COUNT];
            let mut grad_b = 0.0;

            for &i in &train_idx {
                let z = &standardized[i];
                let logit: f64 = weights.iter().zip(z).map(|(w, x)| w * x).sum::<f64>() + bias;
                let residual = Self::sigmoid(logit) - if labels[i] { 1.0 } else { 0.0 };

                for (g, x) in grad_w.iter_mut().zip(z) {
                    *g += residual * x;
                }
                grad_b += residual;
            }

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= LEARNING_RATE * g / n_train;
            }
            bias -= LEARNING_RATE * grad_b / n_train;
        }

        let params = ModelParams {
            model_id:      uuid::Uuid::new_v4().to_string(),
            model_version: MODEL_VERSION.to_string(),
            trained_at:    Utc::now(),
            weights,
            bias,
            feature_means: means,
            feature_stds:  stds,
        };

        // Held-out evaluation.
        let test_labels: Vec<bool> = test_idx.iter().map(|&i| labels[i]).collect();
        let test_probs: Vec<f64> = test_idx
            .iter()
            .map(|&i| {
                let z = &standardized[i];
                let logit: f64 =
                    params.weights.iter().zip(z).map(|(w, x)| w * x).sum::<f64>() + params.bias;
                Self::sigmoid(logit)
            })
            .collect();

        let counts = metrics::confusion_counts(&test_labels, &test_probs, DECISION_THRESHOLD);

        // Importance: each weight's share of total absolute weight.
        let total_abs: f64 = weights.iter().map(|w| w.abs()).sum();
        let importances: Vec<f64> = if total_abs > 0.0 {
            weights.iter().map(|w| w.abs() / total_abs).collect()
        } else {
            vec![1.0 / FEATURE_COUNT as f64; FEATURE_COUNT]
        };

        let mut feature_importance: Vec<FeatureImportance> = FeatureName::ALL
            .iter()
            .zip(&importances)
            .map(|(name, &importance)| FeatureImportance {
                feature: name.as_str().to_string(),
                importance,
            })
            .collect();
        feature_importance.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let result = TrainingMetrics {
            accuracy:  metrics::accuracy(&counts),
            precision: metrics::precision(&counts),
            recall:    metrics::recall(&counts),
            f1:        metrics::f1(&counts),
            roc_auc:   metrics::roc_auc(&test_labels, &test_probs),
            feature_importance,
        };

        log::info!(
            "model: trained {} on {} samples (held out {}) accuracy={:.4} precision={:.4} recall={:.4} f1={:.4} roc_auc={:.4}",
            params.model_id,
            train_idx.len(),
            test_idx.len(),
            result.accuracy,
            result.precision,
            result.recall,
            result.f1,
            result.roc_auc,
        );
        for fi in &result.feature_importance {
            log::debug!("model:   importance {} = {:.4}", fi.feature, fi.importance);
        }

        self.state = ModelState::Trained(params);
        Ok(result)
    }

    fn predict_proba(&self, features: &FeatureVector) -> ChurnResult<f64> {
        let params = self.params()?;
        let z = Self::standardize(params, features);
        let logit: f64 = params.weights.iter().zip(&z).map(|(w, x)| w * x).sum::<f64>() + params.bias;
        Ok(Self::sigmoid(logit))
    }

    fn feature_importances(&self) -> ChurnResult<Vec<f64>> {
        let params = self.params()?;
        let total_abs: f64 = params.weights.iter().map(|w| w.abs()).sum();
        if total_abs == 0.0 {
            return Ok(vec![1.0 / FEATURE_COUNT as f64; FEATURE_COUNT]);
        }
        Ok(params.weights.iter().map(|w| w.abs() / total_abs).collect())
    }

    fn save(&self, path: &Path) -> ChurnResult<()> {
        let params = self.params()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(params)?)?;
        log::info!("model: saved {} to {}", params.model_id, path.display());
        Ok(())
    }
}
