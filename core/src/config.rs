//! Runtime configuration. A JSON file with every field optional; missing
//! fields (or a missing file) take the defaults below.

use crate::error::ChurnResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurnConfig {
    /// SQLite database holding customers and churn_predictions.
    pub db_path: String,
    /// Where the trained model artifact lives.
    pub model_path: String,
    /// Version string written into prediction rows.
    pub model_version: String,
    /// Synthetic sample count for a training run.
    pub synthetic_samples: usize,
    /// Master seed for synthetic generation.
    pub training_seed: u64,
    /// Held-out fraction for training evaluation.
    pub test_fraction: f64,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            db_path:           "./churn.db".to_string(),
            model_path:        "./models/churn_model.json".to_string(),
            model_version:     "1.0".to_string(),
            synthetic_samples: 2000,
            training_seed:     42,
            test_fraction:     0.2,
        }
    }
}

impl ChurnConfig {
    /// Load from a JSON file, or fall back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> ChurnResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
