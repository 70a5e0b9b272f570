//! Synthetic training data — bootstraps the classifier when no labeled
//! customer history exists.
//!
//! Feature distributions are chosen to resemble realistic skew rather
//! than arbitrary uniforms: engagement is symmetric and bounded, tenure
//! and activity gaps are right-skewed, revenue is heavy-tailed. Labels
//! come from a designed weighted-risk formula plus independent noise,
//! so the trained model has real structure to recover.

use crate::{
    features::FeatureVector,
    rng::{StreamBank, StreamSlot},
};

// Label-rule weights. The formula mirrors the risk drivers the
// explanation templates talk about: low engagement, slow support,
// short tenure, and inactivity.
const ENGAGEMENT_WEIGHT: f64 = 0.4;
const SLOW_SUPPORT_WEIGHT: f64 = 0.2;
const NEW_CUSTOMER_WEIGHT: f64 = 0.15;
const INACTIVITY_WEIGHT: f64 = 0.2;
const LABEL_NOISE_STD: f64 = 0.1;
const CHURN_LABEL_THRESHOLD: f64 = 0.5;

const SLOW_SUPPORT_HOURS: f64 = 24.0;
const NEW_CUSTOMER_DAYS: f64 = 90.0;
const INACTIVITY_DAYS: f64 = 30.0;

/// A labeled synthetic dataset: one label per feature vector.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub features: Vec<FeatureVector>,
    pub labels:   Vec<bool>,
}

impl SyntheticDataset {
    /// Fraction of positive (churned) labels.
    pub fn churn_rate(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.labels.iter().filter(|&&l| l).count() as f64 / self.labels.len() as f64
    }
}

pub struct SyntheticDataGenerator;

impl SyntheticDataGenerator {
    /// Generate `n` labeled samples. Same seed, same output, bit for bit —
    /// tests depend on exact reproducibility, not just statistical
    /// similarity.
    pub fn generate(n: usize, seed: u64) -> SyntheticDataset {
        let bank = StreamBank::new(seed);

        let mut engagement = bank.for_stream(StreamSlot::Engagement);
        let mut tenure     = bank.for_stream(StreamSlot::Tenure);
        let mut support    = bank.for_stream(StreamSlot::SupportResponse);
        let mut revenue    = bank.for_stream(StreamSlot::Revenue);
        let mut activity   = bank.for_stream(StreamSlot::Activity);
        let mut noise      = bank.for_stream(StreamSlot::LabelNoise);

        let mut features = Vec::with_capacity(n);
        let mut labels   = Vec::with_capacity(n);

        for _ in 0..n {
            let vector = FeatureVector {
                engagement_score:         engagement.beta_2_2() * 100.0,
                tenure:                   tenure.exponential(365.0),
                support_response_time:    support.gamma(2, 5.0),
                revenue:                  revenue.lognormal(7.0, 1.5),
                days_since_last_activity: activity.exponential(15.0),
            };

            let churn_score = Self::churn_score(&vector) + noise.normal(0.0, LABEL_NOISE_STD);

            labels.push(churn_score > CHURN_LABEL_THRESHOLD);
            features.push(vector);
        }

        SyntheticDataset { features, labels }
    }

    /// The noiseless part of the label rule: a weighted sum of four risk
    /// indicators, each in [0, 1] before weighting.
    fn churn_score(v: &FeatureVector) -> f64 {
        let low_engagement = (100.0 - v.engagement_score) / 100.0;
        let slow_support   = if v.support_response_time > SLOW_SUPPORT_HOURS { 1.0 } else { 0.0 };
        let new_customer   = if v.tenure < NEW_CUSTOMER_DAYS { 1.0 } else { 0.0 };
        let inactive       = if v.days_since_last_activity > INACTIVITY_DAYS { 1.0 } else { 0.0 };

        ENGAGEMENT_WEIGHT * low_engagement
            + SLOW_SUPPORT_WEIGHT * slow_support
            + NEW_CUSTOMER_WEIGHT * new_customer
            + INACTIVITY_WEIGHT * inactive
    }
}
