//! Binary-classification evaluation metrics.
//!
//! Threshold metrics (accuracy, precision, recall, F1) are computed at
//! the 0.5 decision threshold. Zero-denominator cases return 0.0 rather
//! than NaN. ROC AUC uses the rank statistic with average ranks on ties.

use serde::{Deserialize, Serialize};

/// One feature's share of the trained model's importance mass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature:    String,
    pub importance: f64,
}

/// Produced once per training call; immutable; owned by the caller.
/// `feature_importance` is sorted descending by importance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub accuracy:           f64,
    pub precision:          f64,
    pub recall:             f64,
    pub f1:                 f64,
    pub roc_auc:            f64,
    pub feature_importance: Vec<FeatureImportance>,
}

pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfusionCounts {
    pub true_positive:  usize,
    pub false_positive: usize,
    pub true_negative:  usize,
    pub false_negative: usize,
}

pub fn confusion_counts(y_true: &[bool], probs: &[f64], threshold: f64) -> ConfusionCounts {
    debug_assert_eq!(y_true.len(), probs.len());
    let mut c = ConfusionCounts::default();
    for (&actual, &p) in y_true.iter().zip(probs) {
        let predicted = p >= threshold;
        match (actual, predicted) {
            (true, true) => c.true_positive += 1,
            (false, true) => c.false_positive += 1,
            (false, false) => c.true_negative += 1,
            (true, false) => c.false_negative += 1,
        }
    }
    c
}

pub fn accuracy(c: &ConfusionCounts) -> f64 {
    let total = c.true_positive + c.false_positive + c.true_negative + c.false_negative;
    if total == 0 {
        return 0.0;
    }
    (c.true_positive + c.true_negative) as f64 / total as f64
}

pub fn precision(c: &ConfusionCounts) -> f64 {
    let predicted_positive = c.true_positive + c.false_positive;
    if predicted_positive == 0 {
        return 0.0;
    }
    c.true_positive as f64 / predicted_positive as f64
}

pub fn recall(c: &ConfusionCounts) -> f64 {
    let actual_positive = c.true_positive + c.false_negative;
    if actual_positive == 0 {
        return 0.0;
    }
    c.true_positive as f64 / actual_positive as f64
}

pub fn f1(c: &ConfusionCounts) -> f64 {
    let p = precision(c);
    let r = recall(c);
    if p + r == 0.0 {
        return 0.0;
    }
    2.0 * p * r / (p + r)
}

/// ROC AUC via the Mann-Whitney rank statistic. Degenerate slices with a
/// single class carry no ranking information; 0.5 is returned for those.
pub fn roc_auc(y_true: &[bool], probs: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), probs.len());

    let n_pos = y_true.iter().filter(|&&l| l).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| probs[a].partial_cmp(&probs[b]).unwrap_or(std::cmp::Ordering::Equal));

    // Average ranks over tied probability runs (1-based ranks).
    let mut ranks = vec![0.0; probs.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && probs[order[j + 1]] == probs[order[i]] {
            j += 1;
        }
        let avg_rank = (i + 1 + j + 1) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|(&l, _)| l)
        .map(|(_, &r)| r)
        .sum();

    let u = pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    u / (n_pos * n_neg) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_separation_scores_one() {
        let y = [false, false, true, true];
        let p = [0.1, 0.2, 0.8, 0.9];

        let c = confusion_counts(&y, &p, DECISION_THRESHOLD);
        assert_eq!(accuracy(&c), 1.0);
        assert_eq!(precision(&c), 1.0);
        assert_eq!(recall(&c), 1.0);
        assert_eq!(f1(&c), 1.0);
        assert_eq!(roc_auc(&y, &p), 1.0);
    }

    #[test]
    fn inverted_ranking_scores_zero_auc() {
        let y = [true, true, false, false];
        let p = [0.1, 0.2, 0.8, 0.9];
        assert_eq!(roc_auc(&y, &p), 0.0);
    }

    #[test]
    fn tied_probabilities_get_half_credit() {
        let y = [false, true];
        let p = [0.5, 0.5];
        assert!((roc_auc(&y, &p) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_denominators_yield_zero_not_nan() {
        // No predicted positives and no actual positives.
        let y = [false, false];
        let p = [0.1, 0.2];
        let c = confusion_counts(&y, &p, DECISION_THRESHOLD);
        assert_eq!(precision(&c), 0.0);
        assert_eq!(recall(&c), 0.0);
        assert_eq!(f1(&c), 0.0);
    }
}
