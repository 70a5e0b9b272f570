//! Synthetic dataset shape: value ranges, designed skew, label balance.

use churn_core::synthetic::SyntheticDataGenerator;

#[test]
fn features_stay_in_designed_ranges() {
    let dataset = SyntheticDataGenerator::generate(2000, 42);

    for (i, v) in dataset.features.iter().enumerate() {
        assert!(
            (0.0..=100.0).contains(&v.engagement_score),
            "engagement out of range at {i}: {}",
            v.engagement_score
        );
        assert!(v.tenure >= 0.0, "negative tenure at {i}");
        assert!(v.support_response_time >= 0.0, "negative support time at {i}");
        assert!(v.revenue > 0.0, "non-positive revenue at {i}");
        assert!(v.days_since_last_activity >= 0.0, "negative activity gap at {i}");
    }
}

/// Sample means should land near the designed distribution means.
/// Loose bands — this is a sanity check, not a statistics exam.
#[test]
fn sample_means_match_designed_distributions() {
    let dataset = SyntheticDataGenerator::generate(5000, 42);
    let n = dataset.features.len() as f64;

    let mean = |f: fn(&churn_core::features::FeatureVector) -> f64| {
        dataset.features.iter().map(f).sum::<f64>() / n
    };

    let engagement = mean(|v| v.engagement_score);
    assert!(
        (40.0..=60.0).contains(&engagement),
        "Beta(2,2)*100 mean should be near 50, got {engagement}"
    );

    let tenure = mean(|v| v.tenure);
    assert!(
        (300.0..=430.0).contains(&tenure),
        "Exponential tenure mean should be near 365, got {tenure}"
    );

    let support = mean(|v| v.support_response_time);
    assert!(
        (8.0..=12.0).contains(&support),
        "Gamma(2,5) mean should be near 10, got {support}"
    );

    let activity = mean(|v| v.days_since_last_activity);
    assert!(
        (12.0..=18.0).contains(&activity),
        "Exponential activity-gap mean should be near 15, got {activity}"
    );
}

/// Revenue is heavy-tailed: the median sits well below the mean.
#[test]
fn revenue_median_sits_below_mean() {
    let dataset = SyntheticDataGenerator::generate(5000, 42);

    let mut revenues: Vec<f64> = dataset.features.iter().map(|v| v.revenue).collect();
    revenues.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let median = revenues[revenues.len() / 2];
    let mean = revenues.iter().sum::<f64>() / revenues.len() as f64;

    assert!(
        median < mean * 0.75,
        "LogNormal(7, 1.5) median {median} should be well below mean {mean}"
    );
}

/// The weighted-risk label rule churns a minority of customers — neither
/// degenerate class.
#[test]
fn churn_rate_is_plausible() {
    let dataset = SyntheticDataGenerator::generate(5000, 42);
    let rate = dataset.churn_rate();

    assert!(
        (0.02..=0.40).contains(&rate),
        "Churn rate {rate} outside the plausible band"
    );
}

/// Labels track the designed drivers: churners have lower engagement on
/// average than non-churners.
#[test]
fn churners_have_lower_engagement() {
    let dataset = SyntheticDataGenerator::generate(5000, 42);

    let avg = |wanted: bool| {
        let (sum, count) = dataset
            .features
            .iter()
            .zip(&dataset.labels)
            .filter(|(_, &l)| l == wanted)
            .fold((0.0, 0usize), |(s, c), (v, _)| (s + v.engagement_score, c + 1));
        sum / count as f64
    };

    let churned = avg(true);
    let retained = avg(false);
    assert!(
        churned < retained,
        "Churners should be less engaged: churned={churned} retained={retained}"
    );
}
