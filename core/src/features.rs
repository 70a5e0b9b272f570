//! Feature preparation — raw customer records in, fixed feature vectors out.
//!
//! RULE: preparation never fails. Missing or malformed fields fall back to
//! the declared per-feature default instead of raising an error. The
//! provenance flags on PreparedRecord record which fields were defaulted,
//! so callers can tell "defaulted to zero" apart from "provided as zero".

use crate::types::FEATURE_COUNT;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A raw customer record: arbitrary string keys, no required fields.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Raw-record key carrying the last activity calendar date (`YYYY-MM-DD`).
pub const LAST_ACTIVITY_DATE_KEY: &str = "last_activity_date";

/// Fallback when a record carries an activity-date field whose value is
/// missing or unparseable. Distinct from the all-purpose default of 0:
/// a customer with a date column but no usable value is assumed to have
/// been inactive for a month, not active today.
pub const MISSING_ACTIVITY_DATE_DEFAULT: f64 = 30.0;

// ── Feature names ────────────────────────────────────────────────────────────

/// The five model features, in canonical vector order.
/// NEVER reorder — the classifier's importances align to this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    EngagementScore,
    Tenure,
    SupportResponseTime,
    Revenue,
    DaysSinceLastActivity,
}

impl FeatureName {
    pub const ALL: [FeatureName; FEATURE_COUNT] = [
        FeatureName::EngagementScore,
        FeatureName::Tenure,
        FeatureName::SupportResponseTime,
        FeatureName::Revenue,
        FeatureName::DaysSinceLastActivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EngagementScore => "engagement_score",
            Self::Tenure => "tenure",
            Self::SupportResponseTime => "support_response_time",
            Self::Revenue => "revenue",
            Self::DaysSinceLastActivity => "days_since_last_activity",
        }
    }

    /// Default used when a record carries no usable value for this feature.
    /// The missing-date case for DaysSinceLastActivity is handled separately
    /// by the preparer (see MISSING_ACTIVITY_DATE_DEFAULT).
    pub fn default_value(&self) -> f64 {
        0.0
    }
}

// ── Feature vector ───────────────────────────────────────────────────────────

/// Ordered tuple of exactly five numeric features. Field order here is the
/// canonical order everywhere: vectors, importances, contributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub engagement_score:         f64,
    pub tenure:                   f64,
    pub support_response_time:    f64,
    pub revenue:                  f64,
    pub days_since_last_activity: f64,
}

impl FeatureVector {
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.engagement_score,
            self.tenure,
            self.support_response_time,
            self.revenue,
            self.days_since_last_activity,
        ]
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            engagement_score:         values[0],
            tenure:                   values[1],
            support_response_time:    values[2],
            revenue:                  values[3],
            days_since_last_activity: values[4],
        }
    }

    pub fn get(&self, name: FeatureName) -> f64 {
        match name {
            FeatureName::EngagementScore => self.engagement_score,
            FeatureName::Tenure => self.tenure,
            FeatureName::SupportResponseTime => self.support_response_time,
            FeatureName::Revenue => self.revenue,
            FeatureName::DaysSinceLastActivity => self.days_since_last_activity,
        }
    }
}

/// A feature vector derived from one raw record, plus provenance:
/// `defaulted[i]` is true when feature i came from the defaulting policy
/// rather than the record itself.
#[derive(Debug, Clone)]
pub struct PreparedRecord {
    pub vector:    FeatureVector,
    pub defaulted: [bool; FEATURE_COUNT],
}

// ── Preparer ─────────────────────────────────────────────────────────────────

/// Turns raw records into fixed-order feature vectors.
///
/// Day arithmetic for `days_since_last_activity` runs against an explicit
/// reference date so preparation is reproducible under test. Production
/// callers use `new()`, which pins the reference to today.
pub struct FeaturePreparer {
    reference_date: NaiveDate,
}

impl Default for FeaturePreparer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturePreparer {
    pub fn new() -> Self {
        Self {
            reference_date: Local::now().date_naive(),
        }
    }

    pub fn with_reference_date(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    /// Prepare a batch of records. Output is 1:1 with input, same order.
    pub fn prepare(&self, records: &[RawRecord]) -> Vec<PreparedRecord> {
        records.iter().map(|r| self.prepare_one(r)).collect()
    }

    pub fn prepare_one(&self, record: &RawRecord) -> PreparedRecord {
        let mut values    = [0.0; FEATURE_COUNT];
        let mut defaulted = [false; FEATURE_COUNT];

        for (i, name) in FeatureName::ALL.iter().enumerate() {
            let (value, was_defaulted) = match name {
                FeatureName::DaysSinceLastActivity => self.days_since_last_activity(record),
                _ => Self::numeric_field(record, name.as_str(), name.default_value()),
            };
            values[i]    = value;
            defaulted[i] = was_defaulted;
        }

        PreparedRecord {
            vector: FeatureVector::from_array(values),
            defaulted,
        }
    }

    /// Extract a plain numeric field. Missing or non-numeric values take
    /// the feature default — permissive by policy, not an oversight.
    fn numeric_field(record: &RawRecord, key: &str, default: f64) -> (f64, bool) {
        match record.get(key).and_then(|v| v.as_f64()) {
            Some(value) => (value, false),
            None => (default, true),
        }
    }

    /// Derive days-since-last-activity.
    ///
    /// If the record carries an activity-date field, that field wins: a
    /// parseable `YYYY-MM-DD` value becomes (reference - date) in days,
    /// and anything else falls back to MISSING_ACTIVITY_DATE_DEFAULT.
    /// Records without the date field keep a numeric
    /// `days_since_last_activity` if present, else default to 0.
    fn days_since_last_activity(&self, record: &RawRecord) -> (f64, bool) {
        match record.get(LAST_ACTIVITY_DATE_KEY) {
            Some(raw) => match raw
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            {
                Some(date) => {
                    let days = (self.reference_date - date).num_days();
                    (days as f64, false)
                }
                None => (MISSING_ACTIVITY_DATE_DEFAULT, true),
            },
            None => Self::numeric_field(
                record,
                FeatureName::DaysSinceLastActivity.as_str(),
                FeatureName::DaysSinceLastActivity.default_value(),
            ),
        }
    }
}
