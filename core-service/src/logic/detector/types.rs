//! Detector Types
//!
//! The combined risk assessment produced for every reading. Display layers
//! read `severity` and `flags`; they never recompute them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::threshold::Severity;

/// Which signal tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFlag {
    HeartRate,
    BloodPressure,
    Location,
    Activity,
}

impl MetricFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricFlag::HeartRate => "heart_rate",
            MetricFlag::BloodPressure => "blood_pressure",
            MetricFlag::Location => "location",
            MetricFlag::Activity => "activity",
        }
    }
}

/// One assessment for one reading. Ephemeral: only persisted when the alert
/// manager turns it into an `Alert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub severity: Severity,
    /// Signals that tripped, in priority order (vitals, location, activity)
    pub flags: Vec<MetricFlag>,
    /// Human-readable explanation listing every tripped condition
    pub message: String,
    /// Percent deviation per metric, present when a bound was crossed
    pub deviations: BTreeMap<String, f64>,
    /// Zone name or "未知区域"
    pub location_name: String,
    /// Time-block activity label
    pub activity_label: String,
    /// Whether a personal baseline drove the vital-sign severity
    pub used_baseline: bool,
}

impl RiskAssessment {
    pub fn anomaly_count(&self) -> usize {
        self.flags.len()
    }

    pub fn is_actionable(&self) -> bool {
        self.severity > Severity::Safe
    }
}
