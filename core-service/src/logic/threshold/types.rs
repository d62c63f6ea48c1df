//! Threshold Types
//!
//! Core types for fixed-threshold evaluation. No logic here, only data
//! structures shared by the evaluator, the detector and the settings store.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DBP_HIGH, DEFAULT_DBP_LOW, DEFAULT_HR_HIGH, DEFAULT_HR_LOW, DEFAULT_SBP_HIGH,
    DEFAULT_SBP_LOW,
};
use crate::logic::record::ValidationError;

// ============================================================================
// SEVERITY
// ============================================================================

/// Ordinal risk classification: safe < warning < danger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Safe,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "safe",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }

    /// Guardian-facing risk label
    pub fn risk_label(&self) -> &'static str {
        match self {
            Severity::Safe => "低",
            Severity::Warning => "中",
            Severity::Danger => "高",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PER-METRIC FLAGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalFlag {
    Normal,
    High,
    Low,
}

impl VitalFlag {
    pub fn is_anomaly(&self) -> bool {
        !matches!(self, VitalFlag::Normal)
    }
}

// ============================================================================
// THRESHOLD CONFIG (per-subject, guardian-editable)
// ============================================================================

/// Per-subject alerting bounds. Invariant: low < high for every pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub hr_low: i32,
    pub hr_high: i32,
    pub sbp_low: i32,
    pub sbp_high: i32,
    pub dbp_low: i32,
    pub dbp_high: i32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            hr_low: DEFAULT_HR_LOW,
            hr_high: DEFAULT_HR_HIGH,
            sbp_low: DEFAULT_SBP_LOW,
            sbp_high: DEFAULT_SBP_HIGH,
            dbp_low: DEFAULT_DBP_LOW,
            dbp_high: DEFAULT_DBP_HIGH,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let pairs = [
            ("heart rate", self.hr_low, self.hr_high),
            ("systolic BP", self.sbp_low, self.sbp_high),
            ("diastolic BP", self.dbp_low, self.dbp_high),
        ];
        for (name, low, high) in pairs {
            if low >= high {
                return Err(ValidationError {
                    field: "threshold_config",
                    reason: format!("{} bounds must satisfy low < high ({} >= {})", name, low, high),
                });
            }
        }
        Ok(())
    }

    /// Apply a partial update, keeping current values for unset fields.
    pub fn merged(&self, update: &ThresholdUpdate) -> Self {
        Self {
            hr_low: update.hr_low.unwrap_or(self.hr_low),
            hr_high: update.hr_high.unwrap_or(self.hr_high),
            sbp_low: update.sbp_low.unwrap_or(self.sbp_low),
            sbp_high: update.sbp_high.unwrap_or(self.sbp_high),
            dbp_low: update.dbp_low.unwrap_or(self.dbp_low),
            dbp_high: update.dbp_high.unwrap_or(self.dbp_high),
        }
    }
}

/// Partial threshold update from the settings API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ThresholdUpdate {
    pub hr_low: Option<i32>,
    pub hr_high: Option<i32>,
    pub sbp_low: Option<i32>,
    pub sbp_high: Option<i32>,
    pub dbp_low: Option<i32>,
    pub dbp_high: Option<i32>,
}

// ============================================================================
// EVALUATION REPORT
// ============================================================================

/// Result of one fixed-threshold pass over a reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdReport {
    pub heart_rate: VitalFlag,
    pub blood_pressure: VitalFlag,
    pub severity: Severity,
}

impl ThresholdReport {
    pub fn anomaly_count(&self) -> usize {
        [self.heart_rate, self.blood_pressure]
            .iter()
            .filter(|f| f.is_anomaly())
            .count()
    }
}
