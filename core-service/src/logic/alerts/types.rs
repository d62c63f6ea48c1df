//! Alert Types
//!
//! Persisted outcome of an actionable risk assessment, plus the emission
//! policy. No dedup logic here, only data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_ALERT_COOLDOWN_SECS;
use crate::logic::record::SubjectId;
use crate::logic::threshold::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Health,
    AnomalyDetection,
    Location,
    Device,
    DailyReport,
}

impl AlertCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCategory::Health => "health",
            AlertCategory::AnomalyDetection => "anomaly_detection",
            AlertCategory::Location => "location",
            AlertCategory::Device => "device",
            AlertCategory::DailyReport => "daily_report",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "health" => Some(AlertCategory::Health),
            "anomaly_detection" => Some(AlertCategory::AnomalyDetection),
            "location" => Some(AlertCategory::Location),
            "device" => Some(AlertCategory::Device),
            "daily_report" => Some(AlertCategory::DailyReport),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
    Warning,
    Info,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::High => "high",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(AlertSeverity::High),
            "warning" => Some(AlertSeverity::Warning),
            "info" => Some(AlertSeverity::Info),
            _ => None,
        }
    }
}

impl From<Severity> for AlertSeverity {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Danger => AlertSeverity::High,
            Severity::Warning => AlertSeverity::Warning,
            Severity::Safe => AlertSeverity::Info,
        }
    }
}

/// Persisted guardian-facing alert. Mutated only to flip the read flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub subject_id: SubjectId,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    pub description: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        subject_id: SubjectId,
        category: AlertCategory,
        severity: AlertSeverity,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            category,
            severity,
            description,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

/// Emission policy. The cooldown suppresses repeats of one category+severity
/// while an unread alert is recent; 0 disables deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub cooldown_secs: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_ALERT_COOLDOWN_SECS,
        }
    }
}

impl AlertPolicy {
    pub fn from_env() -> Self {
        Self {
            cooldown_secs: crate::constants::get_alert_cooldown_secs(),
        }
    }
}
