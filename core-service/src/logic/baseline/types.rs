//! Baseline Types
//!
//! The learned personal profile and the learning-side error taxonomy.
//! No statistics here, only data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::record::SubjectId;
use crate::logic::store::StoreError;

// ============================================================================
// DATA QUALITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Insufficient,
    Fair,
    Good,
    Excellent,
}

impl DataQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::Insufficient => "insufficient",
            DataQuality::Fair => "fair",
            DataQuality::Good => "good",
            DataQuality::Excellent => "excellent",
        }
    }
}

/// Time-of-day bucket the subject usually spends outdoors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutdoorPreference {
    Morning,
    Afternoon,
    Evening,
}

impl OutdoorPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutdoorPreference::Morning => "morning",
            OutdoorPreference::Afternoon => "afternoon",
            OutdoorPreference::Evening => "evening",
        }
    }
}

// ============================================================================
// HEALTH PROFILE
// ============================================================================

/// Learned personal baseline for one subject.
///
/// Replaced wholesale by each learning run, never patched field by field.
/// Carries no wall-clock fields: `learned_at` is the newest analyzed record's
/// timestamp, so identical history produces an identical profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    pub subject_id: SubjectId,

    // Heart-rate baseline
    pub learned_hr_low: f64,
    pub learned_hr_high: f64,
    pub learned_hr_mean: f64,
    pub learned_hr_std: f64,
    pub resting_hr: f64,

    // Blood-pressure baseline
    pub learned_systolic_mean: f64,
    pub learned_systolic_std: f64,
    pub learned_diastolic_mean: f64,

    // Activity pattern
    pub wake_time: String,
    pub sleep_time: String,
    pub daily_steps_mean: i64,
    pub daily_steps_std: i64,

    // Location habits
    pub home_stay_ratio: f64,
    pub outdoor_preference: OutdoorPreference,

    // Rule-derived guidance
    pub health_summary: String,
    pub risk_factors: Vec<String>,
    pub personalized_advice: Vec<String>,

    // Learning metadata
    pub confidence_score: f64,
    pub data_quality: DataQuality,
    pub learning_days: u32,
    pub records_analyzed: usize,
    pub learned_at: DateTime<Utc>,
}

impl HealthProfile {
    /// Whether the profile is trustworthy enough to override raw thresholds.
    pub fn is_usable(&self) -> bool {
        self.confidence_score > crate::constants::MIN_PROFILE_CONFIDENCE
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("insufficient data: need at least {need} records, have {have}")]
    InsufficientData { have: usize, need: usize },

    #[error("baseline learning already in progress for subject {0}")]
    LearningInProgress(SubjectId),

    #[error("record source: {0}")]
    Store(#[from] StoreError),

    #[error("profile io: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
