//! Vital-sign reading type and input validation.
//!
//! A `VitalReading` is one immutable sample from the wearable feed. Validation
//! fails fast on physiologically impossible values instead of coercing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monitored person identifier
pub type SubjectId = i64;

// Physiological plausibility gates for incoming samples
pub const HR_VALID_RANGE: (i32, i32) = (20, 250);
pub const SBP_VALID_RANGE: (i32, i32) = (60, 250);
pub const DBP_VALID_RANGE: (i32, i32) = (40, 150);
pub const STEPS_MAX: i32 = 100_000;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// One vital-signs sample. Created by the ingestion layer, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    pub subject_id: SubjectId,
    pub heart_rate: i32,
    pub systolic_bp: i32,
    pub diastolic_bp: i32,
    /// Cumulative daily step count at sample time
    pub steps: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl VitalReading {
    /// Reject malformed samples before they reach the evaluation pipeline.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (hr_min, hr_max) = HR_VALID_RANGE;
        if self.heart_rate < hr_min || self.heart_rate > hr_max {
            return Err(ValidationError::new(
                "heart_rate",
                format!("must be between {} and {} bpm", hr_min, hr_max),
            ));
        }

        let (sbp_min, sbp_max) = SBP_VALID_RANGE;
        if self.systolic_bp < sbp_min || self.systolic_bp > sbp_max {
            return Err(ValidationError::new(
                "systolic_bp",
                format!("must be between {} and {} mmHg", sbp_min, sbp_max),
            ));
        }

        let (dbp_min, dbp_max) = DBP_VALID_RANGE;
        if self.diastolic_bp < dbp_min || self.diastolic_bp > dbp_max {
            return Err(ValidationError::new(
                "diastolic_bp",
                format!("must be between {} and {} mmHg", dbp_min, dbp_max),
            ));
        }

        if self.diastolic_bp >= self.systolic_bp {
            return Err(ValidationError::new(
                "diastolic_bp",
                "diastolic BP must be less than systolic BP",
            ));
        }

        if self.steps < 0 {
            return Err(ValidationError::new("steps", "cannot be negative"));
        }
        if self.steps > STEPS_MAX {
            return Err(ValidationError::new(
                "steps",
                format!("unrealistically high (>{})", STEPS_MAX),
            ));
        }

        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::new(
                "latitude",
                "must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::new(
                "longitude",
                "must be between -180 and 180",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> VitalReading {
        VitalReading {
            subject_id: 1,
            heart_rate: 72,
            systolic_bp: 120,
            diastolic_bp: 80,
            steps: 4200,
            latitude: 30.2741,
            longitude: 120.1551,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn accepts_normal_reading() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_impossible_heart_rate() {
        let mut r = sample();
        r.heart_rate = 300;
        let err = r.validate().unwrap_err();
        assert_eq!(err.field, "heart_rate");
    }

    #[test]
    fn rejects_inverted_blood_pressure() {
        let mut r = sample();
        r.systolic_bp = 80;
        r.diastolic_bp = 95;
        let err = r.validate().unwrap_err();
        assert_eq!(err.field, "diastolic_bp");
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut r = sample();
        r.longitude = 200.0;
        assert!(r.validate().is_err());
    }
}
