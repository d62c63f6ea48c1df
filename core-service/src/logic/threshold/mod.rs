//! ThresholdEvaluator - Fixed Clinical Bounds
//!
//! Pure evaluation of one reading against per-subject configured bounds.
//! Used directly when no personal baseline exists, and always run as the
//! blood-pressure signal even when a baseline takes over heart rate.
//!
//! # Architecture
//! - `types.rs`: `Severity`, `VitalFlag`, `ThresholdConfig`, `ThresholdReport`
//! - `rules.rs`: escalation margins

pub mod rules;
pub mod types;

pub use rules::SeverityRules;
pub use types::{Severity, ThresholdConfig, ThresholdReport, ThresholdUpdate, VitalFlag};

use crate::logic::record::{ValidationError, VitalReading};

/// Evaluate with default escalation margins.
///
/// Fails only on malformed input; never on any in-range value combination.
pub fn evaluate(
    reading: &VitalReading,
    config: &ThresholdConfig,
) -> Result<ThresholdReport, ValidationError> {
    evaluate_with_rules(reading, config, &SeverityRules::default())
}

/// Evaluate with custom escalation margins.
pub fn evaluate_with_rules(
    reading: &VitalReading,
    config: &ThresholdConfig,
    rules: &SeverityRules,
) -> Result<ThresholdReport, ValidationError> {
    reading.validate()?;

    let heart_rate = if reading.heart_rate > config.hr_high {
        VitalFlag::High
    } else if reading.heart_rate < config.hr_low {
        VitalFlag::Low
    } else {
        VitalFlag::Normal
    };

    let blood_pressure = if reading.systolic_bp > config.sbp_high
        || reading.diastolic_bp > config.dbp_high
    {
        VitalFlag::High
    } else if reading.systolic_bp < config.sbp_low {
        VitalFlag::Low
    } else {
        VitalFlag::Normal
    };

    let flagged = [heart_rate, blood_pressure]
        .iter()
        .filter(|f| f.is_anomaly())
        .count();

    // A lone flag escalates when the value clears the severe margin
    let hr_severe = reading.heart_rate > config.hr_high + rules.severe_hr_margin
        || reading.heart_rate < config.hr_low - rules.severe_hr_margin;
    let bp_severe = reading.systolic_bp > config.sbp_high + rules.severe_sbp_margin;

    let severity = if flagged >= 2 || hr_severe || bp_severe {
        Severity::Danger
    } else if flagged == 1 {
        Severity::Warning
    } else {
        Severity::Safe
    };

    Ok(ThresholdReport {
        heart_rate,
        blood_pressure,
        severity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(hr: i32, sbp: i32, dbp: i32) -> VitalReading {
        VitalReading {
            subject_id: 1,
            heart_rate: hr,
            systolic_bp: sbp,
            diastolic_bp: dbp,
            steps: 3000,
            latitude: 30.2741,
            longitude: 120.1551,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn in_range_reading_is_safe() {
        let report = evaluate(&reading(72, 120, 80), &ThresholdConfig::default()).unwrap();
        assert_eq!(report.severity, Severity::Safe);
        assert_eq!(report.heart_rate, VitalFlag::Normal);
        assert_eq!(report.blood_pressure, VitalFlag::Normal);
    }

    #[test]
    fn boundary_values_are_safe() {
        // Bounds are exclusive: exactly hr_high / sbp_high does not flag
        let config = ThresholdConfig::default();
        let report = evaluate(&reading(100, 140, 85), &config).unwrap();
        assert_eq!(report.severity, Severity::Safe);
    }

    #[test]
    fn single_mild_flag_is_warning() {
        let report = evaluate(&reading(110, 120, 80), &ThresholdConfig::default()).unwrap();
        assert_eq!(report.heart_rate, VitalFlag::High);
        assert_eq!(report.severity, Severity::Warning);
    }

    #[test]
    fn two_flags_are_danger() {
        let report = evaluate(&reading(115, 145, 80), &ThresholdConfig::default()).unwrap();
        assert_eq!(report.heart_rate, VitalFlag::High);
        assert_eq!(report.blood_pressure, VitalFlag::High);
        assert_eq!(report.severity, Severity::Danger);
    }

    #[test]
    fn single_severe_flag_is_danger() {
        // 125 bpm > 100 + 20 margin
        let report = evaluate(&reading(125, 120, 80), &ThresholdConfig::default()).unwrap();
        assert_eq!(report.severity, Severity::Danger);

        // 165 mmHg > 140 + 20 margin
        let report = evaluate(&reading(72, 165, 80), &ThresholdConfig::default()).unwrap();
        assert_eq!(report.severity, Severity::Danger);
    }

    #[test]
    fn severe_margin_is_configurable() {
        let rules = SeverityRules {
            severe_hr_margin: 5,
            ..Default::default()
        };
        let report =
            evaluate_with_rules(&reading(108, 120, 80), &ThresholdConfig::default(), &rules)
                .unwrap();
        assert_eq!(report.severity, Severity::Danger);
    }

    #[test]
    fn low_heart_rate_flags_low() {
        let report = evaluate(&reading(45, 120, 80), &ThresholdConfig::default()).unwrap();
        assert_eq!(report.heart_rate, VitalFlag::Low);
        assert_eq!(report.severity, Severity::Warning);
    }

    #[test]
    fn high_diastolic_flags_blood_pressure() {
        let report = evaluate(&reading(72, 135, 95), &ThresholdConfig::default()).unwrap();
        assert_eq!(report.blood_pressure, VitalFlag::High);
        assert_eq!(report.severity, Severity::Warning);
    }

    #[test]
    fn malformed_reading_is_rejected() {
        let mut r = reading(72, 120, 80);
        r.heart_rate = 10;
        assert!(evaluate(&r, &ThresholdConfig::default()).is_err());
    }

    #[test]
    fn config_invariant_low_less_than_high() {
        let config = ThresholdConfig {
            hr_low: 100,
            hr_high: 50,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(ThresholdConfig::default().validate().is_ok());
    }
}
