//! BaselineComparator - Current Reading vs Personal Baseline
//!
//! Pure comparison of one reading against the learned profile. Never fails:
//! a subject without a profile simply skips this stage at the orchestrator.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::logic::record::VitalReading;
use crate::logic::threshold::Severity;

use super::types::HealthProfile;

/// Deviation beyond the band treated as a strong steps anomaly (percent)
const STEPS_DEVIATION_BAND: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonStatus {
    #[serde(rename = "正常")]
    Normal,
    #[serde(rename = "偏高")]
    High,
    #[serde(rename = "偏低")]
    Low,
}

impl ComparisonStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ComparisonStatus::Normal => "正常",
            ComparisonStatus::High => "偏高",
            ComparisonStatus::Low => "偏低",
        }
    }

    pub fn is_anomaly(&self) -> bool {
        !matches!(self, ComparisonStatus::Normal)
    }
}

/// One metric measured against its personal band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricComparison {
    pub value: f64,
    pub baseline_low: f64,
    pub baseline_high: f64,
    pub status: ComparisonStatus,
    /// Percent distance from the nearest band bound, 1 decimal, 0 when normal
    pub deviation_percent: f64,
}

impl MetricComparison {
    /// Severity of this metric when the comparator takes over from raw
    /// thresholds. `severe_percent` comes from the active `SeverityRules`.
    pub fn severity(&self, severe_percent: f64) -> Severity {
        match self.status {
            ComparisonStatus::Normal => Severity::Safe,
            _ if self.deviation_percent > severe_percent => Severity::Danger,
            _ => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub heart_rate: MetricComparison,
    pub systolic_bp: MetricComparison,
    pub steps: MetricComparison,
}

/// Compare a reading against the learned profile.
pub fn compare(reading: &VitalReading, profile: &HealthProfile) -> BaselineComparison {
    let heart_rate = band_comparison(
        reading.heart_rate as f64,
        profile.learned_hr_low,
        profile.learned_hr_high,
    );

    let systolic_low = profile.learned_systolic_mean - 2.0 * profile.learned_systolic_std;
    let systolic_high = profile.learned_systolic_mean + 2.0 * profile.learned_systolic_std;
    let systolic_bp = band_comparison(reading.systolic_bp as f64, systolic_low, systolic_high);

    // Steps are compared to the daily mean prorated by hour of day
    let hour = reading.timestamp.hour() as f64;
    let expected = profile.daily_steps_mean as f64 * (hour / 24.0);
    let steps = if expected > 0.0 {
        let band = expected * STEPS_DEVIATION_BAND / 100.0;
        band_comparison(reading.steps as f64, expected - band, expected + band)
    } else {
        MetricComparison {
            value: reading.steps as f64,
            baseline_low: 0.0,
            baseline_high: 0.0,
            status: ComparisonStatus::Normal,
            deviation_percent: 0.0,
        }
    };

    BaselineComparison {
        heart_rate,
        systolic_bp,
        steps,
    }
}

fn band_comparison(value: f64, low: f64, high: f64) -> MetricComparison {
    let (status, deviation_percent) = if value > high {
        (ComparisonStatus::High, percent_of(value - high, high))
    } else if value < low {
        (ComparisonStatus::Low, percent_of(low - value, low))
    } else {
        (ComparisonStatus::Normal, 0.0)
    };

    MetricComparison {
        value,
        baseline_low: low,
        baseline_high: high,
        status,
        deviation_percent,
    }
}

fn percent_of(delta: f64, bound: f64) -> f64 {
    if bound <= 0.0 {
        return 0.0;
    }
    (delta / bound * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::baseline::types::{DataQuality, OutdoorPreference};
    use chrono::{TimeZone, Utc};

    fn profile() -> HealthProfile {
        HealthProfile {
            subject_id: 1,
            learned_hr_low: 58.0,
            learned_hr_high: 92.0,
            learned_hr_mean: 75.0,
            learned_hr_std: 8.5,
            resting_hr: 62.0,
            learned_systolic_mean: 122.0,
            learned_systolic_std: 8.0,
            learned_diastolic_mean: 78.0,
            wake_time: "06:00".to_string(),
            sleep_time: "21:00".to_string(),
            daily_steps_mean: 4800,
            daily_steps_std: 1200,
            home_stay_ratio: 0.72,
            outdoor_preference: OutdoorPreference::Morning,
            health_summary: String::new(),
            risk_factors: vec![],
            personalized_advice: vec![],
            confidence_score: 0.8,
            data_quality: DataQuality::Good,
            learning_days: 30,
            records_analyzed: 90,
            learned_at: Utc.with_ymd_and_hms(2026, 3, 9, 20, 0, 0).unwrap(),
        }
    }

    fn reading(hr: i32, sbp: i32, steps: i32, hour: u32) -> VitalReading {
        VitalReading {
            subject_id: 1,
            heart_rate: hr,
            systolic_bp: sbp,
            diastolic_bp: 78,
            steps,
            latitude: 30.2741,
            longitude: 120.1551,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 10, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn within_band_is_normal() {
        let cmp = compare(&reading(75, 122, 2400, 12), &profile());
        assert_eq!(cmp.heart_rate.status, ComparisonStatus::Normal);
        assert_eq!(cmp.heart_rate.deviation_percent, 0.0);
        assert_eq!(cmp.systolic_bp.status, ComparisonStatus::Normal);
    }

    #[test]
    fn above_band_reports_deviation_from_upper_bound() {
        let cmp = compare(&reading(110, 122, 2400, 12), &profile());
        assert_eq!(cmp.heart_rate.status, ComparisonStatus::High);
        // (110 - 92) / 92 * 100 = 19.6
        assert_eq!(cmp.heart_rate.deviation_percent, 19.6);
        assert_eq!(cmp.heart_rate.severity(20.0), Severity::Warning);
    }

    #[test]
    fn far_above_band_is_danger() {
        let cmp = compare(&reading(120, 122, 2400, 12), &profile());
        // (120 - 92) / 92 * 100 = 30.4
        assert!(cmp.heart_rate.deviation_percent > 20.0);
        assert_eq!(cmp.heart_rate.severity(20.0), Severity::Danger);
    }

    #[test]
    fn below_band_reports_low() {
        let cmp = compare(&reading(50, 122, 2400, 12), &profile());
        assert_eq!(cmp.heart_rate.status, ComparisonStatus::Low);
        // (58 - 50) / 58 * 100 = 13.8
        assert_eq!(cmp.heart_rate.deviation_percent, 13.8);
        assert_eq!(cmp.heart_rate.status.label(), "偏低");
    }

    #[test]
    fn steps_prorated_by_hour() {
        // At 12:00 expected = 4800 * 12/24 = 2400; band 1200..3600
        let cmp = compare(&reading(75, 122, 5000, 12), &profile());
        assert_eq!(cmp.steps.status, ComparisonStatus::High);
        let cmp = compare(&reading(75, 122, 2400, 12), &profile());
        assert_eq!(cmp.steps.status, ComparisonStatus::Normal);
    }

    #[test]
    fn midnight_steps_never_flag() {
        let cmp = compare(&reading(75, 122, 0, 0), &profile());
        assert_eq!(cmp.steps.status, ComparisonStatus::Normal);
    }
}
