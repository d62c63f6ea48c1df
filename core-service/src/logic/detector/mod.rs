//! AnomalyDetector - Orchestrator
//!
//! Merges the fixed-threshold pass, the personal-baseline comparison (when a
//! usable profile exists), the safe-zone check and the activity-pattern check
//! into one `RiskAssessment` per reading.
//!
//! The whole pipeline is a pure function of its inputs: same reading, config,
//! profile and zones always produce the same assessment. All I/O (profile
//! lookup, zone lookup, alert persistence) stays with the caller.

pub mod activity;
pub mod types;

pub use activity::{check_activity, ActivityCheck};
pub use types::{MetricFlag, RiskAssessment};

use std::collections::BTreeMap;

use chrono::Timelike;

use crate::logic::baseline::{compare, BaselineComparison, HealthProfile};
use crate::logic::geo::{self, SafeZone};
use crate::logic::record::{ValidationError, VitalReading};
use crate::logic::threshold::{self, Severity, SeverityRules, ThresholdConfig, VitalFlag};

struct Signal {
    flag: MetricFlag,
    severity: Severity,
    message: String,
    deviation: Option<f64>,
}

/// Assess one reading with default escalation margins.
pub fn assess(
    reading: &VitalReading,
    config: &ThresholdConfig,
    profile: Option<&HealthProfile>,
    zones: &[SafeZone],
) -> Result<RiskAssessment, ValidationError> {
    assess_with_rules(reading, config, profile, zones, &SeverityRules::default())
}

/// Assess one reading with custom escalation margins.
pub fn assess_with_rules(
    reading: &VitalReading,
    config: &ThresholdConfig,
    profile: Option<&HealthProfile>,
    zones: &[SafeZone],
    rules: &SeverityRules,
) -> Result<RiskAssessment, ValidationError> {
    // Fixed thresholds always run; they also validate the reading
    let report = threshold::evaluate_with_rules(reading, config, rules)?;

    // Personalized baseline takes precedence when trustworthy
    let comparison = profile
        .filter(|p| p.is_usable())
        .map(|p| compare(reading, p));

    let mut signals: Vec<Signal> = Vec::new();

    if let Some(signal) = heart_rate_signal(reading, config, &report, comparison.as_ref(), rules) {
        signals.push(signal);
    }
    if let Some(signal) = blood_pressure_signal(reading, config, &report, comparison.as_ref(), rules)
    {
        signals.push(signal);
    }

    let location_name = geo::location_name(reading.latitude, reading.longitude, zones);
    let has_active_zone = zones.iter().any(|z| z.is_active);
    if has_active_zone && !geo::is_in_safe_zone(reading.latitude, reading.longitude, zones) {
        signals.push(Signal {
            flag: MetricFlag::Location,
            severity: Severity::Warning,
            message: "检测到偏离日常活动区域，请确认老人状况".to_string(),
            deviation: None,
        });
    }

    let activity = check_activity(reading.timestamp.hour(), reading.heart_rate, reading.steps);
    if let Some(message) = activity.message.clone() {
        signals.push(Signal {
            flag: MetricFlag::Activity,
            severity: activity.severity,
            message,
            deviation: None,
        });
    }

    // Worst single signal wins; two or more anomalies escalate to danger
    let mut severity = signals
        .iter()
        .map(|s| s.severity)
        .max()
        .unwrap_or(Severity::Safe);
    if signals.len() >= 2 {
        severity = Severity::Danger;
    }

    let message = if signals.is_empty() {
        reassuring_message(activity.label).to_string()
    } else {
        signals
            .iter()
            .map(|s| s.message.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut deviations = BTreeMap::new();
    for s in &signals {
        if let Some(pct) = s.deviation {
            deviations.insert(s.flag.as_str().to_string(), pct);
        }
    }

    Ok(RiskAssessment {
        severity,
        flags: signals.iter().map(|s| s.flag).collect(),
        message,
        deviations,
        location_name,
        activity_label: activity.label.to_string(),
        used_baseline: comparison.is_some(),
    })
}

fn heart_rate_signal(
    reading: &VitalReading,
    config: &ThresholdConfig,
    report: &threshold::ThresholdReport,
    comparison: Option<&BaselineComparison>,
    rules: &SeverityRules,
) -> Option<Signal> {
    if let Some(cmp) = comparison {
        let hr = &cmp.heart_rate;
        if !hr.status.is_anomaly() {
            return None;
        }
        let (bound, direction) = if hr.value > hr.baseline_high {
            (hr.baseline_high, "超出个人基线上限")
        } else {
            (hr.baseline_low, "低于个人基线下限")
        };
        return Some(Signal {
            flag: MetricFlag::HeartRate,
            severity: hr.severity(rules.severe_deviation_percent),
            message: format!(
                "心率{}bpm，{}({:.0}bpm) {:.0}%",
                reading.heart_rate, direction, bound, hr.deviation_percent
            ),
            deviation: Some(hr.deviation_percent),
        });
    }

    match report.heart_rate {
        VitalFlag::Normal => None,
        VitalFlag::High => {
            let severe = reading.heart_rate > config.hr_high + rules.severe_hr_margin;
            let pct = percent_over(reading.heart_rate, config.hr_high);
            Some(Signal {
                flag: MetricFlag::HeartRate,
                severity: if severe { Severity::Danger } else { Severity::Warning },
                message: format!("心率偏高 ({}bpm)，建议关注是否为运动或情绪波动", reading.heart_rate),
                deviation: Some(pct),
            })
        }
        VitalFlag::Low => {
            let severe = reading.heart_rate < config.hr_low - rules.severe_hr_margin;
            let pct = percent_under(reading.heart_rate, config.hr_low);
            Some(Signal {
                flag: MetricFlag::HeartRate,
                severity: if severe { Severity::Danger } else { Severity::Warning },
                message: format!("心率偏低 ({}bpm)，若非睡眠时段请关注", reading.heart_rate),
                deviation: Some(pct),
            })
        }
    }
}

fn blood_pressure_signal(
    reading: &VitalReading,
    config: &ThresholdConfig,
    report: &threshold::ThresholdReport,
    comparison: Option<&BaselineComparison>,
    rules: &SeverityRules,
) -> Option<Signal> {
    match report.blood_pressure {
        VitalFlag::High => {
            let severe = reading.systolic_bp > config.sbp_high + rules.severe_sbp_margin;
            Some(Signal {
                flag: MetricFlag::BloodPressure,
                severity: if severe { Severity::Danger } else { Severity::Warning },
                message: format!(
                    "血压偏高 ({}/{}mmHg)，建议休息并持续监测",
                    reading.systolic_bp, reading.diastolic_bp
                ),
                deviation: Some(percent_over(reading.systolic_bp, config.sbp_high)),
            })
        }
        VitalFlag::Low => Some(Signal {
            flag: MetricFlag::BloodPressure,
            severity: Severity::Warning,
            message: format!(
                "血压偏低 ({}/{}mmHg)，注意补充水分",
                reading.systolic_bp, reading.diastolic_bp
            ),
            deviation: Some(percent_under(reading.systolic_bp, config.sbp_low)),
        }),
        VitalFlag::Normal => {
            // Thresholds see nothing, but the personal band may be narrower
            let cmp = comparison?;
            let sbp = &cmp.systolic_bp;
            if !sbp.status.is_anomaly() {
                return None;
            }
            Some(Signal {
                flag: MetricFlag::BloodPressure,
                severity: sbp.severity(rules.severe_deviation_percent),
                message: format!(
                    "收缩压{}mmHg，偏离个人基线范围({:.0}-{:.0}mmHg)",
                    reading.systolic_bp, sbp.baseline_low, sbp.baseline_high
                ),
                deviation: Some(sbp.deviation_percent),
            })
        }
    }
}

fn reassuring_message(activity_label: &str) -> &'static str {
    match activity_label {
        "晨练时间" => "老人正在进行日常晨练，各项指标正常。",
        "午休时间" => "当前为午休时段，老人心率平稳，处于休息状态。",
        "夜间休息" => "当前为夜间时段，老人处于休息状态，指标平稳。",
        _ => "目前各项生命体征平稳，老人状态安详。",
    }
}

fn percent_over(value: i32, bound: i32) -> f64 {
    if bound <= 0 {
        return 0.0;
    }
    ((value - bound) as f64 / bound as f64 * 1000.0).round() / 10.0
}

fn percent_under(value: i32, bound: i32) -> f64 {
    if bound <= 0 {
        return 0.0;
    }
    ((bound - value) as f64 / bound as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::baseline::{DataQuality, OutdoorPreference};
    use chrono::{TimeZone, Utc};

    fn reading(hr: i32, sbp: i32) -> VitalReading {
        VitalReading {
            subject_id: 1,
            heart_rate: hr,
            systolic_bp: sbp,
            diastolic_bp: 80,
            steps: 3000,
            latitude: 30.2741,
            longitude: 120.1551,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap(),
        }
    }

    fn zones() -> Vec<SafeZone> {
        vec![SafeZone {
            id: 1,
            subject_id: 1,
            name: "家".to_string(),
            latitude: 30.2741,
            longitude: 120.1551,
            radius_m: 500.0,
            is_active: true,
        }]
    }

    fn profile(hr_low: f64, hr_high: f64, confidence: f64) -> HealthProfile {
        HealthProfile {
            subject_id: 1,
            learned_hr_low: hr_low,
            learned_hr_high: hr_high,
            learned_hr_mean: (hr_low + hr_high) / 2.0,
            learned_hr_std: 8.0,
            resting_hr: hr_low + 4.0,
            learned_systolic_mean: 122.0,
            learned_systolic_std: 8.0,
            learned_diastolic_mean: 78.0,
            wake_time: "06:00".to_string(),
            sleep_time: "21:00".to_string(),
            daily_steps_mean: 5000,
            daily_steps_std: 1200,
            home_stay_ratio: 0.7,
            outdoor_preference: OutdoorPreference::Morning,
            health_summary: String::new(),
            risk_factors: vec![],
            personalized_advice: vec![],
            confidence_score: confidence,
            data_quality: DataQuality::Good,
            learning_days: 30,
            records_analyzed: 90,
            learned_at: Utc.with_ymd_and_hms(2026, 3, 9, 20, 0, 0).unwrap(),
        }
    }

    #[test]
    fn normal_reading_is_safe() {
        let a = assess(&reading(72, 120), &ThresholdConfig::default(), None, &zones()).unwrap();
        assert_eq!(a.severity, Severity::Safe);
        assert!(a.flags.is_empty());
        assert!(!a.message.is_empty());
        assert_eq!(a.location_name, "家");
    }

    #[test]
    fn double_vital_anomaly_is_danger_with_both_messages() {
        let a = assess(&reading(115, 145), &ThresholdConfig::default(), None, &zones()).unwrap();
        assert_eq!(a.severity, Severity::Danger);
        assert_eq!(a.flags, vec![MetricFlag::HeartRate, MetricFlag::BloodPressure]);
        assert!(a.message.contains("心率"));
        assert!(a.message.contains("血压"));
        assert!(a.deviations.contains_key("heart_rate"));
    }

    #[test]
    fn leaving_the_safe_zone_flags_location() {
        let mut r = reading(72, 120);
        // ~600 m north of the 500 m zone
        r.latitude = 30.2795;
        let a = assess(&r, &ThresholdConfig::default(), None, &zones()).unwrap();
        assert!(a.flags.contains(&MetricFlag::Location));
        assert!(a.severity >= Severity::Warning);
        assert_eq!(a.location_name, "未知区域");
    }

    #[test]
    fn no_active_zone_skips_the_location_check() {
        let mut inactive = zones();
        inactive[0].is_active = false;
        let mut r = reading(72, 120);
        r.latitude = 30.5;
        let a = assess(&r, &ThresholdConfig::default(), None, &inactive).unwrap();
        assert!(!a.flags.contains(&MetricFlag::Location));
        assert_eq!(a.severity, Severity::Safe);
    }

    #[test]
    fn profile_less_subject_matches_threshold_only_evaluation() {
        let r = reading(110, 120);
        let a = assess(&r, &ThresholdConfig::default(), None, &zones()).unwrap();
        let report = threshold::evaluate(&r, &ThresholdConfig::default()).unwrap();
        assert_eq!(a.severity, report.severity);
        assert!(!a.used_baseline);
    }

    #[test]
    fn personal_baseline_overrides_raw_thresholds() {
        // Naturally fast heart: 105 bpm is over the generic 100 limit but
        // inside the personal band
        let p = profile(70.0, 110.0, 0.8);
        let a = assess(&reading(105, 120), &ThresholdConfig::default(), Some(&p), &zones()).unwrap();
        assert_eq!(a.severity, Severity::Safe);
        assert!(a.used_baseline);
        assert!(!a.flags.contains(&MetricFlag::HeartRate));
    }

    #[test]
    fn baseline_flags_inside_generic_range() {
        // 95 bpm is fine for the population but far above this subject's band
        let p = profile(52.0, 74.0, 0.8);
        let a = assess(&reading(95, 120), &ThresholdConfig::default(), Some(&p), &zones()).unwrap();
        assert!(a.flags.contains(&MetricFlag::HeartRate));
        // (95 - 74) / 74 = 28.4% > 20% severe deviation
        assert_eq!(a.severity, Severity::Danger);
        assert!(a.message.contains("个人基线"));
    }

    #[test]
    fn low_confidence_profile_is_ignored() {
        let p = profile(70.0, 110.0, 0.1);
        let a = assess(&reading(105, 120), &ThresholdConfig::default(), Some(&p), &zones()).unwrap();
        assert!(!a.used_baseline);
        assert_eq!(a.severity, Severity::Warning);
    }

    #[test]
    fn assessment_is_deterministic() {
        let p = profile(60.0, 95.0, 0.9);
        let r = reading(102, 138);
        let a = assess(&r, &ThresholdConfig::default(), Some(&p), &zones()).unwrap();
        let b = assess(&r, &ThresholdConfig::default(), Some(&p), &zones()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn vital_plus_location_escalates_to_danger() {
        let mut r = reading(110, 120);
        r.latitude = 30.2900;
        r.longitude = 120.1800;
        let a = assess(&r, &ThresholdConfig::default(), None, &zones()).unwrap();
        assert_eq!(a.severity, Severity::Danger);
        assert!(a.flags.contains(&MetricFlag::HeartRate));
        assert!(a.flags.contains(&MetricFlag::Location));
        // Vital message leads, location follows
        assert!(a.message.starts_with("心率"));
    }
}
