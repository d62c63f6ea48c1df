//! Guardian-facing realtime status view.
//!
//! Folds the latest reading and its assessment into the payload the frontend
//! renders. Display layers read `status` and `risk_level` as-is; severity is
//! never recomputed here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::detector::RiskAssessment;
use super::record::VitalReading;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub status: String,
    pub heart_rate: i32,
    pub blood_pressure: String,
    pub step_count: i32,
    pub location: String,
    pub activity: String,
    pub risk_level: String,
    pub battery: i32,
    pub last_update: String,
    pub message: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Build the view for one assessed reading. `now` is injected so the age
/// label is testable.
pub fn build_status(
    reading: &VitalReading,
    assessment: &RiskAssessment,
    battery: i32,
    now: DateTime<Utc>,
) -> StatusView {
    StatusView {
        status: assessment.severity.as_str().to_string(),
        heart_rate: reading.heart_rate,
        blood_pressure: format!("{}/{}", reading.systolic_bp, reading.diastolic_bp),
        step_count: reading.steps,
        location: assessment.location_name.clone(),
        activity: assessment.activity_label.to_string(),
        risk_level: assessment.severity.risk_label().to_string(),
        battery,
        last_update: age_label(reading.timestamp, now),
        message: assessment.message.clone(),
        latitude: Some(reading.latitude),
        longitude: Some(reading.longitude),
    }
}

/// Placeholder before the first reading arrives.
pub fn placeholder_status(battery: i32) -> StatusView {
    StatusView {
        status: "safe".to_string(),
        heart_rate: 72,
        blood_pressure: "120/80".to_string(),
        step_count: 0,
        location: "家".to_string(),
        activity: "休息".to_string(),
        risk_level: "低".to_string(),
        battery,
        last_update: "刚刚".to_string(),
        message: "正在初始化监护系统...".to_string(),
        latitude: None,
        longitude: None,
    }
}

fn age_label(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    if secs < 60 {
        "刚刚".to_string()
    } else if secs < 3600 {
        format!("{}分钟前", secs / 60)
    } else {
        format!("{}小时前", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::detector::assess;
    use crate::logic::threshold::ThresholdConfig;
    use chrono::{Duration, TimeZone};

    #[test]
    fn view_mirrors_the_assessment() {
        let reading = VitalReading {
            subject_id: 1,
            heart_rate: 72,
            systolic_bp: 120,
            diastolic_bp: 80,
            steps: 3000,
            latitude: 30.2741,
            longitude: 120.1551,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap(),
        };
        let assessment = assess(&reading, &ThresholdConfig::default(), None, &[]).unwrap();
        let view = build_status(
            &reading,
            &assessment,
            85,
            reading.timestamp + Duration::seconds(30),
        );

        assert_eq!(view.status, "safe");
        assert_eq!(view.risk_level, "低");
        assert_eq!(view.blood_pressure, "120/80");
        assert_eq!(view.last_update, "刚刚");
    }

    #[test]
    fn age_labels() {
        let then = Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap();
        assert_eq!(age_label(then, then + Duration::seconds(10)), "刚刚");
        assert_eq!(age_label(then, then + Duration::minutes(5)), "5分钟前");
        assert_eq!(age_label(then, then + Duration::hours(3)), "3小时前");
    }
}
