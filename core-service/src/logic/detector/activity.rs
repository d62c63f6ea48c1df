//! Time-of-day activity pattern check.
//!
//! Coarse expectations for an elderly daily rhythm: rest at night, moderate
//! exercise in the morning, low activity over the noon rest.

use crate::logic::threshold::Severity;

/// Steps observed during night hours that count as unexpected activity
const NIGHT_STEPS_THRESHOLD: i32 = 100;
const NIGHT_HR_THRESHOLD: i32 = 85;
const MORNING_EXERCISE_HR_MAX: i32 = 120;
const NOON_REST_HR_MAX: i32 = 100;
const NOON_REST_STEPS_MAX: i32 = 500;

#[derive(Debug, Clone)]
pub struct ActivityCheck {
    /// Display label for the current time block
    pub label: &'static str,
    pub severity: Severity,
    pub message: Option<String>,
}

impl ActivityCheck {
    fn normal(label: &'static str) -> Self {
        Self {
            label,
            severity: Severity::Safe,
            message: None,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        self.severity > Severity::Safe
    }
}

/// Check the reading against the expected pattern for its hour of day.
/// `steps` is the cumulative daily count, so the step condition only applies
/// after midnight when the counter has reset; late-evening hours rely on
/// heart rate alone.
pub fn check_activity(hour: u32, heart_rate: i32, steps: i32) -> ActivityCheck {
    // Night (22:00 - 06:00): should be resting
    if hour >= 22 || hour < 6 {
        let walking_after_reset = hour < 6 && steps > NIGHT_STEPS_THRESHOLD;
        if heart_rate > NIGHT_HR_THRESHOLD || walking_after_reset {
            return ActivityCheck {
                label: "夜间异常活动",
                severity: Severity::Warning,
                message: Some("夜间检测到异常活动，可能是失眠或其他情况".to_string()),
            };
        }
        return ActivityCheck::normal("夜间休息");
    }

    // Morning exercise (07:00 - 09:00): moderate activity expected
    if (7..=9).contains(&hour) {
        if heart_rate > MORNING_EXERCISE_HR_MAX {
            return ActivityCheck {
                label: "晨练时间",
                severity: Severity::Warning,
                message: Some("晨练期间心率过高，建议适当休息".to_string()),
            };
        }
        return ActivityCheck::normal("晨练时间");
    }

    // Noon rest (12:00 - 14:00): low activity expected
    if (12..=14).contains(&hour) {
        if heart_rate > NOON_REST_HR_MAX && steps > NOON_REST_STEPS_MAX {
            return ActivityCheck {
                label: "午休时间",
                severity: Severity::Warning,
                message: Some("午休时段检测到较高活动量".to_string()),
            };
        }
        return ActivityCheck::normal("午休时间");
    }

    ActivityCheck::normal("正常活动")
}
