//! Weekly aggregates for the guardian dashboard charts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_HR_HIGH;

use super::record::VitalReading;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayStat {
    pub date: NaiveDate,
    pub avg_heart_rate: i32,
    pub max_heart_rate: i32,
    /// Highest cumulative step count seen that day
    pub total_steps: i64,
    pub avg_systolic_bp: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub days: Vec<DayStat>,
    pub total_records: usize,
    /// Days where the peak heart rate crossed the generic high threshold
    pub anomaly_days: usize,
}

/// Aggregate a (typically 7-day) record window per calendar day.
pub fn weekly_stats(records: &[VitalReading]) -> WeeklyStats {
    let mut by_day: BTreeMap<NaiveDate, Vec<&VitalReading>> = BTreeMap::new();
    for r in records {
        by_day.entry(r.timestamp.date_naive()).or_default().push(r);
    }

    let days: Vec<DayStat> = by_day
        .iter()
        .map(|(date, samples)| {
            let hr_sum: i64 = samples.iter().map(|r| r.heart_rate as i64).sum();
            let sbp_sum: i64 = samples.iter().map(|r| r.systolic_bp as i64).sum();
            DayStat {
                date: *date,
                avg_heart_rate: (hr_sum / samples.len() as i64) as i32,
                max_heart_rate: samples.iter().map(|r| r.heart_rate).max().unwrap_or(0),
                total_steps: samples.iter().map(|r| r.steps).max().unwrap_or(0) as i64,
                avg_systolic_bp: (sbp_sum / samples.len() as i64) as i32,
            }
        })
        .collect();

    let anomaly_days = days
        .iter()
        .filter(|d| d.max_heart_rate > DEFAULT_HR_HIGH)
        .count();

    WeeklyStats {
        total_records: records.len(),
        anomaly_days,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn reading(day: i64, hour: i64, hr: i32, steps: i32) -> VitalReading {
        VitalReading {
            subject_id: 1,
            heart_rate: hr,
            systolic_bp: 120,
            diastolic_bp: 78,
            steps,
            latitude: 30.2741,
            longitude: 120.1551,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()
                + Duration::days(day)
                + Duration::hours(hour),
        }
    }

    #[test]
    fn empty_window_is_empty() {
        let stats = weekly_stats(&[]);
        assert!(stats.days.is_empty());
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.anomaly_days, 0);
    }

    #[test]
    fn aggregates_per_day() {
        let records = vec![
            reading(0, 8, 70, 1000),
            reading(0, 12, 80, 3000),
            reading(0, 18, 72, 5200),
            reading(1, 9, 112, 800),
        ];
        let stats = weekly_stats(&records);

        assert_eq!(stats.days.len(), 2);
        assert_eq!(stats.total_records, 4);

        let day0 = &stats.days[0];
        assert_eq!(day0.avg_heart_rate, 74);
        assert_eq!(day0.max_heart_rate, 80);
        assert_eq!(day0.total_steps, 5200);

        // Day 1 peaked over the generic threshold
        assert_eq!(stats.anomaly_days, 1);
    }
}
