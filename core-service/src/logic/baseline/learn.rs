//! Baseline statistics over one subject's history window.
//!
//! Everything in this file is a pure function of the record slice: no clock,
//! no I/O. Repeating a learning run on identical history yields an identical
//! profile.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Timelike};

use crate::constants::MIN_BASELINE_SAMPLES;
use crate::logic::geo::{haversine_distance, SafeZone};
use crate::logic::record::{SubjectId, VitalReading};

use super::types::{BaselineError, DataQuality, HealthProfile, OutdoorPreference};

/// Standard deviations around the mean that define the learned HR band.
/// Inferred from clinical practice; tunable, not a contract.
pub const STD_MULTIPLIER: f64 = 2.0;

/// Physiological clamp for the learned HR band, protects against noisy data
pub const HR_CLAMP_LOW: f64 = 40.0;
pub const HR_CLAMP_HIGH: f64 = 160.0;

/// Minimum half-width of the learned band, protects against flat data
const MIN_HR_BAND_HALF_WIDTH: f64 = 5.0;

/// Radius used when the home cluster is derived instead of configured
const DERIVED_HOME_RADIUS_M: f64 = 200.0;

/// Target sample density for full confidence (samples per window day)
const TARGET_SAMPLES_PER_DAY: f64 = 3.0;

/// Build a profile from the history window.
///
/// `home_zone` is the subject's designated home circle when one is
/// configured; otherwise the most frequent location cluster stands in.
pub fn build_profile(
    subject_id: SubjectId,
    readings: &[VitalReading],
    window_days: u32,
    home_zone: Option<&SafeZone>,
) -> Result<HealthProfile, BaselineError> {
    if readings.len() < MIN_BASELINE_SAMPLES {
        return Err(BaselineError::InsufficientData {
            have: readings.len(),
            need: MIN_BASELINE_SAMPLES,
        });
    }

    let heart_rates: Vec<f64> = readings.iter().map(|r| r.heart_rate as f64).collect();
    let systolics: Vec<f64> = readings.iter().map(|r| r.systolic_bp as f64).collect();
    let diastolics: Vec<f64> = readings.iter().map(|r| r.diastolic_bp as f64).collect();

    let hr_mean = mean(&heart_rates);
    let hr_std = stddev(&heart_rates, hr_mean, 10.0);
    let systolic_mean = mean(&systolics);
    let systolic_std = stddev(&systolics, systolic_mean, 10.0);
    let diastolic_mean = mean(&diastolics);

    let (learned_hr_low, learned_hr_high) = learned_band(hr_mean, hr_std);
    let resting_hr = lowest_decile_mean(&heart_rates);

    // Group by calendar day for step and wake/sleep statistics
    let by_day = group_by_day(readings);
    let days_with_data = by_day.len();

    let daily_max_steps: Vec<f64> = by_day
        .values()
        .map(|day| day.iter().map(|r| r.steps).max().unwrap_or(0) as f64)
        .collect();
    let steps_mean = mean(&daily_max_steps);
    let steps_std = stddev(&daily_max_steps, steps_mean, 1500.0);

    let (wake_time, sleep_time) = infer_wake_sleep(&by_day);

    let (home_lat, home_lng, home_radius) = match home_zone {
        Some(z) => (z.latitude, z.longitude, z.radius_m),
        None => derived_home_cluster(readings),
    };
    let in_home = |r: &VitalReading| {
        haversine_distance(r.latitude, r.longitude, home_lat, home_lng) <= home_radius
    };
    let home_count = readings.iter().filter(|&r| in_home(r)).count();
    let home_stay_ratio = home_count as f64 / readings.len() as f64;
    let outdoor_preference = outdoor_bucket(readings, &in_home);

    let data_quality = assess_quality(readings.len(), days_with_data);
    let confidence_score = (readings.len() as f64
        / (TARGET_SAMPLES_PER_DAY * window_days as f64))
        .min(1.0);

    let (risk_factors, personalized_advice) =
        derive_guidance(hr_mean, systolic_mean, steps_mean, home_stay_ratio);

    let health_summary = format!(
        "心率基线{:.0}-{:.0}bpm，日均步数约{:.0}步，居家时间占比{:.0}%",
        learned_hr_low,
        learned_hr_high,
        steps_mean,
        home_stay_ratio * 100.0
    );

    let learned_at = readings
        .iter()
        .map(|r| r.timestamp)
        .max()
        .expect("non-empty window");

    Ok(HealthProfile {
        subject_id,
        learned_hr_low,
        learned_hr_high,
        learned_hr_mean: round1(hr_mean),
        learned_hr_std: round1(hr_std),
        resting_hr: round1(resting_hr),
        learned_systolic_mean: round1(systolic_mean),
        learned_systolic_std: round1(systolic_std),
        learned_diastolic_mean: round1(diastolic_mean),
        wake_time,
        sleep_time,
        daily_steps_mean: steps_mean.round() as i64,
        daily_steps_std: steps_std.round() as i64,
        home_stay_ratio: round2(home_stay_ratio),
        outdoor_preference,
        health_summary,
        risk_factors,
        personalized_advice,
        confidence_score: round2(confidence_score),
        data_quality,
        learning_days: window_days,
        records_analyzed: readings.len(),
        learned_at,
    })
}

/// mean ± STD_MULTIPLIER·σ, widened to a minimum band and clamped to
/// physiologically plausible bounds.
fn learned_band(hr_mean: f64, hr_std: f64) -> (f64, f64) {
    let low = (hr_mean - STD_MULTIPLIER * hr_std).min(hr_mean - MIN_HR_BAND_HALF_WIDTH);
    let high = (hr_mean + STD_MULTIPLIER * hr_std).max(hr_mean + MIN_HR_BAND_HALF_WIDTH);
    (
        round1(low.clamp(HR_CLAMP_LOW, HR_CLAMP_HIGH)),
        round1(high.clamp(HR_CLAMP_LOW, HR_CLAMP_HIGH)),
    )
}

fn group_by_day(readings: &[VitalReading]) -> BTreeMap<NaiveDate, Vec<&VitalReading>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&VitalReading>> = BTreeMap::new();
    for r in readings {
        by_day.entry(r.timestamp.date_naive()).or_default().push(r);
    }
    by_day
}

/// Wake = median first active hour, sleep = median last active hour.
/// A sample counts as active when its cumulative step count is non-zero.
fn infer_wake_sleep(by_day: &BTreeMap<NaiveDate, Vec<&VitalReading>>) -> (String, String) {
    let mut first_hours: Vec<u32> = Vec::new();
    let mut last_hours: Vec<u32> = Vec::new();

    for day in by_day.values() {
        let active_hours: Vec<u32> = day
            .iter()
            .filter(|r| r.steps > 0)
            .map(|r| r.timestamp.hour())
            .collect();
        if let Some(&first) = active_hours.iter().min() {
            first_hours.push(first);
        }
        if let Some(&last) = active_hours.iter().max() {
            last_hours.push(last);
        }
    }

    let wake = median(&mut first_hours).map(|h| format!("{:02}:00", h));
    let sleep = median(&mut last_hours).map(|h| format!("{:02}:00", h));
    (
        wake.unwrap_or_else(|| "06:30".to_string()),
        sleep.unwrap_or_else(|| "21:30".to_string()),
    )
}

/// Most frequent location cell (3-decimal grid, ~110 m) as the home stand-in.
fn derived_home_cluster(readings: &[VitalReading]) -> (f64, f64, f64) {
    let mut cells: BTreeMap<(i64, i64), usize> = BTreeMap::new();
    for r in readings {
        let key = ((r.latitude * 1000.0).round() as i64, (r.longitude * 1000.0).round() as i64);
        *cells.entry(key).or_insert(0) += 1;
    }
    let (&(lat_key, lng_key), _) = cells
        .iter()
        .max_by_key(|entry| *entry.1)
        .expect("non-empty window");
    (
        lat_key as f64 / 1000.0,
        lng_key as f64 / 1000.0,
        DERIVED_HOME_RADIUS_M,
    )
}

fn outdoor_bucket<F>(readings: &[VitalReading], in_home: &F) -> OutdoorPreference
where
    F: Fn(&VitalReading) -> bool,
{
    let mut counts = [0usize; 3]; // morning, afternoon, evening
    for r in readings.iter().filter(|&r| !in_home(r)) {
        match r.timestamp.hour() {
            5..=11 => counts[0] += 1,
            12..=17 => counts[1] += 1,
            _ => counts[2] += 1,
        }
    }
    // Ties resolve to the earliest bucket
    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }
    match best {
        0 => OutdoorPreference::Morning,
        1 => OutdoorPreference::Afternoon,
        _ => OutdoorPreference::Evening,
    }
}

fn assess_quality(total_records: usize, days_with_data: usize) -> DataQuality {
    let per_day = if days_with_data > 0 {
        total_records as f64 / days_with_data as f64
    } else {
        0.0
    };
    if days_with_data >= 25 && per_day >= 3.0 {
        DataQuality::Excellent
    } else if days_with_data >= 15 {
        DataQuality::Good
    } else {
        // The minimum-count gate already passed
        DataQuality::Fair
    }
}

fn derive_guidance(
    hr_mean: f64,
    systolic_mean: f64,
    steps_mean: f64,
    home_stay_ratio: f64,
) -> (Vec<String>, Vec<String>) {
    let mut risks = Vec::new();
    let mut advice = Vec::new();

    if systolic_mean > 135.0 {
        risks.push("血压均值偏高".to_string());
        advice.push("建议低盐饮食并定期复测血压".to_string());
    }
    if hr_mean > 85.0 {
        risks.push("整体心率偏快".to_string());
        advice.push("避免剧烈情绪波动，必要时咨询医生".to_string());
    }
    if steps_mean < 3000.0 {
        risks.push("日常活动量偏少".to_string());
        advice.push("建议每天安排30分钟左右的散步".to_string());
    }
    if home_stay_ratio > 0.9 {
        risks.push("外出频率较低".to_string());
    }
    if advice.is_empty() {
        advice.push("保持现有作息，定期复查即可".to_string());
    }

    (risks, advice)
}

// ============================================================================
// SMALL STATISTICS HELPERS
// ============================================================================

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation, `fallback` when fewer than two values.
fn stddev(values: &[f64], mean: f64, fallback: f64) -> f64 {
    if values.len() < 2 {
        return fallback;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

fn lowest_decile_mean(heart_rates: &[f64]) -> f64 {
    let mut sorted = heart_rates.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let take = (sorted.len() / 10).max(1);
    mean(&sorted[..take])
}

fn median(values: &mut Vec<u32>) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    Some(values[values.len() / 2])
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
