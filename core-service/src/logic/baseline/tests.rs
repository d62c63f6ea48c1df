use std::sync::mpsc;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::logic::baseline::learn::build_profile;
use crate::logic::baseline::storage::{JsonProfileStore, MemoryProfileStore, ProfileStore};
use crate::logic::baseline::types::{BaselineError, DataQuality};
use crate::logic::baseline::{BaselineLearner, RecordSource};
use crate::logic::geo::SafeZone;
use crate::logic::record::{SubjectId, VitalReading};
use crate::logic::store::StoreError;

const HOME: (f64, f64) = (30.2741, 120.1551);
const PARK: (f64, f64) = (30.2761, 120.1581);

fn reading_at(ts: DateTime<Utc>, hr: i32, steps: i32, at: (f64, f64)) -> VitalReading {
    VitalReading {
        subject_id: 1,
        heart_rate: hr,
        systolic_bp: 120,
        diastolic_bp: 78,
        steps,
        latitude: at.0,
        longitude: at.1,
        timestamp: ts,
    }
}

fn home_zone() -> SafeZone {
    SafeZone {
        id: 1,
        subject_id: 1,
        name: "家".to_string(),
        latitude: HOME.0,
        longitude: HOME.1,
        radius_m: 200.0,
        is_active: true,
    }
}

/// `days` calendar days, `per_day` samples spread between 07:00 and 19:00.
fn history(days: u32, per_day: u32) -> Vec<VitalReading> {
    let start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    let mut out = Vec::new();
    for d in 0..days {
        for s in 0..per_day {
            let hour = 7 + (s * 12 / per_day.max(1)) % 13;
            let ts = start + Duration::days(d as i64) + Duration::hours(hour as i64);
            let hr = 68 + ((d + s) % 9) as i32;
            let steps = (s + 1) as i32 * 1500;
            let at = if s % 3 == 1 { PARK } else { HOME };
            out.push(reading_at(ts, hr, steps, at));
        }
    }
    out
}

#[test]
fn too_few_records_fails_with_count() {
    let readings = history(3, 2); // 6 records
    let err = build_profile(1, &readings, 30, Some(&home_zone())).unwrap_err();
    match err {
        BaselineError::InsufficientData { have, need } => {
            assert_eq!(have, 6);
            assert_eq!(need, 10);
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn ten_records_succeed_without_excellent_quality() {
    let readings = history(5, 2); // exactly 10
    let profile = build_profile(1, &readings, 30, Some(&home_zone())).unwrap();
    assert_eq!(profile.records_analyzed, 10);
    assert_ne!(profile.data_quality, DataQuality::Excellent);
}

#[test]
fn learning_is_deterministic() {
    let readings = history(20, 4);
    let a = build_profile(1, &readings, 30, Some(&home_zone())).unwrap();
    let b = build_profile(1, &readings, 30, Some(&home_zone())).unwrap();
    assert_eq!(a, b);
}

#[test]
fn learned_band_brackets_the_mean() {
    let readings = history(20, 4);
    let profile = build_profile(1, &readings, 30, Some(&home_zone())).unwrap();
    assert!(profile.learned_hr_low < profile.learned_hr_mean);
    assert!(profile.learned_hr_high > profile.learned_hr_mean);
    assert!(profile.resting_hr <= profile.learned_hr_mean);
}

#[test]
fn learned_band_is_clamped_on_noisy_data() {
    let start = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
    // Wild swings: σ is enormous, the band must stay physiological
    let readings: Vec<VitalReading> = (0..20)
        .map(|i| {
            let hr = if i % 2 == 0 { 35 } else { 180 };
            reading_at(start + Duration::hours(i), hr, 1000, HOME)
        })
        .collect();
    let profile = build_profile(1, &readings, 30, Some(&home_zone())).unwrap();
    assert!(profile.learned_hr_low >= 40.0);
    assert!(profile.learned_hr_high <= 160.0);
}

#[test]
fn dense_month_reaches_excellent_quality() {
    let readings = history(28, 4);
    let profile = build_profile(1, &readings, 30, Some(&home_zone())).unwrap();
    assert_eq!(profile.data_quality, DataQuality::Excellent);
    assert!(profile.confidence_score > 0.9);
}

#[test]
fn home_stay_ratio_counts_zone_membership() {
    let readings = history(15, 3); // one of every three samples at the park
    let profile = build_profile(1, &readings, 30, Some(&home_zone())).unwrap();
    assert!(profile.home_stay_ratio > 0.5 && profile.home_stay_ratio < 0.8,
        "got {}", profile.home_stay_ratio);
}

#[test]
fn home_cluster_is_derived_without_a_zone() {
    let readings = history(15, 3);
    let profile = build_profile(1, &readings, 30, None).unwrap();
    // Most samples sit at HOME, so the derived cluster behaves like it
    assert!(profile.home_stay_ratio > 0.5);
}

#[test]
fn wake_and_sleep_come_from_active_hours() {
    let start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    let mut readings = Vec::new();
    for d in 0..10 {
        let day = start + Duration::days(d);
        readings.push(reading_at(day + Duration::hours(7), 70, 500, HOME));
        readings.push(reading_at(day + Duration::hours(12), 74, 3000, PARK));
        readings.push(reading_at(day + Duration::hours(20), 68, 5200, HOME));
    }
    let profile = build_profile(1, &readings, 30, Some(&home_zone())).unwrap();
    assert_eq!(profile.wake_time, "07:00");
    assert_eq!(profile.sleep_time, "20:00");
}

// ============================================================================
// STORE + LEARNER SERVICE
// ============================================================================

#[test]
fn json_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonProfileStore::new(dir.path());

    assert!(store.get(1).unwrap().is_none());

    let readings = history(15, 3);
    let profile = build_profile(1, &readings, 30, Some(&home_zone())).unwrap();
    store.replace(&profile).unwrap();

    let loaded = store.get(1).unwrap().unwrap();
    assert_eq!(loaded, profile);

    store.remove(1).unwrap();
    assert!(store.get(1).unwrap().is_none());
}

struct FixedRecords(Vec<VitalReading>);

impl RecordSource for FixedRecords {
    fn history(
        &self,
        _subject_id: SubjectId,
        _since: DateTime<Utc>,
    ) -> Result<Vec<VitalReading>, StoreError> {
        Ok(self.0.clone())
    }
}

#[test]
fn learn_replaces_the_stored_profile_wholesale() {
    let profiles = Arc::new(MemoryProfileStore::new());
    let learner = BaselineLearner::new(
        Arc::new(FixedRecords(history(15, 3))),
        profiles.clone(),
    );

    let first = learner.learn(1, 30, Some(&home_zone())).unwrap();
    assert_eq!(profiles.get(1).unwrap().unwrap(), first);

    // A new learner over different history overwrites every field
    let learner = BaselineLearner::new(
        Arc::new(FixedRecords(history(28, 4))),
        profiles.clone(),
    );
    let second = learner.learn(1, 30, Some(&home_zone())).unwrap();
    assert_ne!(first.records_analyzed, second.records_analyzed);
    assert_eq!(profiles.get(1).unwrap().unwrap(), second);
}

/// Record source that parks inside `history` until released, to hold a
/// learning run in flight.
struct BlockingRecords {
    started_tx: mpsc::Sender<()>,
    release_rx: parking_lot::Mutex<mpsc::Receiver<()>>,
    data: Vec<VitalReading>,
}

impl RecordSource for BlockingRecords {
    fn history(
        &self,
        _subject_id: SubjectId,
        _since: DateTime<Utc>,
    ) -> Result<Vec<VitalReading>, StoreError> {
        self.started_tx.send(()).unwrap();
        self.release_rx.lock().recv().unwrap();
        Ok(self.data.clone())
    }
}

#[test]
fn concurrent_learning_for_one_subject_is_rejected() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();

    let learner = Arc::new(BaselineLearner::new(
        Arc::new(BlockingRecords {
            started_tx,
            release_rx: parking_lot::Mutex::new(release_rx),
            data: history(15, 3),
        }),
        Arc::new(MemoryProfileStore::new()),
    ));

    let background = {
        let learner = learner.clone();
        std::thread::spawn(move || learner.learn(1, 30, None))
    };

    // Wait until the first run is inside its window fetch
    started_rx.recv().unwrap();

    match learner.learn(1, 30, None) {
        Err(BaselineError::LearningInProgress(1)) => {}
        other => panic!("expected LearningInProgress, got {:?}", other.map(|_| ())),
    }

    release_tx.send(()).unwrap();
    background.join().unwrap().unwrap();
}
