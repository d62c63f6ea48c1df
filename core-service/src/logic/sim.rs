//! Simulation injector for demos and tests.
//!
//! Generates one abnormal reading (racing heart, elevated BP, outside every
//! default zone) or one normal at-home reading. Readings go through the same
//! ingest path as device data.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::record::{SubjectId, VitalReading};

// Coordinates well outside the default neighborhood zones
const AWAY_LAT: f64 = 30.2900;
const AWAY_LNG: f64 = 120.1800;

// Home center from the default zone table
const HOME_LAT: f64 = 30.2741;
const HOME_LNG: f64 = 120.1551;

/// High heart rate, high blood pressure, outside all safe zones.
pub fn anomalous_reading(subject_id: SubjectId, now: DateTime<Utc>) -> VitalReading {
    let mut rng = rand::thread_rng();
    VitalReading {
        subject_id,
        heart_rate: rng.gen_range(110..=130),
        systolic_bp: rng.gen_range(145..=160),
        diastolic_bp: rng.gen_range(90..=100),
        steps: rng.gen_range(7000..=9000),
        latitude: AWAY_LAT,
        longitude: AWAY_LNG,
        timestamp: now,
    }
}

/// Calm vitals at home, used to end a simulation.
pub fn normal_reading(subject_id: SubjectId, now: DateTime<Utc>) -> VitalReading {
    let mut rng = rand::thread_rng();
    VitalReading {
        subject_id,
        heart_rate: rng.gen_range(65..=80),
        systolic_bp: rng.gen_range(110..=130),
        diastolic_bp: rng.gen_range(70..=85),
        steps: rng.gen_range(2000..=6000),
        latitude: HOME_LAT + rng.gen_range(-0.0005..=0.0005),
        longitude: HOME_LNG + rng.gen_range(-0.0005..=0.0005),
        timestamp: now,
    }
}
