//! Store Module - SQLite Persistence
//!
//! One shared connection behind a mutex serves the record, alert, zone and
//! settings stores. The engine's pure functions never touch this module;
//! everything here sits at the collaborator boundary.
//!
//! # Architecture
//! - `records.rs`: reading history (implements `RecordSource`)
//! - `alerts.rs`: alert stream (implements `AlertStore`)
//! - `zones.rs`: safe-zone management
//! - `settings.rs`: per-subject threshold configuration

pub mod alerts;
pub mod records;
pub mod settings;
pub mod zones;

pub use alerts::SqliteAlertStore;
pub use records::SqliteRecordStore;
pub use settings::SqliteSettingsStore;
pub use zones::{SqliteZoneStore, ZoneUpdate};

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid: {0}")]
    Invalid(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS health_records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id  INTEGER NOT NULL,
    heart_rate  INTEGER NOT NULL,
    systolic_bp INTEGER NOT NULL,
    diastolic_bp INTEGER NOT NULL,
    steps       INTEGER NOT NULL,
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL,
    timestamp   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_records_subject_ts
    ON health_records(subject_id, timestamp);

CREATE TABLE IF NOT EXISTS alerts (
    id          TEXT PRIMARY KEY,
    subject_id  INTEGER NOT NULL,
    category    TEXT NOT NULL,
    severity    TEXT NOT NULL,
    description TEXT NOT NULL,
    is_read     INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alerts_subject_created
    ON alerts(subject_id, created_at);

CREATE TABLE IF NOT EXISTS safe_zones (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id  INTEGER NOT NULL,
    name        TEXT NOT NULL,
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL,
    radius_m    REAL NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1,
    UNIQUE(subject_id, name)
);

CREATE TABLE IF NOT EXISTS threshold_settings (
    subject_id  INTEGER PRIMARY KEY,
    hr_low      INTEGER NOT NULL,
    hr_high     INTEGER NOT NULL,
    sbp_low     INTEGER NOT NULL,
    sbp_high    INTEGER NOT NULL,
    dbp_low     INTEGER NOT NULL,
    dbp_high    INTEGER NOT NULL,
    updated_at  TEXT NOT NULL
);
"#;

/// Shared SQLite handle. Cheap to clone; all stores for one deployment hold
/// the same connection.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Fresh in-memory database, used by tests and demos.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        log::debug!("Database schema ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}

/// RFC 3339 text is the canonical timestamp encoding in every table.
pub(crate) fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, StoreError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&chrono::Utc))
        .map_err(|e| StoreError::Corrupt(format!("timestamp '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::logic::alerts::{AlertCategory, AlertManager, AlertPolicy, AlertSeverity};
    use crate::logic::baseline::{BaselineLearner, JsonProfileStore};
    use crate::logic::detector::assess;
    use crate::logic::record::VitalReading;
    use crate::logic::threshold::Severity;

    fn reading(hr: i32, sbp: i32, ts: chrono::DateTime<Utc>) -> VitalReading {
        VitalReading {
            subject_id: 1,
            heart_rate: hr,
            systolic_bp: sbp,
            diastolic_bp: 80,
            steps: 3200,
            latitude: 30.2741,
            longitude: 120.1551,
            timestamp: ts,
        }
    }

    /// Full path: ingest -> assess with stored config and zones -> alert.
    #[test]
    fn pipeline_from_reading_to_persisted_alert() {
        let db = Db::open_in_memory().unwrap();
        let records = SqliteRecordStore::new(db.clone());
        let zones = SqliteZoneStore::new(db.clone());
        let settings = SqliteSettingsStore::new(db.clone());
        let alerts = AlertManager::new(
            Arc::new(SqliteAlertStore::new(db.clone())),
            AlertPolicy::default(),
        );

        zones.ensure_seeded(1).unwrap();
        let config = settings.get(1).unwrap();

        let ts = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
        let r = reading(115, 145, ts);
        records.insert(&r).unwrap();

        let assessment = assess(&r, &config, None, &zones.active(1).unwrap()).unwrap();
        assert_eq!(assessment.severity, Severity::Danger);

        let alert = alerts.consider(1, &assessment).unwrap().unwrap();
        assert_eq!(alert.category, AlertCategory::Health);
        assert_eq!(alert.severity, AlertSeverity::High);

        // Re-polling the same state inside the cooldown emits nothing
        assert!(alerts.consider(1, &assessment).unwrap().is_none());
        assert_eq!(alerts.unread_count(1).unwrap(), 1);
    }

    /// Safe reading end to end: no alert row is ever written.
    #[test]
    fn safe_reading_never_creates_an_alert() {
        let db = Db::open_in_memory().unwrap();
        let zones = SqliteZoneStore::new(db.clone());
        let settings = SqliteSettingsStore::new(db.clone());
        let alerts = AlertManager::new(
            Arc::new(SqliteAlertStore::new(db.clone())),
            AlertPolicy::default(),
        );

        zones.ensure_seeded(1).unwrap();
        let ts = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
        let r = reading(72, 120, ts);

        let assessment =
            assess(&r, &settings.get(1).unwrap(), None, &zones.active(1).unwrap()).unwrap();
        assert_eq!(assessment.severity, Severity::Safe);
        assert!(alerts.consider(1, &assessment).unwrap().is_none());
        assert_eq!(alerts.list(1, 10).unwrap().len(), 0);
    }

    /// Learner over SQLite history and a JSON profile store.
    #[test]
    fn learner_reads_sql_history_and_writes_json_profile() {
        let db = Db::open_in_memory().unwrap();
        let records = SqliteRecordStore::new(db);
        let dir = tempfile::tempdir().unwrap();
        let profiles = Arc::new(JsonProfileStore::new(dir.path()));

        let start = Utc::now() - Duration::days(14);
        for d in 0..14 {
            for hour in [8, 13, 19] {
                let ts = start + Duration::days(d) + Duration::hours(hour);
                records.insert(&reading(70 + (d % 6) as i32, 120, ts)).unwrap();
            }
        }

        let learner = BaselineLearner::new(Arc::new(records), profiles.clone());
        let profile = learner.learn(1, 30, None).unwrap();

        assert_eq!(profile.records_analyzed, 42);
        assert!(profile.learned_hr_low < profile.learned_hr_high);
        assert_eq!(learner.profile(1).unwrap().unwrap(), profile);
    }
}
