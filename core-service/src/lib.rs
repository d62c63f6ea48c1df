//! Senior Guardian Core
//!
//! Anomaly-detection and personal-baseline engine for elderly vital-sign
//! monitoring. The crate is invoked as a library by whatever transport layer
//! the deployment chooses; the bundled cloud server is one such caller.
//!
//! # Architecture
//!
//! ```text
//! reading ──> ThresholdEvaluator ──────────┐
//!    │                                     │
//!    └──> BaselineComparator (if profile) ─┼──> AnomalyDetector ──> RiskAssessment
//!                 ▲                        │          │
//!        BaselineLearner (history)         │     AlertManager ──> Alert stream
//!                                          │
//!            safe zones / activity pattern ┘
//! ```
//!
//! The evaluation pipeline is pure: same reading, config, profile and zones
//! always produce the same assessment. State (readings, profiles, alerts,
//! zones, settings) lives behind the store collaborators in `logic::store`
//! and `logic::baseline::storage`.

pub mod constants;
pub mod logic;

pub use logic::alerts::{Alert, AlertCategory, AlertManager, AlertPolicy, AlertSeverity};
pub use logic::baseline::{
    BaselineError, BaselineLearner, HealthProfile, JsonProfileStore, ProfileStore, RecordSource,
};
pub use logic::detector::{assess, MetricFlag, RiskAssessment};
pub use logic::geo::SafeZone;
pub use logic::record::{SubjectId, ValidationError, VitalReading};
pub use logic::store::{
    Db, SqliteAlertStore, SqliteRecordStore, SqliteSettingsStore, SqliteZoneStore, StoreError,
};
pub use logic::threshold::{Severity, ThresholdConfig};
