//! Baseline Module - Personal Baseline Engine
//!
//! Learns a subject's normal ranges from their own history and compares
//! live readings against them, replacing the generic clinical thresholds
//! once enough data exists.
//!
//! # Architecture
//! - `types.rs`: `HealthProfile`, `DataQuality`, `BaselineError`
//! - `learn.rs`: pure statistics over one history window
//! - `compare.rs`: current reading vs learned profile
//! - `storage.rs`: `ProfileStore` trait + JSON-file / in-memory impls
//!
//! # Failure Strategy
//! Too little history fails with `InsufficientData`; the orchestrator then
//! degrades to threshold-only evaluation instead of leaving the subject
//! unmonitored. A second learning run for the same subject while one is in
//! flight is rejected with `LearningInProgress`.

pub mod compare;
pub mod learn;
pub mod storage;
pub mod types;
#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::logic::geo::SafeZone;
use crate::logic::record::{SubjectId, VitalReading};
use crate::logic::store::StoreError;

pub use compare::{compare, BaselineComparison, ComparisonStatus, MetricComparison};
pub use storage::{JsonProfileStore, MemoryProfileStore, ProfileStore};
pub use types::{BaselineError, DataQuality, HealthProfile, OutdoorPreference};

/// Historical-record source for learning runs. Implemented by the SQLite
/// record store; tests inject fixed vectors.
pub trait RecordSource: Send + Sync {
    /// Readings for one subject since `since`, oldest first.
    fn history(
        &self,
        subject_id: SubjectId,
        since: DateTime<Utc>,
    ) -> Result<Vec<VitalReading>, StoreError>;
}

/// Learning service: fetches the window, runs the statistics, atomically
/// replaces the stored profile. Single writer per subject.
pub struct BaselineLearner {
    records: Arc<dyn RecordSource>,
    profiles: Arc<dyn ProfileStore>,
    in_flight: Mutex<HashSet<SubjectId>>,
}

impl BaselineLearner {
    pub fn new(records: Arc<dyn RecordSource>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            records,
            profiles,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn profile(&self, subject_id: SubjectId) -> Result<Option<HealthProfile>, BaselineError> {
        self.profiles.get(subject_id)
    }

    /// Run one full learning pass over the last `window_days` of history.
    ///
    /// `home_zone` is the subject's designated home circle when configured;
    /// without one the most frequent location cluster stands in.
    pub fn learn(
        &self,
        subject_id: SubjectId,
        window_days: u32,
        home_zone: Option<&SafeZone>,
    ) -> Result<HealthProfile, BaselineError> {
        let _guard = self.begin(subject_id)?;

        let since = Utc::now() - Duration::days(window_days as i64);
        let readings = self.records.history(subject_id, since)?;

        let profile = learn::build_profile(subject_id, &readings, window_days, home_zone)?;
        self.profiles.replace(&profile)?;

        log::info!(
            "Baseline learning completed for subject {}: {} records, quality {}, confidence {:.2}",
            subject_id,
            profile.records_analyzed,
            profile.data_quality.as_str(),
            profile.confidence_score
        );
        Ok(profile)
    }

    fn begin(&self, subject_id: SubjectId) -> Result<InFlightGuard<'_>, BaselineError> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(subject_id) {
            return Err(BaselineError::LearningInProgress(subject_id));
        }
        Ok(InFlightGuard {
            learner: self,
            subject_id,
        })
    }
}

/// Releases the per-subject learning slot when the run ends, on success or
/// on any early return.
struct InFlightGuard<'a> {
    learner: &'a BaselineLearner,
    subject_id: SubjectId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.learner.in_flight.lock().remove(&self.subject_id);
    }
}
