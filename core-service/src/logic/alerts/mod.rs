//! AlertManager - Emission Policy & Read State
//!
//! Turns actionable risk assessments into persisted alerts, deduplicating
//! repeats of the same anomalous state so polling cannot flood the guardian.
//!
//! # Concurrency
//! The cooldown check and the insert run under a per-subject lock, so two
//! concurrent `consider` calls for one subject cannot both pass the dedup
//! gate.

pub mod types;

pub use types::{Alert, AlertCategory, AlertPolicy, AlertSeverity};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::logic::detector::{MetricFlag, RiskAssessment};
use crate::logic::record::SubjectId;
use crate::logic::store::StoreError;
use crate::logic::threshold::Severity;

/// Alert persistence boundary. Implemented by the SQLite store; tests use
/// the in-memory variant below.
pub trait AlertStore: Send + Sync {
    fn insert(&self, alert: &Alert) -> Result<(), StoreError>;

    /// Whether an unread alert of this category+severity exists at or after
    /// `since`.
    fn has_unread_since(
        &self,
        subject_id: SubjectId,
        category: AlertCategory,
        severity: AlertSeverity,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Newest first.
    fn list(&self, subject_id: SubjectId, limit: usize) -> Result<Vec<Alert>, StoreError>;

    fn unread_count(&self, subject_id: SubjectId) -> Result<u64, StoreError>;

    /// Returns whether the alert exists; marking a read alert is a no-op.
    fn mark_read(&self, alert_id: Uuid) -> Result<bool, StoreError>;

    /// Returns how many alerts were newly marked.
    fn mark_all_read(&self, subject_id: SubjectId) -> Result<u64, StoreError>;
}

pub struct AlertManager {
    store: Arc<dyn AlertStore>,
    policy: AlertPolicy,
    subject_locks: Mutex<HashMap<SubjectId, Arc<Mutex<()>>>>,
}

impl AlertManager {
    pub fn new(store: Arc<dyn AlertStore>, policy: AlertPolicy) -> Self {
        Self {
            store,
            policy,
            subject_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Persist an alert for an actionable assessment, unless an identical
    /// anomalous state was already alerted within the cooldown and is still
    /// unread.
    pub fn consider(
        &self,
        subject_id: SubjectId,
        assessment: &RiskAssessment,
    ) -> Result<Option<Alert>, StoreError> {
        if assessment.severity == Severity::Safe {
            return Ok(None);
        }

        let category = categorize(&assessment.flags);
        let severity = AlertSeverity::from(assessment.severity);

        let lock = self.subject_lock(subject_id);
        let _guard = lock.lock();

        if self.policy.cooldown_secs > 0 {
            let since = Utc::now() - Duration::seconds(self.policy.cooldown_secs);
            if self
                .store
                .has_unread_since(subject_id, category, severity, since)?
            {
                log::debug!(
                    "Alert suppressed for subject {} ({}, {}): cooldown active",
                    subject_id,
                    category.as_str(),
                    severity.as_str()
                );
                return Ok(None);
            }
        }

        let alert = Alert::new(subject_id, category, severity, assessment.message.clone());
        self.store.insert(&alert)?;
        log::info!(
            "Alert {} created for subject {} ({}, {})",
            alert.id,
            subject_id,
            category.as_str(),
            severity.as_str()
        );
        Ok(Some(alert))
    }

    pub fn list(&self, subject_id: SubjectId, limit: usize) -> Result<Vec<Alert>, StoreError> {
        self.store.list(subject_id, limit)
    }

    pub fn unread_count(&self, subject_id: SubjectId) -> Result<u64, StoreError> {
        self.store.unread_count(subject_id)
    }

    pub fn mark_read(&self, alert_id: Uuid) -> Result<bool, StoreError> {
        self.store.mark_read(alert_id)
    }

    pub fn mark_all_read(&self, subject_id: SubjectId) -> Result<u64, StoreError> {
        self.store.mark_all_read(subject_id)
    }

    fn subject_lock(&self, subject_id: SubjectId) -> Arc<Mutex<()>> {
        self.subject_locks
            .lock()
            .entry(subject_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Pure vital anomalies are health alerts, pure wandering is a location
/// alert, anything mixed (or activity-driven) is the generic detection
/// category.
fn categorize(flags: &[MetricFlag]) -> AlertCategory {
    let vital = flags
        .iter()
        .any(|f| matches!(f, MetricFlag::HeartRate | MetricFlag::BloodPressure));
    let location = flags.contains(&MetricFlag::Location);
    let activity = flags.contains(&MetricFlag::Activity);

    match (vital, location, activity) {
        (true, false, false) => AlertCategory::Health,
        (false, true, false) => AlertCategory::Location,
        _ => AlertCategory::AnomalyDetection,
    }
}

// ============================================================================
// IN-MEMORY STORE (tests, embedded use)
// ============================================================================

#[derive(Default)]
pub struct MemoryAlertStore {
    alerts: parking_lot::RwLock<Vec<Alert>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertStore for MemoryAlertStore {
    fn insert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.alerts.write().push(alert.clone());
        Ok(())
    }

    fn has_unread_since(
        &self,
        subject_id: SubjectId,
        category: AlertCategory,
        severity: AlertSeverity,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(self.alerts.read().iter().any(|a| {
            a.subject_id == subject_id
                && a.category == category
                && a.severity == severity
                && !a.is_read
                && a.created_at >= since
        }))
    }

    fn list(&self, subject_id: SubjectId, limit: usize) -> Result<Vec<Alert>, StoreError> {
        let mut out: Vec<Alert> = self
            .alerts
            .read()
            .iter()
            .filter(|a| a.subject_id == subject_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(limit);
        Ok(out)
    }

    fn unread_count(&self, subject_id: SubjectId) -> Result<u64, StoreError> {
        Ok(self
            .alerts
            .read()
            .iter()
            .filter(|a| a.subject_id == subject_id && !a.is_read)
            .count() as u64)
    }

    fn mark_read(&self, alert_id: Uuid) -> Result<bool, StoreError> {
        let mut alerts = self.alerts.write();
        match alerts.iter_mut().find(|a| a.id == alert_id) {
            Some(a) => {
                a.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn mark_all_read(&self, subject_id: SubjectId) -> Result<u64, StoreError> {
        let mut changed = 0;
        for a in self.alerts.write().iter_mut() {
            if a.subject_id == subject_id && !a.is_read {
                a.is_read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
