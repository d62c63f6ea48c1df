//! Per-subject threshold configuration.
//!
//! Every subject always resolves to a valid config: the defaults stand in
//! until a guardian customizes them, and reset restores them.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::logic::record::SubjectId;
use crate::logic::threshold::{ThresholdConfig, ThresholdUpdate};

use super::{Db, StoreError};

#[derive(Clone)]
pub struct SqliteSettingsStore {
    db: Db,
}

impl SqliteSettingsStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Stored config, or the defaults when the subject has none.
    pub fn get(&self, subject_id: SubjectId) -> Result<ThresholdConfig, StoreError> {
        let conn = self.db.conn();
        let stored = conn
            .query_row(
                "SELECT hr_low, hr_high, sbp_low, sbp_high, dbp_low, dbp_high
                 FROM threshold_settings WHERE subject_id = ?1",
                params![subject_id],
                |row| {
                    Ok(ThresholdConfig {
                        hr_low: row.get(0)?,
                        hr_high: row.get(1)?,
                        sbp_low: row.get(2)?,
                        sbp_high: row.get(3)?,
                        dbp_low: row.get(4)?,
                        dbp_high: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(stored.unwrap_or_default())
    }

    /// Apply a partial update on top of the current config. The merged
    /// result must keep low < high for every pair.
    pub fn update(
        &self,
        subject_id: SubjectId,
        update: &ThresholdUpdate,
    ) -> Result<ThresholdConfig, StoreError> {
        let merged = self.get(subject_id)?.merged(update);
        merged
            .validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        self.db.conn().execute(
            "INSERT INTO threshold_settings
             (subject_id, hr_low, hr_high, sbp_low, sbp_high, dbp_low, dbp_high, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(subject_id) DO UPDATE SET
                hr_low = excluded.hr_low,
                hr_high = excluded.hr_high,
                sbp_low = excluded.sbp_low,
                sbp_high = excluded.sbp_high,
                dbp_low = excluded.dbp_low,
                dbp_high = excluded.dbp_high,
                updated_at = excluded.updated_at",
            params![
                subject_id,
                merged.hr_low,
                merged.hr_high,
                merged.sbp_low,
                merged.sbp_high,
                merged.dbp_low,
                merged.dbp_high,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(merged)
    }

    /// Drop any customization, falling back to the defaults.
    pub fn reset(&self, subject_id: SubjectId) -> Result<ThresholdConfig, StoreError> {
        self.db.conn().execute(
            "DELETE FROM threshold_settings WHERE subject_id = ?1",
            params![subject_id],
        )?;
        Ok(ThresholdConfig::default())
    }
}
