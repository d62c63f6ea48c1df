//! Reading history persistence.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::logic::baseline::RecordSource;
use crate::logic::record::{SubjectId, VitalReading};

use super::{parse_timestamp, Db, StoreError};

#[derive(Clone)]
pub struct SqliteRecordStore {
    db: Db,
}

impl SqliteRecordStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Persist one reading, returns the row id.
    pub fn insert(&self, reading: &VitalReading) -> Result<i64, StoreError> {
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO health_records
             (subject_id, heart_rate, systolic_bp, diastolic_bp, steps, latitude, longitude, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                reading.subject_id,
                reading.heart_rate,
                reading.systolic_bp,
                reading.diastolic_bp,
                reading.steps,
                reading.latitude,
                reading.longitude,
                reading.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn latest(&self, subject_id: SubjectId) -> Result<Option<VitalReading>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT subject_id, heart_rate, systolic_bp, diastolic_bp, steps, latitude, longitude, timestamp
             FROM health_records WHERE subject_id = ?1
             ORDER BY timestamp DESC LIMIT 1",
        )?;
        let mut rows = stmt.query(params![subject_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(read_row(row)?)),
            None => Ok(None),
        }
    }

    /// Newest first.
    pub fn list(
        &self,
        subject_id: SubjectId,
        limit: usize,
    ) -> Result<Vec<VitalReading>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT subject_id, heart_rate, systolic_bp, diastolic_bp, steps, latitude, longitude, timestamp
             FROM health_records WHERE subject_id = ?1
             ORDER BY timestamp DESC LIMIT ?2",
        )?;
        let mut rows = stmt.query(params![subject_id, limit as i64])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(read_row(row)?);
        }
        Ok(out)
    }

    /// Oldest first, everything at or after `since`.
    pub fn since(
        &self,
        subject_id: SubjectId,
        since: DateTime<Utc>,
    ) -> Result<Vec<VitalReading>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT subject_id, heart_rate, systolic_bp, diastolic_bp, steps, latitude, longitude, timestamp
             FROM health_records WHERE subject_id = ?1 AND timestamp >= ?2
             ORDER BY timestamp ASC",
        )?;
        let mut rows = stmt.query(params![subject_id, since.to_rfc3339()])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(read_row(row)?);
        }
        Ok(out)
    }
}

impl RecordSource for SqliteRecordStore {
    fn history(
        &self,
        subject_id: SubjectId,
        since: DateTime<Utc>,
    ) -> Result<Vec<VitalReading>, StoreError> {
        self.since(subject_id, since)
    }
}

fn read_row(row: &Row<'_>) -> Result<VitalReading, StoreError> {
    let ts: String = row.get(7)?;
    Ok(VitalReading {
        subject_id: row.get(0)?,
        heart_rate: row.get(1)?,
        systolic_bp: row.get(2)?,
        diastolic_bp: row.get(3)?,
        steps: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        timestamp: parse_timestamp(&ts)?,
    })
}
