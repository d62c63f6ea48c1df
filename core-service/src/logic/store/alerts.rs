//! Alert stream persistence.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::logic::alerts::{Alert, AlertCategory, AlertSeverity, AlertStore};
use crate::logic::record::SubjectId;

use super::{parse_timestamp, Db, StoreError};

#[derive(Clone)]
pub struct SqliteAlertStore {
    db: Db,
}

impl SqliteAlertStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

impl AlertStore for SqliteAlertStore {
    fn insert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.db.conn().execute(
            "INSERT INTO alerts (id, subject_id, category, severity, description, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                alert.id.to_string(),
                alert.subject_id,
                alert.category.as_str(),
                alert.severity.as_str(),
                alert.description,
                alert.is_read,
                alert.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn has_unread_since(
        &self,
        subject_id: SubjectId,
        category: AlertCategory,
        severity: AlertSeverity,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let count: i64 = self.db.conn().query_row(
            "SELECT COUNT(*) FROM alerts
             WHERE subject_id = ?1 AND category = ?2 AND severity = ?3
               AND is_read = 0 AND created_at >= ?4",
            params![
                subject_id,
                category.as_str(),
                severity.as_str(),
                since.to_rfc3339()
            ],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn list(&self, subject_id: SubjectId, limit: usize) -> Result<Vec<Alert>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, subject_id, category, severity, description, is_read, created_at
             FROM alerts WHERE subject_id = ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;
        let mut rows = stmt.query(params![subject_id, limit as i64])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(read_row(row)?);
        }
        Ok(out)
    }

    fn unread_count(&self, subject_id: SubjectId) -> Result<u64, StoreError> {
        let count: i64 = self.db.conn().query_row(
            "SELECT COUNT(*) FROM alerts WHERE subject_id = ?1 AND is_read = 0",
            params![subject_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn mark_read(&self, alert_id: Uuid) -> Result<bool, StoreError> {
        let exists: i64 = self.db.conn().query_row(
            "SELECT COUNT(*) FROM alerts WHERE id = ?1",
            params![alert_id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Ok(false);
        }
        self.db.conn().execute(
            "UPDATE alerts SET is_read = 1 WHERE id = ?1",
            params![alert_id.to_string()],
        )?;
        Ok(true)
    }

    fn mark_all_read(&self, subject_id: SubjectId) -> Result<u64, StoreError> {
        let changed = self.db.conn().execute(
            "UPDATE alerts SET is_read = 1 WHERE subject_id = ?1 AND is_read = 0",
            params![subject_id],
        )?;
        Ok(changed as u64)
    }
}

fn read_row(row: &Row<'_>) -> Result<Alert, StoreError> {
    let id: String = row.get(0)?;
    let category: String = row.get(2)?;
    let severity: String = row.get(3)?;
    let created_at: String = row.get(6)?;

    Ok(Alert {
        id: Uuid::parse_str(&id).map_err(|e| StoreError::Corrupt(format!("alert id: {}", e)))?,
        subject_id: row.get(1)?,
        category: AlertCategory::parse(&category)
            .ok_or_else(|| StoreError::Corrupt(format!("alert category '{}'", category)))?,
        severity: AlertSeverity::parse(&severity)
            .ok_or_else(|| StoreError::Corrupt(format!("alert severity '{}'", severity)))?,
        description: row.get(4)?,
        is_read: row.get(5)?,
        created_at: parse_timestamp(&created_at)?,
    })
}
