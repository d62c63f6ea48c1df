//! Safe-zone management.

use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::logic::geo::{SafeZone, DEFAULT_ZONES};
use crate::logic::record::SubjectId;

use super::{Db, StoreError};

/// Partial zone update from the API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ZoneUpdate {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_m: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct SqliteZoneStore {
    db: Db,
}

impl SqliteZoneStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn list(&self, subject_id: SubjectId) -> Result<Vec<SafeZone>, StoreError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, subject_id, name, latitude, longitude, radius_m, is_active
             FROM safe_zones WHERE subject_id = ?1 ORDER BY id ASC",
        )?;
        let mut rows = stmt.query(params![subject_id])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(read_row(row)?);
        }
        Ok(out)
    }

    pub fn active(&self, subject_id: SubjectId) -> Result<Vec<SafeZone>, StoreError> {
        Ok(self
            .list(subject_id)?
            .into_iter()
            .filter(|z| z.is_active)
            .collect())
    }

    /// Seed the default neighborhood zones for a subject with none, then
    /// return the full list. Keeps a new subject monitorable out of the box.
    pub fn ensure_seeded(&self, subject_id: SubjectId) -> Result<Vec<SafeZone>, StoreError> {
        if self.list(subject_id)?.is_empty() {
            for &(name, lat, lng, radius) in DEFAULT_ZONES.iter() {
                self.db.conn().execute(
                    "INSERT INTO safe_zones (subject_id, name, latitude, longitude, radius_m, is_active)
                     VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                    params![subject_id, name, lat, lng, radius],
                )?;
            }
            log::info!("Seeded default safe zones for subject {}", subject_id);
        }
        self.list(subject_id)
    }

    pub fn create(
        &self,
        subject_id: SubjectId,
        name: &str,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<SafeZone, StoreError> {
        let conn = self.db.conn();
        let existing: i64 = conn.query_row(
            "SELECT COUNT(*) FROM safe_zones WHERE subject_id = ?1 AND name = ?2",
            params![subject_id, name],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Err(StoreError::Conflict(format!(
                "zone '{}' already exists for subject {}",
                name, subject_id
            )));
        }

        conn.execute(
            "INSERT INTO safe_zones (subject_id, name, latitude, longitude, radius_m, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![subject_id, name, latitude, longitude, radius_m],
        )?;
        let id = conn.last_insert_rowid();
        Ok(SafeZone {
            id,
            subject_id,
            name: name.to_string(),
            latitude,
            longitude,
            radius_m,
            is_active: true,
        })
    }

    pub fn update(
        &self,
        id: i64,
        subject_id: SubjectId,
        update: &ZoneUpdate,
    ) -> Result<Option<SafeZone>, StoreError> {
        let current = match self.get(id, subject_id)? {
            Some(z) => z,
            None => return Ok(None),
        };

        let zone = SafeZone {
            name: update.name.clone().unwrap_or(current.name),
            latitude: update.latitude.unwrap_or(current.latitude),
            longitude: update.longitude.unwrap_or(current.longitude),
            radius_m: update.radius_m.unwrap_or(current.radius_m),
            is_active: update.is_active.unwrap_or(current.is_active),
            ..current
        };
        if zone.radius_m <= 0.0 {
            return Err(StoreError::Invalid("zone radius must be positive".into()));
        }

        self.db.conn().execute(
            "UPDATE safe_zones
             SET name = ?3, latitude = ?4, longitude = ?5, radius_m = ?6, is_active = ?7
             WHERE id = ?1 AND subject_id = ?2",
            params![
                id,
                subject_id,
                zone.name,
                zone.latitude,
                zone.longitude,
                zone.radius_m,
                zone.is_active,
            ],
        )?;
        Ok(Some(zone))
    }

    pub fn delete(&self, id: i64, subject_id: SubjectId) -> Result<bool, StoreError> {
        let changed = self.db.conn().execute(
            "DELETE FROM safe_zones WHERE id = ?1 AND subject_id = ?2",
            params![id, subject_id],
        )?;
        Ok(changed > 0)
    }

    /// Flip the active flag, returns the new state.
    pub fn toggle(&self, id: i64, subject_id: SubjectId) -> Result<Option<bool>, StoreError> {
        let current = match self.get(id, subject_id)? {
            Some(z) => z,
            None => return Ok(None),
        };
        let next = !current.is_active;
        self.db.conn().execute(
            "UPDATE safe_zones SET is_active = ?3 WHERE id = ?1 AND subject_id = ?2",
            params![id, subject_id, next],
        )?;
        Ok(Some(next))
    }

    fn get(&self, id: i64, subject_id: SubjectId) -> Result<Option<SafeZone>, StoreError> {
        let conn = self.db.conn();
        conn.query_row(
            "SELECT id, subject_id, name, latitude, longitude, radius_m, is_active
             FROM safe_zones WHERE id = ?1 AND subject_id = ?2",
            params![id, subject_id],
            |row| {
                Ok(SafeZone {
                    id: row.get(0)?,
                    subject_id: row.get(1)?,
                    name: row.get(2)?,
                    latitude: row.get(3)?,
                    longitude: row.get(4)?,
                    radius_m: row.get(5)?,
                    is_active: row.get(6)?,
                })
            },
        )
        .optional()
        .map_err(StoreError::from)
    }
}

fn read_row(row: &Row<'_>) -> Result<SafeZone, StoreError> {
    Ok(SafeZone {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        name: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        radius_m: row.get(5)?,
        is_active: row.get(6)?,
    })
}
