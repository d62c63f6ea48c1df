//! Profile persistence.
//!
//! The engine never holds profiles as ambient state; callers inject a
//! `ProfileStore`. The JSON-file store is the production default, the
//! in-memory store backs tests and embedded use.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::constants::get_data_dir;
use crate::logic::record::SubjectId;

use super::types::{BaselineError, HealthProfile};

pub trait ProfileStore: Send + Sync {
    /// `None` is the normal state for a subject that has never been learned.
    fn get(&self, subject_id: SubjectId) -> Result<Option<HealthProfile>, BaselineError>;

    /// Replace the subject's profile wholesale.
    fn replace(&self, profile: &HealthProfile) -> Result<(), BaselineError>;

    fn remove(&self, subject_id: SubjectId) -> Result<(), BaselineError>;
}

// ============================================================================
// JSON FILE STORE
// ============================================================================

/// One JSON file per subject under the data directory.
pub struct JsonProfileStore {
    dir: PathBuf,
}

impl JsonProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        get_data_dir().join("profiles")
    }

    fn path_for(&self, subject_id: SubjectId) -> PathBuf {
        self.dir.join(format!("profile_{}.json", subject_id))
    }
}

impl Default for JsonProfileStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl ProfileStore for JsonProfileStore {
    fn get(&self, subject_id: SubjectId) -> Result<Option<HealthProfile>, BaselineError> {
        let path = self.path_for(subject_id);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path)?;
        let profile = serde_json::from_slice(&data)?;
        Ok(Some(profile))
    }

    fn replace(&self, profile: &HealthProfile) -> Result<(), BaselineError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(profile.subject_id);
        let json = serde_json::to_vec_pretty(profile)?;

        // Write-then-rename so readers never observe a half-written profile
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, subject_id: SubjectId) -> Result<(), BaselineError> {
        let path = self.path_for(subject_id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<SubjectId, HealthProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, subject_id: SubjectId) -> Result<Option<HealthProfile>, BaselineError> {
        Ok(self.profiles.read().get(&subject_id).cloned())
    }

    fn replace(&self, profile: &HealthProfile) -> Result<(), BaselineError> {
        self.profiles
            .write()
            .insert(profile.subject_id, profile.clone());
        Ok(())
    }

    fn remove(&self, subject_id: SubjectId) -> Result<(), BaselineError> {
        self.profiles.write().remove(&subject_id);
        Ok(())
    }
}
