//! Request handlers
//!
//! Thin extract-call-engine-respond layers. Severity and flags always come
//! from the engine; nothing here recomputes them.

pub mod alerts;
pub mod baseline;
pub mod health;
pub mod records;
pub mod settings;
pub mod simulation;
pub mod zones;

use guardian_core::{SafeZone, SubjectId};

use crate::{AppResult, AppState};

/// Active zones for assessment, seeding the defaults for new subjects.
pub(crate) fn active_zones(state: &AppState, subject_id: SubjectId) -> AppResult<Vec<SafeZone>> {
    state.zones.ensure_seeded(subject_id)?;
    Ok(state.zones.active(subject_id)?)
}

/// The subject's home circle: the zone named "家", or the first configured
/// zone as a fallback.
pub(crate) fn home_zone(state: &AppState, subject_id: SubjectId) -> AppResult<Option<SafeZone>> {
    let zones = state.zones.ensure_seeded(subject_id)?;
    Ok(zones
        .iter()
        .find(|z| z.name == "家")
        .or_else(|| zones.first())
        .cloned())
}
