//! Geographic helpers: haversine distance and safe-zone lookup.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::record::SubjectId;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A named circle the subject is expected to stay within.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeZone {
    pub id: i64,
    pub subject_id: SubjectId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub is_active: bool,
}

/// Seeded zones for a subject that has not configured any yet.
/// (name, lat, lng, radius in meters)
pub static DEFAULT_ZONES: Lazy<Vec<(&'static str, f64, f64, f64)>> = Lazy::new(|| {
    vec![
        ("家", 30.2741, 120.1551, 200.0),
        ("幸福社区公园", 30.2761, 120.1581, 300.0),
        ("幸福社区菜市场", 30.2721, 120.1531, 200.0),
        ("社区医院", 30.2701, 120.1601, 200.0),
    ]
});

/// Distance between two coordinates in meters.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (lat1, lng1, lat2, lng2) = (
        lat1.to_radians(),
        lng1.to_radians(),
        lat2.to_radians(),
        lng2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// First active zone containing the point, in listed order.
pub fn locate_zone<'a>(lat: f64, lng: f64, zones: &'a [SafeZone]) -> Option<&'a SafeZone> {
    zones.iter().filter(|z| z.is_active).find(|z| {
        haversine_distance(lat, lng, z.latitude, z.longitude) <= z.radius_m
    })
}

pub fn is_in_safe_zone(lat: f64, lng: f64, zones: &[SafeZone]) -> bool {
    locate_zone(lat, lng, zones).is_some()
}

/// Display name of the current location, "未知区域" when outside every zone.
pub fn location_name(lat: f64, lng: f64, zones: &[SafeZone]) -> String {
    locate_zone(lat, lng, zones)
        .map(|z| z.name.clone())
        .unwrap_or_else(|| "未知区域".to_string())
}
