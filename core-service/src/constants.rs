//! Central Configuration Constants
//!
//! Single source of truth for all engine defaults. To change a default
//! threshold or window, only edit this file.

use std::path::PathBuf;

/// App name
pub const APP_NAME: &str = "Senior Guardian";

// ============================================
// Default clinical thresholds
// ============================================

pub const DEFAULT_HR_LOW: i32 = 50;
pub const DEFAULT_HR_HIGH: i32 = 100;
pub const DEFAULT_SBP_LOW: i32 = 90;
pub const DEFAULT_SBP_HIGH: i32 = 140;
pub const DEFAULT_DBP_LOW: i32 = 60;
pub const DEFAULT_DBP_HIGH: i32 = 90;

// ============================================
// Baseline learning
// ============================================

/// Minimum records required before a learning run succeeds
pub const MIN_BASELINE_SAMPLES: usize = 10;

/// Default history window for a learning run (days)
pub const DEFAULT_LEARNING_WINDOW_DAYS: u32 = 30;

/// Profiles below this confidence fall back to configured thresholds
pub const MIN_PROFILE_CONFIDENCE: f64 = 0.3;

// ============================================
// Alerting
// ============================================

/// Default suppression window for repeated alerts of one category (seconds)
pub const DEFAULT_ALERT_COOLDOWN_SECS: i64 = 600;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get alert cooldown from environment or use default
pub fn get_alert_cooldown_secs() -> i64 {
    std::env::var("ALERT_COOLDOWN_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ALERT_COOLDOWN_SECS)
}

/// Data directory for the SQLite database and learned profiles
pub fn get_data_dir() -> PathBuf {
    std::env::var("GUARDIAN_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("senior-guardian")
        })
}
