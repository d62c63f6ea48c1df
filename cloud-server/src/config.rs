//! Configuration module

use std::env;
use std::path::PathBuf;

use guardian_core::constants;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Directory holding learned profile JSON files
    pub profile_dir: PathBuf,

    /// Suppression window for repeated alerts (seconds)
    pub alert_cooldown_secs: i64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let data_dir = constants::get_data_dir();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            db_path: env::var("GUARDIAN_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("guardian.db")),

            profile_dir: env::var("GUARDIAN_PROFILE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("profiles")),

            alert_cooldown_secs: constants::get_alert_cooldown_secs(),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
