//! Senior Guardian Cloud Backend Server
//!
//! Guardian-facing REST backend over the guardian-core engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SENIOR GUARDIAN CLOUD                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │  API      │  │  guardian-core   │  │  Simulation     │  │
//! │  │  Gateway  │  │  (thresholds,    │  │  Injector       │  │
//! │  │  (Axum)   │  │  baseline, alerts)│ │  (demo feed)    │  │
//! │  └─────┬─────┘  └────────┬─────────┘  └────────┬────────┘  │
//! │        └─────────────────┼─────────────────────┘           │
//! │                          ▼                                 │
//! │                ┌───────────────────┐                       │
//! │                │ SQLite + profiles │                       │
//! │                └───────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use guardian_core::{
    AlertManager, AlertPolicy, BaselineLearner, Db, JsonProfileStore, ProfileStore,
    SqliteAlertStore, SqliteRecordStore, SqliteSettingsStore, SqliteZoneStore,
};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guardian_cloud=debug,guardian_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Senior Guardian Cloud Server starting...");
    tracing::info!("Database: {}", config.db_path.display());

    // Storage + engine services
    let db = Db::open(&config.db_path)?;
    let records = SqliteRecordStore::new(db.clone());
    let profiles: Arc<dyn ProfileStore> =
        Arc::new(JsonProfileStore::new(config.profile_dir.clone()));
    let learner = Arc::new(BaselineLearner::new(
        Arc::new(records.clone()),
        profiles.clone(),
    ));
    let alerts = Arc::new(AlertManager::new(
        Arc::new(SqliteAlertStore::new(db.clone())),
        AlertPolicy {
            cooldown_secs: config.alert_cooldown_secs,
        },
    ));

    if config.is_production() {
        tracing::info!("Running in production mode");
    }

    let state = AppState {
        records,
        zones: SqliteZoneStore::new(db.clone()),
        settings: SqliteSettingsStore::new(db.clone()),
        learner,
        alerts,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub records: SqliteRecordStore,
    pub zones: SqliteZoneStore,
    pub settings: SqliteSettingsStore,
    pub learner: Arc<BaselineLearner>,
    pub alerts: Arc<AlertManager>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Readings
        .route("/api/v1/records", post(handlers::records::create))
        .route("/api/v1/records/:id", get(handlers::records::list))
        .route("/api/v1/records/:id/latest", get(handlers::records::latest))
        .route("/api/v1/status/:id", get(handlers::records::realtime_status))
        .route("/api/v1/stats/weekly/:id", get(handlers::records::weekly))

        // Baseline
        .route("/api/v1/baseline/learn", post(handlers::baseline::learn))
        .route("/api/v1/baseline/profile/:id", get(handlers::baseline::profile))
        .route("/api/v1/baseline/comparison/:id", get(handlers::baseline::comparison))

        // Alerts
        .route("/api/v1/alerts/:id", get(handlers::alerts::list))
        .route("/api/v1/alerts/:id/unread-count", get(handlers::alerts::unread_count))
        .route("/api/v1/alerts/:id/read", put(handlers::alerts::mark_read))
        .route("/api/v1/alerts/:id/read-all", put(handlers::alerts::mark_all_read))

        // Safe zones
        .route(
            "/api/v1/zones/:id",
            get(handlers::zones::list).post(handlers::zones::create),
        )
        .route(
            "/api/v1/zones/:id/:zone_id",
            put(handlers::zones::update).delete(handlers::zones::delete),
        )
        .route("/api/v1/zones/:id/:zone_id/toggle", put(handlers::zones::toggle))

        // Settings
        .route(
            "/api/v1/settings/:id",
            get(handlers::settings::get).put(handlers::settings::update),
        )
        .route("/api/v1/settings/:id/reset", post(handlers::settings::reset))

        // Simulation (demo)
        .route("/api/v1/simulation/inject-anomaly", post(handlers::simulation::inject_anomaly))
        .route("/api/v1/simulation/reset", post(handlers::simulation::reset));

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
