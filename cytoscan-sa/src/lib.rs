//! cytoscan-sa library interface
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use cytoscan_common::events::EventBus;

use crate::storage::MediaStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Filesystem media store
    pub media: MediaStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus, media: MediaStore) -> Self {
        Self {
            db,
            event_bus,
            media,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
///
/// The original clients call these endpoints cross-origin, so the API
/// carries a permissive CORS layer. Stored media is served back under
/// /media as the public URL of the object store.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let media_dir = ServeDir::new(state.media.root());

    Router::new()
        .merge(api::analyze_routes())
        .merge(api::results_routes())
        .merge(api::parameter_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .nest_service("/media", media_dir)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
