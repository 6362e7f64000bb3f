//! zelo-ra library - Recurrence Analysis service
//!
//! Scans asset timelines for recurring problem keywords, keeps the
//! per-keyword recurrence ledger current, and raises deduplicated alerts
//! when a keyword crosses the recurrence threshold.

use axum::Router;
use sqlx::SqlitePool;

use zelo_common::events::EventBus;

pub mod analysis;
pub mod api;
pub mod db;
pub mod error;
pub mod scheduler;

pub use crate::analysis::RecurrenceAnalyzer;
pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Recurrence engine (owns the pool and the event bus)
    pub analyzer: RecurrenceAnalyzer,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus) -> Self {
        Self {
            analyzer: RecurrenceAnalyzer::new(db, event_bus),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/analysis/assets/:asset_id", post(api::analyze_asset))
        .route("/api/analysis/companies/:company_id", post(api::analyze_company))
        .route("/api/alerts", get(api::list_alerts))
        .route("/api/alerts/:alert_id/read", post(api::mark_read))
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .with_state(state)
}
