//! HTTP API handlers for zelo-ra

pub mod alerts;
pub mod analysis;
pub mod health;
pub mod sse;

pub use alerts::{list_alerts, mark_read};
pub use analysis::{analyze_asset, analyze_company};
pub use health::health_routes;
pub use sse::event_stream;
