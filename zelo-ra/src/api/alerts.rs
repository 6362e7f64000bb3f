//! Alert listing and acknowledgement endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use zelo_common::db::models::Alert;

use crate::db::alerts;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    pub company_id: Uuid,
    /// When true, only unread alerts are returned
    #[serde(default)]
    pub unread: bool,
}

/// GET /api/alerts?company_id=...&unread=true
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<ListAlertsQuery>,
) -> ApiResult<Json<Vec<Alert>>> {
    let alerts =
        alerts::alerts_for_company(state.analyzer.db(), query.company_id, query.unread).await?;
    Ok(Json(alerts))
}

/// POST /api/alerts/:alert_id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let changed = alerts::mark_alert_read(state.analyzer.db(), alert_id).await?;
    if !changed {
        return Err(ApiError::NotFound(format!("Alert not found: {}", alert_id)));
    }
    Ok(Json(json!({ "status": "ok" })))
}
