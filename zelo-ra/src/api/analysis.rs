//! Recurrence analysis trigger endpoints
//!
//! Called by the host product's RPC mutations and admin/cron paths.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::{sweep_company, AssetAnalysis, SweepSummary};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeAssetRequest {
    pub company_id: Uuid,
}

/// POST /api/analysis/assets/:asset_id
///
/// Run the recurrence pipeline for a single asset. Responds with the
/// analysis counts; an asset with no problem events yields all zeros.
pub async fn analyze_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<Uuid>,
    Json(request): Json<AnalyzeAssetRequest>,
) -> ApiResult<Json<AssetAnalysis>> {
    let analysis = state
        .analyzer
        .analyze_asset(asset_id, request.company_id)
        .await?;
    Ok(Json(analysis))
}

/// POST /api/analysis/companies/:company_id
///
/// Fan the asset pipeline out over every asset with timeline activity.
/// Discovery failure is a hard 500; per-asset failures are only counted.
pub async fn analyze_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Json<SweepSummary>> {
    let summary = sweep_company(&state.analyzer, company_id).await?;
    Ok(Json(summary))
}
