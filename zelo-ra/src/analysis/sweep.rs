//! Company-wide sweep driver
//!
//! Fans the per-asset pipeline out over every asset with timeline activity.
//! Asset tasks run on a bounded `JoinSet` and are joined explicitly, so a
//! sweep has a definite completion point and a large company cannot flood
//! the pool. One asset failing or hanging never aborts its siblings; only
//! the discovery step is a hard failure (there is nothing to iterate over).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use zelo_common::events::ZeloEvent;

use crate::db::events;

use super::analyzer::{AssetAnalysis, RecurrenceAnalyzer};

/// Concurrent per-asset analyses per sweep
const MAX_CONCURRENT_ASSETS: usize = 4;

/// Budget for one asset's analysis; a stuck asset counts as failed instead
/// of stalling the sweep
const PER_ASSET_TIMEOUT: Duration = Duration::from_secs(30);

/// Observability counts for one company sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub company_id: Uuid,
    pub assets_discovered: usize,
    pub assets_processed: usize,
    pub assets_failed: usize,
    pub keywords_tracked: usize,
    pub alerts_emitted: usize,
}

/// Run the recurrence pipeline for every asset of a company
pub async fn sweep_company(
    analyzer: &RecurrenceAnalyzer,
    company_id: Uuid,
) -> Result<SweepSummary> {
    let asset_ids = events::distinct_asset_ids(analyzer.db(), company_id).await?;
    info!(%company_id, assets = asset_ids.len(), "Starting company recurrence sweep");

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_ASSETS));
    let mut join_set: JoinSet<(Uuid, Result<AssetAnalysis>)> = JoinSet::new();

    let mut summary = SweepSummary {
        company_id,
        assets_discovered: asset_ids.len(),
        assets_processed: 0,
        assets_failed: 0,
        keywords_tracked: 0,
        alerts_emitted: 0,
    };

    for asset_id in asset_ids {
        let analyzer = analyzer.clone();
        let semaphore = semaphore.clone();
        join_set.spawn(async move {
            let permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return (asset_id, Err(anyhow!("Sweep semaphore closed: {}", e))),
            };
            let outcome = match tokio::time::timeout(
                PER_ASSET_TIMEOUT,
                analyzer.analyze_asset(asset_id, company_id),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(anyhow!(
                    "Asset analysis timed out after {:?}",
                    PER_ASSET_TIMEOUT
                )),
            };
            drop(permit);
            (asset_id, outcome)
        });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((_, Ok(analysis))) => {
                summary.assets_processed += 1;
                summary.keywords_tracked += analysis.keywords_tracked;
                summary.alerts_emitted += analysis.alerts_emitted;
            }
            Ok((asset_id, Err(e))) => {
                summary.assets_failed += 1;
                warn!(%asset_id, %company_id, "Asset analysis failed: {:#}", e);
            }
            Err(e) => {
                summary.assets_failed += 1;
                warn!(%company_id, "Asset analysis task panicked: {}", e);
            }
        }
    }

    info!(
        %company_id,
        assets_processed = summary.assets_processed,
        assets_failed = summary.assets_failed,
        keywords_tracked = summary.keywords_tracked,
        alerts_emitted = summary.alerts_emitted,
        "Company recurrence sweep complete"
    );
    analyzer.event_bus().emit(ZeloEvent::SweepCompleted {
        company_id,
        assets_discovered: summary.assets_discovered,
        assets_processed: summary.assets_processed,
        assets_failed: summary.assets_failed,
        alerts_emitted: summary.alerts_emitted,
        timestamp: Utc::now(),
    });

    Ok(summary)
}
