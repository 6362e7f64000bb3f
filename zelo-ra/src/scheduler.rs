//! Periodic sweep scheduler
//!
//! Background task sweeping every company with timeline activity on a fixed
//! interval. Per-company failures are logged and the schedule keeps going.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::analysis::{sweep_company, RecurrenceAnalyzer};
use crate::db::events;

/// Spawn the periodic sweep loop
///
/// The first sweep runs immediately, then every `interval`. The handle can
/// be aborted at shutdown; no state needs flushing.
pub fn spawn_sweep_scheduler(analyzer: RecurrenceAnalyzer, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?interval, "Sweep scheduler started");

        loop {
            ticker.tick().await;
            run_scheduled_sweeps(&analyzer).await;
        }
    })
}

async fn run_scheduled_sweeps(analyzer: &RecurrenceAnalyzer) {
    let company_ids = match events::distinct_company_ids(analyzer.db()).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Scheduled sweep could not list companies: {:#}", e);
            return;
        }
    };

    info!(companies = company_ids.len(), "Running scheduled sweeps");
    for company_id in company_ids {
        if let Err(e) = sweep_company(analyzer, company_id).await {
            warn!(%company_id, "Scheduled sweep failed: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use uuid::Uuid;
    use zelo_common::db::models::{EventCategory, TimelineEvent};
    use zelo_common::events::EventBus;

    #[tokio::test]
    async fn scheduler_sweeps_active_companies() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            // One connection: every pooled connection to :memory: is a distinct database
            .max_connections(1)
            .connect("sqlite::memory:").await.unwrap();
        zelo_common::db::init_schema(&pool).await.unwrap();
        let analyzer = RecurrenceAnalyzer::new(pool.clone(), EventBus::new(64));

        let asset = Uuid::new_v4();
        let company = Uuid::new_v4();
        for (title, days) in [
            ("Vazamento na cozinha", 30),
            ("Vazamento no banheiro", 20),
            ("Vazamento na garagem", 10),
        ] {
            events::insert_event(
                &pool,
                &TimelineEvent {
                    id: Uuid::new_v4(),
                    asset_id: asset,
                    company_id: company,
                    title: title.to_string(),
                    description: None,
                    category: EventCategory::Problem,
                    recorded_at: Utc::now() - ChronoDuration::days(days),
                },
            )
            .await
            .unwrap();
        }

        let handle = spawn_sweep_scheduler(analyzer, Duration::from_secs(3600));
        // First tick fires immediately; give the sweep a moment to land
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.abort();

        let alerts: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM alerts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(alerts.0, 1);
    }
}
