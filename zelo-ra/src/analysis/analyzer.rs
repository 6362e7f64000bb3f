//! Per-asset recurrence analysis pipeline
//!
//! Sequential per asset: fetch problem events in the trailing window,
//! extract and rank keywords, refresh the ledger, and emit an alert the
//! first time a keyword crosses the threshold while no alert is active.

use anyhow::Result;
use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use zelo_common::db::models::{Alert, AlertSeverity, RecurrenceRecord};
use zelo_common::events::{EventBus, ZeloEvent};

use crate::db::{alerts, events, recurrence};

use super::frequency::{aggregate_keywords, classify_frequency};

/// Trailing analysis window
const ANALYSIS_WINDOW_MONTHS: u32 = 6;

/// Minimum occurrence count before an alert is considered
const ALERT_THRESHOLD: i64 = 3;

/// Observability counts for one asset's analysis
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AssetAnalysis {
    pub problem_events: usize,
    pub keywords_tracked: usize,
    pub alerts_emitted: usize,
}

/// Recurrence analysis engine
///
/// Cheap to clone; clones share the pool and the event bus.
#[derive(Clone)]
pub struct RecurrenceAnalyzer {
    db: SqlitePool,
    event_bus: EventBus,
}

impl RecurrenceAnalyzer {
    pub fn new(db: SqlitePool, event_bus: EventBus) -> Self {
        Self { db, event_bus }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Start of the trailing analysis window
    pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(ANALYSIS_WINDOW_MONTHS))
            .unwrap_or_else(|| now - Duration::days(183))
    }

    /// Run the full pipeline for one asset
    ///
    /// An asset with zero problem events in the window is a no-op: nothing
    /// is written and the returned counts are all zero.
    pub async fn analyze_asset(&self, asset_id: Uuid, company_id: Uuid) -> Result<AssetAnalysis> {
        let now = Utc::now();
        let since = Self::window_start(now);

        let problem_events =
            events::problem_events_for_asset(&self.db, asset_id, company_id, since).await?;
        if problem_events.is_empty() {
            debug!(%asset_id, "No problem events in window, skipping analysis");
            return Ok(AssetAnalysis::default());
        }

        let total_problems = problem_events.len() as i64;
        let texts: Vec<String> = problem_events.iter().map(|e| e.combined_text()).collect();
        let ranked = aggregate_keywords(texts.iter().map(|s| s.as_str()));

        let mut analysis = AssetAnalysis {
            problem_events: problem_events.len(),
            keywords_tracked: ranked.len(),
            alerts_emitted: 0,
        };

        for kc in &ranked {
            let tier = classify_frequency(kc.count, total_problems);
            let record = recurrence::upsert_record(
                &self.db,
                asset_id,
                company_id,
                &kc.keyword,
                kc.count,
                tier,
                now,
            )
            .await?;

            if kc.count >= ALERT_THRESHOLD {
                // Claim-then-emit: the conditional flip is the dedup gate,
                // so concurrent sweeps cannot double-alert
                if recurrence::try_activate_alert(&self.db, record.id).await? {
                    self.emit_alert(&record, kc.count).await?;
                    analysis.alerts_emitted += 1;
                }
            }
        }

        info!(
            %asset_id, %company_id,
            problem_events = analysis.problem_events,
            keywords_tracked = analysis.keywords_tracked,
            alerts_emitted = analysis.alerts_emitted,
            "Asset recurrence analysis complete"
        );
        self.event_bus.emit(ZeloEvent::AssetAnalyzed {
            asset_id,
            company_id,
            problem_events: analysis.problem_events,
            keywords_tracked: analysis.keywords_tracked,
            alerts_emitted: analysis.alerts_emitted,
            timestamp: now,
        });

        Ok(analysis)
    }

    /// Create the alert row for a keyword that became a recurring problem
    async fn emit_alert(&self, record: &RecurrenceRecord, count: i64) -> Result<()> {
        let severity = AlertSeverity::for_count(count);
        let alert = Alert {
            id: Uuid::new_v4(),
            asset_id: record.asset_id,
            company_id: record.company_id,
            recurrence_id: Some(record.id),
            title: format!("Problema recorrente: {}", record.keyword),
            message: format!(
                "O problema \"{}\" ocorreu {} vezes nos últimos 6 meses.",
                record.keyword, count
            ),
            severity,
            is_read: false,
            created_at: Utc::now(),
        };

        alerts::insert_alert(&self.db, &alert).await?;
        info!(keyword = %record.keyword, %severity, asset_id = %record.asset_id, "Alert created");

        self.event_bus.emit(ZeloEvent::AlertCreated {
            alert_id: alert.id,
            asset_id: alert.asset_id,
            company_id: alert.company_id,
            keyword: record.keyword.clone(),
            severity,
            timestamp: alert.created_at,
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zelo_common::db::models::{EventCategory, FrequencyTier, TimelineEvent};

    async fn setup_analyzer() -> RecurrenceAnalyzer {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            // One connection: every pooled connection to :memory: is a distinct database
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        zelo_common::db::init_schema(&pool).await.expect("Schema init failed");
        RecurrenceAnalyzer::new(pool, EventBus::new(64))
    }

    async fn seed_problem(
        analyzer: &RecurrenceAnalyzer,
        asset_id: Uuid,
        company_id: Uuid,
        title: &str,
        description: Option<&str>,
        days_ago: i64,
    ) {
        let event = TimelineEvent {
            id: Uuid::new_v4(),
            asset_id,
            company_id,
            title: title.to_string(),
            description: description.map(|s| s.to_string()),
            category: EventCategory::Problem,
            recorded_at: Utc::now() - Duration::days(days_ago),
        };
        events::insert_event(analyzer.db(), &event).await.unwrap();
    }

    #[tokio::test]
    async fn asset_without_problems_writes_nothing() {
        let analyzer = setup_analyzer().await;
        let asset = Uuid::new_v4();
        let company = Uuid::new_v4();

        let analysis = analyzer.analyze_asset(asset, company).await.unwrap();
        assert_eq!(analysis.problem_events, 0);
        assert_eq!(analysis.keywords_tracked, 0);
        assert_eq!(analysis.alerts_emitted, 0);

        let ledger_rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recurrence_analysis")
            .fetch_one(analyzer.db())
            .await
            .unwrap();
        assert_eq!(ledger_rows.0, 0);
        let alert_rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM alerts")
            .fetch_one(analyzer.db())
            .await
            .unwrap();
        assert_eq!(alert_rows.0, 0);
    }

    #[tokio::test]
    async fn below_threshold_tracks_without_alerting() {
        let analyzer = setup_analyzer().await;
        let asset = Uuid::new_v4();
        let company = Uuid::new_v4();

        seed_problem(&analyzer, asset, company, "Vazamento na cozinha", None, 10).await;
        seed_problem(&analyzer, asset, company, "Vazamento no banheiro", None, 5).await;

        let analysis = analyzer.analyze_asset(asset, company).await.unwrap();
        assert_eq!(analysis.keywords_tracked, 1);
        assert_eq!(analysis.alerts_emitted, 0);

        let record = recurrence::find_record(analyzer.db(), asset, company, "vazamento")
            .await
            .unwrap()
            .expect("Keyword should be tracked");
        assert_eq!(record.occurrence_count, 2);
        assert!(!record.alert_active, "count 2 must not activate an alert");
    }

    #[tokio::test]
    async fn threshold_emits_exactly_one_alert_and_flips_flag() {
        let analyzer = setup_analyzer().await;
        let asset = Uuid::new_v4();
        let company = Uuid::new_v4();

        seed_problem(&analyzer, asset, company, "Vazamento na cozinha", None, 20).await;
        seed_problem(&analyzer, asset, company, "Vazamento no banheiro", None, 12).await;
        seed_problem(&analyzer, asset, company, "Vazamento na garagem", None, 4).await;

        let analysis = analyzer.analyze_asset(asset, company).await.unwrap();
        assert_eq!(analysis.alerts_emitted, 1);

        let record = recurrence::find_record(analyzer.db(), asset, company, "vazamento")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.occurrence_count, 3);
        assert!(record.alert_active);

        let alert_list = alerts::alerts_for_company(analyzer.db(), company, false).await.unwrap();
        assert_eq!(alert_list.len(), 1);
        assert_eq!(alert_list[0].severity, AlertSeverity::Medium);
        assert_eq!(alert_list[0].recurrence_id, Some(record.id));
        assert!(alert_list[0].title.contains("vazamento"));
        assert!(alert_list[0].message.contains("últimos 6 meses"));
        assert!(alert_list[0].message.contains('3'));
    }

    #[tokio::test]
    async fn no_re_alert_while_episode_active() {
        let analyzer = setup_analyzer().await;
        let asset = Uuid::new_v4();
        let company = Uuid::new_v4();

        seed_problem(&analyzer, asset, company, "Vazamento na cozinha", None, 30).await;
        seed_problem(&analyzer, asset, company, "Vazamento no banheiro", None, 20).await;
        seed_problem(&analyzer, asset, company, "Vazamento na garagem", None, 10).await;
        analyzer.analyze_asset(asset, company).await.unwrap();

        // A fourth occurrence grows the count but must not re-alert
        seed_problem(&analyzer, asset, company, "Vazamento na sala", None, 1).await;
        let rerun = analyzer.analyze_asset(asset, company).await.unwrap();
        assert_eq!(rerun.alerts_emitted, 0);

        let record = recurrence::find_record(analyzer.db(), asset, company, "vazamento")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.occurrence_count, 4);
        assert!(record.alert_active);

        let alert_list = alerts::alerts_for_company(analyzer.db(), company, false).await.unwrap();
        assert_eq!(alert_list.len(), 1, "episode already active, no second alert");
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        // 4 problem events over 3 months; "vazamento" appears 3 times in
        // total (once in one event, twice in another), "elétrica" once.
        let analyzer = setup_analyzer().await;
        let asset = Uuid::new_v4();
        let company = Uuid::new_v4();

        seed_problem(&analyzer, asset, company, "Vazamento no teto", None, 85).await;
        seed_problem(
            &analyzer,
            asset,
            company,
            "Vazamento persistente",
            Some("mesmo vazamento da semana passada, fiação elétrica molhada"),
            60,
        )
        .await;
        seed_problem(&analyzer, asset, company, "Porta emperrada", None, 30).await;
        seed_problem(&analyzer, asset, company, "Janela trincada", None, 7).await;

        let analysis = analyzer.analyze_asset(asset, company).await.unwrap();
        assert_eq!(analysis.problem_events, 4);
        // Only "vazamento" clears the >1 filter
        assert_eq!(analysis.keywords_tracked, 1);
        assert_eq!(analysis.alerts_emitted, 1);

        let record = recurrence::find_record(analyzer.db(), asset, company, "vazamento")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.occurrence_count, 3);
        // 3 of 4 events = 75% > 50%
        assert_eq!(record.frequency_tier, FrequencyTier::VeryFrequent);
        assert!(record.alert_active);

        let alert_list = alerts::alerts_for_company(analyzer.db(), company, false).await.unwrap();
        assert_eq!(alert_list.len(), 1);
        // 3 <= count < 5
        assert_eq!(alert_list[0].severity, AlertSeverity::Medium);
    }

    #[tokio::test]
    async fn analysis_emits_bus_events() {
        let analyzer = setup_analyzer().await;
        let mut rx = analyzer.event_bus().subscribe();
        let asset = Uuid::new_v4();
        let company = Uuid::new_v4();

        seed_problem(&analyzer, asset, company, "Infiltração na parede", None, 15).await;
        seed_problem(&analyzer, asset, company, "Infiltração no teto", None, 10).await;
        seed_problem(&analyzer, asset, company, "Infiltração na laje", None, 5).await;
        analyzer.analyze_asset(asset, company).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.event_type(), "AlertCreated");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.event_type(), "AssetAnalyzed");
    }
}
