//! Timeline event queries
//!
//! The recurrence engine reads problem events per asset; asset discovery for
//! a company sweep looks at every category, since any activity marks the
//! asset as worth analyzing.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use zelo_common::db::models::{EventCategory, TimelineEvent};
use zelo_common::time::{format_timestamp, parse_timestamp};

/// Save a timeline event
pub async fn insert_event(pool: &SqlitePool, event: &TimelineEvent) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO timeline_events
            (id, asset_id, company_id, title, description, category, recorded_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.id.to_string())
    .bind(event.asset_id.to_string())
    .bind(event.company_id.to_string())
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.category.as_str())
    .bind(format_timestamp(event.recorded_at))
    .bind(format_timestamp(Utc::now()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load an asset's problem events recorded at or after `since`
pub async fn problem_events_for_asset(
    pool: &SqlitePool,
    asset_id: Uuid,
    company_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<TimelineEvent>> {
    let rows = sqlx::query(
        r#"
        SELECT id, asset_id, company_id, title, description, category, recorded_at
        FROM timeline_events
        WHERE asset_id = ? AND company_id = ? AND category = 'problem' AND recorded_at >= ?
        ORDER BY recorded_at ASC
        "#,
    )
    .bind(asset_id.to_string())
    .bind(company_id.to_string())
    .bind(format_timestamp(since))
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let category_str: String = row.get("category");
            let recorded_at_str: String = row.get("recorded_at");
            let id_str: String = row.get("id");
            let asset_str: String = row.get("asset_id");
            let company_str: String = row.get("company_id");

            Ok(TimelineEvent {
                id: Uuid::parse_str(&id_str)?,
                asset_id: Uuid::parse_str(&asset_str)?,
                company_id: Uuid::parse_str(&company_str)?,
                title: row.get("title"),
                description: row.get("description"),
                category: EventCategory::parse(&category_str)
                    .ok_or_else(|| anyhow!("Unknown event category: {}", category_str))?,
                recorded_at: parse_timestamp(&recorded_at_str)?,
            })
        })
        .collect()
}

/// Distinct asset IDs with any timeline activity for a company
///
/// All categories contribute here; only problem events are analyzed later.
pub async fn distinct_asset_ids(pool: &SqlitePool, company_id: Uuid) -> Result<Vec<Uuid>> {
    let rows = sqlx::query(
        "SELECT DISTINCT asset_id FROM timeline_events WHERE company_id = ?",
    )
    .bind(company_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let id_str: String = row.get("asset_id");
            Ok(Uuid::parse_str(&id_str)?)
        })
        .collect()
}

/// Distinct company IDs with any timeline activity (scheduled sweep driver)
pub async fn distinct_company_ids(pool: &SqlitePool) -> Result<Vec<Uuid>> {
    let rows = sqlx::query("SELECT DISTINCT company_id FROM timeline_events")
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|row| {
            let id_str: String = row.get("company_id");
            Ok(Uuid::parse_str(&id_str)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn setup_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            // One connection: every pooled connection to :memory: is a distinct database
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        zelo_common::db::init_schema(&pool).await.expect("Schema init failed");
        pool
    }

    fn make_event(
        asset_id: Uuid,
        company_id: Uuid,
        title: &str,
        category: EventCategory,
        recorded_at: DateTime<Utc>,
    ) -> TimelineEvent {
        TimelineEvent {
            id: Uuid::new_v4(),
            asset_id,
            company_id,
            title: title.to_string(),
            description: None,
            category,
            recorded_at,
        }
    }

    #[tokio::test]
    async fn problem_query_filters_category_and_window() {
        let pool = setup_pool().await;
        let asset = Uuid::new_v4();
        let company = Uuid::new_v4();
        let now = Utc::now();

        let in_window =
            make_event(asset, company, "Vazamento", EventCategory::Problem, now - Duration::days(30));
        let wrong_category =
            make_event(asset, company, "Troca de filtro", EventCategory::Maintenance, now);
        let too_old =
            make_event(asset, company, "Goteira antiga", EventCategory::Problem, now - Duration::days(400));

        for event in [&in_window, &wrong_category, &too_old] {
            insert_event(&pool, event).await.unwrap();
        }

        let since = now - Duration::days(183);
        let events = problem_events_for_asset(&pool, asset, company, since).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, in_window.id);
    }

    #[tokio::test]
    async fn asset_discovery_spans_all_categories() {
        let pool = setup_pool().await;
        let company = Uuid::new_v4();
        let asset_a = Uuid::new_v4();
        let asset_b = Uuid::new_v4();
        let now = Utc::now();

        insert_event(&pool, &make_event(asset_a, company, "Inspeção anual", EventCategory::Inspection, now))
            .await
            .unwrap();
        insert_event(&pool, &make_event(asset_b, company, "Vazamento", EventCategory::Problem, now))
            .await
            .unwrap();
        // Another company's asset must not appear
        insert_event(
            &pool,
            &make_event(Uuid::new_v4(), Uuid::new_v4(), "Outro", EventCategory::Problem, now),
        )
        .await
        .unwrap();

        let mut ids = distinct_asset_ids(&pool, company).await.unwrap();
        ids.sort();
        let mut expected = vec![asset_a, asset_b];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn company_discovery_lists_active_companies() {
        let pool = setup_pool().await;
        let company = Uuid::new_v4();
        insert_event(
            &pool,
            &make_event(Uuid::new_v4(), company, "Vazamento", EventCategory::Problem, Utc::now()),
        )
        .await
        .unwrap();

        let ids = distinct_company_ids(&pool).await.unwrap();
        assert_eq!(ids, vec![company]);
    }
}
