//! Recurrence ledger persistence
//!
//! One row per `(asset_id, company_id, keyword)`, enforced by a unique
//! constraint. Lookups are exact-match on the normalized keyword; the
//! upsert leaves `alert_active` untouched so the activation step can use a
//! conditional update as its gate.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use zelo_common::db::models::{FrequencyTier, RecurrenceRecord};
use zelo_common::time::{format_timestamp, parse_timestamp};

/// Load the ledger row for one keyword on one asset (exact keyword match)
pub async fn find_record(
    pool: &SqlitePool,
    asset_id: Uuid,
    company_id: Uuid,
    keyword: &str,
) -> Result<Option<RecurrenceRecord>> {
    let row = sqlx::query(
        r#"
        SELECT id, asset_id, company_id, keyword, occurrence_count,
               last_occurrence_date, frequency_tier, alert_active, created_at, updated_at
        FROM recurrence_analysis
        WHERE asset_id = ? AND company_id = ? AND keyword = ?
        "#,
    )
    .bind(asset_id.to_string())
    .bind(company_id.to_string())
    .bind(keyword)
    .fetch_optional(pool)
    .await?;

    row.map(map_record_row).transpose()
}

/// Create or refresh the ledger row for a keyword, returning its state
/// after the write
///
/// Inserted rows start with `alert_active = false`; the upsert never
/// touches the flag on existing rows.
pub async fn upsert_record(
    pool: &SqlitePool,
    asset_id: Uuid,
    company_id: Uuid,
    keyword: &str,
    occurrence_count: i64,
    frequency_tier: FrequencyTier,
    observed_at: DateTime<Utc>,
) -> Result<RecurrenceRecord> {
    let timestamp = format_timestamp(observed_at);
    sqlx::query(
        r#"
        INSERT INTO recurrence_analysis
            (id, asset_id, company_id, keyword, occurrence_count,
             last_occurrence_date, frequency_tier, alert_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
        ON CONFLICT(asset_id, company_id, keyword) DO UPDATE SET
            occurrence_count = excluded.occurrence_count,
            last_occurrence_date = excluded.last_occurrence_date,
            frequency_tier = excluded.frequency_tier,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(asset_id.to_string())
    .bind(company_id.to_string())
    .bind(keyword)
    .bind(occurrence_count)
    .bind(&timestamp)
    .bind(frequency_tier.as_str())
    .bind(&timestamp)
    .bind(&timestamp)
    .execute(pool)
    .await?;

    find_record(pool, asset_id, company_id, keyword)
        .await?
        .ok_or_else(|| anyhow!("Ledger row missing immediately after upsert: {}", keyword))
}

/// Atomically claim alert emission for a ledger row
///
/// Flips `alert_active` to true only if it was false, returning whether
/// this call won the claim. Two concurrent sweeps of the same asset can
/// both reach the threshold; only one gets `true` here, so at most one
/// alert is emitted per recurrence episode.
pub async fn try_activate_alert(pool: &SqlitePool, record_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE recurrence_analysis
        SET alert_active = 1, updated_at = ?
        WHERE id = ? AND alert_active = 0
        "#,
    )
    .bind(format_timestamp(Utc::now()))
    .bind(record_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

fn map_record_row(row: SqliteRow) -> Result<RecurrenceRecord> {
    let id_str: String = row.get("id");
    let asset_str: String = row.get("asset_id");
    let company_str: String = row.get("company_id");
    let tier_str: String = row.get("frequency_tier");
    let last_occurrence_str: String = row.get("last_occurrence_date");
    let created_str: String = row.get("created_at");
    let updated_str: String = row.get("updated_at");
    let alert_active: i64 = row.get("alert_active");

    Ok(RecurrenceRecord {
        id: Uuid::parse_str(&id_str)?,
        asset_id: Uuid::parse_str(&asset_str)?,
        company_id: Uuid::parse_str(&company_str)?,
        keyword: row.get("keyword"),
        occurrence_count: row.get("occurrence_count"),
        last_occurrence_date: parse_timestamp(&last_occurrence_str)?,
        frequency_tier: FrequencyTier::parse(&tier_str)
            .ok_or_else(|| anyhow!("Unknown frequency tier: {}", tier_str))?,
        alert_active: alert_active != 0,
        created_at: parse_timestamp(&created_str)?,
        updated_at: parse_timestamp(&updated_str)?,
    })
}
