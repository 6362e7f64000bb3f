//! Alert persistence
//!
//! Alerts are only created through the recurrence engine's threshold check;
//! this module has no dedup logic of its own. Reading and acknowledging
//! alerts serves the product's notification surface.

use anyhow::{anyhow, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use zelo_common::db::models::{Alert, AlertSeverity};
use zelo_common::time::{format_timestamp, parse_timestamp};

/// Save an alert
pub async fn insert_alert(pool: &SqlitePool, alert: &Alert) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO alerts
            (id, asset_id, company_id, recurrence_id, title, message, severity, is_read, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(alert.id.to_string())
    .bind(alert.asset_id.to_string())
    .bind(alert.company_id.to_string())
    .bind(alert.recurrence_id.map(|id| id.to_string()))
    .bind(&alert.title)
    .bind(&alert.message)
    .bind(alert.severity.as_str())
    .bind(alert.is_read as i64)
    .bind(format_timestamp(alert.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// List a company's alerts, newest first
pub async fn alerts_for_company(
    pool: &SqlitePool,
    company_id: Uuid,
    unread_only: bool,
) -> Result<Vec<Alert>> {
    let query = if unread_only {
        r#"
        SELECT id, asset_id, company_id, recurrence_id, title, message, severity, is_read, created_at
        FROM alerts
        WHERE company_id = ? AND is_read = 0
        ORDER BY created_at DESC
        "#
    } else {
        r#"
        SELECT id, asset_id, company_id, recurrence_id, title, message, severity, is_read, created_at
        FROM alerts
        WHERE company_id = ?
        ORDER BY created_at DESC
        "#
    };

    let rows = sqlx::query(query)
        .bind(company_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(map_alert_row).collect()
}

/// Mark one alert as read, returning whether a row was changed
pub async fn mark_alert_read(pool: &SqlitePool, alert_id: Uuid) -> Result<bool> {
    let result = sqlx::query("UPDATE alerts SET is_read = 1 WHERE id = ?")
        .bind(alert_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

fn map_alert_row(row: SqliteRow) -> Result<Alert> {
    let id_str: String = row.get("id");
    let asset_str: String = row.get("asset_id");
    let company_str: String = row.get("company_id");
    let recurrence_str: Option<String> = row.get("recurrence_id");
    let severity_str: String = row.get("severity");
    let created_str: String = row.get("created_at");
    let is_read: i64 = row.get("is_read");

    Ok(Alert {
        id: Uuid::parse_str(&id_str)?,
        asset_id: Uuid::parse_str(&asset_str)?,
        company_id: Uuid::parse_str(&company_str)?,
        recurrence_id: recurrence_str.map(|s| Uuid::parse_str(&s)).transpose()?,
        title: row.get("title"),
        message: row.get("message"),
        severity: AlertSeverity::parse(&severity_str)
            .ok_or_else(|| anyhow!("Unknown alert severity: {}", severity_str))?,
        is_read: is_read != 0,
        created_at: parse_timestamp(&created_str)?,
    })
}
