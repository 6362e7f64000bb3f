//! Shared database access for Zelo services

pub mod models;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Connects to the shared zelo.db in the root folder, creating the file and
/// schema when missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_schema(&pool).await?;

    Ok(pool)
}

/// Create the Zelo tables if they don't exist
///
/// The `UNIQUE(asset_id, company_id, keyword)` constraint on
/// recurrence_analysis backs the ledger's upsert; keyword lookups are
/// exact-match on the normalized token.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS timeline_events (
            id TEXT PRIMARY KEY,
            asset_id TEXT NOT NULL,
            company_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_timeline_events_asset
        ON timeline_events (company_id, asset_id, category, recorded_at)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recurrence_analysis (
            id TEXT PRIMARY KEY,
            asset_id TEXT NOT NULL,
            company_id TEXT NOT NULL,
            keyword TEXT NOT NULL,
            occurrence_count INTEGER NOT NULL DEFAULT 0,
            last_occurrence_date TEXT NOT NULL,
            frequency_tier TEXT NOT NULL,
            alert_active INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (asset_id, company_id, keyword)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            id TEXT PRIMARY KEY,
            asset_id TEXT NOT NULL,
            company_id TEXT NOT NULL,
            recurrence_id TEXT REFERENCES recurrence_analysis(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            severity TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_alerts_company
        ON alerts (company_id, is_read, created_at)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (timeline_events, recurrence_analysis, alerts)");

    Ok(())
}
