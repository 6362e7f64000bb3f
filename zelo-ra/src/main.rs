//! zelo-ra (Recurrence Analysis) - Recurring-problem detection service
//!
//! Reads asset timeline events from the shared zelo.db, tracks recurring
//! problem keywords per asset, and raises alerts surfaced by the rest of
//! the product. Sweeps run on a schedule and on demand via the HTTP API.

use anyhow::Result;
use tracing::info;

use zelo_common::events::EventBus;
use zelo_ra::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Zelo Recurrence Analysis (zelo-ra) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Resolve root folder: CLI arg > env var > config file > OS default
    let cli_root = std::env::args().nth(1);
    let root_folder = zelo_common::config::resolve_root_folder(cli_root.as_deref());
    zelo_common::config::ensure_root_folder(&root_folder)?;

    let db_path = zelo_common::config::database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db_pool = zelo_common::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let event_bus = EventBus::new(100);
    let state = AppState::new(db_pool, event_bus);

    // Periodic company sweeps (first run immediate)
    let interval = zelo_common::config::sweep_interval();
    let _scheduler = zelo_ra::scheduler::spawn_sweep_scheduler(state.analyzer.clone(), interval);

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:5740").await?;
    info!("zelo-ra listening on http://127.0.0.1:5740");
    info!("Health check: http://127.0.0.1:5740/health");

    axum::serve(listener, app).await?;

    Ok(())
}
