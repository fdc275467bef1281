//! Prescription Service - HTTP entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌──────────────┐    ┌────────────┐
//! │  Config  │───▶│   Gateway    │───▶│ Prescription │───▶│ PostgreSQL │
//! │  (YAML)  │    │   (axum)     │    │   Service    │    │  (sqlx)    │
//! └──────────┘    └──────────────┘    └──────────────┘    └────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use prescription_service::config::AppConfig;
use prescription_service::db::Database;
use prescription_service::gateway::{self, state::AppState};
use prescription_service::logging::init_logging;
use prescription_service::prescription::{PgPrescriptionStore, PrescriptionService};

#[derive(Debug, Parser)]
#[command(name = "prescription_service", about = "Prescription issuance HTTP API")]
struct Args {
    /// Configuration environment; loads `config/<env>.yaml`
    #[arg(short, long, default_value = "dev")]
    env: String,

    /// Override `gateway.port`
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut app_config = AppConfig::load(&args.env)?;
    if let Some(port) = args.port {
        app_config.gateway.port = port;
    }
    let _log_guard = init_logging(&app_config);

    tracing::info!("Starting Prescription Service in {} mode", args.env);

    let db = Database::connect(&app_config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.health_check()
        .await
        .context("PostgreSQL health check failed")?;

    if app_config.database.init_schema {
        db.init_schema()
            .await
            .context("Failed to initialize schema")?;
    }

    let store = Arc::new(PgPrescriptionStore::new(db.pool().clone()));
    let service = Arc::new(PrescriptionService::new(store));
    tracing::info!(store = service.store_name(), "Prescription service ready");

    let state = Arc::new(AppState::new(service));
    gateway::run_server(&app_config.gateway, state).await
}
