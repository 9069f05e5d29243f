//! porter-gateway server entry point.
//!
//! Starts the Axum HTTP server with the REST, SSE and static endpoints, and
//! the hourly activity log ingestion when persistence is enabled.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use porter_gateway::api;
use porter_gateway::app_state::AppState;
use porter_gateway::config::GatewayConfig;
use porter_gateway::persistence::PostgresPersistence;
use porter_gateway::service::log_ingest;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (.env included)
    let config = GatewayConfig::from_env()?;
    init_tracing(config.log_json);
    tracing::info!(addr = %config.listen_addr, "starting porter-gateway");

    // Build persistence layer
    let persistence = if config.persistence_enabled {
        let db = PostgresPersistence::connect_lazy(&config)?;
        if let Err(e) = db.migrate().await {
            tracing::error!(
                error = %e,
                "database migration failed, continuing without schema check"
            );
        }
        Some(db)
    } else {
        tracing::info!("persistence disabled");
        None
    };

    // Build application state
    let app_state = AppState::from_config(&config, persistence.clone())?;

    // Schedule activity log ingestion
    let ingest_job = persistence.map(|db| {
        log_ingest::spawn_ingest_job(
            Arc::clone(&app_state.activity_log),
            db,
            Duration::from_secs(config.log_ingest_interval_secs),
        )
    });

    // Build router
    let app = api::build_app(app_state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(job) = ingest_job {
        job.abort();
    }
    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
