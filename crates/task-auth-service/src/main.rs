//! Task Auth Service
//!
//! Entry point for the task API's authentication service.

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use task_auth_service::config::Config;
use task_auth_service::directory::{PgUserDirectory, DIRECTORY_ACQUIRE_TIMEOUT};
use task_auth_service::observability::metrics::init_metrics_recorder;
use task_auth_service::routes::{self, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Task Auth Service");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration rejected: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        access_token_ttl_ms = config.access_token_ttl.as_millis(),
        refresh_token_ttl_ms = config.refresh_token_ttl.as_millis(),
        revocation_ttl_ceiling_ms = config.revocation_ttl_ceiling.as_millis(),
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to install metrics recorder: {}", e);
        e
    })?;

    let db_pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(DIRECTORY_ACQUIRE_TIMEOUT)
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&add_query_timeout(&config.database_url, 5))
        .await
        .map_err(|e| {
            error!("User directory unreachable: {}", e);
            e
        })?;

    info!("User directory pool ready");

    let bind_address = config.bind_address.clone();

    // Fails here on a short or non-base64 signing secret
    let state = AppState::new(config, Arc::new(PgUserDirectory::new(db_pool))).map_err(|e| {
        error!("Failed to initialize auth core: {}", e);
        e
    })?;

    let app = routes::build_routes(Arc::new(state), metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!(bind_address = %bind_address, "BIND_ADDRESS is not a socket address: {}", e);
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Task Auth Service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Task Auth Service stopped");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM, after the optional drain period.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Cannot listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    info!(signal = received, "Shutdown requested");

    let drain = drain_period();
    if !drain.is_zero() {
        warn!(drain_secs = drain.as_secs(), "Draining in-flight requests");
        tokio::time::sleep(drain).await;
    }
}

/// `SHUTDOWN_DRAIN_SECONDS`, zero when unset or unparseable.
fn drain_period() -> Duration {
    std::env::var("SHUTDOWN_DRAIN_SECONDS")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .map_or(Duration::ZERO, Duration::from_secs)
}

/// Appends a Postgres `statement_timeout` to the connection URL.
fn add_query_timeout(url: &str, timeout_secs: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}options=-c%20statement_timeout%3D{timeout_secs}s")
}
