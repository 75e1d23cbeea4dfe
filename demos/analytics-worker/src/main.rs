//! Analytics worker.
//!
//! Opens the connection registry at startup, lends it to the worker loop, and
//! tears it down on Ctrl+C or SIGTERM.
//!
//! ```bash
//! # Brokers only
//! cargo run -p analytics-worker
//!
//! # Brokers plus MongoDB
//! cargo run -p analytics-worker -- --with-mongo
//! ```
//!
//! Connection URLs come from `ANALYTICS_MONGO_URL`,
//! `ANALYTICS_BROKER_REDIS_URL`, `CELERY_BROKER_REDIS_URL_AUTHORIZATION_IOS`
//! and `CELERY_BROKER_REDIS_URL_AUTHORIZATION_ANDROID` (a `.env` file is
//! honored).

use analytics_managers_core::{
    BrokerConnector, ClientError, DocumentStoreConnector, LifecycleHook, ManagersConfig,
};
use analytics_managers_mongo::MongoConnector;
use analytics_managers_redis::{RedisBrokerConnector, RedisBrokerPool};
use analytics_managers_runtime::Managers;
use analytics_managers_runtime::metrics::register_metrics;
use std::future::Future;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Base lifecycle shared by every analytics process: metric descriptions on
/// the way up, a log line on the way down.
struct TelemetryHook;

impl LifecycleHook for TelemetryHook {
    fn initialize(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        register_metrics();
        std::future::ready(Ok(()))
    }

    fn teardown(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        info!("Telemetry flushed");
        std::future::ready(Ok(()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    init_tracing();

    let with_mongo = std::env::args().any(|arg| arg == "--with-mongo");
    let config = ManagersConfig::from_env();

    let mut managers = Managers::with_hook(
        config,
        TelemetryHook,
        MongoConnector::builder()
            .app_name("analytics-worker")
            .server_selection_timeout(Duration::from_secs(5))
            .verify_on_connect(with_mongo)
            .build(),
        RedisBrokerConnector::builder()
            .connection_timeout(Duration::from_secs(5))
            .build(),
    );

    managers.initialize(with_mongo).await?;
    info!(?managers, "Analytics worker started");

    run(&managers).await?;

    managers.teardown().await?;
    info!("Shutdown complete");
    Ok(())
}

/// Serve until a shutdown signal arrives.
async fn run<D, B, H>(managers: &Managers<D, B, H>) -> anyhow::Result<()>
where
    D: DocumentStoreConnector,
    B: BrokerConnector<Pool = RedisBrokerPool>,
    H: LifecycleHook,
{
    // Take a raw connection up front so a misconfigured pool fails loudly.
    let _queue = managers.analytics_broker()?.connection()?;

    shutdown_signal().await;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analytics_worker=info,analytics_managers_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
