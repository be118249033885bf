use anyhow::{Context, Result};
use hostlogger::config::LoggerConfig;
use hostlogger::health::HealthReporter;
use hostlogger::routes;
use hostlogger::scheduler::CycleScheduler;
use hostlogger::sensor::SensorSet;
use hostlogger::store::{self, SchemaState};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let config = LoggerConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        store = ?config.store,
        sampling = ?config.sampling,
        sensor_backend = ?config.sensors.backend,
        health_path = %config.health.status_path.display(),
        "starting"
    );

    let store = store::connect(
        &config.store.uri,
        &config.store.database,
        &config.store.collection,
    )
    .await
    .context("connecting to metric store")?;
    match store
        .ensure_schema()
        .await
        .context("bootstrapping metric collection")?
    {
        SchemaState::Created => tracing::info!(
            backend = store.backend(),
            collection = store.collection(),
            "created time-series collection and timestamp index"
        ),
        SchemaState::AlreadyPresent => tracing::info!(
            backend = store.backend(),
            collection = store.collection(),
            "collection already present"
        ),
    }

    let scheduler = CycleScheduler::new(
        SensorSet::for_backend(config.sensors.backend, config.sensors.thermal_path.clone()),
        store,
        HealthReporter::new(config.health.status_path.clone()),
        config.sampling.clone(),
    );

    if let Some(addr) = &config.health.http_addr {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding health endpoint on {}", addr))?;
        tracing::info!("Health endpoint on http://{}/health", addr);
        let app = routes::app(scheduler.health());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "health endpoint stopped");
            }
        });
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
    });

    let stored = scheduler
        .run(shutdown_rx)
        .await
        .context("metric logging stopped")?;
    tracing::info!(records_stored = stored, "shut down");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
