// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

//! `rota serve`: wire the configured store into the scheduling services and
//! run the HTTP API until Ctrl+C or SIGTERM.

use anyhow::{bail, Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use rota_core::application::repository_factory::{create_repositories, SchedulingServices};
use rota_core::domain::scheduler_config::{DatabaseBackend, MetricsConfig, SchedulerConfigManifest};
use rota_core::infrastructure::event_bus::EventBus;
use rota_core::presentation::api;

use super::{connect, load_config};

pub async fn run(config_path: Option<PathBuf>, port_override: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port_override {
        config.spec.server.port = port;
    }
    ensure_servable(&config)?;

    info!(
        "Rota scheduler starting: backend={:?}",
        config.spec.database.backend
    );

    install_metrics_exporter(&config.spec.observability.metrics)?;

    let backend = config.storage_backend();
    let database = connect(&backend).await?;
    if let Some(database) = &database {
        if config.spec.database.run_migrations {
            database
                .migrate()
                .await
                .context("Failed to apply database migrations")?;
        }
    }

    let repositories = create_repositories(&backend, database.map(|db| db.get_pool().clone()))
        .context("Failed to create repositories")?;
    let services = SchedulingServices::new(repositories, EventBus::with_default_capacity());
    let app = api::app(services, config.spec.server.allow_cors);

    let addr = format!("{}:{}", config.spec.server.bind_address, config.spec.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Rota scheduler listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Rota scheduler shutting down");

    Ok(())
}

/// The in-memory store starts with an empty directory that nothing can
/// fill, so a server on it could only answer 404s.
fn ensure_servable(config: &SchedulerConfigManifest) -> Result<()> {
    if config.spec.database.backend == DatabaseBackend::InMemory {
        bail!(
            "The in_memory backend is for tests only and cannot be served; \
             set spec.database.backend to postgres"
        );
    }
    Ok(())
}

fn install_metrics_exporter(metrics: &MetricsConfig) -> Result<()> {
    if !metrics.enabled {
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], metrics.port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!("Prometheus metrics exposed on {}", addr);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
