// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Rota CLI

pub mod config;
pub mod migrate;
pub mod serve;

pub use self::config::ConfigCommand;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use rota_core::domain::repository::StorageBackend;
use rota_core::domain::scheduler_config::SchedulerConfigManifest;
use rota_core::infrastructure::db::Database;

/// Load and validate the configuration every runtime command starts from.
pub(crate) fn load_config(config_path: Option<PathBuf>) -> Result<SchedulerConfigManifest> {
    let config = SchedulerConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

/// Connect to PostgreSQL when the configured backend needs it.
pub(crate) async fn connect(backend: &StorageBackend) -> Result<Option<Database>> {
    match backend {
        StorageBackend::InMemory => Ok(None),
        StorageBackend::PostgreSQL(postgres) => {
            let database = Database::new(postgres)
                .await
                .context("Failed to connect to PostgreSQL")?;
            Ok(Some(database))
        }
    }
}

/// Like [`connect`], for commands that only make sense against PostgreSQL.
pub(crate) async fn require_database(backend: &StorageBackend) -> Result<Database> {
    match connect(backend).await? {
        Some(database) => Ok(database),
        None => bail!("This command requires the postgres database backend"),
    }
}
