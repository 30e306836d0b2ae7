// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

//! `rota migrate`: apply pending schema migrations and exit.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use super::{load_config, require_database};

pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let database = require_database(&config.storage_backend()).await?;

    database
        .migrate()
        .await
        .context("Failed to apply database migrations")?;

    println!("{}", "✓ Database schema is up to date".green());

    Ok(())
}
