// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use feedsift::config::{load_and_validate_config, RelayBuilder};
use feedsift::errors::ConfigError;
use feedsift::observability::messages::config::{ConfigLoaded, ValidationFailed};
use feedsift::observability::messages::StructuredLog;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "./feedsift.yaml";

/// Config path from the first argument, or the default next to the binary's
/// working directory.
fn config_path() -> PathBuf {
    env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = config_path();
    let config = match load_and_validate_config(&path) {
        Ok(config) => config,
        Err(ConfigError::Invalid(errors)) => {
            ValidationFailed {
                error_count: errors.len(),
            }
            .log();
            for error in &errors {
                tracing::error!("{}", error);
            }
            bail!("{} has {} configuration error(s)", path.display(), errors.len());
        }
        Err(e) => return Err(e).with_context(|| format!("loading {}", path.display())),
    };

    let path_text = path.display().to_string();
    ConfigLoaded {
        path: &path_text,
        mapping_count: config.mappings.len(),
        source_count: config.source_count(),
    }
    .log();

    let started = Instant::now();
    let relay = RelayBuilder::from_config(&config).context("building relay")?;
    let report = relay.run().await;
    relay.scheduler().shutdown().await;

    tracing::info!(
        mappings = report.mappings.len(),
        delivered = report.delivered(),
        clean = report.is_clean(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Relay run finished"
    );

    if !report.is_clean() {
        let failed: Vec<&str> = report
            .mappings
            .iter()
            .filter(|m| !m.is_clean())
            .map(|m| m.mapping.as_str())
            .collect();
        bail!("mappings finished with errors: {}", failed.join(", "));
    }
    Ok(())
}
