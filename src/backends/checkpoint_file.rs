// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Checkpoints as a tab-separated text file, one `key<TAB>RFC3339` line per
//! source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::CheckpointError;
use crate::traits::{CheckpointMap, CheckpointStore};

pub struct CheckpointFile {
    path: PathBuf,
}

impl CheckpointFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parses the file contents. Blank lines are ignored.
pub fn parse_checkpoints(contents: &str) -> Result<CheckpointMap, CheckpointError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let malformed = |reason: &str| CheckpointError::Malformed {
                line: index + 1,
                reason: reason.to_string(),
            };
            let (key, timestamp) = line
                .split_once('\t')
                .ok_or_else(|| malformed("expected key<TAB>timestamp"))?;
            let timestamp = DateTime::parse_from_rfc3339(timestamp.trim())
                .map_err(|e| malformed(&e.to_string()))?;
            Ok((key.to_string(), timestamp.with_timezone(&Utc)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CheckpointMap::from_iter)
}

pub fn render_checkpoints(checkpoints: &CheckpointMap) -> String {
    checkpoints
        .iter()
        .map(|(key, at)| format!("{}\t{}\n", key, at.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
        .collect()
}

#[async_trait::async_trait]
impl CheckpointStore for CheckpointFile {
    async fn read(&self) -> Result<CheckpointMap, CheckpointError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => parse_checkpoints(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(CheckpointMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a sibling temporary file and renames it over the target so a
    /// crash mid-write never leaves a truncated file behind.
    async fn write(&self, checkpoints: &CheckpointMap) -> Result<(), CheckpointError> {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        tokio::fs::write(&staging, render_checkpoints(checkpoints)).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}
