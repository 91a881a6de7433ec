// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Configuration file parsed and validated.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use feedsift::observability::messages::config::ConfigLoaded;
///
/// let msg = ConfigLoaded {
///     path: "feedsift.yaml",
///     mapping_count: 2,
///     source_count: 7,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub mapping_count: usize,
    pub source_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {}: {} mappings, {} sources",
            self.path, self.mapping_count, self.source_count
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            mapping_count = self.mapping_count,
            source_count = self.source_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config", span_name = name, path = self.path)
    }
}

/// Configuration validation found problems.
///
/// # Log Level
/// `error!` - The relay will not start
pub struct ValidationFailed {
    pub error_count: usize,
}

impl Display for ValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration validation failed with {} error(s)",
            self.error_count
        )
    }
}

impl StructuredLog for ValidationFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "validation_failed",
            span_name = name,
            error_count = self.error_count,
        )
    }
}
