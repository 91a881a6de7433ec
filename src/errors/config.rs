// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::ParseError;

/// Errors that can occur while loading a relay configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("environment variable '{name}' named by token_env is not set")]
    MissingTokenEnv { name: String },

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors found while validating a loaded configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two mappings share a name
    DuplicateMappingName {
        /// The repeated mapping name
        name: String,
    },
    /// Two sources in one mapping resolve to the same checkpoint key
    DuplicateSourceKey {
        /// The mapping holding both sources
        mapping: String,
        /// The shared checkpoint key
        key: String,
    },
    /// A mapping has nowhere to deliver to
    NoChannels {
        /// The mapping without channels
        mapping: String,
    },
    /// Two mappings would overwrite each other's checkpoints
    SharedStateFile {
        /// The state file path as configured
        path: String,
        first: String,
        second: String,
    },
    /// Neither `token` nor `token_env` is set
    NoToken,
    /// The scheduler budget would never let an operation through
    ZeroOperationBudget,
    /// More operations per window than there are nanoseconds in it
    OperationBudgetTooDense {
        operations_per_window: u32,
        window_ms: u64,
    },
    /// The first-run lookback is negative or too large to represent
    InvalidLookback {
        /// The configured number of hours
        hours: i64,
    },
    /// A source filter does not parse
    InvalidFilter {
        /// The mapping holding the source
        mapping: String,
        /// Checkpoint key of the source
        key: String,
        /// The parser's complaint
        error: ParseError,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateMappingName { name } => {
                write!(f, "Duplicate mapping name: '{}'", name)
            }
            ValidationError::DuplicateSourceKey { mapping, key } => {
                write!(
                    f,
                    "Mapping '{}' lists source '{}' more than once",
                    mapping, key
                )
            }
            ValidationError::NoChannels { mapping } => {
                write!(f, "Mapping '{}' has no channels to deliver to", mapping)
            }
            ValidationError::SharedStateFile {
                path,
                first,
                second,
            } => {
                write!(
                    f,
                    "Mappings '{}' and '{}' share state file '{}'",
                    first, second, path
                )
            }
            ValidationError::NoToken => {
                write!(f, "One of token or token_env must be set")
            }
            ValidationError::ZeroOperationBudget => {
                write!(f, "scheduler.operations_per_window and scheduler.window_ms must both be greater than zero")
            }
            ValidationError::OperationBudgetTooDense {
                operations_per_window,
                window_ms,
            } => {
                write!(
                    f,
                    "scheduler.operations_per_window ({}) exceeds the nanoseconds in scheduler.window_ms ({})",
                    operations_per_window, window_ms
                )
            }
            ValidationError::InvalidLookback { hours } => {
                write!(
                    f,
                    "retrieval.first_run_lookback_hours ({}) must be zero or more and fit in a duration",
                    hours
                )
            }
            ValidationError::InvalidFilter {
                mapping,
                key,
                error,
            } => {
                write!(
                    f,
                    "Filter for source '{}' in mapping '{}' does not parse: {}",
                    key, mapping, error
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
