// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Every check runs over the whole configuration and the problems are
//! collected, so one pass reports everything wrong with a file:
//!
//! 1. **Credentials**: a token or a token environment variable is named
//! 2. **Scheduler budget**: operations per window and the window are non-zero,
//!    with no more operations than nanoseconds in the window
//! 3. **Lookback**: the first-run lookback is a representable, non-negative span
//! 4. **Mapping names**: unique across the file
//! 5. **State files**: no two mappings write the same checkpoint file
//! 6. **Per mapping**: at least one channel, source keys unique, filters parse
//!
//! # Examples
//!
//! ```rust
//! use feedsift::config::{parse_config, validate_config};
//! use feedsift::errors::ValidationError;
//! use std::path::Path;
//!
//! let yaml = r#"
//! token: t
//! bot_owner_uri: https://example.org
//! mappings:
//!   - name: cats
//!     state: cats.tsv
//!     sources:
//!       - type: author
//!         did: did:plc:abc
//! "#;
//! let config = parse_config(Path::new("relay.yaml"), yaml).unwrap();
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert_eq!(errors, vec![ValidationError::NoChannels { mapping: "cats".into() }]);
//! ```

use std::collections::{HashMap, HashSet};

use chrono::TimeDelta;

use crate::config::{Config, MappingConfig};
use crate::errors::ValidationError;

/// Checks a loaded configuration, returning every problem found.
pub fn validate_config(cfg: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if cfg.token.is_none() && cfg.token_env.is_none() {
        errors.push(ValidationError::NoToken);
    }

    let scheduler = &cfg.scheduler;
    if scheduler.operations_per_window == 0 || scheduler.window_ms == 0 {
        errors.push(ValidationError::ZeroOperationBudget);
    } else if u128::from(scheduler.window_ms) * 1_000_000 < u128::from(scheduler.operations_per_window) {
        errors.push(ValidationError::OperationBudgetTooDense {
            operations_per_window: scheduler.operations_per_window,
            window_ms: scheduler.window_ms,
        });
    }

    let hours = cfg.retrieval.first_run_lookback_hours;
    if hours < 0 || TimeDelta::try_hours(hours).is_none() {
        errors.push(ValidationError::InvalidLookback { hours });
    }

    validate_unique_names(cfg, &mut errors);
    validate_state_files(cfg, &mut errors);
    for mapping in &cfg.mappings {
        validate_mapping(mapping, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_names(cfg: &Config, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for mapping in &cfg.mappings {
        if !seen.insert(mapping.name.as_str()) && reported.insert(mapping.name.as_str()) {
            errors.push(ValidationError::DuplicateMappingName {
                name: mapping.name.clone(),
            });
        }
    }
}

fn validate_state_files(cfg: &Config, errors: &mut Vec<ValidationError>) {
    let mut owners: HashMap<&std::path::Path, &str> = HashMap::new();
    for mapping in &cfg.mappings {
        if let Some(first) = owners.insert(mapping.state.as_path(), mapping.name.as_str()) {
            errors.push(ValidationError::SharedStateFile {
                path: mapping.state.display().to_string(),
                first: first.to_string(),
                second: mapping.name.clone(),
            });
        }
    }
}

fn validate_mapping(mapping: &MappingConfig, errors: &mut Vec<ValidationError>) {
    if mapping.channels.is_empty() {
        errors.push(ValidationError::NoChannels {
            mapping: mapping.name.clone(),
        });
    }

    let mut keys = HashSet::new();
    for source in &mapping.sources {
        let key = source.key();
        if let Err(error) = source.filter_expr() {
            errors.push(ValidationError::InvalidFilter {
                mapping: mapping.name.clone(),
                key: key.clone(),
                error,
            });
        }
        if !keys.insert(key.clone()) {
            errors.push(ValidationError::DuplicateSourceKey {
                mapping: mapping.name.clone(),
                key,
            });
        }
    }
}
