// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::config::consts::{
    DEFAULT_ACCEPT_LIMIT, DEFAULT_BLUESKY_BASE_URL, DEFAULT_DISCORD_BASE_URL,
    DEFAULT_FIRST_RUN_LIMIT, DEFAULT_FIRST_RUN_LOOKBACK_HOURS, DEFAULT_MESSAGE_PREFIX,
    DEFAULT_OPERATIONS_PER_WINDOW, DEFAULT_PAUSE_SECS, DEFAULT_USER_AGENT, DEFAULT_WINDOW_MS,
};
use crate::engine::{RetrievalLimits, SchedulerOptions};
use crate::errors::{ConfigError, ParseError};
use crate::feed::SourceTarget;
use crate::fisp::{parse, Expr, FilterBuilder};

/// Main configuration structure for the relay.
///
/// Holds the notifier credentials, pacing and retrieval tuning, and the
/// mappings that tie feed sources to destination channels. It is typically
/// loaded from a YAML file, though TOML and JSON are accepted too.
///
/// # Fields
/// * `token` / `token_env` - Bot token, inline or named by an environment variable
/// * `bot_owner_uri` / `bot_version` - Identify the bot in its `User-Agent`
/// * `user_agent` - `User-Agent` sent to the feed API
/// * `message_prefix` - Text placed before every delivered link
/// * `scheduler` - Dispatch pacing (optional)
/// * `retrieval` - Accept limits and first-run window (optional)
/// * `mappings` - Sources, channels and state file per mapping
///
/// # Example
/// ```yaml
/// token_env: DISCORD_TOKEN
/// bot_owner_uri: https://example.org/feedsift
/// scheduler:
///   operations_per_window: 5
///   window_ms: 1000
/// mappings:
///   - name: cats
///     state: state/cats.tsv
///     channels: ["1234567890"]
///     sources:
///       - type: author
///         did: did:plc:abc
///         include_reposts: false
///       - type: generator
///         did: did:plc:def
///         feed_key: cats
///         filter: (contains_regex "(?i)kitten")
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_env: Option<String>,
    pub bot_owner_uri: String,
    #[serde(default = "default_bot_version")]
    pub bot_version: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_message_prefix")]
    pub message_prefix: String,
    #[serde(default = "default_bluesky_base_url")]
    pub bluesky_base_url: String,
    #[serde(default = "default_discord_base_url")]
    pub discord_base_url: String,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    pub mappings: Vec<MappingConfig>,
}

fn default_bot_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_message_prefix() -> String {
    DEFAULT_MESSAGE_PREFIX.to_string()
}

fn default_bluesky_base_url() -> String {
    DEFAULT_BLUESKY_BASE_URL.to_string()
}

fn default_discord_base_url() -> String {
    DEFAULT_DISCORD_BASE_URL.to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// The bot token, read from the environment when `token_env` is used.
    /// An inline `token` wins over `token_env`.
    pub fn resolve_token(&self) -> Result<String, ConfigError> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        let name = self.token_env.clone().unwrap_or_default();
        std::env::var(&name).map_err(|_| ConfigError::MissingTokenEnv { name })
    }

    pub fn source_count(&self) -> usize {
        self.mappings.iter().map(|m| m.sources.len()).sum()
    }
}

/// Dispatch pacing.
///
/// # Example
/// ```yaml
/// scheduler:
///   operations_per_window: 40
///   window_ms: 1000
///   default_pause_secs: 60
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub operations_per_window: u32,
    pub window_ms: u64,
    pub default_pause_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            operations_per_window: DEFAULT_OPERATIONS_PER_WINDOW,
            window_ms: DEFAULT_WINDOW_MS,
            default_pause_secs: DEFAULT_PAUSE_SECS,
        }
    }
}

impl SchedulerConfig {
    pub fn options(&self) -> SchedulerOptions {
        SchedulerOptions {
            operations_per_window: self.operations_per_window,
            window: Duration::from_millis(self.window_ms),
            default_pause: Duration::from_secs(self.default_pause_secs),
        }
    }
}

/// Accept limits and the first-run window.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub accept_limit: usize,
    pub first_run_limit: usize,
    pub first_run_lookback_hours: i64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            accept_limit: DEFAULT_ACCEPT_LIMIT,
            first_run_limit: DEFAULT_FIRST_RUN_LIMIT,
            first_run_lookback_hours: DEFAULT_FIRST_RUN_LOOKBACK_HOURS,
        }
    }
}

impl RetrievalConfig {
    pub fn limits(&self) -> RetrievalLimits {
        RetrievalLimits {
            accept_limit: self.accept_limit,
            first_run_limit: self.first_run_limit,
            first_run_lookback: chrono::Duration::try_hours(self.first_run_lookback_hours.max(0))
                .unwrap_or(chrono::Duration::MAX),
        }
    }
}

/// Sources relayed to a set of channels, with their checkpoints kept in
/// `state`.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    pub name: String,
    pub state: PathBuf,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// One feed source.
///
/// # Example
/// ```yaml
/// - type: author
///   did: did:plc:abc
///   include_reposts: false
///   include_without_embed: false
/// - type: generator
///   did: did:plc:def
///   feed_key: cats
///   filter: ["not", ["is_retweet"]]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Author {
        did: String,
        #[serde(default = "default_true")]
        include_reposts: bool,
        #[serde(default = "default_true")]
        include_without_embed: bool,
        #[serde(default)]
        filter: Option<FilterSource>,
    },
    Generator {
        did: String,
        feed_key: String,
        #[serde(default)]
        filter: Option<FilterSource>,
    },
}

/// A user filter, written either as Fisp text or as a nested list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterSource {
    Text(String),
    Tree(Value),
}

impl FilterSource {
    pub fn to_expr(&self) -> Result<Expr, ParseError> {
        match self {
            FilterSource::Text(text) => parse(text),
            FilterSource::Tree(tree) => Ok(Expr::from_json(tree)),
        }
    }
}

impl SourceConfig {
    pub fn target(&self) -> SourceTarget {
        match self {
            SourceConfig::Author { did, .. } => SourceTarget::Author { did: did.clone() },
            SourceConfig::Generator { did, feed_key, .. } => SourceTarget::Generator {
                did: did.clone(),
                feed_key: feed_key.clone(),
            },
        }
    }

    pub fn key(&self) -> String {
        self.target().key()
    }

    /// The source's complete predicate: the author switches as clauses,
    /// then the user filter, all under one `all_of`.
    pub fn filter_expr(&self) -> Result<Expr, ParseError> {
        let (mut builder, filter) = match self {
            SourceConfig::Author {
                include_reposts,
                include_without_embed,
                filter,
                ..
            } => {
                let mut builder = FilterBuilder::new();
                if !include_reposts {
                    builder = builder.exclude_reposts();
                }
                if !include_without_embed {
                    builder = builder.require_embed();
                }
                (builder, filter)
            }
            SourceConfig::Generator { filter, .. } => (FilterBuilder::new(), filter),
        };
        if let Some(filter) = filter {
            builder = builder.clause(filter.to_expr()?);
        }
        Ok(builder.build_expr())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Parses configuration text in the format implied by `path`'s extension.
pub fn parse_config(path: &Path, content: &str) -> Result<Config, ConfigError> {
    Ok(match Format::of(path) {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Toml => toml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    })
}

/// Load a config file. `.toml` and `.json` files are read as such, anything
/// else as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(path, &content)
}

/// Load a config and check it with [`validate_config`](crate::config::validate_config),
/// reporting every problem found rather than the first.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
