// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::{BlueskyFetcher, CheckpointFile, DiscordDispatcher};
use crate::config::Config;
use crate::engine::{Mapping, Relay, Retriever, Scheduler, Source};
use crate::errors::{ConfigError, ValidationError};
use crate::fisp::{CompiledFilter, FunctionRegistry};
use crate::traits::{Dispatcher, FeedFetcher};

/// Relay builder - turns a validated configuration into a runnable [`Relay`].
///
/// The builder compiles each source's filter against one shared
/// [`FunctionRegistry`], gives every mapping a [`CheckpointFile`] at its
/// `state` path, and starts the dispatch [`Scheduler`] with the configured
/// budget. The scheduler's consumer is spawned on the current tokio runtime,
/// so building must happen inside one.
///
/// # Examples
///
/// ```no_run
/// use feedsift::config::{load_and_validate_config, RelayBuilder};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_and_validate_config("feedsift.yaml")?;
/// let relay = RelayBuilder::from_config(&config)?;
///
/// let report = relay.run().await;
/// relay.scheduler().shutdown().await;
/// println!("delivered {}", report.delivered());
/// # Ok(())
/// # }
/// ```
pub struct RelayBuilder;

impl RelayBuilder {
    /// Build a relay talking to the Bluesky AppView and Discord, as
    /// configured.
    pub fn from_config(cfg: &Config) -> Result<Relay, ConfigError> {
        let token = cfg.resolve_token()?;
        let fetcher = BlueskyFetcher::with_base_url(&cfg.bluesky_base_url, &cfg.user_agent);
        let dispatcher = DiscordDispatcher::with_base_url(
            &cfg.discord_base_url,
            &token,
            &cfg.bot_owner_uri,
            &cfg.bot_version,
        );
        Self::with_collaborators(
            cfg,
            Arc::new(FunctionRegistry::with_builtins()),
            Arc::new(fetcher),
            Arc::new(dispatcher),
        )
    }

    /// Build a relay around caller-supplied collaborators.
    pub fn with_collaborators(
        cfg: &Config,
        registry: Arc<FunctionRegistry>,
        fetcher: Arc<dyn FeedFetcher>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Relay, ConfigError> {
        let mappings = Self::build_mappings(cfg, &registry)?;
        let retriever = Retriever::new(fetcher, cfg.retrieval.limits());
        let scheduler = Scheduler::start(cfg.scheduler.options());
        Ok(Relay::new(
            mappings,
            Arc::new(retriever),
            dispatcher,
            Arc::new(scheduler),
            &cfg.message_prefix,
        ))
    }

    /// Compile every mapping's sources. Each source's filter is evaluated
    /// with the source's account as the owner for self-authorship checks.
    pub fn build_mappings(
        cfg: &Config,
        registry: &Arc<FunctionRegistry>,
    ) -> Result<Vec<Mapping>, ConfigError> {
        cfg.mappings
            .iter()
            .map(|mapping| {
                let sources = mapping
                    .sources
                    .iter()
                    .map(|source| {
                        let target = source.target();
                        let expr = source.filter_expr().map_err(|error| {
                            ConfigError::Invalid(vec![ValidationError::InvalidFilter {
                                mapping: mapping.name.clone(),
                                key: target.key(),
                                error,
                            }])
                        })?;
                        let owner = Some(target.owner().to_string());
                        let filter = CompiledFilter::new(expr, Arc::clone(registry), owner);
                        Ok(Source::new(target, filter))
                    })
                    .collect::<Result<Vec<_>, ConfigError>>()?;

                Ok(Mapping {
                    name: mapping.name.clone(),
                    sources,
                    channels: mapping.channels.clone(),
                    checkpoints: Arc::new(CheckpointFile::new(&mapping.state)),
                })
            })
            .collect()
    }
}
