// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One polling pass over every configured mapping.
//!
//! Mappings run concurrently. Within a mapping:
//!
//! 1. read the checkpoint map (a failure skips the mapping)
//! 2. retrieve every source on its own task and join them in order
//! 3. advance each source's checkpoint, merge and sort accepted items
//! 4. submit one delivery per channel and item to the scheduler, then wait
//! 5. write the checkpoint map

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::errors::CheckpointError;
use crate::feed::FeedItem;
use crate::observability::messages::relay::{
    CheckpointReadFailed, CheckpointWriteFailed, MappingCompleted, MappingStarted, SourceTaskFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{CheckpointStore, Dispatcher};

use super::retrieval::{Retriever, Source};
use super::scheduler::{DeliveryTask, Scheduler};

/// Renders the message announcing `item`: `<prefix> https://fxbsky.app/profile/<did>/post/<rkey>`.
///
/// `None` when the item's URI has no record key.
pub fn render_message(prefix: &str, item: &FeedItem) -> Option<String> {
    let did = item.uri_authority().unwrap_or(&item.author);
    let rkey = item.record_key()?;
    let link = format!("https://fxbsky.app/profile/{}/post/{}", did, rkey);
    Some(if prefix.is_empty() {
        link
    } else {
        format!("{} {}", prefix, link)
    })
}

/// A named set of sources sharing a checkpoint store and destinations.
pub struct Mapping {
    pub name: String,
    pub sources: Vec<Source>,
    pub channels: Vec<String>,
    pub checkpoints: Arc<dyn CheckpointStore>,
}

/// Why a mapping did not finish cleanly.
#[derive(Debug)]
pub enum MappingFailure {
    CheckpointRead(CheckpointError),
    CheckpointWrite(CheckpointError),
    /// The mapping's task panicked or was cancelled
    Aborted(String),
}

#[derive(Debug)]
pub struct MappingReport {
    pub mapping: String,
    /// Items accepted across all sources
    pub collected: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
    /// Keys of sources whose retrieval stopped on an error
    pub failed_sources: Vec<String>,
    pub failure: Option<MappingFailure>,
}

impl MappingReport {
    fn new(mapping: &str) -> Self {
        Self {
            mapping: mapping.to_string(),
            collected: 0,
            delivered: 0,
            failed_deliveries: 0,
            failed_sources: Vec::new(),
            failure: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failure.is_none() && self.failed_sources.is_empty() && self.failed_deliveries == 0
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub mappings: Vec<MappingReport>,
}

impl RunReport {
    pub fn delivered(&self) -> usize {
        self.mappings.iter().map(|m| m.delivered).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.mappings.iter().all(MappingReport::is_clean)
    }
}

#[derive(Clone)]
struct RelayContext {
    retriever: Arc<Retriever>,
    dispatcher: Arc<dyn Dispatcher>,
    scheduler: Arc<Scheduler>,
    message_prefix: Arc<str>,
}

/// Runs mappings through retrieval, dispatch and checkpointing.
pub struct Relay {
    mappings: Vec<Arc<Mapping>>,
    context: RelayContext,
}

impl Relay {
    pub fn new(
        mappings: Vec<Mapping>,
        retriever: Arc<Retriever>,
        dispatcher: Arc<dyn Dispatcher>,
        scheduler: Arc<Scheduler>,
        message_prefix: &str,
    ) -> Self {
        Self {
            mappings: mappings.into_iter().map(Arc::new).collect(),
            context: RelayContext {
                retriever,
                dispatcher,
                scheduler,
                message_prefix: Arc::from(message_prefix),
            },
        }
    }

    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter().map(Arc::as_ref)
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.context.scheduler
    }

    /// Runs every mapping once and reports on each, in configuration order.
    pub async fn run(&self) -> RunReport {
        let handles: Vec<_> = self
            .mappings
            .iter()
            .map(|mapping| {
                let mapping = Arc::clone(mapping);
                let context = self.context.clone();
                let span = MappingStarted {
                    mapping: &mapping.name,
                    source_count: mapping.sources.len(),
                    channel_count: mapping.channels.len(),
                }
                .span("mapping_run");
                tokio::spawn(async move { run_mapping(&mapping, &context).await }.instrument(span))
            })
            .collect();

        let mut report = RunReport::default();
        for (mapping, handle) in self.mappings.iter().zip(handles) {
            report.mappings.push(match handle.await {
                Ok(mapping_report) => mapping_report,
                Err(e) => {
                    let mut aborted = MappingReport::new(&mapping.name);
                    aborted.failure = Some(MappingFailure::Aborted(e.to_string()));
                    aborted
                }
            });
        }
        report
    }
}

async fn run_mapping(mapping: &Arc<Mapping>, context: &RelayContext) -> MappingReport {
    let started = Instant::now();
    let mut report = MappingReport::new(&mapping.name);
    MappingStarted {
        mapping: &mapping.name,
        source_count: mapping.sources.len(),
        channel_count: mapping.channels.len(),
    }
    .log();

    let mut checkpoints = match mapping.checkpoints.read().await {
        Ok(checkpoints) => checkpoints,
        Err(error) => {
            CheckpointReadFailed {
                mapping: &mapping.name,
                error: &error,
            }
            .log();
            report.failure = Some(MappingFailure::CheckpointRead(error));
            return report;
        }
    };

    let tasks: Vec<_> = (0..mapping.sources.len())
        .map(|index| {
            let mapping = Arc::clone(mapping);
            let retriever = Arc::clone(&context.retriever);
            let previous = checkpoints.get(&mapping.sources[index].key());
            tokio::spawn(async move { retriever.retrieve(&mapping.sources[index], previous).await })
        })
        .collect();

    let mut items = Vec::new();
    for (source, task) in mapping.sources.iter().zip(tasks) {
        match task.await {
            Ok(outcome) => {
                if outcome.error.is_some() {
                    report.failed_sources.push(outcome.key.clone());
                }
                if let Some(checkpoint) = outcome.checkpoint {
                    checkpoints.advance(&outcome.key, checkpoint);
                }
                items.extend(outcome.items);
            }
            Err(error) => {
                let key = source.key();
                SourceTaskFailed {
                    mapping: &mapping.name,
                    source: &key,
                    error: &error,
                }
                .log();
                report.failed_sources.push(key);
            }
        }
    }
    items.sort_by_key(|item| item.created_at);
    report.collected = items.len();

    let mut pending = Vec::new();
    for channel in &mapping.channels {
        for item in &items {
            let Some(message) = render_message(&context.message_prefix, item) else {
                tracing::warn!(uri = %item.uri, "Skipping item without a record key");
                continue;
            };
            let (task, handle) =
                DeliveryTask::new(Arc::clone(&context.dispatcher), channel, &message, &item.uri);
            context.scheduler.submit(Box::new(task)).await;
            pending.push(handle);
        }
    }
    for handle in pending {
        match handle.wait().await {
            Ok(()) => report.delivered += 1,
            Err(_) => report.failed_deliveries += 1,
        }
    }

    if let Err(error) = mapping.checkpoints.write(&checkpoints).await {
        CheckpointWriteFailed {
            mapping: &mapping.name,
            error: &error,
        }
        .log();
        report.failure = Some(MappingFailure::CheckpointWrite(error));
    }

    MappingCompleted {
        mapping: &mapping.name,
        collected: report.collected,
        delivered: report.delivered,
        failed: report.failed_deliveries,
        duration: started.elapsed(),
    }
    .log();
    report
}
