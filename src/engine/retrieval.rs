// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Paginated, checkpointed retrieval of one feed source.
//!
//! For each source the [`Retriever`] walks the feed page by page, newest page
//! first, and stops as soon as one of these no longer holds:
//!
//! - the oldest item seen so far is still newer than the cutoff
//! - fewer items than the accept limit have been accepted
//! - the page came with a cursor
//! - that cursor differs from the one used to fetch the page
//!
//! A source with a checkpoint uses it as the cutoff and the regular accept
//! limit. A source without one uses the first-run limit and `now - lookback`
//! so a new source cannot flood its channels.
//!
//! A failing page fetch ends that source's pagination with whatever was
//! accepted before it. An item whose filter fails to evaluate is logged and
//! rejected.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::Instrument;

use crate::config::consts::{DEFAULT_ACCEPT_LIMIT, DEFAULT_FIRST_RUN_LIMIT, DEFAULT_FIRST_RUN_LOOKBACK_HOURS};
use crate::errors::FetchError;
use crate::feed::{FeedItem, FeedPage, SourceTarget};
use crate::fisp::CompiledFilter;
use crate::observability::messages::retrieval::{
    FilterEvaluationFailed, PageFetchFailed, PageFetched, RetrievalCompleted, RetrievalStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::FeedFetcher;

/// A configured feed plus the predicate its items must satisfy.
#[derive(Debug, Clone)]
pub struct Source {
    pub target: SourceTarget,
    pub filter: CompiledFilter,
}

impl Source {
    pub fn new(target: SourceTarget, filter: CompiledFilter) -> Self {
        Self { target, filter }
    }

    pub fn key(&self) -> String {
        self.target.key()
    }
}

/// Accept limits and the first-run window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalLimits {
    /// Most items accepted per run for a source with a checkpoint
    pub accept_limit: usize,
    /// Most items accepted for a source seen for the first time
    pub first_run_limit: usize,
    /// How far back a first run looks
    pub first_run_lookback: Duration,
}

impl Default for RetrievalLimits {
    fn default() -> Self {
        Self {
            accept_limit: DEFAULT_ACCEPT_LIMIT,
            first_run_limit: DEFAULT_FIRST_RUN_LIMIT,
            first_run_lookback: Duration::hours(DEFAULT_FIRST_RUN_LOOKBACK_HOURS),
        }
    }
}

/// Progress of one source's pagination.
#[derive(Debug, Clone)]
pub struct SourceState {
    pub key: String,
    /// Accepted items, ascending by creation time
    pub buffer: Vec<FeedItem>,
    pub newest_seen: Option<DateTime<Utc>>,
    pub oldest_seen: Option<DateTime<Utc>>,
    pub newest_accepted: Option<DateTime<Utc>>,
    pub cursor: Option<String>,
    pub limit: usize,
    /// Items at or before this instant are never accepted
    pub cutoff: DateTime<Utc>,
    pub pages: usize,
    pub done: bool,
}

impl SourceState {
    pub fn new(key: String, limit: usize, cutoff: DateTime<Utc>) -> Self {
        Self {
            key,
            buffer: Vec::new(),
            newest_seen: None,
            oldest_seen: None,
            newest_accepted: None,
            cursor: None,
            limit,
            cutoff,
            pages: 0,
            done: limit == 0,
        }
    }

    /// Folds one page into the state and decides whether another page is
    /// worth fetching.
    pub fn absorb(&mut self, page: FeedPage, filter: &CompiledFilter) {
        self.pages += 1;
        let previous_cursor = self.cursor.take();
        self.cursor = page.cursor;

        let mut items = page.items;
        items.sort_by_key(|item| item.created_at);

        for item in items {
            self.newest_seen = self.newest_seen.max(Some(item.created_at));
            self.oldest_seen = Some(match self.oldest_seen {
                Some(oldest) => oldest.min(item.created_at),
                None => item.created_at,
            });

            if item.created_at <= self.cutoff || self.buffer.len() >= self.limit {
                continue;
            }

            match filter.matches(&item) {
                Ok(true) => {
                    self.newest_accepted = self.newest_accepted.max(Some(item.created_at));
                    self.buffer.push(item);
                }
                Ok(false) => {}
                Err(error) => FilterEvaluationFailed {
                    source: &self.key,
                    uri: &item.uri,
                    error: &error,
                }
                .log(),
            }
        }
        self.buffer.sort_by_key(|item| item.created_at);

        let still_newer = self.oldest_seen.is_some_and(|oldest| oldest > self.cutoff);
        let under_limit = self.buffer.len() < self.limit;
        let cursor_moved = match (&self.cursor, &previous_cursor) {
            (Some(next), Some(previous)) => next != previous,
            (Some(_), None) => true,
            (None, _) => false,
        };
        self.done = !(still_newer && under_limit && cursor_moved);
    }

    /// `max(previous, newest accepted)`.
    pub fn checkpoint(&self, previous: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        previous.max(self.newest_accepted)
    }
}

/// What retrieving one source produced.
#[derive(Debug)]
pub struct SourceOutcome {
    pub key: String,
    /// Accepted items, ascending by creation time
    pub items: Vec<FeedItem>,
    /// New checkpoint; never earlier than the one passed in
    pub checkpoint: Option<DateTime<Utc>>,
    pub pages: usize,
    /// The fetch failure that cut pagination short, if any
    pub error: Option<FetchError>,
}

/// Drives pagination for sources through a [`FeedFetcher`].
pub struct Retriever {
    fetcher: Arc<dyn FeedFetcher>,
    limits: RetrievalLimits,
}

impl Retriever {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, limits: RetrievalLimits) -> Self {
        Self { fetcher, limits }
    }

    pub fn limits(&self) -> &RetrievalLimits {
        &self.limits
    }

    pub async fn retrieve(&self, source: &Source, previous: Option<DateTime<Utc>>) -> SourceOutcome {
        self.retrieve_at(source, previous, Utc::now()).await
    }

    /// Like [`retrieve`](Self::retrieve) with an explicit clock reading for the
    /// first-run window.
    pub async fn retrieve_at(
        &self,
        source: &Source,
        previous: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> SourceOutcome {
        let (limit, cutoff) = match previous {
            Some(checkpoint) => (self.limits.accept_limit, checkpoint),
            None => (
                self.limits.first_run_limit,
                now.checked_sub_signed(self.limits.first_run_lookback)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            ),
        };
        let state = SourceState::new(source.key(), limit, cutoff);

        let started = RetrievalStarted {
            source: &state.key,
            cutoff,
            limit,
            first_run: previous.is_none(),
        };
        let span = started.span("source_retrieval");
        span.in_scope(|| started.log());

        self.paginate(source, previous, state).instrument(span).await
    }

    async fn paginate(
        &self,
        source: &Source,
        previous: Option<DateTime<Utc>>,
        mut state: SourceState,
    ) -> SourceOutcome {
        let mut error = None;
        while !state.done {
            match self
                .fetcher
                .fetch_page(&source.target, state.cursor.as_deref())
                .await
            {
                Ok(page) => {
                    PageFetched {
                        source: &state.key,
                        page: state.pages + 1,
                        item_count: page.items.len(),
                        cursor: page.cursor.as_deref(),
                    }
                    .log();
                    state.absorb(page, &source.filter);
                }
                Err(e) => {
                    PageFetchFailed {
                        source: &state.key,
                        page: state.pages + 1,
                        error: &e,
                    }
                    .log();
                    error = Some(e);
                    break;
                }
            }
        }

        let checkpoint = state.checkpoint(previous);
        RetrievalCompleted {
            source: &state.key,
            pages: state.pages,
            accepted: state.buffer.len(),
            checkpoint,
        }
        .log();

        SourceOutcome {
            key: state.key,
            items: state.buffer,
            checkpoint,
            pages: state.pages,
            error,
        }
    }
}
