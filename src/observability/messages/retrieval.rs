// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for paginated feed retrieval.

use crate::observability::messages::StructuredLog;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Retrieval of one source is starting.
///
/// # Log Level
/// `debug!` - Per-source detail
///
/// # Example
/// ```
/// use chrono::Utc;
/// use feedsift::observability::messages::retrieval::RetrievalStarted;
///
/// let msg = RetrievalStarted {
///     source: "did:plc:abc",
///     cutoff: Utc::now(),
///     limit: 100,
///     first_run: false,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct RetrievalStarted<'a> {
    pub source: &'a str,
    pub cutoff: DateTime<Utc>,
    pub limit: usize,
    pub first_run: bool,
}

impl Display for RetrievalStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Retrieving {}: items after {}, limit {}{}",
            self.source,
            self.cutoff.to_rfc3339(),
            self.limit,
            if self.first_run { " (first run)" } else { "" }
        )
    }
}

impl StructuredLog for RetrievalStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            source = self.source,
            cutoff = %self.cutoff.to_rfc3339(),
            limit = self.limit,
            first_run = self.first_run,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "retrieval",
            span_name = name,
            source = self.source,
            limit = self.limit,
            first_run = self.first_run,
        )
    }
}

/// A page arrived.
///
/// # Log Level
/// `debug!` - Per-page detail
pub struct PageFetched<'a> {
    pub source: &'a str,
    pub page: usize,
    pub item_count: usize,
    pub cursor: Option<&'a str>,
}

impl Display for PageFetched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fetched page {} of {}: {} items, next cursor {}",
            self.page,
            self.source,
            self.item_count,
            self.cursor.unwrap_or("<none>")
        )
    }
}

impl StructuredLog for PageFetched<'_> {
    fn log(&self) {
        tracing::debug!(
            source = self.source,
            page = self.page,
            item_count = self.item_count,
            cursor = self.cursor,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "page_fetched",
            span_name = name,
            source = self.source,
            page = self.page,
        )
    }
}

/// A page could not be fetched; retrieval of the source ends with what it
/// already has.
///
/// # Log Level
/// `warn!` - Degraded operation
///
/// # Example
/// ```
/// use feedsift::observability::messages::retrieval::PageFetchFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "timeout");
/// let msg = PageFetchFailed {
///     source: "did:plc:abc",
///     page: 1,
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct PageFetchFailed<'a> {
    pub source: &'a str,
    pub page: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for PageFetchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to fetch page {} of {}: {}",
            self.page, self.source, self.error
        )
    }
}

impl StructuredLog for PageFetchFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            source = self.source,
            page = self.page,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "page_fetch_failed",
            span_name = name,
            source = self.source,
            page = self.page,
            error = %self.error,
        )
    }
}

/// The filter could not be evaluated for an item, which is then rejected.
///
/// # Log Level
/// `warn!` - Usually a mistake in the filter text
pub struct FilterEvaluationFailed<'a> {
    pub source: &'a str,
    pub uri: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for FilterEvaluationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Filter for {} failed on {}, rejecting it: {}",
            self.source, self.uri, self.error
        )
    }
}

impl StructuredLog for FilterEvaluationFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            source = self.source,
            uri = self.uri,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "filter_evaluation_failed",
            span_name = name,
            source = self.source,
            uri = self.uri,
        )
    }
}

/// Retrieval of one source finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RetrievalCompleted<'a> {
    pub source: &'a str,
    pub pages: usize,
    pub accepted: usize,
    pub checkpoint: Option<DateTime<Utc>>,
}

impl Display for RetrievalCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Retrieved {}: {} items accepted over {} pages",
            self.source, self.accepted, self.pages
        )?;
        if let Some(checkpoint) = self.checkpoint {
            write!(f, ", checkpoint {}", checkpoint.to_rfc3339())?;
        }
        Ok(())
    }
}

impl StructuredLog for RetrievalCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            source = self.source,
            pages = self.pages,
            accepted = self.accepted,
            checkpoint = ?self.checkpoint,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "retrieval_completed",
            span_name = name,
            source = self.source,
            accepted = self.accepted,
        )
    }
}
