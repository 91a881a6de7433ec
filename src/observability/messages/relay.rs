// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for relay runs.
//!
//! This module contains message types for logging events related to:
//! * Mapping lifecycle (start, completion)
//! * Checkpoint reads and writes
//! * Delivery and source task failures

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A mapping run is starting.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use feedsift::observability::messages::relay::MappingStarted;
///
/// let msg = MappingStarted {
///     mapping: "art",
///     source_count: 4,
///     channel_count: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct MappingStarted<'a> {
    pub mapping: &'a str,
    pub source_count: usize,
    pub channel_count: usize,
}

impl Display for MappingStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running mapping '{}': {} sources to {} channels",
            self.mapping, self.source_count, self.channel_count
        )
    }
}

impl StructuredLog for MappingStarted<'_> {
    fn log(&self) {
        tracing::info!(
            mapping = self.mapping,
            source_count = self.source_count,
            channel_count = self.channel_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "mapping",
            span_name = name,
            mapping = self.mapping,
            source_count = self.source_count,
        )
    }
}

/// A mapping run finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct MappingCompleted<'a> {
    pub mapping: &'a str,
    pub collected: usize,
    pub delivered: usize,
    pub failed: usize,
    pub duration: std::time::Duration,
}

impl Display for MappingCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Mapping '{}' completed in {:?}: {} items collected, {} deliveries sent, {} failed",
            self.mapping, self.duration, self.collected, self.delivered, self.failed
        )
    }
}

impl StructuredLog for MappingCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            mapping = self.mapping,
            collected = self.collected,
            delivered = self.delivered,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "mapping_completed",
            span_name = name,
            mapping = self.mapping,
            duration = ?self.duration,
        )
    }
}

/// The checkpoint map could not be read; the mapping is skipped.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use feedsift::observability::messages::relay::CheckpointReadFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
/// let msg = CheckpointReadFailed {
///     mapping: "art",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CheckpointReadFailed<'a> {
    pub mapping: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CheckpointReadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping mapping '{}': cannot read checkpoints: {}",
            self.mapping, self.error
        )
    }
}

impl StructuredLog for CheckpointReadFailed<'_> {
    fn log(&self) {
        tracing::error!(mapping = self.mapping, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "checkpoint_read_failed",
            span_name = name,
            mapping = self.mapping,
            error = %self.error,
        )
    }
}

/// The updated checkpoint map could not be written.
///
/// # Log Level
/// `error!` - Items may be delivered again next run
pub struct CheckpointWriteFailed<'a> {
    pub mapping: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CheckpointWriteFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to write checkpoints for mapping '{}': {}",
            self.mapping, self.error
        )
    }
}

impl StructuredLog for CheckpointWriteFailed<'_> {
    fn log(&self) {
        tracing::error!(mapping = self.mapping, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "checkpoint_write_failed",
            span_name = name,
            mapping = self.mapping,
            error = %self.error,
        )
    }
}

pub struct DeliveryFailed<'a> {
    pub destination: &'a str,
    pub uri: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DeliveryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to deliver {} to {}: {}",
            self.uri, self.destination, self.error
        )
    }
}

impl StructuredLog for DeliveryFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            destination = self.destination,
            uri = self.uri,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "delivery_failed",
            span_name = name,
            destination = self.destination,
            uri = self.uri,
        )
    }
}

/// A source's retrieval task ended abnormally; the other sources continue.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct SourceTaskFailed<'a> {
    pub mapping: &'a str,
    pub source: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for SourceTaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Retrieval task for {} in mapping '{}' failed: {}",
            self.source, self.mapping, self.error
        )
    }
}

impl StructuredLog for SourceTaskFailed<'_> {
    fn log(&self) {
        tracing::error!(
            mapping = self.mapping,
            source = self.source,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "source_task_failed",
            span_name = name,
            mapping = self.mapping,
            source = self.source,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_mapping_completed_display() {
        let msg = MappingCompleted {
            mapping: "art",
            collected: 3,
            delivered: 6,
            failed: 0,
            duration: Duration::from_millis(1500),
        };
        assert_eq!(
            msg.to_string(),
            "Mapping 'art' completed in 1.5s: 3 items collected, 6 deliveries sent, 0 failed"
        );
    }

    #[test]
    fn test_checkpoint_read_failed_display() {
        let error = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let msg = CheckpointReadFailed {
            mapping: "art",
            error: &error,
        };
        assert_eq!(
            msg.to_string(),
            "Skipping mapping 'art': cannot read checkpoints: disk on fire"
        );
    }
}
