// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the dispatch scheduler.
//!
//! This module contains message types for logging events related to:
//! * Scheduler startup and shutdown
//! * Rate-limit rejections and the pauses they cause
//! * Quota-driven spacing between operations

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Scheduler consumer task started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use feedsift::observability::messages::scheduler::SchedulerStarted;
/// use std::time::Duration;
///
/// let msg = SchedulerStarted {
///     interval: Duration::from_millis(25),
///     default_pause: Duration::from_secs(60),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SchedulerStarted {
    pub interval: Duration,
    pub default_pause: Duration,
}

impl Display for SchedulerStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatch scheduler started: one operation every {:?}, default rate-limit pause {:?}",
            self.interval, self.default_pause
        )
    }
}

impl StructuredLog for SchedulerStarted {
    fn log(&self) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            default_pause_ms = self.default_pause.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "scheduler",
            span_name = name,
            interval = ?self.interval,
        )
    }
}

/// A task was rejected for rate limiting and will be retried first.
///
/// # Log Level
/// `warn!` - Remote side is pushing back
///
/// # Example
/// ```
/// use feedsift::observability::messages::scheduler::TaskRateLimited;
/// use std::time::Duration;
///
/// let msg = TaskRateLimited {
///     task: "deliver to 1234",
///     pause: Duration::from_millis(1500),
///     hinted: true,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct TaskRateLimited<'a> {
    pub task: &'a str,
    pub pause: Duration,
    /// Whether the pause came from the remote side's hint
    pub hinted: bool,
}

impl Display for TaskRateLimited<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rate limited on {}; pausing {:?}{} before retrying",
            self.task,
            self.pause,
            if self.hinted { "" } else { " (default)" }
        )
    }
}

impl StructuredLog for TaskRateLimited<'_> {
    fn log(&self) {
        tracing::warn!(
            task = self.task,
            pause_ms = self.pause.as_millis() as u64,
            hinted = self.hinted,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "task_rate_limited",
            span_name = name,
            task = self.task,
            pause = ?self.pause,
        )
    }
}

/// Quota feedback set the minimum gap before the next operation.
///
/// # Log Level
/// `debug!` - Pacing detail
pub struct QuotaSpacingApplied {
    pub remaining: u32,
    pub reset_after: Duration,
    pub spacing: Duration,
}

impl Display for QuotaSpacingApplied {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} calls left, reset in {:?}; next operation no sooner than {:?}",
            self.remaining, self.reset_after, self.spacing
        )
    }
}

impl StructuredLog for QuotaSpacingApplied {
    fn log(&self) {
        tracing::debug!(
            remaining = self.remaining,
            reset_after_ms = self.reset_after.as_millis() as u64,
            spacing_ms = self.spacing.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "quota_spacing",
            span_name = name,
            remaining = self.remaining,
        )
    }
}

/// Scheduler consumer task stopped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SchedulerStopped {
    /// Tasks still queued when the scheduler stopped; they are dropped
    pub pending: usize,
}

impl Display for SchedulerStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatch scheduler stopped with {} queued operations",
            self.pending
        )
    }
}

impl StructuredLog for SchedulerStopped {
    fn log(&self) {
        tracing::info!(pending = self.pending, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("scheduler_stopped", span_name = name, pending = self.pending)
    }
}
