// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use async_trait::async_trait;

use crate::traits::dispatcher::Quota;

/// How a scheduled operation ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskOutcome {
    /// Done; `quota` feeds the scheduler's pacing
    Completed { quota: Option<Quota> },
    /// Rejected by the remote side; the task wants to run again
    RateLimited { retry_after: Option<Duration> },
    /// Done, unsuccessfully; the task reported the failure itself
    Failed,
}

/// A unit of work run by the [`Scheduler`](crate::engine::Scheduler).
///
/// `run` may be called more than once when earlier attempts were rate
/// limited.
#[async_trait]
pub trait ScheduledTask: Send {
    async fn run(&mut self) -> TaskOutcome;

    /// Short description used in logs.
    fn describe(&self) -> String;
}
