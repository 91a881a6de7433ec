// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Adaptive rate-limited dispatch scheduler.
//!
//! A single consumer task drains a FIFO queue of [`ScheduledTask`]s. It
//! starts at most one operation per `window / operations_per_window` and
//! never starts one while the previous is still running. Two signals from
//! the tasks adjust that pace:
//!
//! - quota feedback (`remaining` calls left, `reset_after` until refill) sets
//!   a floor of `reset_after / remaining` before the next start, so spacing
//!   widens as the quota drains
//! - a rate-limit rejection pauses the consumer until the hinted resume time,
//!   or for the default pause when there is no hint, and puts the rejected
//!   task back at the head of the queue
//!
//! Rejected tasks are retried for as long as the remote side keeps rejecting
//! them.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use feedsift::engine::{DeliveryTask, Scheduler, SchedulerOptions};
//! # use feedsift::traits::{Dispatcher, DeliveryReport};
//! # use feedsift::errors::DispatchError;
//! # struct Console;
//! # #[async_trait::async_trait]
//! # impl Dispatcher for Console {
//! #     async fn deliver(&self, _: &str, _: &str) -> Result<DeliveryReport, DispatchError> {
//! #         Ok(DeliveryReport::Delivered { quota: None })
//! #     }
//! #     fn name(&self) -> &'static str { "console" }
//! # }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scheduler = Scheduler::start(SchedulerOptions {
//!     operations_per_window: 40,
//!     window: Duration::from_secs(1),
//!     default_pause: Duration::from_secs(60),
//! });
//!
//! let (task, handle) = DeliveryTask::new(Arc::new(Console), "1234", "hello", "at://x");
//! scheduler.submit(Box::new(task)).await;
//! handle.wait().await?;
//!
//! scheduler.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::consts::{DEFAULT_OPERATIONS_PER_WINDOW, DEFAULT_PAUSE_SECS, DEFAULT_WINDOW_MS};
use crate::errors::DispatchError;
use crate::observability::messages::relay::DeliveryFailed;
use crate::observability::messages::scheduler::{
    QuotaSpacingApplied, SchedulerStarted, SchedulerStopped, TaskRateLimited,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{DeliveryReport, Dispatcher, ScheduledTask, TaskOutcome};

/// Pacing budget for a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerOptions {
    pub operations_per_window: u32,
    pub window: Duration,
    /// Pause after a rate-limit rejection that came without a resume hint
    pub default_pause: Duration,
}

impl SchedulerOptions {
    /// Fixed gap between operation starts, never shorter than a nanosecond.
    pub fn interval(&self) -> Duration {
        (self.window / self.operations_per_window.max(1)).max(Duration::from_nanos(1))
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            operations_per_window: DEFAULT_OPERATIONS_PER_WINDOW,
            window: Duration::from_millis(DEFAULT_WINDOW_MS),
            default_pause: Duration::from_secs(DEFAULT_PAUSE_SECS),
        }
    }
}

type Queue = Mutex<VecDeque<Box<dyn ScheduledTask>>>;

struct Shared {
    queue: Queue,
    available: Notify,
}

/// Handle to a running scheduler. Submitting is safe from any number of
/// tasks at once.
pub struct Scheduler {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Spawns the consumer task on the current runtime.
    pub fn start(options: SchedulerOptions) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            available: Notify::new(),
        });
        let cancel = CancellationToken::new();
        let consumer = tokio::spawn(consume(Arc::clone(&shared), options, cancel.clone()));
        Self {
            shared,
            cancel,
            consumer: Mutex::new(Some(consumer)),
        }
    }

    /// Queues `task` behind everything already waiting.
    pub async fn submit(&self, task: Box<dyn ScheduledTask>) {
        self.shared.queue.lock().await.push_back(task);
        self.shared.available.notify_one();
    }

    /// Queues `task` ahead of everything already waiting.
    pub async fn retry(&self, task: Box<dyn ScheduledTask>) {
        self.shared.queue.lock().await.push_front(task);
        self.shared.available.notify_one();
    }

    pub async fn pending(&self) -> usize {
        self.shared.queue.lock().await.len()
    }

    /// Stops the consumer after the operation in flight, if any, and drops
    /// whatever is still queued.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(consumer) = self.consumer.lock().await.take() {
            if let Err(e) = consumer.await {
                tracing::error!(error = %e, "Dispatch scheduler consumer ended abnormally");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn next_task(shared: &Shared, cancel: &CancellationToken) -> Option<Box<dyn ScheduledTask>> {
    loop {
        if let Some(task) = shared.queue.lock().await.pop_front() {
            return Some(task);
        }
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = shared.available.notified() => {}
        }
    }
}

async fn consume(shared: Arc<Shared>, options: SchedulerOptions, cancel: CancellationToken) {
    let interval = options.interval();
    SchedulerStarted {
        interval,
        default_pause: options.default_pause,
    }
    .log();

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut not_before = Instant::now();

    while let Some(mut task) = next_task(&shared, &cancel).await {
        let paced = async {
            ticker.tick().await;
            tokio::time::sleep_until(not_before).await;
        };
        tokio::select! {
            _ = cancel.cancelled() => {
                shared.queue.lock().await.push_front(task);
                break;
            }
            _ = paced => {}
        }

        match task.run().await {
            TaskOutcome::Completed { quota: Some(quota) } => {
                let spacing = quota.spacing();
                QuotaSpacingApplied {
                    remaining: quota.remaining,
                    reset_after: quota.reset_after,
                    spacing,
                }
                .log();
                not_before = Instant::now() + spacing;
            }
            TaskOutcome::Completed { quota: None } | TaskOutcome::Failed => {}
            TaskOutcome::RateLimited { retry_after } => {
                let pause = retry_after.unwrap_or(options.default_pause);
                TaskRateLimited {
                    task: &task.describe(),
                    pause,
                    hinted: retry_after.is_some(),
                }
                .log();
                not_before = Instant::now() + pause;
                shared.queue.lock().await.push_front(task);
            }
        }
    }

    SchedulerStopped {
        pending: shared.queue.lock().await.len(),
    }
    .log();
}

/// Waits for a [`DeliveryTask`] to finish.
pub struct DeliveryHandle {
    receiver: oneshot::Receiver<Result<(), DispatchError>>,
}

impl DeliveryHandle {
    /// Resolves once the delivery succeeded or failed for good. A delivery
    /// dropped by a scheduler shutdown reports [`DispatchError::Abandoned`].
    pub async fn wait(self) -> Result<(), DispatchError> {
        self.receiver.await.unwrap_or(Err(DispatchError::Abandoned))
    }
}

/// Sends one message to one destination through a [`Dispatcher`].
pub struct DeliveryTask {
    dispatcher: Arc<dyn Dispatcher>,
    destination: String,
    message: String,
    uri: String,
    completion: Option<oneshot::Sender<Result<(), DispatchError>>>,
}

impl DeliveryTask {
    /// `uri` names the item being delivered, for logs.
    pub fn new(
        dispatcher: Arc<dyn Dispatcher>,
        destination: &str,
        message: &str,
        uri: &str,
    ) -> (Self, DeliveryHandle) {
        let (sender, receiver) = oneshot::channel();
        let task = Self {
            dispatcher,
            destination: destination.to_string(),
            message: message.to_string(),
            uri: uri.to_string(),
            completion: Some(sender),
        };
        (task, DeliveryHandle { receiver })
    }

    fn complete(&mut self, result: Result<(), DispatchError>) {
        if let Some(sender) = self.completion.take() {
            // the waiter may have gone away; nothing else to tell
            let _ = sender.send(result);
        }
    }
}

#[async_trait::async_trait]
impl ScheduledTask for DeliveryTask {
    async fn run(&mut self) -> TaskOutcome {
        match self.dispatcher.deliver(&self.destination, &self.message).await {
            Ok(DeliveryReport::Delivered { quota }) => {
                self.complete(Ok(()));
                TaskOutcome::Completed { quota }
            }
            Ok(DeliveryReport::RateLimited { retry_after }) => TaskOutcome::RateLimited { retry_after },
            Err(error) => {
                DeliveryFailed {
                    destination: &self.destination,
                    uri: &self.uri,
                    error: &error,
                }
                .log();
                self.complete(Err(error));
                TaskOutcome::Failed
            }
        }
    }

    fn describe(&self) -> String {
        format!("delivery of {} to {}", self.uri, self.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::RecordingDispatcher;
    use crate::traits::Quota;
    use std::sync::Mutex as StdMutex;

    type StartLog = Arc<StdMutex<Vec<(&'static str, Instant)>>>;

    /// Records each start; rejects its first `rejections` runs.
    struct TimedTask {
        name: &'static str,
        rejections: usize,
        retry_after: Option<Duration>,
        quota: Option<Quota>,
        log: StartLog,
    }

    impl TimedTask {
        fn new(name: &'static str, log: &StartLog) -> Self {
            Self {
                name,
                rejections: 0,
                retry_after: None,
                quota: None,
                log: Arc::clone(log),
            }
        }
    }

    #[async_trait::async_trait]
    impl ScheduledTask for TimedTask {
        async fn run(&mut self) -> TaskOutcome {
            self.log.lock().unwrap().push((self.name, Instant::now()));
            tokio::time::sleep(Duration::from_millis(5)).await;
            if self.rejections > 0 {
                self.rejections -= 1;
                return TaskOutcome::RateLimited {
                    retry_after: self.retry_after,
                };
            }
            TaskOutcome::Completed { quota: self.quota }
        }

        fn describe(&self) -> String {
            self.name.to_string()
        }
    }

    fn options(per_window: u32, window_ms: u64, pause_secs: u64) -> SchedulerOptions {
        SchedulerOptions {
            operations_per_window: per_window,
            window: Duration::from_millis(window_ms),
            default_pause: Duration::from_secs(pause_secs),
        }
    }

    fn names(log: &StartLog) -> Vec<&'static str> {
        log.lock().unwrap().iter().map(|(name, _)| *name).collect()
    }

    #[test]
    fn test_interval_never_reaches_zero() {
        let dense = SchedulerOptions {
            operations_per_window: 2_000_000,
            window: Duration::from_millis(1),
            default_pause: Duration::from_secs(1),
        };
        assert_eq!(dense.interval(), Duration::from_nanos(1));
        assert_eq!(options(10, 1000, 60).interval(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dense_budget_still_delivers() {
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let scheduler = Scheduler::start(SchedulerOptions {
            operations_per_window: 2_000_000,
            window: Duration::from_millis(1),
            default_pause: Duration::from_secs(1),
        });

        let (task, handle) = DeliveryTask::new(dispatcher, "chan", "hi", "at://1");
        scheduler.submit(Box::new(task)).await;
        let result = tokio::time::timeout(Duration::from_secs(2), handle.wait()).await;
        assert!(matches!(result, Ok(Ok(()))));
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fifo_order_at_fixed_cadence() {
        let log: StartLog = Arc::default();
        let scheduler = Scheduler::start(options(10, 1000, 60));
        for name in ["A", "B", "C"] {
            scheduler.submit(Box::new(TimedTask::new(name, &log))).await;
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(names(&log), vec!["A", "B", "C"]);

        let starts: Vec<Instant> = log.lock().unwrap().iter().map(|(_, at)| *at).collect();
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_task_is_retried_first_after_pause() {
        let log: StartLog = Arc::default();
        let scheduler = Scheduler::start(options(40, 1000, 60));

        let mut a = TimedTask::new("A", &log);
        a.rejections = 1;
        a.retry_after = Some(Duration::from_secs(3));
        scheduler.submit(Box::new(a)).await;
        scheduler.submit(Box::new(TimedTask::new("B", &log))).await;
        scheduler.submit(Box::new(TimedTask::new("C", &log))).await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(names(&log), vec!["A", "A", "B", "C"]);

        let entries = log.lock().unwrap().clone();
        let resume = entries[0].1 + Duration::from_secs(3);
        assert!(entries[1..].iter().all(|(_, at)| *at >= resume));
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_without_hint_uses_default_pause() {
        let log: StartLog = Arc::default();
        let scheduler = Scheduler::start(options(40, 1000, 20));

        let mut a = TimedTask::new("A", &log);
        a.rejections = 1;
        scheduler.submit(Box::new(a)).await;

        tokio::time::sleep(Duration::from_secs(19)).await;
        assert_eq!(names(&log), vec!["A"]);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(names(&log), vec!["A", "A"]);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_feedback_widens_spacing() {
        let log: StartLog = Arc::default();
        let scheduler = Scheduler::start(options(40, 1000, 60));

        let mut a = TimedTask::new("A", &log);
        a.quota = Some(Quota {
            remaining: 2,
            reset_after: Duration::from_secs(4),
        });
        scheduler.submit(Box::new(a)).await;
        scheduler.submit(Box::new(TimedTask::new("B", &log))).await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        let entries = log.lock().unwrap().clone();
        assert_eq!(entries.len(), 2);
        // 4s / 2 remaining = 2s floor, well above the 25ms cadence
        assert!(entries[1].1 - entries[0].1 >= Duration::from_secs(2));
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_jumps_the_queue() {
        let log: StartLog = Arc::default();
        let scheduler = Scheduler::start(options(1, 1000, 60));
        // the first task occupies the consumer while the rest are queued
        scheduler.submit(Box::new(TimedTask::new("first", &log))).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        scheduler.submit(Box::new(TimedTask::new("B", &log))).await;
        scheduler.retry(Box::new(TimedTask::new("A", &log))).await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(names(&log), vec!["first", "A", "B"]);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_task_reports_through_handle() {
        let dispatcher = Arc::new(
            RecordingDispatcher::new()
                .then(Ok(DeliveryReport::RateLimited {
                    retry_after: Some(Duration::from_millis(500)),
                }))
                .then(Err(DispatchError::Status {
                    status: 403,
                    body: "missing access".into(),
                })),
        );
        let deliveries = dispatcher.deliveries();
        let scheduler = Scheduler::start(options(40, 1000, 60));

        let (first, first_handle) = DeliveryTask::new(dispatcher.clone(), "chan", "one", "at://1");
        let (second, second_handle) = DeliveryTask::new(dispatcher.clone(), "chan", "two", "at://2");
        scheduler.submit(Box::new(first)).await;
        scheduler.submit(Box::new(second)).await;

        // first is rejected once then fails for good; second goes through
        assert!(matches!(
            first_handle.wait().await,
            Err(DispatchError::Status { status: 403, .. })
        ));
        assert!(second_handle.wait().await.is_ok());

        let messages: Vec<String> = deliveries
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.message.clone())
            .collect();
        assert_eq!(messages, vec!["one", "one", "two"]);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_queued_deliveries() {
        let dispatcher = Arc::new(RecordingDispatcher::new().then(Ok(DeliveryReport::RateLimited {
            retry_after: Some(Duration::from_secs(3600)),
        })));
        let scheduler = Scheduler::start(options(40, 1000, 60));

        let (task, handle) = DeliveryTask::new(dispatcher, "chan", "stuck", "at://1");
        scheduler.submit(Box::new(task)).await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        scheduler.shutdown().await;
        assert_eq!(scheduler.pending().await, 1);
        drop(scheduler);
        assert!(matches!(handle.wait().await, Err(DispatchError::Abandoned)));
    }
}
