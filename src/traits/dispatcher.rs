// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::DispatchError;

/// Remaining allowance the notifier reported after a call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quota {
    /// Calls left in the current bucket
    pub remaining: u32,
    /// Time until the bucket refills
    pub reset_after: Duration,
}

impl Quota {
    /// Extra spacing to keep before the next call so the remaining calls
    /// spread evenly over the reset window.
    pub fn spacing(&self) -> Duration {
        match self.remaining {
            0 => self.reset_after,
            remaining => self.reset_after / remaining,
        }
    }
}

/// What happened to a delivery that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeliveryReport {
    /// Accepted; `quota` is set when the notifier reported one
    Delivered { quota: Option<Quota> },
    /// Rejected for rate limiting; retry after the hint when present
    RateLimited { retry_after: Option<Duration> },
}

/// Sends rendered messages to a destination.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn deliver(&self, destination: &str, message: &str) -> Result<DeliveryReport, DispatchError>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_spacing() {
        let quota = |remaining, ms| Quota {
            remaining,
            reset_after: Duration::from_millis(ms),
        };
        assert_eq!(quota(4, 1000).spacing(), Duration::from_millis(250));
        assert_eq!(quota(0, 1500).spacing(), Duration::from_millis(1500));
        assert_eq!(quota(1, 0).spacing(), Duration::ZERO);
    }
}
