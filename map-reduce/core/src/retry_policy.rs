// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;

/// Decides how a task loop reacts to failed `DoTask` calls
pub trait RetryPolicy: Send + Sync + 'static {
    /// Delay before the next attempt after `failed_attempts` failures,
    /// or None to give up on the task
    fn delay_before_retry(&self, failed_attempts: u32) -> Option<Duration>;

    /// How long a task loop may wait for an idle worker while no task of
    /// the phase completes. None waits forever.
    fn acquire_timeout(&self) -> Option<Duration>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffRetryPolicy {
    max_attempts: Option<u32>,
    base_delay: Duration,
    max_delay: Duration,
    acquire_timeout: Option<Duration>,
}

impl BackoffRetryPolicy {
    /// Exponential backoff starting at `base_delay`, capped at `max_delay`
    pub fn new(max_attempts: Option<u32>, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            acquire_timeout: None,
        }
    }

    /// Retries forever, immediately, and waits forever for workers
    pub fn unbounded() -> Self {
        Self::new(None, Duration::ZERO, Duration::ZERO)
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }
}

impl Default for BackoffRetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RetryPolicy for BackoffRetryPolicy {
    fn delay_before_retry(&self, failed_attempts: u32) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if failed_attempts >= max {
                return None;
            }
        }

        let exponent = failed_attempts.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);
        Some(delay.min(self.max_delay))
    }

    fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout
    }
}
