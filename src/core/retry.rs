//! Retrying wrapper for calls into the backing store.
//!
//! Any operation can be wrapped; only errors reported as transient by
//! [`AppError::is_transient`] are retried, with capped exponential backoff
//! and a small jitter, inside an overall deadline.

use crate::errors::{AppError, AppResult};
use chrono::Utc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Deadline for the whole call, retries included.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Policy that never waits between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Run `op`, retrying transient failures.
    pub fn run<T, F>(&self, mut op: F) -> AppResult<T>
    where
        F: FnMut() -> AppResult<T>,
    {
        let max_attempts = self.max_attempts.max(1);
        let started = Instant::now();
        let mut attempt = 1;

        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    let elapsed = started.elapsed();
                    if attempt >= max_attempts || elapsed >= self.timeout {
                        warn!(attempt, error = %e, "retries exhausted");
                        return Err(AppError::Unavailable {
                            attempts: attempt,
                            last: e.to_string(),
                        });
                    }

                    let delay = self
                        .delay_for(attempt)
                        .min(self.timeout.saturating_sub(elapsed));
                    debug!(attempt, ?delay, error = %e, "transient failure, retrying");
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Exponential delay before retry number `attempt`, capped at `max_backoff`.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }

    /// [`base_delay`](Self::base_delay) plus up to 25% jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        if base_ms == 0 {
            return base;
        }
        let max_extra = (base_ms / 4).max(1);
        let seed = u64::from(Utc::now().timestamp_subsec_nanos()) ^ u64::from(attempt);
        Duration::from_millis(base_ms.saturating_add(seed % (max_extra + 1)))
    }
}
