// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress notifications and their throttle.

use std::time::Duration;

use tokio::time::Instant;

/// Default minimum spacing between two progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Snapshot handed to the progress callback after a completed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Successes plus failures recorded so far, including pre-admission rejections.
    pub processed: usize,
    /// Number of recipients in the run.
    pub total: usize,
    /// `Name (email)` of the recipient that just completed.
    pub recipient: String,
}

/// Caller-supplied progress sink. May borrow from the caller's stack.
pub type ProgressFn<'a> = dyn Fn(ProgressUpdate) + Send + Sync + 'a;

/// Lets a notification through only if more than `interval` has passed
/// since the last one that was let through. The first call always passes.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns true (and restarts the interval) if a notification may be sent at `now`.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) <= self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}
