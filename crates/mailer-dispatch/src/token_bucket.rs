// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token bucket admission gate.
//!
//! Tokens refill continuously at `refill_per_second` up to `capacity`; every
//! admitted send consumes exactly one. The bucket starts full, so up to
//! `capacity` sends may start immediately.

use std::num::NonZeroU32;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Floor for a single wait. The tokio timer has millisecond resolution, and
/// a zero-length sleep would not advance a paused clock.
const MIN_WAIT: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Async token bucket shared by all send tasks of one dispatch run.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_second: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket.
    pub fn new(capacity: NonZeroU32, refill_per_second: NonZeroU32) -> Self {
        let capacity = f64::from(capacity.get());
        Self {
            capacity,
            refill_per_second: f64::from(refill_per_second.get()),
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Bucket holding at most one second's worth of tokens.
    pub fn per_second(rate: NonZeroU32) -> Self {
        Self::new(rate, rate)
    }

    /// Wait until a token is available, then consume it.
    ///
    /// Each iteration re-samples the clock after sleeping, since the sleep
    /// may overshoot. The lock is never held across the sleep.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                self.refill(&mut state);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_per_second).max(MIN_WAIT)
            };

            trace!(wait_ms = wait.as_millis() as u64, "rate limit reached, waiting for token");
            tokio::time::sleep(wait).await;
        }
    }

    /// Consume a token if one is available right now.
    pub async fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Current (refilled) token count.
    pub async fn available(&self) -> f64 {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        state.tokens
    }

    /// Maximum burst size.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_second).min(self.capacity);
        state.last_refill = now;
    }
}
