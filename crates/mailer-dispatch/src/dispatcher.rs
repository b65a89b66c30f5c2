// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rate-limited, bounded-concurrency dispatch loop.
//!
//! The [`Dispatcher`] drives every recipient through three gates in order:
//! - the synchronous [`precheck`](crate::validate::precheck), which rejects
//!   missing or malformed addresses without using a token or a slot
//! - a pool slot, capped at `concurrency` in-flight tasks
//! - one token from the run's [`TokenBucket`]
//!
//! Each admitted recipient runs as its own task. Results flow back to the
//! loop through the `JoinSet`, so counters and the failure list are owned
//! by a single [`DispatchContext`] and never shared between tasks.

use std::any::Any;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use mailer_core::{Delivery, DispatchResult, FailedRecipient, MailerError, Recipient};
use tokio::task::{Id, JoinError, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::progress::{ProgressFn, ProgressThrottle, ProgressUpdate, DEFAULT_PROGRESS_INTERVAL};
use crate::token_bucket::TokenBucket;
use crate::validate::precheck;

/// Default emails per second (and concurrent sends) when nothing is configured.
pub const DEFAULT_RATE: u32 = 12;

/// Tunables for one dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Maximum number of sends in flight at once.
    pub concurrency: usize,
    /// Sends started per second; also the bucket capacity (one second of burst).
    pub rate_per_second: u32,
    /// Minimum spacing between progress notifications.
    pub progress_interval: Duration,
}

impl DispatchOptions {
    /// Concurrency and rate taken from the same value.
    pub fn coupled(per_second: u32) -> Self {
        Self {
            concurrency: per_second as usize,
            rate_per_second: per_second,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::coupled(DEFAULT_RATE)
    }
}

/// Outcome of one admitted recipient's task.
#[derive(Debug)]
enum Outcome {
    Sent,
    Failed(String),
    /// Cancelled while waiting for a token; nothing was sent.
    Skipped,
}

/// Mutable state of one run, owned by the dispatch loop.
struct DispatchContext<'a> {
    total: usize,
    result: DispatchResult,
    throttle: ProgressThrottle,
    progress: Option<&'a ProgressFn<'a>>,
    /// Recipient of every task still in the pool.
    in_flight: HashMap<Id, Recipient>,
}

impl<'a> DispatchContext<'a> {
    fn new(total: usize, interval: Duration, progress: Option<&'a ProgressFn<'a>>) -> Self {
        Self {
            total,
            result: DispatchResult::default(),
            throttle: ProgressThrottle::new(interval),
            progress,
            in_flight: HashMap::new(),
        }
    }

    fn reject(&mut self, recipient: &Recipient, reason: &str) {
        warn!(recipient = %recipient.descriptor(), reason, "recipient rejected before admission");
        self.result
            .record_failure(FailedRecipient::new(recipient, reason));
    }

    fn track(&mut self, id: Id, recipient: Recipient) {
        self.in_flight.insert(id, recipient);
    }

    fn absorb(&mut self, joined: Result<(Id, Outcome), JoinError>) {
        let (id, outcome) = match joined {
            Ok(done) => done,
            Err(err) => {
                // Tasks catch their own panics and are never aborted, so this
                // only happens if the runtime is shutting down underneath us.
                error!(error = %err, "send task did not complete");
                let reason = format!("send task did not complete: {err}");
                (err.id(), Outcome::Failed(reason))
            }
        };
        let recipient = self.in_flight.remove(&id).unwrap_or_default();

        match outcome {
            Outcome::Sent => {
                debug!(recipient = %recipient.descriptor(), "email sent");
                self.result.record_success();
            }
            Outcome::Failed(reason) => {
                warn!(recipient = %recipient.descriptor(), error = %reason, "email failed");
                self.result
                    .record_failure(FailedRecipient::new(&recipient, reason));
            }
            Outcome::Skipped => {
                self.result.record_skipped();
                return;
            }
        }

        self.notify(&recipient);
    }

    fn notify(&mut self, recipient: &Recipient) {
        if let Some(progress) = self.progress
            && self.throttle.ready(Instant::now())
        {
            progress(ProgressUpdate {
                processed: self.result.processed(),
                total: self.total,
                recipient: recipient.descriptor(),
            });
        }
    }
}

/// Sends one email per recipient under a rate limit and a concurrency cap.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    options: DispatchOptions,
    rate: NonZeroU32,
}

impl Dispatcher {
    /// Create a dispatcher, rejecting zero concurrency or a zero rate.
    pub fn new(options: DispatchOptions) -> Result<Self, MailerError> {
        if options.concurrency == 0 {
            return Err(MailerError::Config(
                "dispatch concurrency must be at least 1".to_string(),
            ));
        }
        let rate = NonZeroU32::new(options.rate_per_second).ok_or_else(|| {
            MailerError::Config("dispatch rate must be at least 1 email per second".to_string())
        })?;
        Ok(Self { options, rate })
    }

    /// Dispatch every recipient and wait for all of them to finish.
    pub async fn run(
        &self,
        recipients: Vec<Recipient>,
        delivery: Arc<dyn Delivery>,
        progress: Option<&ProgressFn<'_>>,
    ) -> DispatchResult {
        self.run_with_cancel(recipients, delivery, progress, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but stops admitting recipients once `cancel` fires.
    ///
    /// Tasks still waiting for a token give up without sending; tasks already
    /// sending are allowed to finish. Everything not attempted is counted in
    /// [`DispatchResult::skipped_count`].
    pub async fn run_with_cancel(
        &self,
        recipients: Vec<Recipient>,
        delivery: Arc<dyn Delivery>,
        progress: Option<&ProgressFn<'_>>,
        cancel: CancellationToken,
    ) -> DispatchResult {
        let total = recipients.len();
        let concurrency = self.options.concurrency;
        let rate = self.rate.get();
        let started = Instant::now();

        info!(total, concurrency, rate, "dispatch started");

        let mut ctx = DispatchContext::new(total, self.options.progress_interval, progress);
        let bucket = Arc::new(TokenBucket::per_second(self.rate));
        let mut pool: JoinSet<Outcome> = JoinSet::new();

        for recipient in recipients {
            if cancel.is_cancelled() {
                ctx.result.record_skipped();
                continue;
            }

            if let Err(reason) = precheck(&recipient) {
                ctx.reject(&recipient, reason);
                continue;
            }

            while pool.len() >= concurrency {
                match pool.join_next_with_id().await {
                    Some(joined) => ctx.absorb(joined),
                    None => break,
                }
            }
            while let Some(joined) = pool.try_join_next_with_id() {
                ctx.absorb(joined);
            }

            if cancel.is_cancelled() {
                ctx.result.record_skipped();
                continue;
            }

            let task = pool.spawn(send_one(
                recipient.clone(),
                bucket.clone(),
                delivery.clone(),
                cancel.clone(),
            ));
            ctx.track(task.id(), recipient);
        }

        while let Some(joined) = pool.join_next_with_id().await {
            ctx.absorb(joined);
        }

        let result = ctx.result;
        info!(
            sent = result.success_count,
            failed = result.failure_count,
            skipped = result.skipped_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dispatch finished"
        );
        result
    }
}

/// Body of one per-recipient task: take a token, then deliver.
///
/// Never panics: a panic inside the delivery is converted to a failure.
async fn send_one(
    recipient: Recipient,
    bucket: Arc<TokenBucket>,
    delivery: Arc<dyn Delivery>,
    cancel: CancellationToken,
) -> Outcome {
    let attempt = async {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Outcome::Skipped,
            _ = bucket.acquire() => {}
        }

        match delivery.deliver(&recipient).await {
            Ok(()) => Outcome::Sent,
            Err(err) => Outcome::Failed(err.reason()),
        }
    };

    AssertUnwindSafe(attempt)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Outcome::Failed(panic_message(panic.as_ref())))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("send panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("send panicked: {message}")
    } else {
        "send panicked".to_string()
    }
}
