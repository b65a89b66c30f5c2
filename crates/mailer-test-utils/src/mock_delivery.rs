// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery for dispatcher tests.
//!
//! `MockDelivery` implements `Delivery` with scripted per-recipient
//! behavior and records every call, its start time, and the peak number of
//! overlapping calls.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use mailer_core::{Delivery, MailerError, Recipient};

/// A scriptable stand-in for "render and send one email".
#[derive(Debug, Default)]
pub struct MockDelivery {
    latency: Duration,
    latency_for: HashMap<String, Duration>,
    failures: HashMap<String, String>,
    panics: HashSet<String>,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockDelivery {
    /// A delivery that succeeds immediately for everyone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `latency` before completing.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Override the latency for one address.
    pub fn with_latency_for(mut self, email: impl Into<String>, latency: Duration) -> Self {
        self.latency_for.insert(email.into(), latency);
        self
    }

    /// Calls for `email` fail with a transport error carrying `message`.
    pub fn failing_for(mut self, email: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(email.into(), message.into());
        self
    }

    /// Calls for `email` panic.
    pub fn panicking_for(mut self, email: impl Into<String>) -> Self {
        self.panics.insert(email.into());
        self
    }

    /// Addresses passed to `deliver`, in call order.
    pub async fn delivered_to(&self) -> Vec<String> {
        self.calls.lock().await.iter().map(|(e, _)| e.clone()).collect()
    }

    /// Start instants of every call, in call order.
    pub async fn start_times(&self) -> Vec<Instant> {
        self.calls.lock().await.iter().map(|(_, t)| *t).collect()
    }

    /// Number of `deliver` calls so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even if the call panics.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Delivery for MockDelivery {
    async fn deliver(&self, recipient: &Recipient) -> Result<(), MailerError> {
        let email = recipient.email().unwrap_or_default().to_string();
        self.calls.lock().await.push((email.clone(), Instant::now()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let latency = self.latency_for.get(&email).copied().unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.panics.contains(&email) {
            panic!("mock delivery exploded for {email}");
        }
        if let Some(message) = self.failures.get(&email) {
            return Err(MailerError::transport(message.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_and_scripted_failures() {
        let mock = MockDelivery::new().failing_for("b@example.com", "SMTP timeout");

        assert!(mock.deliver(&Recipient::new("a@example.com")).await.is_ok());
        let err = mock
            .deliver(&Recipient::new("b@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "SMTP timeout");

        assert_eq!(mock.delivered_to().await, vec!["a@example.com", "b@example.com"]);
        assert_eq!(mock.max_in_flight(), 1);
    }
}
