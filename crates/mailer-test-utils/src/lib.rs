// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for mailer integration tests.
//!
//! Provides scriptable mocks for fast, deterministic tests without an SMTP
//! server.
//!
//! # Components
//!
//! - [`MockDelivery`] - per-recipient delivery with scripted latency, failures,
//!   and concurrency instrumentation
//! - [`MockTransport`] - mail transport capturing every sent message

pub mod mock_delivery;
pub mod mock_transport;

pub use mock_delivery::MockDelivery;
pub use mock_transport::MockTransport;

use mailer_core::Recipient;

/// `count` recipients named `User N` at `userN@example.com`, numbered from 1.
pub fn numbered_recipients(count: usize) -> Vec<Recipient> {
    (1..=count)
        .map(|i| Recipient::new(format!("user{i}@example.com")).with_name(format!("User {i}")))
        .collect()
}
