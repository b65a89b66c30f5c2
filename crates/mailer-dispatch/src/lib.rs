// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rate-limited parallel email dispatch.
//!
//! - [`TokenBucket`] throttles how fast sends may start
//! - [`Dispatcher`] caps how many run at once and aggregates outcomes
//! - [`precheck`] filters out recipients that cannot possibly succeed
//! - [`ProgressThrottle`] keeps progress callbacks to one per interval
//!
//! The send itself is an injected [`mailer_core::Delivery`].

pub mod dispatcher;
pub mod progress;
pub mod token_bucket;
pub mod validate;

pub use dispatcher::{DispatchOptions, Dispatcher, DEFAULT_RATE};
pub use progress::{ProgressFn, ProgressThrottle, ProgressUpdate, DEFAULT_PROGRESS_INTERVAL};
pub use token_bucket::TokenBucket;
pub use validate::{is_valid_email, precheck, INVALID_EMAIL_FORMAT, MISSING_EMAIL};
