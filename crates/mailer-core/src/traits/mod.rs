// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the dispatcher and its collaborators.
//!
//! Both traits use `#[async_trait]` so they can be used as trait objects.

pub mod delivery;
pub mod transport;

pub use delivery::Delivery;
pub use transport::EmailTransport;
