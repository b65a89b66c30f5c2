// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-admission recipient check.
//!
//! Runs before a recipient takes a rate-limit token or a pool slot, so
//! addresses that can never be delivered do not consume either.

use std::sync::LazyLock;

use mailer_core::Recipient;
use regex::Regex;

/// Failure reason for a recipient without an email field.
pub const MISSING_EMAIL: &str = "Missing email";

/// Failure reason for an address that fails the shape check.
pub const INVALID_EMAIL_FORMAT: &str = "Invalid email format";

/// `local@domain.tld` with no whitespace and a single `@`.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email shape pattern is valid")
});

/// Basic email shape check. Not an RFC 5322 parser.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Returns the recipient's address if it may be admitted, otherwise the
/// failure reason to record.
pub fn precheck(recipient: &Recipient) -> Result<&str, &'static str> {
    match recipient.email() {
        None => Err(MISSING_EMAIL),
        Some(email) if !is_valid_email(email) => Err(INVALID_EMAIL_FORMAT),
        Some(email) => Ok(email),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.uk"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["not-an-email", "missing-at.com", "", "a@b", "a b@c.d", "a@@b.c", "@b.co"] {
            assert!(!is_valid_email(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn precheck_reasons() {
        assert_eq!(precheck(&Recipient::empty()), Err(MISSING_EMAIL));
        assert_eq!(precheck(&Recipient::new("")), Err(MISSING_EMAIL));
        assert_eq!(
            precheck(&Recipient::new("missing-at.com")),
            Err(INVALID_EMAIL_FORMAT)
        );
        assert_eq!(precheck(&Recipient::new("ada@example.com")), Ok("ada@example.com"));
    }

    proptest! {
        #[test]
        fn generated_addresses_pass(
            local in "[a-z0-9._+-]{1,16}",
            domain in "[a-z0-9-]{1,12}",
            tld in "[a-z]{2,6}",
        ) {
            let email = format!("{local}@{domain}.{tld}");
            prop_assert!(is_valid_email(&email));
        }

        #[test]
        fn whitespace_anywhere_fails(
            prefix in "[a-z]{0,5}",
            suffix in "[a-z]{0,5}",
            ws in "[ \t\n]",
        ) {
            let email = format!("{prefix}{ws}{suffix}@example.com");
            prop_assert!(!is_valid_email(&email));
        }
    }
}
