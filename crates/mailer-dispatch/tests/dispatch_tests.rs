// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the dispatcher.
//!
//! All timing tests run on a paused tokio clock, so sleeps in the mock and
//! in the token bucket advance virtual time deterministically.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mailer_core::Recipient;
use mailer_dispatch::{
    DispatchOptions, Dispatcher, ProgressFn, ProgressUpdate, INVALID_EMAIL_FORMAT, MISSING_EMAIL,
};
use mailer_test_utils::{numbered_recipients, MockDelivery};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn dispatcher(options: DispatchOptions) -> Dispatcher {
    Dispatcher::new(options).expect("options are valid")
}

// ---- Conservation ----

#[tokio::test(start_paused = true)]
async fn every_recipient_is_counted_exactly_once() {
    let mut recipients = numbered_recipients(8);
    recipients.push(Recipient::new("broken"));
    recipients.push(Recipient::empty().with_name("Nobody"));

    let mock = Arc::new(
        MockDelivery::new()
            .with_latency(Duration::from_millis(20))
            .failing_for("user4@example.com", "mailbox full"),
    );

    let result = dispatcher(DispatchOptions::coupled(3))
        .run(recipients, mock.clone(), None)
        .await;

    assert_eq!(result.success_count + result.failure_count, 10);
    assert_eq!(result.failures.len(), result.failure_count);
    assert_eq!(result.success_count, 7);
    assert_eq!(result.failure_count, 3);
    assert_eq!(result.skipped_count, 0);
    assert!(!result.is_success());
}

#[tokio::test(start_paused = true)]
async fn empty_input_finishes_immediately() {
    let mock = Arc::new(MockDelivery::new());
    let result = dispatcher(DispatchOptions::default())
        .run(Vec::new(), mock.clone(), None)
        .await;

    assert_eq!(result.processed(), 0);
    assert!(result.is_success());
    assert_eq!(mock.call_count().await, 0);
}

// ---- Concurrency bound ----

#[tokio::test(start_paused = true)]
async fn in_flight_never_exceeds_concurrency() {
    let mock = Arc::new(MockDelivery::new().with_latency(Duration::from_millis(50)));
    let options = DispatchOptions::coupled(100).with_concurrency(3);

    let result = dispatcher(options)
        .run(numbered_recipients(30), mock.clone(), None)
        .await;

    assert_eq!(result.success_count, 30);
    assert_eq!(mock.max_in_flight(), 3);
}

// ---- Rate bound ----

#[tokio::test(start_paused = true)]
async fn sends_start_no_faster_than_the_rate() {
    let rate = 5usize;
    let mock = Arc::new(MockDelivery::new().with_latency(Duration::from_millis(10)));

    let result = dispatcher(DispatchOptions::coupled(rate as u32))
        .run(numbered_recipients(25), mock.clone(), None)
        .await;
    assert_eq!(result.success_count, 25);

    let mut starts = mock.start_times().await;
    starts.sort();
    for (i, &t) in starts.iter().enumerate().skip(rate) {
        let in_window = starts[i..]
            .iter()
            .take_while(|&&s| s < t + Duration::from_secs(1))
            .count();
        assert!(in_window <= rate + 1, "window at index {i} held {in_window} starts");
    }
}

// ---- Validation short-circuit ----

#[tokio::test(start_paused = true)]
async fn invalid_recipients_never_reach_delivery() {
    let recipients = vec![
        Recipient::empty().with_name("No Email"),
        Recipient::new("not-an-email"),
        Recipient::new("missing-at.com"),
        Recipient::new(""),
        Recipient::new("valid@example.com"),
    ];
    let mock = Arc::new(MockDelivery::new());
    let start = Instant::now();

    // One token per second: if rejected recipients consumed tokens, the
    // valid one would have to wait.
    let result = dispatcher(DispatchOptions::coupled(1))
        .run(recipients, mock.clone(), None)
        .await;

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(result.success_count, 1);
    assert_eq!(result.failure_count, 4);
    assert_eq!(mock.delivered_to().await, vec!["valid@example.com"]);

    let reasons: Vec<(&str, &str)> = result
        .failures
        .iter()
        .map(|f| (f.email.as_str(), f.error.as_str()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("N/A", MISSING_EMAIL),
            ("not-an-email", INVALID_EMAIL_FORMAT),
            ("missing-at.com", INVALID_EMAIL_FORMAT),
            ("N/A", MISSING_EMAIL),
        ]
    );
    assert_eq!(result.failures[0].name, "No Email");
}

// ---- Failure isolation ----

#[tokio::test(start_paused = true)]
async fn one_failure_does_not_affect_siblings() {
    let mock = Arc::new(
        MockDelivery::new()
            .with_latency(Duration::from_millis(30))
            .failing_for("user3@example.com", "SMTP timeout"),
    );

    let result = dispatcher(DispatchOptions::coupled(5))
        .run(numbered_recipients(5), mock.clone(), None)
        .await;

    assert_eq!(result.success_count, 4);
    assert_eq!(result.failure_count, 1);
    let failure = &result.failures[0];
    assert_eq!(failure.email, "user3@example.com");
    assert_eq!(failure.name, "User 3");
    assert_eq!(failure.error, "SMTP timeout");
    assert_eq!(mock.call_count().await, 5);
}

#[tokio::test(start_paused = true)]
async fn panicking_delivery_is_recorded_as_failure() {
    let mock = Arc::new(MockDelivery::new().panicking_for("user2@example.com"));

    let result = dispatcher(DispatchOptions::coupled(4))
        .run(numbered_recipients(4), mock.clone(), None)
        .await;

    assert_eq!(result.success_count, 3);
    assert_eq!(result.failure_count, 1);
    assert_eq!(result.failures[0].email, "user2@example.com");
    assert!(
        result.failures[0].error.contains("mock delivery exploded"),
        "got: {}",
        result.failures[0].error
    );
}

// ---- Order independence ----

/// Small deterministic xorshift so each run gets a different latency pattern.
fn jittered(seed: u64, count: usize) -> MockDelivery {
    let mut state = seed;
    let mut mock = MockDelivery::new()
        .failing_for("user2@example.com", "rejected")
        .failing_for("user7@example.com", "rejected");
    for i in 1..=count {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let latency = Duration::from_millis(state % 200);
        mock = mock.with_latency_for(format!("user{i}@example.com"), latency);
    }
    mock
}

#[tokio::test(start_paused = true)]
async fn aggregate_is_independent_of_completion_order() {
    let mut outcomes = Vec::new();

    for seed in [0x9E37_79B9_7F4A_7C15_u64, 0x2545_F491_4F6C_DD1D] {
        let mock = Arc::new(jittered(seed, 10));
        let result = dispatcher(DispatchOptions::coupled(4))
            .run(numbered_recipients(10), mock, None)
            .await;
        let failed: BTreeSet<String> = result.failures.iter().map(|f| f.email.clone()).collect();
        outcomes.push((result.success_count, result.failure_count, failed));
    }

    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[0].0, 8);
    assert_eq!(outcomes[0].1, 2);
}

// ---- Throughput scenario ----

#[tokio::test(start_paused = true)]
async fn twenty_recipients_at_five_per_second() {
    let mock = Arc::new(MockDelivery::new().with_latency(Duration::from_millis(50)));
    let start = Instant::now();

    let result = dispatcher(DispatchOptions::coupled(5))
        .run(numbered_recipients(20), mock.clone(), None)
        .await;

    let elapsed = start.elapsed();
    assert_eq!(result.success_count, 20);
    assert_eq!(result.failure_count, 0);
    // 5 in the initial burst, then 15 more at 200ms spacing, plus the last send.
    assert!(elapsed >= Duration::from_millis(3000), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(3200), "elapsed {elapsed:?}");
    assert!(mock.max_in_flight() <= 5);
}

// ---- Progress ----

#[tokio::test(start_paused = true)]
async fn progress_is_throttled_and_monotonic() {
    let updates: Mutex<Vec<ProgressUpdate>> = Mutex::new(Vec::new());
    let record: &ProgressFn<'_> = &|update| updates.lock().unwrap().push(update);

    let mock = Arc::new(MockDelivery::new().with_latency(Duration::from_millis(30)));
    let result = dispatcher(DispatchOptions::coupled(10))
        .run(numbered_recipients(40), mock, Some(record))
        .await;
    assert_eq!(result.success_count, 40);

    let updates = updates.into_inner().unwrap();
    assert!(!updates.is_empty());
    assert!(updates.len() < 40, "expected throttling, got {} updates", updates.len());
    assert!(updates.iter().all(|u| u.total == 40));
    assert!(updates.windows(2).all(|w| w[0].processed <= w[1].processed));
    assert!(updates[0].recipient.ends_with("@example.com)"));
}

#[tokio::test(start_paused = true)]
async fn burst_completions_collapse_into_one_update() {
    let updates: Mutex<Vec<ProgressUpdate>> = Mutex::new(Vec::new());
    let record: &ProgressFn<'_> = &|update| updates.lock().unwrap().push(update);

    let mock = Arc::new(MockDelivery::new());
    dispatcher(DispatchOptions::coupled(10))
        .run(numbered_recipients(10), mock, Some(record))
        .await;

    assert_eq!(updates.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn wider_progress_interval_means_fewer_updates() {
    let count_updates = |interval: Duration| async move {
        let updates = Mutex::new(0usize);
        let record: &ProgressFn<'_> = &|_| *updates.lock().unwrap() += 1;
        let options = DispatchOptions::coupled(10).with_progress_interval(interval);
        let mock = Arc::new(MockDelivery::new().with_latency(Duration::from_millis(30)));
        dispatcher(options)
            .run(numbered_recipients(40), mock, Some(record))
            .await;
        updates.into_inner().unwrap()
    };

    let frequent = count_updates(Duration::from_millis(50)).await;
    let sparse = count_updates(Duration::from_millis(1000)).await;

    assert!(sparse >= 1);
    assert!(sparse < frequent, "sparse {sparse} vs frequent {frequent}");
}

// ---- Cancellation ----

#[tokio::test(start_paused = true)]
async fn cancellation_stops_admission_and_returns_partial_result() {
    let mock = Arc::new(MockDelivery::new().with_latency(Duration::from_millis(100)));
    let cancel = CancellationToken::new();
    let cancel_at = Instant::now() + Duration::from_millis(1200);

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep_until(cancel_at).await;
        trigger.cancel();
    });

    let result = dispatcher(DispatchOptions::coupled(2))
        .run_with_cancel(numbered_recipients(10), mock.clone(), None, cancel)
        .await;

    assert_eq!(
        result.success_count + result.failure_count + result.skipped_count,
        10
    );
    assert_eq!(result.failure_count, 0);
    assert!(result.skipped_count >= 5, "skipped {}", result.skipped_count);
    assert_eq!(mock.call_count().await, result.success_count);
    assert!(mock.start_times().await.iter().all(|&t| t < cancel_at));
    assert!(!result.is_success());
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_run_sends_nothing() {
    let mock = Arc::new(MockDelivery::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = dispatcher(DispatchOptions::coupled(3))
        .run_with_cancel(numbered_recipients(6), mock.clone(), None, cancel)
        .await;

    assert_eq!(result.skipped_count, 6);
    assert_eq!(result.processed(), 0);
    assert_eq!(mock.call_count().await, 0);
}
