//! Orchestrator integration tests with mock providers.

use chrono::TimeDelta;
use parley_core::{ChatOptions, CoreError, Orchestrator, ProviderError};
use parley_memory::{ConversationStore, ManualClock, StoreLimits, Turn};
use parley_test_utils::{FailingLLM, FixedLLM, RecordingLLM, ScriptedLLM};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn store(max_entries: usize, ttl_seconds: u64) -> ConversationStore {
    ConversationStore::new(StoreLimits::new(max_entries, ttl_seconds).expect("limits"))
}

/// A first turn returns the reply and records both sides of the exchange.
#[tokio::test]
async fn send_records_user_and_assistant_turns() {
    let orchestrator = Orchestrator::new(store(10, 3600), Arc::new(FixedLLM::new("Hi there")));

    let reply = orchestrator.send("x", "Hello").await.expect("send");
    assert_eq!(reply.response, "Hi there");
    assert_eq!(reply.session_id, "x");

    let transcript = orchestrator.transcript("x").expect("transcript");
    assert_eq!(
        transcript.turns(),
        &[Turn::user("Hello"), Turn::assistant("Hi there")]
    );
}

/// Later turns see the full history followed by the new message.
#[tokio::test]
async fn provider_receives_history_in_order() {
    let (llm, seen) = RecordingLLM::new("ok");
    let orchestrator = Orchestrator::new(store(10, 3600), Arc::new(llm));

    orchestrator.send("s", "first").await.expect("first");
    orchestrator.send("s", "second").await.expect("second");

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], vec![Turn::user("first")]);
    assert_eq!(
        seen[1],
        vec![
            Turn::user("first"),
            Turn::assistant("ok"),
            Turn::user("second"),
        ]
    );
}

/// The configured system prompt is sent first and never stored.
#[tokio::test]
async fn system_prompt_prefixes_every_request() {
    let (llm, seen) = RecordingLLM::new("ok");
    let orchestrator = Orchestrator::with_options(
        store(10, 3600),
        Arc::new(llm),
        ChatOptions {
            max_message_chars: 100,
            system_prompt: Some("You are terse.".to_string()),
        },
    );

    orchestrator.send("s", "one").await.expect("one");
    orchestrator.send("s", "two").await.expect("two");

    let seen = seen.lock();
    assert_eq!(seen[1][0], Turn::system("You are terse."));
    assert_eq!(seen[1].len(), 4);
    assert_eq!(orchestrator.transcript("s").expect("transcript").len(), 4);
}

/// Empty input is rejected before the provider or the store is touched.
#[tokio::test]
async fn empty_message_is_rejected_without_side_effects() {
    let llm = FailingLLM::transport("unreachable");
    let orchestrator = Orchestrator::new(store(10, 3600), Arc::new(llm.clone()));

    let err = orchestrator.send("y", "").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
    let err = orchestrator.send("y", "   ").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
    let err = orchestrator.send("", "hello").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));

    assert_eq!(llm.calls(), 0);
    assert_eq!(orchestrator.stats().current_size, 0);
}

/// Oversized messages are rejected by character count.
#[tokio::test]
async fn oversized_message_is_rejected() {
    let orchestrator = Orchestrator::new(store(10, 3600), Arc::new(FixedLLM::new("ok")));
    let at_limit = "é".repeat(4000);
    let over_limit = "é".repeat(4001);

    orchestrator.send("s", &at_limit).await.expect("at limit");
    let err = orchestrator.send("s", &over_limit).await.unwrap_err();
    assert!(err.is_client_error());
}

/// A provider failure leaves the transcript exactly as it was.
#[tokio::test]
async fn provider_failure_leaves_no_trace() {
    let script = ScriptedLLM::new([
        Ok("first reply".to_string()),
        Err(ProviderError::Status {
            status: 500,
            body: "boom".to_string(),
        }),
    ]);
    let orchestrator = Orchestrator::new(store(10, 3600), Arc::new(script));

    orchestrator.send("s", "first").await.expect("first");
    let err = orchestrator.send("s", "second").await.unwrap_err();
    assert!(matches!(err, CoreError::Provider(ProviderError::Status { status: 500, .. })));

    let transcript = orchestrator.transcript("s").expect("transcript");
    assert_eq!(
        transcript.turns(),
        &[Turn::user("first"), Turn::assistant("first reply")]
    );
}

/// A provider timeout surfaces as a timeout error.
#[tokio::test]
async fn provider_timeout_is_preserved() {
    let orchestrator = Orchestrator::new(store(10, 3600), Arc::new(FailingLLM::timeout()));
    match orchestrator.send("s", "hello").await {
        Err(CoreError::Provider(err)) => assert!(err.is_timeout()),
        other => panic!("unexpected result: {other:?}"),
    }
}

/// With room for two sessions, a third evicts the least recently used.
#[tokio::test]
async fn third_session_evicts_least_recently_used() {
    let orchestrator = Orchestrator::new(store(2, 3600), Arc::new(FixedLLM::new("ok")));

    for session in ["a", "b", "c"] {
        orchestrator.send(session, "hello").await.expect("send");
    }

    assert_eq!(orchestrator.stats().current_size, 2);
    assert_eq!(orchestrator.transcript("c").expect("c").len(), 2);
    assert!(orchestrator.transcript("a").expect("a").is_empty());
}

/// Sessions idle past the TTL come back empty.
#[tokio::test]
async fn idle_sessions_expire() {
    let clock = ManualClock::default();
    let store = ConversationStore::with_clock(
        StoreLimits::new(10, 60).expect("limits"),
        Arc::new(clock.clone()),
    );
    let orchestrator = Orchestrator::new(store, Arc::new(FixedLLM::new("ok")));

    orchestrator.send("s", "hello").await.expect("send");
    clock.advance(TimeDelta::seconds(59));
    assert_eq!(orchestrator.stats().current_size, 1);

    clock.advance(TimeDelta::seconds(1));
    assert_eq!(orchestrator.stats().current_size, 0);
    assert!(orchestrator.transcript("s").expect("transcript").is_empty());
}

/// Clearing is idempotent and clear-all empties the store.
#[tokio::test]
async fn clear_and_clear_all() {
    let orchestrator = Orchestrator::new(store(10, 3600), Arc::new(FixedLLM::new("ok")));
    for session in ["a", "b", "c"] {
        orchestrator.send(session, "hello").await.expect("send");
    }

    assert!(orchestrator.clear("a"));
    assert!(!orchestrator.clear("a"));
    assert!(!orchestrator.clear("never-seen"));

    assert_eq!(orchestrator.clear_all(), 2);
    assert_eq!(orchestrator.stats().current_size, 0);
    assert_eq!(orchestrator.clear_all(), 0);
}

/// Stats report live size and configured limits.
#[tokio::test]
async fn stats_report_limits() {
    let orchestrator = Orchestrator::new(store(5, 120), Arc::new(FixedLLM::new("ok")));
    orchestrator.send("s", "hello").await.expect("send");

    let stats = orchestrator.stats();
    assert_eq!(stats.current_size, 1);
    assert_eq!(stats.max_size, 5);
    assert_eq!(stats.ttl_seconds, 120);
}

/// A spawned turn completes and returns its reply through the handle.
#[tokio::test]
async fn spawned_send_finishes() {
    let orchestrator = Orchestrator::new(store(10, 3600), Arc::new(ScriptedLLM::echo()));
    let handle = orchestrator.spawn_send("s", "ping");
    assert_eq!(handle.session_id, "s");

    let reply = handle.finish().await.expect("reply");
    assert_eq!(reply.response, "echo: ping");
}

/// Dropping a spawned turn's handle does not cancel the turn.
#[tokio::test]
async fn abandoned_send_still_records_turns() {
    let orchestrator = Orchestrator::new(
        store(10, 3600),
        Arc::new(ScriptedLLM::echo().with_delay(Duration::from_millis(20))),
    );
    drop(orchestrator.spawn_send("s", "ping"));

    let mut recorded = 0;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        recorded = orchestrator.transcript("s").expect("transcript").len();
        if recorded == 2 {
            break;
        }
    }
    assert_eq!(recorded, 2);
}

/// Probing the provider bypasses session memory entirely.
#[tokio::test]
async fn probe_does_not_touch_memory() {
    let orchestrator = Orchestrator::new(store(10, 3600), Arc::new(FixedLLM::new("pong")));
    assert_eq!(orchestrator.probe("ping").await.expect("probe"), "pong");
    assert_eq!(orchestrator.stats().current_size, 0);

    let err = orchestrator.probe("").await.unwrap_err();
    assert!(err.is_client_error());
}
