//! Public SDK surface for Parley.
//!
//! This crate re-exports the member crates and provides the small startup
//! helpers shared by the `parley` binary and embedders.

/// Re-export for convenience.
pub use parley_config as config;
pub use parley_core as core;
/// Re-export for convenience.
pub use parley_memory as memory;
/// Re-export for convenience.
pub use parley_protocol as protocol;
pub use parley_server as server;

use log::{debug, info};
use parley_memory::ConversationStore;
use std::time::Duration;
use tokio::task::JoinHandle;

#[inline]
/// Initialize logging with `env_logger`, honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

/// Periodically drop expired sessions from `store`.
///
/// The task runs until aborted. Lazy expiry keeps working without it; the
/// sweep only bounds how long idle transcripts stay resident.
pub fn spawn_sweeper(store: ConversationStore, period: Duration) -> JoinHandle<()> {
    info!("starting session sweeper (period_ms={})", period.as_millis());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                debug!("session sweep finished (purged={purged})");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::spawn_sweeper;
    use chrono::TimeDelta;
    use parley_memory::{ConversationStore, ManualClock, StoreLimits, Turn};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn sweeper_purges_expired_sessions() {
        let clock = ManualClock::default();
        let store = ConversationStore::with_clock(
            StoreLimits::new(10, 60).expect("limits"),
            Arc::new(clock.clone()),
        );
        store
            .append("idle", [Turn::user("hi"), Turn::assistant("hello")])
            .expect("append");
        store.append("busy", [Turn::user("hi")]).expect("append");

        let sweeper = spawn_sweeper(store.clone(), Duration::from_millis(5));
        clock.advance(TimeDelta::seconds(30));
        store.append("busy", [Turn::user("again")]).expect("append");
        clock.advance(TimeDelta::seconds(30));
        tokio::time::sleep(Duration::from_millis(50)).await;
        sweeper.abort();

        assert_eq!(store.purge_expired(), 0);
        assert_eq!(store.stats().current_size, 1);
        assert_eq!(store.get_or_create("busy").expect("busy").len(), 2);
    }
}
