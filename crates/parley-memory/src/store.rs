//! Bounded, expiring, concurrent-safe conversation store.

use crate::clock::{Clock, SystemClock};
use crate::error::MemoryError;
use crate::model::{MemoryStats, Transcript, Turn};
use crate::policy::{StoreLimits, is_expired};
use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Recency index key: access time first, insertion order as tie-break.
type RecencyKey = (DateTime<Utc>, u64);

/// Stored transcript plus the metadata used for expiry and eviction.
#[derive(Debug)]
struct SessionEntry {
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
    /// Monotonic insertion sequence of this entry's key.
    seq: u64,
}

impl SessionEntry {
    fn recency_key(&self) -> RecencyKey {
        (self.last_accessed_at, self.seq)
    }

    fn snapshot(&self, session_id: &str) -> Transcript {
        Transcript::new(
            session_id.to_string(),
            self.turns.clone(),
            self.created_at,
            self.last_accessed_at,
        )
    }
}

#[derive(Debug, Default)]
struct StoreState {
    entries: HashMap<String, SessionEntry>,
    /// Every entry appears here exactly once, ordered oldest access first.
    recency: BTreeMap<RecencyKey, String>,
    next_seq: u64,
}

impl StoreState {
    /// Drop every entry whose last access is older than the TTL.
    ///
    /// The recency index is ordered by access time, so expired entries are
    /// always a prefix of it.
    fn purge_expired(&mut self, now: DateTime<Utc>, limits: &StoreLimits) -> usize {
        let ttl = limits.ttl();
        let mut purged = 0;
        while let Some((&(last_accessed_at, _), _)) = self.recency.first_key_value() {
            if !is_expired(last_accessed_at, now, ttl) {
                break;
            }
            if let Some((_, session_id)) = self.recency.pop_first() {
                self.entries.remove(&session_id);
                debug!("expired session memory (session_id={session_id})");
                purged += 1;
            }
        }
        purged
    }

    /// Refresh a live entry's access time, keeping the index in sync.
    fn refresh(&mut self, session_id: &str, now: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(session_id) {
            self.recency.remove(&entry.recency_key());
            entry.last_accessed_at = now;
            self.recency
                .insert(entry.recency_key(), session_id.to_string());
        }
    }

    /// Evict least recently accessed entries until one more fits.
    fn make_room(&mut self, limits: &StoreLimits) {
        while self.entries.len() >= limits.max_entries() {
            let Some((_, evicted)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&evicted);
            info!(
                "evicted least recently used session (session_id={evicted}, max_entries={})",
                limits.max_entries()
            );
        }
    }

    /// Look up a live entry (refreshing it) or create an empty one.
    fn get_or_insert(
        &mut self,
        session_id: &str,
        now: DateTime<Utc>,
        limits: &StoreLimits,
    ) -> &mut SessionEntry {
        if self.entries.contains_key(session_id) {
            debug!("retrieved session memory (session_id={session_id})");
            self.refresh(session_id, now);
        } else {
            self.make_room(limits);
            info!("created session memory (session_id={session_id})");
        }
        let next_seq = &mut self.next_seq;
        let recency = &mut self.recency;
        self.entries
            .entry(session_id.to_string())
            .or_insert_with(|| {
                let seq = *next_seq;
                *next_seq += 1;
                recency.insert((now, seq), session_id.to_string());
                SessionEntry {
                    turns: Vec::new(),
                    created_at: now,
                    last_accessed_at: now,
                    seq,
                }
            })
    }

    fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.recency.clear();
        removed
    }
}

/// Session-id → transcript cache bounded by count and idle time.
///
/// Every entry carries one access timestamp that drives both TTL expiry and
/// LRU eviction. Expiry is lazy: each operation first purges entries idle for
/// at least the TTL. A single mutex guards the whole map, so every operation
/// (including a multi-turn append) is atomic with respect to the others.
///
/// Clones share the same underlying state.
#[derive(Clone)]
pub struct ConversationStore {
    state: Arc<Mutex<StoreState>>,
    limits: StoreLimits,
    clock: Arc<dyn Clock>,
}

impl ConversationStore {
    /// Create a store driven by the system clock.
    pub fn new(limits: StoreLimits) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    /// Create a store with an explicit time source.
    pub fn with_clock(limits: StoreLimits, clock: Arc<dyn Clock>) -> Self {
        info!(
            "conversation store initialized (max_entries={}, ttl_seconds={})",
            limits.max_entries(),
            limits.ttl_seconds()
        );
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            limits,
            clock,
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Return the live transcript for `session_id`, creating an empty one if
    /// absent or expired. Refreshes the entry's access time.
    pub fn get_or_create(&self, session_id: &str) -> Result<Transcript, MemoryError> {
        ensure_session_id(session_id)?;
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.purge_expired(now, &self.limits);
        let entry = state.get_or_insert(session_id, now, &self.limits);
        Ok(entry.snapshot(session_id))
    }

    /// Append turns in order to the session's transcript.
    ///
    /// A missing or expired entry is recreated, so the turns become its only
    /// content. All turns land under one lock acquisition; concurrent appends
    /// to the same key never interleave.
    pub fn append<I>(&self, session_id: &str, turns: I) -> Result<(), MemoryError>
    where
        I: IntoIterator<Item = Turn>,
    {
        ensure_session_id(session_id)?;
        let turns: Vec<Turn> = turns.into_iter().collect();
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.purge_expired(now, &self.limits);
        let entry = state.get_or_insert(session_id, now, &self.limits);
        entry.turns.extend(turns);
        debug!(
            "appended session memory (session_id={session_id}, turns={})",
            entry.turns.len()
        );
        Ok(())
    }

    /// Remove a live entry. Returns `false` when nothing was removed,
    /// including when the entry had already expired.
    pub fn clear(&self, session_id: &str) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.purge_expired(now, &self.limits);
        let Some(entry) = state.entries.remove(session_id) else {
            return false;
        };
        state.recency.remove(&entry.recency_key());
        info!("cleared session memory (session_id={session_id})");
        true
    }

    /// Remove every entry, returning how many live entries were dropped.
    pub fn clear_all(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.purge_expired(now, &self.limits);
        let removed = state.clear();
        info!("cleared all sessions from memory (count={removed})");
        removed
    }

    /// Report live size and configured limits.
    pub fn stats(&self) -> MemoryStats {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.purge_expired(now, &self.limits);
        MemoryStats {
            current_size: state.entries.len(),
            max_size: self.limits.max_entries(),
            ttl_seconds: self.limits.ttl_seconds(),
        }
    }

    /// Eagerly drop expired entries; used by the optional background sweeper.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let purged = self.state.lock().purge_expired(now, &self.limits);
        if purged > 0 {
            debug!("purged expired sessions (count={purged})");
        }
        purged
    }
}

fn ensure_session_id(session_id: &str) -> Result<(), MemoryError> {
    if session_id.is_empty() {
        return Err(MemoryError::EmptySessionId);
    }
    Ok(())
}
