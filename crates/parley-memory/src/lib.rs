//! Session-scoped conversation memory for Parley.
//!
//! This crate owns the bounded, expiring transcript store that the
//! orchestrator consults on every chat turn.

pub mod clock;
pub mod error;
pub mod model;
pub mod policy;
pub mod store;

/// Time sources used for expiry.
pub use clock::{Clock, ManualClock, SystemClock};
/// Memory error type.
pub use error::MemoryError;
/// Turn, transcript, and statistics models.
pub use model::{MemoryStats, Role, Turn, Transcript};
/// Store limits and the expiry predicate.
pub use policy::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECONDS, StoreLimits, is_expired};
/// Conversation store.
pub use store::ConversationStore;
