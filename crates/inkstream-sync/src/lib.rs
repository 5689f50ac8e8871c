//! # inkstream-sync
//!
//! Client-side realtime synchronization core.  Mirrors server-side events
//! (new message, new notification, like toggled, comment churn, presence)
//! into a local state store, reconciling them against authoritative REST
//! re-fetches.
//!
//! The moving parts:
//!
//! - [`registry::ChannelRegistry`] — reference-counted bookkeeping of which
//!   pub/sub channels are subscribed, with exactly one transport-level
//!   subscription per distinct key.
//! - [`presence::PresenceTracker`] — the set of currently-online users,
//!   maintained from snapshot and incremental membership events.
//! - [`dispatcher::Dispatcher`] — maps each inbound event to a local patch
//!   or an authoritative re-fetch (re-fetch-biased: patch only when the
//!   event is self-sufficient).
//! - [`state::SyncState`] — conversations, the open thread, unread counters,
//!   notifications, and watched post/comment lists.
//! - [`engine::SyncEngine`] — the session-scoped façade that owns all of the
//!   above plus the event-loop task.
//!
//! All state mutation happens under a single async mutex, one action at a
//! time; "concurrency" here is the interleaving of transport events, HTTP
//! completions, and caller operations on the same runtime.

pub mod comments;
pub mod conversations;
pub mod dispatcher;
pub mod engine;
pub mod fetch;
pub mod notifications;
pub mod presence;
pub mod registry;
pub mod state;
pub mod transport;
pub mod unread;

mod error;

#[cfg(test)]
pub(crate) mod support;

pub use conversations::{PendingMessage, ThreadView};
pub use dispatcher::Dispatcher;
pub use engine::SyncEngine;
pub use error::SyncError;
pub use fetch::{FetchGate, FetchTarget, FetchTicket};
pub use presence::PresenceTracker;
pub use registry::ChannelRegistry;
pub use state::SyncState;
pub use transport::{Transport, TransportError};
pub use unread::UnreadCounters;
