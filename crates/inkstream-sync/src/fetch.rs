//! Re-fetch sequencing.
//!
//! Multiple events for the same entity can trigger overlapping re-fetches,
//! and nothing orders their HTTP completions.  Each fetch takes a ticket
//! with a per-entity monotonically increasing sequence number; a completed
//! fetch is applied only if no later-started fetch has already been applied,
//! so an early fetch that resolves late can never overwrite newer data.

use std::collections::HashMap;

use inkstream_shared::{ConversationId, PostId};

/// What a re-fetch targets.  Gating is per target, so fetches for different
/// entities never interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchTarget {
    ConversationList,
    ConversationThread(ConversationId),
    Notifications,
    Post(PostId),
    Comments(PostId),
}

/// Ticket identifying one started fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    target: FetchTarget,
    seq: u64,
}

/// Per-target monotone sequence gate.
#[derive(Debug, Default)]
pub struct FetchGate {
    next: HashMap<FetchTarget, u64>,
    applied: HashMap<FetchTarget, u64>,
}

impl FetchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a fetch and hand out its ticket.
    pub fn begin(&mut self, target: FetchTarget) -> FetchTicket {
        let seq = self.next.entry(target).or_insert(0);
        *seq += 1;
        FetchTicket { target, seq: *seq }
    }

    /// Decide whether a completed fetch may be applied.
    ///
    /// Admits the response iff its ticket is newer than the last one applied
    /// for the same target, and records it as applied when it is.
    pub fn admit(&mut self, ticket: FetchTicket) -> bool {
        let applied = self.applied.entry(ticket.target).or_insert(0);
        if ticket.seq > *applied {
            *applied = ticket.seq;
            true
        } else {
            false
        }
    }

    /// Forget all sequencing (logout).
    pub fn clear(&mut self) {
        self.next.clear();
        self.applied.clear();
    }
}
