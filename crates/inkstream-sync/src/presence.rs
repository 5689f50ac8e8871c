//! Online-presence tracking.
//!
//! Maintains the set of currently-online user ids from three presence
//! events: the full member snapshot delivered when the subscription
//! succeeds, and incremental member added/removed events afterwards.

use std::collections::HashSet;

use tracing::debug;

use inkstream_shared::UserId;

/// The set of users currently connected to the presence channel.
///
/// There is no "unknown" state: a user absent from the set is reported
/// offline, including during the window before the first snapshot arrives.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    online: HashSet<UserId>,
}

impl PresenceTracker {
    /// Create a tracker with nobody known to be online.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set with an authoritative member snapshot.
    ///
    /// This is the only operation allowed to shrink the set other than
    /// explicit removals.
    pub fn on_snapshot(&mut self, members: impl IntoIterator<Item = UserId>) {
        self.online = members.into_iter().collect();
        debug!(online = self.online.len(), "Applied presence snapshot");
    }

    /// Mark a member online.  Idempotent.
    pub fn on_member_added(&mut self, member: UserId) {
        if self.online.insert(member) {
            debug!(user = %member, "Member online");
        }
    }

    /// Mark a member offline.  Idempotent.
    pub fn on_member_removed(&mut self, member: UserId) {
        if self.online.remove(&member) {
            debug!(user = %member, "Member offline");
        }
    }

    /// Membership test.
    pub fn is_online(&self, user: UserId) -> bool {
        self.online.contains(&user)
    }

    /// Number of users currently online.
    pub fn online_count(&self) -> usize {
        self.online.len()
    }

    /// Snapshot of the online set.
    pub fn online_users(&self) -> Vec<UserId> {
        self.online.iter().copied().collect()
    }

    /// Forget everyone (logout).
    pub fn clear(&mut self) {
        self.online.clear();
    }
}
