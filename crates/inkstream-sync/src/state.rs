//! Aggregate sync state.
//!
//! One struct owns every state slice for the session.  It lives behind a
//! single `tokio::sync::Mutex` in the engine, so each mutation is applied
//! atomically with respect to every other: no caller can observe, say, the
//! per-conversation unread map and the total mid-update.

use crate::comments::CommentState;
use crate::conversations::ConversationState;
use crate::fetch::FetchGate;
use crate::notifications::NotificationState;
use crate::presence::PresenceTracker;
use crate::unread::UnreadCounters;

/// All session-scoped sync state.
#[derive(Debug, Default)]
pub struct SyncState {
    pub conversations: ConversationState,
    pub unread: UnreadCounters,
    pub notifications: NotificationState,
    pub comments: CommentState,
    pub presence: PresenceTracker,
    pub fetches: FetchGate,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything (logout).
    pub fn clear(&mut self) {
        self.conversations.clear();
        self.unread.reset_all();
        self.notifications.clear();
        self.comments.clear();
        self.presence.clear();
        self.fetches.clear();
    }
}
