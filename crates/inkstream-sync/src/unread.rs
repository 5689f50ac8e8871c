//! Unread-message counters.

use std::collections::HashMap;

use inkstream_shared::ConversationId;

/// Per-conversation unread counts plus the derived total.
///
/// Invariant: `total` always equals the sum of the per-conversation counts.
/// Both are updated inside each method, so no caller can observe them
/// disagreeing.
#[derive(Debug, Clone, Default)]
pub struct UnreadCounters {
    per_conversation: HashMap<ConversationId, u64>,
    total: u64,
}

impl UnreadCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one unread message against a conversation.
    pub fn increment(&mut self, conversation: ConversationId) {
        *self.per_conversation.entry(conversation).or_insert(0) += 1;
        self.total += 1;
    }

    /// Zero a conversation's counter, subtracting it from the total.
    pub fn reset(&mut self, conversation: ConversationId) {
        if let Some(count) = self.per_conversation.remove(&conversation) {
            self.total -= count;
        }
    }

    /// Zero everything (logout).
    pub fn reset_all(&mut self) {
        self.per_conversation.clear();
        self.total = 0;
    }

    /// Unread count for one conversation.
    pub fn count(&self, conversation: ConversationId) -> u64 {
        self.per_conversation.get(&conversation).copied().unwrap_or(0)
    }

    /// Unread count across all conversations.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Snapshot of the per-conversation map.
    pub fn snapshot(&self) -> HashMap<ConversationId, u64> {
        self.per_conversation.clone()
    }
}
