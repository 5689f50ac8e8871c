//! Conversation sync state.
//!
//! Holds the conversation list (sidebar), the currently open thread, and the
//! optimistic messages awaiting server confirmation.  Authoritative payloads
//! always replace local data wholesale: server-assigned ids define message
//! order, so the thread is never patched incrementally on arrival.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use inkstream_shared::{Conversation, ConversationId, Message, UserId};

/// A message sent by the current user that the server has not confirmed yet.
///
/// Tagged with a client-local uuid; the tag never survives an authoritative
/// thread replace, which discards all pending entries in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMessage {
    pub local_tag: Uuid,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl PendingMessage {
    pub fn new(conversation_id: ConversationId, sender_id: UserId, content: String) -> Self {
        Self {
            local_tag: Uuid::new_v4(),
            conversation_id,
            sender_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// The currently open message thread.
#[derive(Debug, Clone, Default)]
pub struct OpenThread {
    pub conversation_id: Option<ConversationId>,
    messages: Vec<Message>,
    pending: Vec<PendingMessage>,
}

/// Owned snapshot of the open thread for rendering.
#[derive(Debug, Clone)]
pub struct ThreadView {
    pub conversation_id: ConversationId,
    pub messages: Vec<Message>,
    pub pending: Vec<PendingMessage>,
}

impl ThreadView {
    /// Entries visible to the user: confirmed messages then pending ones.
    pub fn len(&self) -> usize {
        self.messages.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Conversation list and open-thread state.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    items: Vec<Conversation>,
    open: OpenThread,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the conversation list with an authoritative payload.
    pub fn apply_list(&mut self, conversations: Vec<Conversation>) {
        debug!(count = conversations.len(), "Applied conversation list");
        self.items = conversations;
    }

    /// Whether a conversation is known locally.
    pub fn knows(&self, id: ConversationId) -> bool {
        self.items.iter().any(|c| c.id == id)
    }

    /// Ids of every conversation in the sidebar.
    pub fn ids(&self) -> Vec<ConversationId> {
        self.items.iter().map(|c| c.id).collect()
    }

    pub fn items(&self) -> &[Conversation] {
        &self.items
    }

    /// Prepend a freshly created conversation and make it current.
    pub fn upsert_created(&mut self, conversation: Conversation) {
        let id = conversation.id;
        self.items.retain(|c| c.id != id);
        self.items.insert(0, conversation);
        self.open = OpenThread {
            conversation_id: Some(id),
            ..OpenThread::default()
        };
    }

    /// Mark a conversation as the open thread.
    ///
    /// The thread starts empty; the caller follows up with an authoritative
    /// fetch that lands via [`apply_thread`](Self::apply_thread).
    pub fn open(&mut self, id: ConversationId) {
        self.open = OpenThread {
            conversation_id: Some(id),
            ..OpenThread::default()
        };
    }

    /// Close the open thread, dropping any pending entries with it.
    pub fn close(&mut self) {
        self.open = OpenThread::default();
    }

    /// Id of the open conversation, if any.
    pub fn open_id(&self) -> Option<ConversationId> {
        self.open.conversation_id
    }

    pub fn is_open(&self, id: ConversationId) -> bool {
        self.open.conversation_id == Some(id)
    }

    /// Replace the open thread wholesale with server-confirmed data.
    ///
    /// All optimistic entries are discarded: the authoritative payload
    /// already contains any of them the server accepted, and merging by id
    /// is impossible before the server assigns ids.  Ignored when the
    /// conversation is no longer the open one (stale completion after a
    /// thread switch).
    pub fn apply_thread(&mut self, conversation: Conversation) {
        if self.open.conversation_id != Some(conversation.id) {
            debug!(conversation = %conversation.id, "Dropping thread payload for non-open conversation");
            return;
        }

        self.open.messages = conversation.messages.clone();
        self.open.pending.clear();

        // Keep the sidebar entry's preview in step.
        if let Some(item) = self.items.iter_mut().find(|c| c.id == conversation.id) {
            item.last_message_at = conversation.last_message_at;
            item.messages = conversation.messages.last().cloned().into_iter().collect();
        }
    }

    /// Append an optimistic message to the open thread.
    ///
    /// Returns false (and appends nothing) if the conversation is not the
    /// open thread.
    pub fn append_optimistic(&mut self, message: PendingMessage) -> bool {
        if self.open.conversation_id != Some(message.conversation_id) {
            return false;
        }
        self.open.pending.push(message);
        true
    }

    /// Patch read receipts into the open thread.
    ///
    /// `read_at` only ever transitions from `None` to a timestamp; a receipt
    /// for a message already marked read is ignored.
    pub fn apply_read_receipts(&mut self, conversation: ConversationId, receipts: &[Message]) {
        if self.open.conversation_id != Some(conversation) {
            return;
        }
        for receipt in receipts {
            if let Some(message) = self.open.messages.iter_mut().find(|m| m.id == receipt.id) {
                if message.read_at.is_none() {
                    message.read_at = receipt.read_at;
                }
            }
        }
    }

    /// Owned snapshot of the open thread.
    pub fn thread_view(&self) -> Option<ThreadView> {
        self.open.conversation_id.map(|conversation_id| ThreadView {
            conversation_id,
            messages: self.open.messages.clone(),
            pending: self.open.pending.clone(),
        })
    }

    /// Drop everything (logout).
    pub fn clear(&mut self) {
        self.items.clear();
        self.open = OpenThread::default();
    }
}
