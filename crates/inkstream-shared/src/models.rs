//! Data models as returned by the REST API.
//!
//! These are the authoritative shapes: on every re-fetch the payloads below
//! replace whatever the client holds locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CommentId, ConversationId, MessageId, NotificationId, PostId, UserId};

/// A direct message inside a conversation.
///
/// Immutable once created, except for `read_at` which transitions from
/// `None` to a timestamp exactly once and is never reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}

/// A direct-message conversation.
///
/// The list endpoint returns each conversation with only its latest message
/// as a preview; the detail endpoint returns the full id-ordered thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: ConversationId,
    pub participant_ids: Vec<UserId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Per-recipient read state of a notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRecipient {
    pub user_id: UserId,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}

/// What triggered a notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
    PostLiked { post_id: PostId, actor_id: UserId },
    CommentAdded {
        post_id: PostId,
        comment_id: CommentId,
        actor_id: UserId,
    },
    CommentLiked { comment_id: CommentId, actor_id: UserId },
    NewFollower { actor_id: UserId },
    NewMessage {
        conversation_id: ConversationId,
        actor_id: UserId,
    },
}

/// A notification delivered to one or more recipients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub recipients: Vec<NotificationRecipient>,
    pub payload: NotificationPayload,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Read timestamp for one recipient, if they are a recipient at all.
    pub fn read_at_for(&self, user: UserId) -> Option<DateTime<Utc>> {
        self.recipients
            .iter()
            .find(|r| r.user_id == user)
            .and_then(|r| r.read_at)
    }

    /// Whether the notification is unread for the given recipient.
    ///
    /// A user who is not a recipient has nothing to read.
    pub fn is_unread_for(&self, user: UserId) -> bool {
        self.recipients
            .iter()
            .any(|r| r.user_id == user && r.read_at.is_none())
    }
}

/// Post detail as consumed by the sync core: aggregate counts only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub like_count: u64,
    pub comment_count: u64,
}

/// A comment on a post, possibly a reply to another comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    pub like_count: u64,
    pub created_at: DateTime<Utc>,
}
