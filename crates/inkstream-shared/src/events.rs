//! Realtime event payloads.
//!
//! The transport delivers duck-typed JSON payloads whose shape depends on the
//! event name. [`ChannelEvent`] models that as a tagged union so the
//! dispatcher gets exhaustiveness checking over every event it handles.

use serde::{Deserialize, Serialize};

use crate::channel::ChannelKey;
use crate::models::{Message, Notification};
use crate::types::{CommentId, LikeableType, UserId};

/// One named event as decoded from a transport frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ChannelEvent {
    /// A message was created in a conversation.
    NewMessage { message: Message },

    /// A notification was created for the channel's user.
    NewNotification { notification: Notification },

    /// A like was added or removed on a post or comment.
    ///
    /// Carries only aggregate hints; the authoritative count comes from the
    /// re-fetch this event triggers.
    LikeUpdated {
        likeable_type: LikeableType,
        likeable_id: u64,
        like_count: u64,
    },

    /// A comment was created on the channel's post.
    NewComment { comment_id: CommentId },

    /// A comment on the channel's post was edited.
    UpdateComment { comment_id: CommentId },

    /// A comment on the channel's post was deleted.
    ///
    /// Unambiguous, so it is applied as a local patch rather than a re-fetch.
    DeleteComment { comment_id: CommentId },

    /// Presence subscription succeeded; carries the full member snapshot.
    SubscriptionSucceeded { members: Vec<UserId> },

    /// A member connected to the presence channel.
    MemberAdded { user_id: UserId },

    /// A member disconnected from the presence channel.
    MemberRemoved { user_id: UserId },
}

impl ChannelEvent {
    /// The wire event name, as bound on the pub/sub channel.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "new-message",
            Self::NewNotification { .. } => "new-notification",
            Self::LikeUpdated { .. } => "like-updated",
            Self::NewComment { .. } => "new-comment",
            Self::UpdateComment { .. } => "update-comment",
            Self::DeleteComment { .. } => "delete-comment",
            Self::SubscriptionSucceeded { .. } => "subscription-succeeded",
            Self::MemberAdded { .. } => "member-added",
            Self::MemberRemoved { .. } => "member-removed",
        }
    }
}

/// An event paired with the channel it arrived on.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub channel: ChannelKey,
    pub event: ChannelEvent,
}

impl InboundEvent {
    pub fn new(channel: ChannelKey, event: ChannelEvent) -> Self {
        Self { channel, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_decodes_by_name() {
        let json = r#"{
            "event": "like-updated",
            "data": { "likeable_type": "Post", "likeable_id": 4, "like_count": 12 }
        }"#;

        let event: ChannelEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ChannelEvent::LikeUpdated {
                likeable_type: LikeableType::Post,
                likeable_id: 4,
                like_count: 12,
            }
        );
        assert_eq!(event.name(), "like-updated");
    }

    #[test]
    fn test_delete_comment_carries_only_the_id() {
        let json = r#"{ "event": "delete-comment", "data": { "comment_id": 31 } }"#;
        let event: ChannelEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, ChannelEvent::DeleteComment { comment_id: CommentId(31) });
    }
}
