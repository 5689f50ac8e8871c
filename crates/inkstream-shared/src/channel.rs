//! Logical channel names.
//!
//! Every realtime event arrives on a named channel scoped to one entity.
//! [`ChannelKey`] is the typed form of those names and round-trips to the
//! string names the backend publishes on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CommentId, ConversationId, PostId, UserId};

/// Wire name of the single global presence channel.
const PRESENCE_CHANNEL: &str = "presence-chat";

/// A parsed channel name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ChannelKey {
    /// Per-conversation channel carrying `new-message` events.
    Conversation(ConversationId),
    /// Per-post channel carrying like and comment events.
    Post(PostId),
    /// Per-comment channel carrying `like-updated` events.
    Comment(CommentId),
    /// Per-user channel carrying `new-notification` events.
    User(UserId),
    /// Global presence channel reporting membership.
    Presence,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseChannelError {
    #[error("unknown channel name: {0}")]
    UnknownName(String),

    #[error("invalid entity id in channel name: {0}")]
    InvalidId(String),
}

impl ChannelKey {
    /// The wire name the backend publishes this channel under.
    pub fn name(&self) -> String {
        match self {
            Self::Conversation(id) => format!("conversation-{id}"),
            Self::Post(id) => format!("post-{id}"),
            Self::Comment(id) => format!("comment-{id}"),
            Self::User(id) => format!("user-{id}"),
            Self::Presence => PRESENCE_CHANNEL.to_string(),
        }
    }

    /// Parse a wire channel name back into a key.
    pub fn parse(name: &str) -> Result<Self, ParseChannelError> {
        if name == PRESENCE_CHANNEL {
            return Ok(Self::Presence);
        }

        let (prefix, raw_id) = name
            .rsplit_once('-')
            .ok_or_else(|| ParseChannelError::UnknownName(name.to_string()))?;

        let id: u64 = raw_id
            .parse()
            .map_err(|_| ParseChannelError::InvalidId(name.to_string()))?;

        match prefix {
            "conversation" => Ok(Self::Conversation(ConversationId(id))),
            "post" => Ok(Self::Post(PostId(id))),
            "comment" => Ok(Self::Comment(CommentId(id))),
            "user" => Ok(Self::User(UserId(id))),
            _ => Err(ParseChannelError::UnknownName(name.to_string())),
        }
    }

}

impl std::fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_backend_format() {
        assert_eq!(ChannelKey::Conversation(ConversationId(7)).name(), "conversation-7");
        assert_eq!(ChannelKey::Post(PostId(3)).name(), "post-3");
        assert_eq!(ChannelKey::User(UserId(12)).name(), "user-12");
        assert_eq!(ChannelKey::Presence.name(), "presence-chat");
    }

    #[test]
    fn test_parse_known_channels() {
        assert_eq!(
            ChannelKey::parse("conversation-7").unwrap(),
            ChannelKey::Conversation(ConversationId(7))
        );
        assert_eq!(
            ChannelKey::parse("comment-19").unwrap(),
            ChannelKey::Comment(CommentId(19))
        );
        assert_eq!(ChannelKey::parse("presence-chat").unwrap(), ChannelKey::Presence);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            ChannelKey::parse("conversation-abc"),
            Err(ParseChannelError::InvalidId(_))
        ));
        assert!(matches!(
            ChannelKey::parse("nonsense"),
            Err(ParseChannelError::UnknownName(_))
        ));
        assert!(matches!(
            ChannelKey::parse("topic-3"),
            Err(ParseChannelError::UnknownName(_))
        ));
    }
}
