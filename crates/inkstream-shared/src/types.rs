use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id! {
    /// Server-assigned id of a registered user.
    UserId
}

entity_id! {
    /// Server-assigned id of a direct-message conversation.
    ConversationId
}

entity_id! {
    /// Server-assigned id of a message within a conversation.
    ///
    /// Ids are allocated in send order by the backend, so they define the
    /// authoritative ordering of a thread regardless of delivery order.
    MessageId
}

entity_id! {
    /// Server-assigned id of a blog post.
    PostId
}

entity_id! {
    /// Server-assigned id of a comment on a post.
    CommentId
}

entity_id! {
    /// Server-assigned id of a notification.
    NotificationId
}

/// Which kind of entity a like event targets.
///
/// The backend sends the discriminator capitalised (`"Post"` / `"Comment"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LikeableType {
    Post,
    Comment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_bare_numbers() {
        let id = ConversationId(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: ConversationId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_likeable_type_wire_names() {
        assert_eq!(serde_json::to_string(&LikeableType::Post).unwrap(), "\"Post\"");
        assert_eq!(
            serde_json::to_string(&LikeableType::Comment).unwrap(),
            "\"Comment\""
        );
    }
}
