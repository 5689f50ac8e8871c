//! # inkstream-shared
//!
//! Domain types shared across the inkstream sync crates: entity ids, channel
//! keys, the data models the REST API returns, and the tagged event union
//! delivered over the realtime transport.

pub mod channel;
pub mod events;
pub mod models;
pub mod types;

pub use channel::{ChannelKey, ParseChannelError};
pub use events::{ChannelEvent, InboundEvent};
pub use models::{
    Comment, Conversation, Message, Notification, NotificationPayload, NotificationRecipient, Post,
};
pub use types::{CommentId, ConversationId, LikeableType, MessageId, NotificationId, PostId, UserId};
