//! # inkstream-api
//!
//! The REST surface the sync core consumes.  [`SyncApi`] is the trait the
//! dispatcher and engine are injected with; [`HttpApi`] implements it against
//! the application backend over HTTPS with a bearer token.
//!
//! Every response is treated as authoritative truth: the sync core replaces
//! local state wholesale with whatever these calls return.

pub mod http;

mod error;

use async_trait::async_trait;

use inkstream_shared::{
    Comment, Conversation, ConversationId, Message, Notification, NotificationId, Post, PostId,
    UserId,
};

pub use error::ApiError;
pub use http::HttpApi;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// The REST operations the sync core depends on.
///
/// Object-safe so engines and tests can inject `Arc<dyn SyncApi>`.
#[async_trait]
pub trait SyncApi: Send + Sync {
    /// List the current user's conversations, newest activity first.
    async fn fetch_conversations(&self) -> Result<Vec<Conversation>>;

    /// Fetch one conversation with its full id-ordered message thread.
    async fn fetch_conversation(&self, id: ConversationId) -> Result<Conversation>;

    /// Create a conversation with the given participants.
    async fn create_conversation(
        &self,
        participant_ids: &[UserId],
        name: Option<&str>,
    ) -> Result<Conversation>;

    /// Send a message; returns the server-confirmed message with its
    /// assigned id.
    async fn send_message(&self, conversation: ConversationId, content: &str) -> Result<Message>;

    /// Acknowledge the open conversation as read; returns the messages whose
    /// `read_at` transitioned.
    async fn mark_conversation_read(&self, id: ConversationId) -> Result<Vec<Message>>;

    /// List the current user's notifications, newest first.
    async fn fetch_notifications(&self) -> Result<Vec<Notification>>;

    /// Mark one notification read for the current user.
    async fn mark_notification_read(&self, id: NotificationId) -> Result<Notification>;

    /// Mark every notification read for the current user.
    async fn mark_all_notifications_read(&self) -> Result<()>;

    /// Delete a notification.
    async fn delete_notification(&self, id: NotificationId) -> Result<()>;

    /// Fetch post detail (aggregate like/comment counts).
    async fn fetch_post(&self, id: PostId) -> Result<Post>;

    /// Fetch the full comment list for a post, including reply nesting.
    async fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>>;
}
