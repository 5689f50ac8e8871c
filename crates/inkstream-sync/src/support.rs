//! In-memory transport and API doubles shared by the test modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use inkstream_api::{ApiError, Result as ApiResult, SyncApi};
use inkstream_shared::{
    ChannelKey, Comment, Conversation, ConversationId, Message, MessageId, Notification,
    NotificationId, NotificationPayload, NotificationRecipient, Post, PostId, UserId,
};

use crate::transport::{Transport, TransportError};

/// Transport double that records every subscribe/unsubscribe per channel.
#[derive(Default)]
pub struct RecordingTransport {
    subscribes: Mutex<HashMap<ChannelKey, usize>>,
    unsubscribes: Mutex<HashMap<ChannelKey, usize>>,
    fail_next_subscribe: AtomicBool,
}

impl RecordingTransport {
    pub fn subscribe_count(&self, key: &ChannelKey) -> usize {
        self.subscribes.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn unsubscribe_count(&self, key: &ChannelKey) -> usize {
        self.unsubscribes.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn fail_next_subscribe(&self) {
        self.fail_next_subscribe.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn subscribe(&self, channel: &ChannelKey) -> Result<(), TransportError> {
        if self.fail_next_subscribe.swap(false, Ordering::SeqCst) {
            return Err(TransportError::Rejected("stubbed failure".into()));
        }
        *self.subscribes.lock().unwrap().entry(*channel).or_insert(0) += 1;
        Ok(())
    }

    async fn unsubscribe(&self, channel: &ChannelKey) -> Result<(), TransportError> {
        *self.unsubscribes.lock().unwrap().entry(*channel).or_insert(0) += 1;
        Ok(())
    }
}

/// API double backed by seedable in-memory data, with per-endpoint call
/// counters so tests can assert which re-fetches a dispatch triggered.
#[derive(Default)]
pub struct StubApi {
    pub conversations: Mutex<Vec<Conversation>>,
    pub threads: Mutex<HashMap<ConversationId, Conversation>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub posts: Mutex<HashMap<PostId, Post>>,
    pub comments: Mutex<HashMap<PostId, Vec<Comment>>>,
    pub read_receipts: Mutex<HashMap<ConversationId, Vec<Message>>>,
    pub sent: Mutex<Vec<(ConversationId, String)>>,

    pub conversation_list_fetches: AtomicUsize,
    pub thread_fetches: AtomicUsize,
    pub notification_fetches: AtomicUsize,
    pub post_fetches: AtomicUsize,
    pub comment_fetches: AtomicUsize,

    next_message_id: AtomicU64,
    fail_next_send: AtomicBool,
    fail_next_conversation_fetch: AtomicBool,
}

impl StubApi {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicU64::new(1000),
            ..Self::default()
        }
    }

    pub fn seed_conversation(&self, conversation: Conversation) {
        self.threads
            .lock()
            .unwrap()
            .insert(conversation.id, conversation.clone());
        self.conversations.lock().unwrap().push(conversation);
    }

    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_conversation_fetch(&self) {
        self.fail_next_conversation_fetch.store(true, Ordering::SeqCst);
    }

    fn not_found(path: String) -> ApiError {
        ApiError::Status { status: 404, path }
    }
}

#[async_trait]
impl SyncApi for StubApi {
    async fn fetch_conversations(&self) -> ApiResult<Vec<Conversation>> {
        self.conversation_list_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_conversation_fetch.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                path: "/conversations".into(),
            });
        }
        Ok(self.conversations.lock().unwrap().clone())
    }

    async fn fetch_conversation(&self, id: ConversationId) -> ApiResult<Conversation> {
        self.thread_fetches.fetch_add(1, Ordering::SeqCst);
        self.threads
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("/conversations/{id}")))
    }

    async fn create_conversation(
        &self,
        participant_ids: &[UserId],
        name: Option<&str>,
    ) -> ApiResult<Conversation> {
        let id = ConversationId(self.next_message_id.fetch_add(1, Ordering::SeqCst));
        let conversation = Conversation {
            id,
            participant_ids: participant_ids.to_vec(),
            name: name.map(str::to_string),
            messages: Vec::new(),
            last_message_at: None,
        };
        self.seed_conversation(conversation.clone());
        Ok(conversation)
    }

    async fn send_message(&self, conversation: ConversationId, content: &str) -> ApiResult<Message> {
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                path: format!("/conversations/{conversation}/message"),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((conversation, content.to_string()));
        Ok(Message {
            id: MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst)),
            conversation_id: conversation,
            sender_id: UserId(0),
            content: content.to_string(),
            created_at: Utc::now(),
            read_at: None,
        })
    }

    async fn mark_conversation_read(&self, id: ConversationId) -> ApiResult<Vec<Message>> {
        Ok(self
            .read_receipts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_notifications(&self) -> ApiResult<Vec<Notification>> {
        self.notification_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.notifications.lock().unwrap().clone())
    }

    async fn mark_notification_read(&self, id: NotificationId) -> ApiResult<Notification> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("/notifications/{id}")))
    }

    async fn mark_all_notifications_read(&self) -> ApiResult<()> {
        Ok(())
    }

    async fn delete_notification(&self, id: NotificationId) -> ApiResult<()> {
        self.notifications.lock().unwrap().retain(|n| n.id != id);
        Ok(())
    }

    async fn fetch_post(&self, id: PostId) -> ApiResult<Post> {
        self.post_fetches.fetch_add(1, Ordering::SeqCst);
        self.posts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("/posts/{id}")))
    }

    async fn fetch_comments(&self, post: PostId) -> ApiResult<Vec<Comment>> {
        self.comment_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(&post)
            .cloned()
            .unwrap_or_default())
    }
}

// Model builders used across test modules.

pub fn message(id: u64, conversation: ConversationId, sender: UserId, content: &str) -> Message {
    Message {
        id: MessageId(id),
        conversation_id: conversation,
        sender_id: sender,
        content: content.to_string(),
        created_at: Utc::now(),
        read_at: None,
    }
}

pub fn conversation(id: u64, participants: &[UserId], messages: Vec<Message>) -> Conversation {
    Conversation {
        id: ConversationId(id),
        participant_ids: participants.to_vec(),
        name: None,
        last_message_at: messages.last().map(|m| m.created_at),
        messages,
    }
}

pub fn notification(id: u64, recipient: UserId, actor: UserId) -> Notification {
    Notification {
        id: NotificationId(id),
        recipients: vec![NotificationRecipient {
            user_id: recipient,
            read_at: None,
        }],
        payload: NotificationPayload::NewFollower { actor_id: actor },
        created_at: Utc::now(),
    }
}

pub fn comment(id: u64, post: PostId, author: UserId) -> Comment {
    Comment {
        id: inkstream_shared::CommentId(id),
        post_id: post,
        user_id: author,
        content: format!("comment {id}"),
        parent_id: None,
        like_count: 0,
        created_at: Utc::now(),
    }
}
