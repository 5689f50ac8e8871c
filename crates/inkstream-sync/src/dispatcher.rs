//! Event dispatch.
//!
//! Maps each inbound event to a local state mutation or an authoritative
//! re-fetch.  The policy is re-fetch-biased: events whose payloads carry
//! ambiguity (aggregate like counts, reply nesting, thread ordering) trigger
//! a full re-fetch; only unambiguous events (`delete-comment`, presence
//! membership) are applied as local patches.
//!
//! A dispatch that fails mid-re-fetch is logged and swallowed; the previous
//! state stays visible until the next successful event or manual refresh.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use inkstream_api::SyncApi;
use inkstream_shared::{
    ChannelEvent, ChannelKey, CommentId, ConversationId, InboundEvent, LikeableType, Message,
    PostId, UserId,
};

use crate::error::SyncError;
use crate::fetch::FetchTarget;
use crate::registry::ChannelRegistry;
use crate::state::SyncState;

/// Routes inbound events into state mutations and re-fetches.
///
/// Also owns the two derived channel sets: one subscription per sidebar
/// conversation and one per comment of each watched post, kept in step with
/// the lists each authoritative re-fetch returns.
pub struct Dispatcher {
    api: Arc<dyn SyncApi>,
    registry: Arc<ChannelRegistry>,
    state: Arc<Mutex<SyncState>>,
    current_user: UserId,
    sidebar: Mutex<HashSet<ConversationId>>,
    watched_posts: Mutex<HashMap<PostId, HashSet<CommentId>>>,
}

impl Dispatcher {
    pub fn new(
        api: Arc<dyn SyncApi>,
        registry: Arc<ChannelRegistry>,
        state: Arc<Mutex<SyncState>>,
        current_user: UserId,
    ) -> Self {
        Self {
            api,
            registry,
            state,
            current_user,
            sidebar: Mutex::new(HashSet::new()),
            watched_posts: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one inbound event.  Never fails: dispatch errors are logged
    /// and the last-known-good state remains.
    pub async fn handle(&self, inbound: InboundEvent) {
        // Stale delivery for a channel we no longer track.
        if !self.registry.contains(&inbound.channel).await {
            debug!(channel = %inbound.channel, event = inbound.event.name(), "Dropping event for unsubscribed channel");
            return;
        }

        let channel = inbound.channel;
        let name = inbound.event.name();
        if let Err(e) = self.dispatch(inbound).await {
            warn!(channel = %channel, event = name, error = %e, "Event dispatch failed; keeping previous state");
        }
    }

    async fn dispatch(&self, inbound: InboundEvent) -> Result<(), SyncError> {
        match (inbound.channel, inbound.event) {
            (ChannelKey::Conversation(id), ChannelEvent::NewMessage { message }) => {
                self.on_new_message(id, message).await
            }

            (ChannelKey::User(user), ChannelEvent::NewNotification { .. }) => {
                // Per-user channels exist for every user; only events on the
                // current user's own channel concern this client.
                if user == self.current_user {
                    self.refetch_notifications().await
                } else {
                    Ok(())
                }
            }

            (
                ChannelKey::Post(post),
                ChannelEvent::LikeUpdated {
                    likeable_type: LikeableType::Post,
                    ..
                },
            ) => self.refetch_post(post).await,

            (
                ChannelKey::Post(post),
                ChannelEvent::NewComment { .. } | ChannelEvent::UpdateComment { .. },
            ) => self.refetch_comments(post).await,

            (ChannelKey::Post(post), ChannelEvent::DeleteComment { comment_id }) => {
                // Deletion is unambiguous: patch locally, no re-fetch.
                let mut state = self.state.lock().await;
                state.comments.remove_comment(post, comment_id);
                Ok(())
            }

            (
                ChannelKey::Comment(comment),
                ChannelEvent::LikeUpdated {
                    likeable_type: LikeableType::Comment,
                    ..
                },
            ) => {
                let post = self.state.lock().await.comments.post_of(comment);
                match post {
                    Some(post) => self.refetch_comments(post).await,
                    None => {
                        debug!(comment = %comment, "Like event for comment with no watched post");
                        Ok(())
                    }
                }
            }

            (ChannelKey::Presence, ChannelEvent::SubscriptionSucceeded { members }) => {
                self.state.lock().await.presence.on_snapshot(members);
                Ok(())
            }

            (ChannelKey::Presence, ChannelEvent::MemberAdded { user_id }) => {
                self.state.lock().await.presence.on_member_added(user_id);
                Ok(())
            }

            (ChannelKey::Presence, ChannelEvent::MemberRemoved { user_id }) => {
                self.state.lock().await.presence.on_member_removed(user_id);
                Ok(())
            }

            (channel, event) => {
                debug!(channel = %channel, event = event.name(), "Ignoring event not mapped for this channel kind");
                Ok(())
            }
        }
    }

    /// A message landed in a conversation.
    ///
    /// The raw payload is never appended to the open thread: the server
    /// applies its own ordering and truncation rules, so the authoritative
    /// re-fetch is the only way messages enter a thread.
    async fn on_new_message(&self, id: ConversationId, message: Message) -> Result<(), SyncError> {
        let open = {
            let mut state = self.state.lock().await;
            let open = state.conversations.is_open(id);
            if message.sender_id != self.current_user && !open {
                state.unread.increment(id);
            }
            open
        };

        // The list re-fetch also covers a brand-new conversation created by
        // the other participant: the new entry appears in the sidebar.
        self.refetch_conversation_list().await?;

        if open {
            self.refetch_thread(id).await?;
        }
        Ok(())
    }

    /// Re-fetch the conversation list and realign sidebar subscriptions.
    pub async fn refetch_conversation_list(&self) -> Result<(), SyncError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.fetches.begin(FetchTarget::ConversationList)
        };

        let list = self.api.fetch_conversations().await?;

        let ids = {
            let mut state = self.state.lock().await;
            if !state.fetches.admit(ticket) {
                debug!("Discarding stale conversation-list response");
                return Ok(());
            }
            state.conversations.apply_list(list);
            state.conversations.ids()
        };

        self.sync_sidebar_channels(ids).await;
        Ok(())
    }

    /// Re-fetch the open conversation's full thread.
    pub async fn refetch_thread(&self, id: ConversationId) -> Result<(), SyncError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.fetches.begin(FetchTarget::ConversationThread(id))
        };

        let conversation = self.api.fetch_conversation(id).await?;

        let mut state = self.state.lock().await;
        if state.fetches.admit(ticket) {
            state.conversations.apply_thread(conversation);
        } else {
            debug!(conversation = %id, "Discarding stale thread response");
        }
        Ok(())
    }

    /// Re-fetch the current user's notification list.
    pub async fn refetch_notifications(&self) -> Result<(), SyncError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.fetches.begin(FetchTarget::Notifications)
        };

        let notifications = self.api.fetch_notifications().await?;

        let mut state = self.state.lock().await;
        if state.fetches.admit(ticket) {
            state.notifications.apply_list(notifications);
        } else {
            debug!("Discarding stale notification response");
        }
        Ok(())
    }

    /// Re-fetch a post's detail (aggregate counts).
    pub async fn refetch_post(&self, id: PostId) -> Result<(), SyncError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.fetches.begin(FetchTarget::Post(id))
        };

        let post = self.api.fetch_post(id).await?;

        let mut state = self.state.lock().await;
        if state.fetches.admit(ticket) {
            state.comments.apply_post(post);
        } else {
            debug!(post = %id, "Discarding stale post response");
        }
        Ok(())
    }

    /// Re-fetch a post's comment list and realign per-comment channels.
    pub async fn refetch_comments(&self, post: PostId) -> Result<(), SyncError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.fetches.begin(FetchTarget::Comments(post))
        };

        let comments = self.api.fetch_comments(post).await?;

        let ids = {
            let mut state = self.state.lock().await;
            if !state.fetches.admit(ticket) {
                debug!(post = %post, "Discarding stale comment response");
                return Ok(());
            }
            state.comments.apply_comments(post, comments);
            state.comments.comment_ids(post)
        };

        self.sync_comment_channels(post, ids).await;
        Ok(())
    }

    /// Begin watching a post: subscribe its channel, load detail and
    /// comments, and subscribe each comment's channel.
    ///
    /// A failed initial load never leaks the subscription: the post channel
    /// and bookkeeping taken above are released before the error propagates.
    pub(crate) async fn watch_post(&self, post: PostId) -> Result<(), SyncError> {
        self.registry.acquire(&ChannelKey::Post(post)).await?;
        self.watched_posts.lock().await.entry(post).or_default();

        if let Err(e) = self.load_post(post).await {
            self.unwatch_post(post).await;
            return Err(e);
        }
        Ok(())
    }

    async fn load_post(&self, post: PostId) -> Result<(), SyncError> {
        self.refetch_post(post).await?;
        self.refetch_comments(post).await
    }

    /// Stop watching a post, releasing its channel and every comment
    /// channel held for it.
    pub(crate) async fn unwatch_post(&self, post: PostId) {
        let comments = self.watched_posts.lock().await.remove(&post);
        if let Some(comments) = comments {
            for comment in comments {
                self.registry.release(&ChannelKey::Comment(comment)).await;
            }
        }
        self.registry.release(&ChannelKey::Post(post)).await;
        self.state.lock().await.comments.forget_post(post);
    }

    /// Hold exactly one channel reference per sidebar conversation.
    async fn sync_sidebar_channels(&self, ids: Vec<ConversationId>) {
        let mut held = self.sidebar.lock().await;
        let wanted: HashSet<ConversationId> = ids.into_iter().collect();

        let added: Vec<ConversationId> = wanted.difference(&held).copied().collect();
        let gone: Vec<ConversationId> = held.difference(&wanted).copied().collect();

        for id in added {
            let key = ChannelKey::Conversation(id);
            match self.registry.acquire(&key).await {
                Ok(()) => {
                    held.insert(id);
                }
                Err(e) => warn!(channel = %key, error = %e, "Sidebar subscribe failed"),
            }
        }

        for id in gone {
            held.remove(&id);
            self.registry.release(&ChannelKey::Conversation(id)).await;
        }
    }

    /// Hold exactly one channel reference per comment of a watched post.
    async fn sync_comment_channels(&self, post: PostId, ids: Vec<CommentId>) {
        let mut watched = self.watched_posts.lock().await;
        let Some(held) = watched.get_mut(&post) else {
            // Comment list refreshed for a post nobody watches; no channels
            // to align.
            return;
        };
        let wanted: HashSet<CommentId> = ids.into_iter().collect();

        let added: Vec<CommentId> = wanted.difference(held).copied().collect();
        let gone: Vec<CommentId> = held.difference(&wanted).copied().collect();

        for id in added {
            let key = ChannelKey::Comment(id);
            match self.registry.acquire(&key).await {
                Ok(()) => {
                    held.insert(id);
                }
                Err(e) => warn!(channel = %key, error = %e, "Comment subscribe failed"),
            }
        }

        for id in gone {
            held.remove(&id);
            self.registry.release(&ChannelKey::Comment(id)).await;
        }
    }

    /// Release the derived channel sets (logout).
    pub(crate) async fn clear_derived_channels(&self) {
        self.sidebar.lock().await.clear();
        self.watched_posts.lock().await.clear();
    }
}
