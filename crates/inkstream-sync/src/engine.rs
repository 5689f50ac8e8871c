//! The session-scoped sync engine.
//!
//! One engine exists per logged-in session.  It owns the state store, the
//! channel registry, and the event-loop task, and is the only surface UI
//! code talks to.  Engines are plain injected objects, never ambient
//! singletons, so tests (and multiple windows) can run isolated instances.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use inkstream_api::SyncApi;
use inkstream_shared::{
    ChannelKey, Comment, Conversation, ConversationId, InboundEvent, Notification, NotificationId,
    Post, PostId, UserId,
};

use crate::conversations::{PendingMessage, ThreadView};
use crate::dispatcher::Dispatcher;
use crate::error::SyncError;
use crate::registry::ChannelRegistry;
use crate::state::SyncState;
use crate::transport::Transport;

/// Client-side realtime sync engine.
pub struct SyncEngine {
    api: Arc<dyn SyncApi>,
    registry: Arc<ChannelRegistry>,
    state: Arc<Mutex<SyncState>>,
    dispatcher: Arc<Dispatcher>,
    current_user: UserId,
    event_loop: Mutex<Option<JoinHandle<()>>>,
}

impl SyncEngine {
    /// Start a session: subscribe the session channels (the current user's
    /// notification channel and global presence), load the initial
    /// conversation and notification lists, and spawn the event loop over
    /// the inbound event stream.
    pub async fn start(
        api: Arc<dyn SyncApi>,
        transport: Arc<dyn Transport>,
        events: mpsc::Receiver<InboundEvent>,
        current_user: UserId,
    ) -> Result<Self, SyncError> {
        let registry = Arc::new(ChannelRegistry::new(transport));
        let state = Arc::new(Mutex::new(SyncState::new()));
        let dispatcher = Arc::new(Dispatcher::new(
            api.clone(),
            registry.clone(),
            state.clone(),
            current_user,
        ));

        // A failed bootstrap must not leave session or sidebar channels
        // subscribed on a registry the caller is about to drop.
        if let Err(e) = Self::bootstrap(&registry, &dispatcher, current_user).await {
            dispatcher.clear_derived_channels().await;
            registry.clear().await;
            return Err(e);
        }

        let loop_dispatcher = dispatcher.clone();
        let event_loop = tokio::spawn(run_event_loop(loop_dispatcher, events));

        info!(user = %current_user, "Sync engine started");
        Ok(Self {
            api,
            registry,
            state,
            dispatcher,
            current_user,
            event_loop: Mutex::new(Some(event_loop)),
        })
    }

    /// Subscribe the session channels and load the initial lists.
    async fn bootstrap(
        registry: &ChannelRegistry,
        dispatcher: &Dispatcher,
        current_user: UserId,
    ) -> Result<(), SyncError> {
        registry.acquire(&ChannelKey::User(current_user)).await?;
        registry.acquire(&ChannelKey::Presence).await?;

        dispatcher.refetch_conversation_list().await?;
        dispatcher.refetch_notifications().await
    }

    /// Make a conversation the open thread.
    ///
    /// Subscribes its channel (one extra reference for the open view),
    /// zeroes its unread counter, acknowledges read state with the server,
    /// and fetches the full thread.
    pub async fn open_conversation(&self, id: ConversationId) -> Result<(), SyncError> {
        self.registry.acquire(&ChannelKey::Conversation(id)).await?;

        let previous = {
            let mut state = self.state.lock().await;
            let previous = state.conversations.open_id();
            state.conversations.open(id);
            state.unread.reset(id);
            previous
        };
        // Drop the previously-open view's reference (or, when re-opening the
        // same conversation, the duplicate one just taken).
        if let Some(previous) = previous {
            self.registry
                .release(&ChannelKey::Conversation(previous))
                .await;
        }

        // The local reset already happened; a failed acknowledgement is a
        // low-severity inconsistency, not a reason to abort the open.
        match self.api.mark_conversation_read(id).await {
            Ok(receipts) => {
                let mut state = self.state.lock().await;
                state.conversations.apply_read_receipts(id, &receipts);
            }
            Err(e) => warn!(conversation = %id, error = %e, "Read acknowledgement failed"),
        }

        self.dispatcher.refetch_thread(id).await
    }

    /// Close the open thread and release its channel reference.
    pub async fn close_conversation(&self) {
        let open = {
            let mut state = self.state.lock().await;
            let open = state.conversations.open_id();
            state.conversations.close();
            open
        };
        if let Some(id) = open {
            self.registry.release(&ChannelKey::Conversation(id)).await;
        }
    }

    /// Send a message in the open conversation.
    ///
    /// The message is appended optimistically before the server confirms;
    /// the authoritative re-fetch triggered by the matching `new-message`
    /// event replaces the thread wholesale, so the optimistic entry never
    /// outlives confirmation.  On failure the entry is deliberately left in
    /// place until the next authoritative replace.
    pub async fn send_message(
        &self,
        conversation: ConversationId,
        content: &str,
    ) -> Result<(), SyncError> {
        {
            let mut state = self.state.lock().await;
            if !state.conversations.is_open(conversation) {
                return Err(SyncError::NotOpen(conversation));
            }
            state.conversations.append_optimistic(PendingMessage::new(
                conversation,
                self.current_user,
                content.to_string(),
            ));
        }

        if let Err(e) = self.api.send_message(conversation, content).await {
            warn!(conversation = %conversation, error = %e, "Send failed; optimistic entry kept");
            return Err(e.into());
        }
        Ok(())
    }

    /// Create a conversation and make it the open thread.
    pub async fn create_conversation(
        &self,
        participant_ids: &[UserId],
        name: Option<&str>,
    ) -> Result<ConversationId, SyncError> {
        let conversation = self.api.create_conversation(participant_ids, name).await?;
        let id = conversation.id;

        self.registry.acquire(&ChannelKey::Conversation(id)).await?;
        let previous = {
            let mut state = self.state.lock().await;
            let previous = state.conversations.open_id();
            state.conversations.upsert_created(conversation);
            previous
        };
        if let Some(previous) = previous {
            self.registry
                .release(&ChannelKey::Conversation(previous))
                .await;
        }
        Ok(id)
    }

    /// Start watching a post: its channel, detail, and comment channels.
    pub async fn watch_post(&self, post: PostId) -> Result<(), SyncError> {
        self.dispatcher.watch_post(post).await
    }

    /// Stop watching a post, releasing every channel held for it.
    pub async fn unwatch_post(&self, post: PostId) {
        self.dispatcher.unwatch_post(post).await;
    }

    /// Mark one notification read.  Optimistic: the local mark is applied
    /// first and is not rolled back if the server call fails.
    pub async fn mark_notification_read(&self, id: NotificationId) -> Result<(), SyncError> {
        {
            let mut state = self.state.lock().await;
            state
                .notifications
                .mark_read(id, self.current_user, Utc::now());
        }
        if let Err(e) = self.api.mark_notification_read(id).await {
            warn!(notification = %id, error = %e, "Server mark-read failed; local mark kept");
            return Err(e.into());
        }
        Ok(())
    }

    /// Mark every notification read.  Same optimistic policy as
    /// [`mark_notification_read`](Self::mark_notification_read).
    pub async fn mark_all_notifications_read(&self) -> Result<(), SyncError> {
        {
            let mut state = self.state.lock().await;
            state
                .notifications
                .mark_all_read(self.current_user, Utc::now());
        }
        if let Err(e) = self.api.mark_all_notifications_read().await {
            warn!(error = %e, "Server mark-all-read failed; local marks kept");
            return Err(e.into());
        }
        Ok(())
    }

    /// Delete a notification after the server confirms.
    pub async fn delete_notification(&self, id: NotificationId) -> Result<(), SyncError> {
        self.api.delete_notification(id).await?;
        self.state.lock().await.notifications.remove(id);
        Ok(())
    }

    /// Manually refresh the notification list.
    pub async fn refresh_notifications(&self) -> Result<(), SyncError> {
        self.dispatcher.refetch_notifications().await
    }

    /// Manually refresh the conversation list.
    pub async fn refresh_conversations(&self) -> Result<(), SyncError> {
        self.dispatcher.refetch_conversation_list().await
    }

    // --- read-only snapshots ------------------------------------------------

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.lock().await.conversations.items().to_vec()
    }

    pub async fn open_thread(&self) -> Option<ThreadView> {
        self.state.lock().await.conversations.thread_view()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.items().to_vec()
    }

    /// Derived unread notification count for the current user.
    pub async fn notification_unread_count(&self) -> usize {
        self.state
            .lock()
            .await
            .notifications
            .unread_count(self.current_user)
    }

    pub async fn unread_total(&self) -> u64 {
        self.state.lock().await.unread.total()
    }

    pub async fn unread_count(&self, conversation: ConversationId) -> u64 {
        self.state.lock().await.unread.count(conversation)
    }

    pub async fn is_online(&self, user: UserId) -> bool {
        self.state.lock().await.presence.is_online(user)
    }

    pub async fn online_users(&self) -> Vec<UserId> {
        self.state.lock().await.presence.online_users()
    }

    pub async fn post(&self, id: PostId) -> Option<Post> {
        self.state.lock().await.comments.post(id).cloned()
    }

    pub async fn comments(&self, post: PostId) -> Vec<Comment> {
        self.state.lock().await.comments.comments_for(post).to_vec()
    }

    /// End the session: stop the event loop, unsubscribe every channel, and
    /// drop all state (logout).
    pub async fn shutdown(&self) {
        if let Some(task) = self.event_loop.lock().await.take() {
            task.abort();
        }
        self.dispatcher.clear_derived_channels().await;
        self.registry.clear().await;
        self.state.lock().await.clear();
        info!(user = %self.current_user, "Sync engine shut down");
    }
}

/// Forward inbound transport events into the dispatcher, one at a time,
/// until the transport side closes the stream.
async fn run_event_loop(dispatcher: Arc<Dispatcher>, mut events: mpsc::Receiver<InboundEvent>) {
    info!("Sync event loop started");
    while let Some(event) = events.recv().await {
        dispatcher.handle(event).await;
    }
    warn!("Event stream closed; sync event loop ended");
}
