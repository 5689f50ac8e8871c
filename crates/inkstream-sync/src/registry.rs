//! Channel subscription bookkeeping.
//!
//! Several views can need the same channel at once (a conversation open in
//! the chat popup and in the full messages page, for example), so the
//! registry reference-counts consumers per [`ChannelKey`] and issues the
//! transport-level subscribe/unsubscribe only on the zero boundary.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use inkstream_shared::ChannelKey;

use crate::transport::{Transport, TransportError};

/// Reference-counted registry of active channel subscriptions.
///
/// Invariant: a key is present in the map iff the transport holds a live
/// subscription for it.  A failed transport subscribe is never recorded.
pub struct ChannelRegistry {
    transport: Arc<dyn Transport>,
    entries: Mutex<HashMap<ChannelKey, usize>>,
}

impl ChannelRegistry {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Register a consumer for the channel.
    ///
    /// Idempotent at the transport level: the underlying subscription is
    /// opened only for the first consumer of a key.
    pub async fn acquire(&self, key: &ChannelKey) -> Result<(), TransportError> {
        let mut entries = self.entries.lock().await;

        if let Some(count) = entries.get_mut(key) {
            *count += 1;
            debug!(channel = %key, refs = *count, "Channel already subscribed");
            return Ok(());
        }

        // Subscribe first so a transport failure leaves no bookkeeping.
        self.transport.subscribe(key).await?;
        entries.insert(*key, 1);
        debug!(channel = %key, "Subscribed channel");
        Ok(())
    }

    /// Drop one consumer of the channel.
    ///
    /// The transport-level unsubscribe fires only when the last consumer
    /// releases.  Releasing an unknown key is a no-op.
    pub async fn release(&self, key: &ChannelKey) {
        let mut entries = self.entries.lock().await;

        let Some(count) = entries.get_mut(key) else {
            debug!(channel = %key, "Release of unknown channel ignored");
            return;
        };

        *count -= 1;
        if *count > 0 {
            debug!(channel = %key, refs = *count, "Channel still referenced");
            return;
        }

        entries.remove(key);
        if let Err(e) = self.transport.unsubscribe(key).await {
            // Bookkeeping already dropped; the server will reap the
            // subscription when the connection closes.
            warn!(channel = %key, error = %e, "Transport unsubscribe failed");
        } else {
            debug!(channel = %key, "Unsubscribed channel");
        }
    }

    /// Whether the registry currently tracks the key.
    pub async fn contains(&self, key: &ChannelKey) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    /// Number of distinct subscribed channels.
    pub async fn active_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Drop every subscription regardless of reference counts (logout).
    pub async fn clear(&self) {
        let keys: Vec<ChannelKey> = {
            let mut entries = self.entries.lock().await;
            entries.drain().map(|(key, _)| key).collect()
        };

        for key in keys {
            if let Err(e) = self.transport.unsubscribe(&key).await {
                warn!(channel = %key, error = %e, "Transport unsubscribe failed during clear");
            }
        }
        debug!("Channel registry cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use inkstream_shared::ConversationId;

    use crate::support::RecordingTransport;

    fn conv(id: u64) -> ChannelKey {
        ChannelKey::Conversation(ConversationId(id))
    }

    #[tokio::test]
    async fn test_repeated_acquire_subscribes_once() {
        let transport = Arc::new(RecordingTransport::default());
        let registry = ChannelRegistry::new(transport.clone());

        for _ in 0..3 {
            registry.acquire(&conv(1)).await.unwrap();
        }

        assert_eq!(transport.subscribe_count(&conv(1)), 1);
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_refcounted_release() {
        let transport = Arc::new(RecordingTransport::default());
        let registry = ChannelRegistry::new(transport.clone());

        registry.acquire(&conv(1)).await.unwrap();
        registry.acquire(&conv(1)).await.unwrap();

        registry.release(&conv(1)).await;
        assert_eq!(transport.unsubscribe_count(&conv(1)), 0);
        assert!(registry.contains(&conv(1)).await);

        registry.release(&conv(1)).await;
        assert_eq!(transport.unsubscribe_count(&conv(1)), 1);
        assert!(!registry.contains(&conv(1)).await);
    }

    #[tokio::test]
    async fn test_release_unknown_key_is_noop() {
        let transport = Arc::new(RecordingTransport::default());
        let registry = ChannelRegistry::new(transport.clone());

        registry.release(&conv(9)).await;
        assert_eq!(transport.unsubscribe_count(&conv(9)), 0);
    }

    #[tokio::test]
    async fn test_failed_subscribe_is_not_recorded() {
        let transport = Arc::new(RecordingTransport::default());
        transport.fail_next_subscribe();
        let registry = ChannelRegistry::new(transport.clone());

        assert!(registry.acquire(&conv(1)).await.is_err());
        assert!(!registry.contains(&conv(1)).await);

        // A retry after the failure subscribes normally.
        registry.acquire(&conv(1)).await.unwrap();
        assert!(registry.contains(&conv(1)).await);
        assert_eq!(transport.subscribe_count(&conv(1)), 1);
    }

    #[tokio::test]
    async fn test_clear_unsubscribes_everything() {
        let transport = Arc::new(RecordingTransport::default());
        let registry = ChannelRegistry::new(transport.clone());

        registry.acquire(&conv(1)).await.unwrap();
        registry.acquire(&conv(1)).await.unwrap();
        registry.acquire(&conv(2)).await.unwrap();

        registry.clear().await;
        assert_eq!(registry.active_count().await, 0);
        assert_eq!(transport.unsubscribe_count(&conv(1)), 1);
        assert_eq!(transport.unsubscribe_count(&conv(2)), 1);
    }
}
