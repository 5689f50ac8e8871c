//! Pub/sub transport interface.
//!
//! The sync core never speaks a wire protocol itself.  A transport
//! implementation owns the realtime connection, decodes frames into
//! [`InboundEvent`]s, and delivers them on the mpsc channel handed to the
//! engine.  This module only defines the subscribe/unsubscribe surface the
//! channel registry drives.
//!
//! [`InboundEvent`]: inkstream_shared::InboundEvent

use async_trait::async_trait;
use thiserror::Error;

use inkstream_shared::ChannelKey;

/// Errors produced by the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The realtime connection is down.
    #[error("Transport connection lost")]
    ConnectionLost,

    /// The server refused the subscription (e.g. auth failure on a
    /// presence channel).
    #[error("Subscription rejected: {0}")]
    Rejected(String),

    /// Anything else the underlying client reports.
    #[error("Transport error: {0}")]
    Other(String),
}

/// Transport-level channel subscription control.
///
/// The [`ChannelRegistry`] calls `subscribe` at most once per active key and
/// pairs every successful `subscribe` with exactly one `unsubscribe`, so
/// implementations do not need their own de-duplication.
///
/// [`ChannelRegistry`]: crate::registry::ChannelRegistry
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a transport-level subscription for the channel.
    async fn subscribe(&self, channel: &ChannelKey) -> Result<(), TransportError>;

    /// Tear down the transport-level subscription for the channel.
    async fn unsubscribe(&self, channel: &ChannelKey) -> Result<(), TransportError>;
}
