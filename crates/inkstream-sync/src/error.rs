use thiserror::Error;

use inkstream_api::ApiError;
use inkstream_shared::ConversationId;

use crate::transport::TransportError;

/// Errors surfaced to callers of the sync engine.
///
/// Failures inside event-triggered re-fetches never reach here; those are
/// logged at the dispatch boundary and the previous state stays visible.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Conversation {0} is not the open thread")]
    NotOpen(ConversationId),
}
