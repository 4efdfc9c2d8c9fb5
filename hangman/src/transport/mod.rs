use async_trait::async_trait;
use protocol::Content;

use crate::types::{ChannelId, MessageId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("unknown channel {0}")]
    UnknownChannel(ChannelId),

    #[error("unknown message {message} in channel {channel}")]
    UnknownMessage {
        channel: ChannelId,
        message: MessageId,
    },

    #[error("transport closed")]
    Closed,

    #[error("rejected by the platform: {0}")]
    Rejected(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Thread { parent: ChannelId },
}

/// What the game needs from the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn create_thread(&self, parent: ChannelId, name: &str) -> TransportResult<ChannelId>;
    async fn send_message(&self, channel: ChannelId, content: Content) -> TransportResult<MessageId>;
    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: Content,
    ) -> TransportResult<()>;
    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> TransportResult<()>;
    async fn delete_thread(&self, thread: ChannelId, reason: &str) -> TransportResult<()>;
    async fn fetch_channel(&self, channel: ChannelId) -> TransportResult<ChannelKind>;
}

/// Marks a transport call as non-critical: a failure is logged and dropped.
pub trait BestEffort<T> {
    fn best_effort(self, what: &str) -> Option<T>;
}

impl<T> BestEffort<T> for TransportResult<T> {
    fn best_effort(self, what: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "{} failed", what);
                None
            }
        }
    }
}
