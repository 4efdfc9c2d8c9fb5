use serde::{Serialize, Deserialize};
use crate::BinCodeMessage;
use crate::content::Content;
use crate::ids::{ChannelId, MessageId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayEvent {
    /// Sent once after `Identify`.
    Welcome {
        play_channel: ChannelId,
    },
    ThreadCreated {
        parent: ChannelId,
        thread: ChannelId,
        name: String,
    },
    ThreadDeleted {
        thread: ChannelId,
        reason: String,
    },
    /// `author` is `None` for messages posted by the bot itself.
    MessagePosted {
        channel: ChannelId,
        message: MessageId,
        author: Option<UserId>,
        content: Content,
    },
    MessageEdited {
        channel: ChannelId,
        message: MessageId,
        content: Content,
    },
    MessageDeleted {
        channel: ChannelId,
        message: MessageId,
    },
    /// Private answer to a command, only sent to its invoker.
    Reply {
        text: String,
    },
}

impl BinCodeMessage<'_> for GatewayEvent {}
