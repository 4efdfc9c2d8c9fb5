use serde::{Deserialize, Serialize};
use crate::BinCodeMessage;
use crate::ids::{ChannelId, RoleId, UserId};

/// Staff command surface of the bot (`/hangman <sub>`).
#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone)]
pub enum Command {
    /// `None` plays a random category every round.
    Start { category: Option<String> },
    Stop,
    Add { category: String, word: String },
    Del { category: String, word: String },
    Setup,
}

/// Who is talking to the gateway, with the permission bits the command
/// surface checks.
#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone)]
pub struct Member {
    pub id: UserId,
    pub name: String,
    pub administrator: bool,
    pub kick_members: bool,
    pub roles: Vec<RoleId>,
    pub bot: bool,
}

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone)]
pub enum ClientRequest {
    /// Must be the first frame of a connection.
    Identify(Member),
    Command {
        channel: ChannelId,
        command: Command,
    },
    Chat {
        channel: ChannelId,
        text: String,
    },
}

impl BinCodeMessage<'_> for ClientRequest {}
