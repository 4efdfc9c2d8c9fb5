use protocol::Command;
use tokio::sync::oneshot;

use super::GameResult;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerType {
    /// Announcement is over; draw the word.
    PreRoll,
    Deadline,
    Tick,
    Hint,
    /// Gap after a resolved round is over; announce the next one.
    NextRound,
}

#[derive(Debug)]
pub enum Request {
    Command {
        channel: ChannelId,
        author: UserId,
        command: Command,
        reply: oneshot::Sender<GameResult<String>>,
    },
    Chat {
        channel: ChannelId,
        author: UserId,
        text: String,
    },
    /// Only acted upon while `generation` is still the channel's current one.
    Timer {
        channel: ChannelId,
        generation: u64,
        timer: TimerType,
    },
    /// Deletes a finished round's thread.
    Teardown {
        thread: ChannelId,
    },
}
