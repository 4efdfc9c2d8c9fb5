use tokio::time::Duration;

use crate::consts::*;
use crate::types::*;

pub struct Config {
    /// Channel whose status message is refreshed on start-up.
    pub play_channel: ChannelId,
    /// Pinged when a round is announced and again when it starts.
    pub ping_role: Option<RoleId>,
    pub timings: Timings,
}

impl Config {
    pub fn new(play_channel: ChannelId) -> Self {
        Self {
            play_channel,
            ping_role: None,
            timings: Timings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub round: Duration,
    pub tick: Duration,
    /// Time left on the clock at each automatic hint.
    pub hints: Vec<Duration>,
    pub pre_roll: Duration,
    pub next_round_gap: Duration,
    pub teardown: Duration,
    pub rotate_after: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            round: ROUND_TIME,
            tick: TICK,
            hints: HINT_MILESTONES.iter().map(|s| Duration::from_secs(*s)).collect(),
            pre_roll: PRE_ROLL,
            next_round_gap: NEXT_ROUND_GAP,
            teardown: TEARDOWN_DELAY,
            rotate_after: ROTATE_AFTER,
        }
    }
}

impl Timings {
    /// Offsets from round start at which hints fire.
    pub fn hint_offsets(&self) -> impl Iterator<Item = Duration> + '_ {
        self.hints.iter().map(move |left| self.round.saturating_sub(*left))
    }
}
