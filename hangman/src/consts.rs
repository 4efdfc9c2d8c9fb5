use tokio::time::Duration;

pub const ROUND_TIME: Duration = Duration::from_secs(120);
pub const TICK: Duration = Duration::from_secs(15);
/// Seconds left on the clock when an automatic hint is given.
pub const HINT_MILESTONES: [u64; 3] = [60, 40, 20];

pub const PRE_ROLL: Duration = Duration::from_secs(15);
pub const NEXT_ROUND_GAP: Duration = Duration::from_secs(15);
pub const TEARDOWN_DELAY: Duration = Duration::from_secs(10);

pub const ROTATE_AFTER: u32 = 3;
pub const MAX_GUESS_LEN: usize = 32;

pub const HB_DURATION: Duration = Duration::from_secs(10);
pub const DEFAULT_PORT: u16 = 9000;
