use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Duration, Instant, MissedTickBehavior};

use super::config::Timings;
use super::request::{Request, TimerType};
use crate::types::*;

/// A pending timer task. Dropping the handle cancels it.
#[derive(Debug)]
pub struct TimerHandle(JoinHandle<()>);

impl TimerHandle {
    pub fn cancel(&self) {
        self.0.abort();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Delivers `req` to the lifecycle loop after `after`.
pub fn set_timer(after: Duration, loopback: Sender<Request>, req: Request) -> TimerHandle {
    TimerHandle(tokio::spawn(async move {
        sleep(after).await;
        loopback.send(req).await.unwrap_or_default();
    }))
}

/// Deadline, refresh ticker and hint timers of one round.
#[derive(Debug)]
pub struct RoundClock {
    timers: Vec<TimerHandle>,
}

impl RoundClock {
    pub fn start(
        channel: ChannelId,
        generation: u64,
        timings: &Timings,
        loopback: &Sender<Request>,
    ) -> Self {
        let timer = |timer| Request::Timer {
            channel,
            generation,
            timer,
        };
        let mut timers = Vec::with_capacity(2 + timings.hints.len());

        timers.push(set_timer(timings.round, loopback.clone(), timer(TimerType::Deadline)));

        let tick = timings.tick;
        let ticker_tx = loopback.clone();
        timers.push(TimerHandle(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let req = Request::Timer {
                    channel,
                    generation,
                    timer: TimerType::Tick,
                };
                if ticker_tx.send(req).await.is_err() {
                    break;
                }
            }
        })));

        for offset in timings.hint_offsets() {
            timers.push(set_timer(offset, loopback.clone(), timer(TimerType::Hint)));
        }

        Self { timers }
    }

    /// Cancels every pending timer of the round at once.
    pub fn cancel(&mut self) {
        for timer in self.timers.drain(..) {
            timer.cancel();
        }
    }
}
