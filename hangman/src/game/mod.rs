mod clock;
mod config;
mod error;
pub mod guess;
mod request;
pub mod session;
pub mod state;

use std::collections::HashMap;
use std::sync::Arc;

use lexicon::{Catalog, RANDOM};
use protocol::Command;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::render;
use crate::transport::{BestEffort, ChannelKind, ChatTransport};
use crate::types::*;
use guess::Verdict;
use session::Session;
use state::{Active, Announcing, Outcome, Phase, Resolving, Round, Stage};

pub use clock::{set_timer, RoundClock, TimerHandle};
pub use config::{Config, Timings};
pub use error::{GameError, GameResult};
pub use request::{Request, TimerType};

#[derive(Default)]
struct ChannelGame {
    phase: Phase,
    session: Option<Session>,
    /// The persistent status message of this channel.
    status: Option<MessageId>,
}

/// Owns every game, keyed by play channel, and drives each one through
/// `Idle → Announcing → Active → Resolving → Announcing …` until stopped.
///
/// All work happens on the task running [`RoundLifecycle::run`]; timers only
/// post [`Request::Timer`] back into the loop, tagged with the generation they
/// were armed for, and stale ones are dropped on arrival.
pub struct RoundLifecycle {
    config: Config,
    catalog: Catalog,
    transport: Arc<dyn ChatTransport>,

    channels: HashMap<ChannelId, ChannelGame>,
    generation: u64,
    rng: StdRng,

    rm_rx: Receiver<Request>,
    loopback: Sender<Request>,
}

impl RoundLifecycle {
    pub fn new(config: Config, catalog: Catalog, transport: Arc<dyn ChatTransport>) -> Self {
        let (loopback, rm_rx) = channel::<Request>(64);
        Self {
            config,
            catalog,
            transport,

            channels: HashMap::new(),
            generation: 0,
            rng: StdRng::from_entropy(),

            rm_rx,
            loopback,
        }
    }

    pub fn get_tx(&self) -> Sender<Request> {
        self.loopback.clone()
    }

    pub fn stage(&self, channel: ChannelId) -> Stage {
        self.channels
            .get(&channel)
            .map(|game| game.phase.stage())
            .unwrap_or(Stage::Idle)
    }

    pub fn round(&self, channel: ChannelId) -> Option<&Round> {
        match self.channels.get(&channel).map(|game| &game.phase) {
            Some(Phase::Active(active)) => Some(&active.round),
            _ => None,
        }
    }

    pub fn session(&self, channel: ChannelId) -> Option<&Session> {
        self.channels.get(&channel).and_then(|game| game.session.as_ref())
    }

    pub fn status_message(&self, channel: ChannelId) -> Option<MessageId> {
        self.channels.get(&channel).and_then(|game| game.status)
    }

    pub async fn run(mut self) {
        let play_channel = self.config.play_channel;
        self.upsert_status(play_channel).await;
        while self.step().await {}
    }

    /// Handles the next request; `false` once every sender is gone.
    pub async fn step(&mut self) -> bool {
        match self.rm_rx.recv().await {
            Some(req) => {
                self.handle(req).await;
                true
            }
            None => false,
        }
    }

    pub async fn handle(&mut self, req: Request) {
        match req {
            Request::Command {
                channel,
                author,
                command,
                reply,
            } => {
                let result = self.command(channel, author, command).await;
                reply.send(result).unwrap_or_default();
            }
            Request::Chat {
                channel,
                author,
                text,
            } => self.guess(channel, author, &text).await,
            Request::Timer {
                channel,
                generation,
                timer,
            } => self.on_timer(channel, generation, timer).await,
            Request::Teardown { thread } => {
                self.transport
                    .delete_thread(thread, "Round finished")
                    .await
                    .best_effort("thread teardown");
            }
        }
    }

    /// Runs a staff command and returns the reply for its invoker.
    pub async fn command(
        &mut self,
        channel: ChannelId,
        author: UserId,
        command: Command,
    ) -> GameResult<String> {
        debug!(%channel, %author, ?command, "command");
        let result = match command {
            Command::Start { category } => self
                .start(channel, category.as_deref().unwrap_or(RANDOM))
                .await
                .map(|_| "I created the round thread. Check the announcement in the channel.".to_string()),
            Command::Stop => self
                .stop(channel)
                .await
                .map(|_| "Game stopped. The thread and the announcement were cleaned up.".to_string()),
            Command::Add { category, word } => self
                .catalog
                .add_word(&category, &word)
                .await
                .map(|_| format!("✅ Added **{}** to category **{}**.", word, category))
                .map_err(GameError::from),
            Command::Del { category, word } => self
                .catalog
                .remove_word(&category, &word)
                .await
                .map(|_| format!("🗑️ Removed **{}** from category **{}**.", word, category))
                .map_err(GameError::from),
            Command::Setup => {
                self.upsert_status(channel).await;
                Ok("The status message was created or updated.".to_string())
            }
        };
        if let Err(ref e) = result {
            debug!(%channel, %author, error = %e, "command rejected");
        }
        result
    }

    /// Announces a round in `channel`. `requested` is a category name or
    /// `"random"`; a named category is kept for the following rounds until it
    /// rotates.
    pub async fn start(&mut self, channel: ChannelId, requested: &str) -> GameResult<()> {
        if self.stage(channel) != Stage::Idle {
            return Err(GameError::AlreadyActive);
        }
        let session = Session::new(requested).with_rotation(self.config.timings.rotate_after);
        let announcing = self.announce(channel, session.next_category()).await?;
        info!(%channel, mode = ?session.mode, category = %session.next_category(), "game started");

        let game = self.channels.entry(channel).or_default();
        game.session = Some(session);
        game.phase = Phase::Announcing(announcing);
        Ok(())
    }

    /// Aborts the game in `channel` at once: timers, thread and announcement
    /// are dropped without the usual grace delays. Only an announced or
    /// running round can be stopped.
    pub async fn stop(&mut self, channel: ChannelId) -> GameResult<()> {
        let transport = self.transport.clone();
        let game = self.channels.get_mut(&channel).ok_or(GameError::NoActiveRound)?;
        match &mut game.phase {
            Phase::Announcing(_) => {}
            Phase::Active(active) => active.clock.cancel(),
            Phase::Idle | Phase::Resolving(_) => return Err(GameError::NoActiveRound),
        }
        let (thread, announcement) = match std::mem::take(&mut game.phase) {
            Phase::Announcing(a) => (a.thread, Some(a.announcement)),
            Phase::Active(a) => (a.round.thread, a.round.announcement),
            Phase::Idle | Phase::Resolving(_) => return Err(GameError::NoActiveRound),
        };
        game.session = None;

        transport
            .delete_thread(thread, "Stopped by staff")
            .await
            .best_effort("thread delete");
        if let Some(announcement) = announcement {
            transport
                .delete_message(channel, announcement)
                .await
                .best_effort("announcement delete");
        }
        info!(%channel, "game stopped");
        self.upsert_status(channel).await;
        Ok(())
    }

    /// Routes a chat message; only messages in an active round's thread count.
    pub async fn guess(&mut self, thread: ChannelId, author: UserId, text: &str) {
        let round_time = self.config.timings.round;
        let transport = self.transport.clone();
        let found = self.channels.iter_mut().find_map(|(channel, game)| match &mut game.phase {
            Phase::Active(active) if active.round.thread == thread => Some((*channel, &mut active.round)),
            _ => None,
        });
        let (channel, round) = match found {
            Some(found) => found,
            None => return,
        };

        let verdict = guess::evaluate(round, author, text);
        if matches!(verdict, Verdict::Ignored | Verdict::Repeated) {
            return;
        }
        debug!(%channel, %author, ?verdict, "guess");
        update_board(&*transport, round, round_time).await;

        let reply = match verdict {
            Verdict::Hit(letter) => render::hit(letter),
            Verdict::WrongLetter(_) => render::wrong_letter(author),
            Verdict::WrongWord => render::wrong_word(author),
            Verdict::Won => return self.resolve(channel, Outcome::Won).await,
            Verdict::Ignored | Verdict::Repeated => return,
        };
        transport
            .send_message(thread, reply.into())
            .await
            .best_effort("guess feedback");
    }

    async fn on_timer(&mut self, channel: ChannelId, generation: u64, timer: TimerType) {
        let stage = match self.channels.get(&channel) {
            Some(game) if game.phase.generation() == Some(generation) => game.phase.stage(),
            _ => {
                debug!(%channel, generation, ?timer, "stale timer");
                return;
            }
        };
        match (timer, stage) {
            (TimerType::PreRoll, Stage::Announcing) => self.begin_round(channel).await,
            (TimerType::Deadline, Stage::Active) => self.resolve(channel, Outcome::TimedOut).await,
            (TimerType::Tick, Stage::Active) => self.refresh(channel).await,
            (TimerType::Hint, Stage::Active) => self.hint(channel).await,
            (TimerType::NextRound, Stage::Resolving) => self.next_round(channel).await,
            _ => debug!(%channel, ?timer, ?stage, "timer does not apply"),
        }
    }

    /// Creates the round thread and posts the announcement. Nothing is left
    /// behind when this fails.
    async fn announce(&mut self, channel: ChannelId, category: &str) -> GameResult<Announcing> {
        let transport = self.transport.clone();
        let seed = transport
            .send_message(channel, "Preparing the round thread…".into())
            .await?;
        let thread = transport
            .create_thread(channel, &render::thread_name(category))
            .await;
        transport
            .delete_message(channel, seed)
            .await
            .best_effort("seed message delete");
        let thread = thread?;

        let text = render::announcement(self.config.ping_role, thread, self.config.timings.pre_roll);
        let announcement = match transport.send_message(channel, text.into()).await {
            Ok(message) => message,
            Err(e) => {
                transport
                    .delete_thread(thread, "Round could not be announced")
                    .await
                    .best_effort("thread discard");
                return Err(e.into());
            }
        };

        let generation = self.next_generation();
        let pre_roll = set_timer(
            self.config.timings.pre_roll,
            self.loopback.clone(),
            Request::Timer {
                channel,
                generation,
                timer: TimerType::PreRoll,
            },
        );
        debug!(%channel, %thread, generation, "round announced");
        Ok(Announcing {
            generation,
            category: category.to_string(),
            thread,
            announcement,
            _pre_roll: pre_roll,
        })
    }

    /// End of the pre-roll: draw the word, post the board and start the clock.
    async fn begin_round(&mut self, channel: ChannelId) {
        let transport = self.transport.clone();
        let timings = self.config.timings.clone();
        let game = self.channels.entry(channel).or_default();
        let announcing = match std::mem::take(&mut game.phase) {
            Phase::Announcing(announcing) => announcing,
            other => {
                game.phase = other;
                return;
            }
        };
        let Announcing {
            generation,
            category,
            thread,
            announcement,
            ..
        } = announcing;

        let pick = match self.catalog.pick(&category, &mut self.rng).await {
            Ok(pick) => pick,
            Err(e) => {
                error!(%channel, error = %e, "no word to play");
                self.abandon(channel, thread, Some(announcement)).await;
                return;
            }
        };

        let mut round = Round::new(generation, pick.word, pick.category, thread);
        round.announcement = Some(announcement);
        match transport
            .send_message(thread, render::board(&round, timings.round).into())
            .await
        {
            Ok(board) => round.board = Some(board),
            Err(e) => {
                error!(%channel, %thread, error = %e, "could not post the board");
                self.abandon(channel, thread, Some(announcement)).await;
                return;
            }
        }

        transport
            .send_message(thread, render::round_started(self.config.ping_role).into())
            .await
            .best_effort("round start ping");
        if transport
            .delete_message(channel, announcement)
            .await
            .best_effort("announcement delete")
            .is_some()
        {
            round.announcement = None;
        }

        info!(%channel, round = generation, category = %round.category, "round active");
        let clock = RoundClock::start(channel, generation, &timings, &self.loopback);
        self.channels.entry(channel).or_default().phase = Phase::Active(Active { round, clock });
        self.upsert_status(channel).await;
    }

    /// A round could not begin: discard what was created and go idle.
    async fn abandon(&mut self, channel: ChannelId, thread: ChannelId, announcement: Option<MessageId>) {
        let game = self.channels.entry(channel).or_default();
        game.phase = Phase::Idle;
        game.session = None;
        self.transport
            .delete_thread(thread, "The game could not start")
            .await
            .best_effort("thread discard");
        if let Some(announcement) = announcement {
            self.transport
                .delete_message(channel, announcement)
                .await
                .best_effort("announcement delete");
        }
        self.upsert_status(channel).await;
    }

    /// Ends the active round of `channel`. Does nothing unless a round is
    /// active, so a second win or a late deadline cannot resolve twice.
    async fn resolve(&mut self, channel: ChannelId, outcome: Outcome) {
        let transport = self.transport.clone();
        let timings = self.config.timings.clone();
        let game = match self.channels.get_mut(&channel) {
            Some(game) => game,
            None => return,
        };
        match &mut game.phase {
            Phase::Active(active) => active.clock.cancel(),
            _ => return,
        }
        let Active { mut round, .. } = match std::mem::take(&mut game.phase) {
            Phase::Active(active) => active,
            _ => return,
        };
        round.outcome = outcome;

        let categories = self.catalog.categories().await.unwrap_or_else(|e| {
            warn!(%channel, error = %e, "categories unavailable, keeping the current one");
            Vec::new()
        });
        let decision = self
            .channels
            .get_mut(&channel)
            .and_then(|game| game.session.as_mut())
            .map(|session| session.decide_next(&categories, &mut self.rng));

        let result = match outcome {
            Outcome::Won => render::winners(&round),
            Outcome::TimedOut | Outcome::InProgress => render::timed_out(&round),
        };
        let next = decision
            .map(|d| format!("\n{}", d.announcement()))
            .unwrap_or_default();
        transport
            .send_message(round.thread, format!("{}{}", result, next).into())
            .await
            .best_effort("round result");
        transport
            .send_message(round.thread, render::teardown_notice(timings.teardown).into())
            .await
            .best_effort("teardown notice");
        if let Some(announcement) = round.announcement {
            transport
                .delete_message(channel, announcement)
                .await
                .best_effort("announcement delete");
        }

        // not tied to the game: a stop during the delay must not keep the
        // old thread alive
        let loopback = self.loopback.clone();
        let thread = round.thread;
        let teardown = timings.teardown;
        tokio::spawn(async move {
            sleep(teardown).await;
            loopback.send(Request::Teardown { thread }).await.unwrap_or_default();
        });

        let generation = self.next_generation();
        let gap = set_timer(
            timings.next_round_gap,
            self.loopback.clone(),
            Request::Timer {
                channel,
                generation,
                timer: TimerType::NextRound,
            },
        );
        self.channels.entry(channel).or_default().phase = Phase::Resolving(Resolving {
            generation,
            _gap: gap,
        });
        info!(%channel, round = round.generation, ?outcome, word = %round.secret, "round resolved");
        self.upsert_status(channel).await;
    }

    /// End of the gap after a resolved round: announce the next one.
    async fn next_round(&mut self, channel: ChannelId) {
        let category = match self.session(channel) {
            Some(session) => session.next_category().to_string(),
            None => {
                self.channels.entry(channel).or_default().phase = Phase::Idle;
                return;
            }
        };
        match self.announce(channel, &category).await {
            Ok(announcing) => {
                self.channels.entry(channel).or_default().phase = Phase::Announcing(announcing);
            }
            Err(e) => {
                error!(%channel, error = %e, "could not announce the next round, game over");
                let game = self.channels.entry(channel).or_default();
                game.phase = Phase::Idle;
                game.session = None;
            }
        }
    }

    async fn refresh(&mut self, channel: ChannelId) {
        if let Some(round) = self.round(channel) {
            update_board(&*self.transport, round, self.config.timings.round).await;
        }
        self.upsert_status(channel).await;
    }

    async fn hint(&mut self, channel: ChannelId) {
        let transport = self.transport.clone();
        let round_time = self.config.timings.round;
        let round = match self.channels.get_mut(&channel).map(|game| &mut game.phase) {
            Some(Phase::Active(active)) if !active.round.is_over() => &mut active.round,
            _ => return,
        };
        let letter = match round.reveal_hint(&mut self.rng) {
            Some(letter) => letter,
            None => return,
        };
        debug!(%channel, %letter, "hint");
        update_board(&*transport, round, round_time).await;
        transport
            .send_message(round.thread, render::hint(letter).into())
            .await
            .best_effort("hint");

        if round.is_solved() {
            round.outcome = Outcome::Won;
            self.resolve(channel, Outcome::Won).await;
        }
    }

    /// Edits the channel's status message, or posts a new one when there is
    /// none or it is gone.
    async fn upsert_status(&mut self, channel: ChannelId) {
        let transport = self.transport.clone();
        match transport.fetch_channel(channel).await {
            Ok(ChannelKind::Text) => {}
            Ok(kind) => {
                debug!(%channel, ?kind, "status only lives in text channels");
                return;
            }
            Err(e) => {
                warn!(%channel, error = %e, "status channel unavailable");
                return;
            }
        }

        let game = self.channels.entry(channel).or_default();
        let active = match &game.phase {
            Phase::Active(active) => Some(active.round.thread),
            _ => None,
        };
        let embed = render::status(active);
        if let Some(message) = game.status {
            if transport
                .edit_message(channel, message, embed.clone().into())
                .await
                .is_ok()
            {
                return;
            }
        }
        game.status = transport
            .send_message(channel, embed.into())
            .await
            .best_effort("status message");
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

async fn update_board(transport: &dyn ChatTransport, round: &Round, round_time: Duration) {
    if let Some(board) = round.board {
        let embed = render::board(round, round.remaining(round_time));
        transport
            .edit_message(round.thread, board, embed.into())
            .await
            .best_effort("board refresh");
    }
}
