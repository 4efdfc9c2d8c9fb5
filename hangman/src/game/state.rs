use std::collections::{BTreeSet, HashSet};

use rand::seq::IteratorRandom;
use rand::Rng;
use tokio::time::{Duration, Instant};

use super::clock::{RoundClock, TimerHandle};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    Won,
    TimedOut,
}

/// One play-through, from the word draw to a win or a timeout.
#[derive(Debug)]
pub struct Round {
    pub generation: u64,
    pub secret: String,
    pub category: String,
    pub revealed: BTreeSet<char>,
    /// Wrong letters and wrong whole-word attempts, in the order they came in.
    pub wrong: Vec<String>,
    /// Credited on a win, in the order they first helped.
    pub contributors: Vec<UserId>,
    pub attempted: HashSet<UserId>,
    /// Unix epoch milliseconds, shown on the board.
    pub started_at: i64,
    pub round_start: Instant,
    pub thread: ChannelId,
    /// The board message.
    pub board: Option<MessageId>,
    /// The play-channel announcement, until it is deleted.
    pub announcement: Option<MessageId>,
    pub outcome: Outcome,
}

impl Round {
    pub fn new(generation: u64, secret: String, category: String, thread: ChannelId) -> Self {
        Self {
            generation,
            secret,
            category,
            revealed: BTreeSet::new(),
            wrong: Vec::new(),
            contributors: Vec::new(),
            attempted: HashSet::new(),
            started_at: chrono::Utc::now().timestamp_millis(),
            round_start: Instant::now(),
            thread,
            board: None,
            announcement: None,
            outcome: Outcome::InProgress,
        }
    }

    /// Distinct letters of the secret. Spaces, hyphens and other marks are not
    /// letters and never need guessing.
    pub fn letters(&self) -> BTreeSet<char> {
        self.secret.chars().filter(|c| c.is_alphabetic()).collect()
    }

    pub fn hidden(&self) -> BTreeSet<char> {
        self.letters().difference(&self.revealed).copied().collect()
    }

    pub fn is_solved(&self) -> bool {
        self.letters().is_subset(&self.revealed)
    }

    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    pub fn reveal_all(&mut self) {
        let letters = self.letters();
        self.revealed.extend(letters);
    }

    pub fn credit(&mut self, user: UserId) {
        if !self.contributors.contains(&user) {
            self.contributors.push(user);
        }
    }

    /// Reveals one hidden letter chosen uniformly; `None` when nothing is hidden.
    pub fn reveal_hint<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<char> {
        let letter = self.hidden().into_iter().choose(rng)?;
        self.revealed.insert(letter);
        Some(letter)
    }

    pub fn remaining(&self, round: Duration) -> Duration {
        round.saturating_sub(self.round_start.elapsed())
    }
}

/// Where a channel's game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Announcing,
    Active,
    Resolving,
}

pub(crate) enum Phase {
    Idle,
    Announcing(Announcing),
    Active(Active),
    Resolving(Resolving),
}

pub(crate) struct Announcing {
    pub generation: u64,
    pub category: String,
    pub thread: ChannelId,
    pub announcement: MessageId,
    pub _pre_roll: TimerHandle,
}

pub(crate) struct Active {
    pub round: Round,
    pub clock: RoundClock,
}

pub(crate) struct Resolving {
    pub generation: u64,
    pub _gap: TimerHandle,
}

impl Phase {
    pub fn stage(&self) -> Stage {
        match self {
            Phase::Idle => Stage::Idle,
            Phase::Announcing(_) => Stage::Announcing,
            Phase::Active(_) => Stage::Active,
            Phase::Resolving(_) => Stage::Resolving,
        }
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            Phase::Idle => None,
            Phase::Announcing(a) => Some(a.generation),
            Phase::Active(a) => Some(a.round.generation),
            Phase::Resolving(r) => Some(r.generation),
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}
