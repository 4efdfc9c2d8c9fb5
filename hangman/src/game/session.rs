use lexicon::{normalize, RANDOM};
use rand::seq::IteratorRandom;
use rand::Rng;

use crate::consts::ROTATE_AFTER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stay on one category, switching to another every few rounds.
    Fixed,
    Random,
}

/// Category rotation across the consecutive rounds of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub mode: Mode,
    pub current_category: String,
    pub rounds_in_category: u32,
    pub rotate_after: u32,
}

/// What the next round will play, as announced at the end of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Random,
    Unchanged(String),
    Rotated(String),
}

impl Decision {
    pub fn announcement(&self) -> String {
        match self {
            Decision::Random => "➡️ The next round will be **random**.".to_string(),
            Decision::Unchanged(category) => {
                format!("➡️ The next round stays in category **{}**.", category)
            }
            Decision::Rotated(category) => {
                format!("🔄 The next round will be from category **{}**.", category)
            }
        }
    }
}

impl Session {
    /// A session for a `start` request; `"random"` selects random mode.
    pub fn new(requested: &str) -> Self {
        let requested = normalize(requested.trim());
        let (mode, current_category) = if requested.is_empty() || requested == RANDOM {
            (Mode::Random, String::new())
        } else {
            (Mode::Fixed, requested)
        };
        Self {
            mode,
            current_category,
            rounds_in_category: 0,
            rotate_after: ROTATE_AFTER,
        }
    }

    pub fn with_rotation(mut self, rotate_after: u32) -> Self {
        self.rotate_after = rotate_after;
        self
    }

    /// Category name to ask the catalog for.
    pub fn next_category(&self) -> &str {
        match self.mode {
            Mode::Random => RANDOM,
            Mode::Fixed => &self.current_category,
        }
    }

    /// Counts a resolved round and decides the next category. After
    /// `rotate_after` rounds a fixed session moves to another category from
    /// `categories`, or stays put when there is no other.
    pub fn decide_next<R: Rng + ?Sized>(&mut self, categories: &[String], rng: &mut R) -> Decision {
        if self.mode == Mode::Random {
            return Decision::Random;
        }
        self.rounds_in_category += 1;
        if self.rounds_in_category < self.rotate_after {
            return Decision::Unchanged(self.current_category.clone());
        }

        self.rounds_in_category = 0;
        if let Some(next) = categories
            .iter()
            .filter(|c| **c != self.current_category)
            .choose(rng)
        {
            tracing::info!(from = %self.current_category, to = %next, "rotating category");
            self.current_category = next.clone();
        }
        Decision::Rotated(self.current_category.clone())
    }
}
