use std::sync::OnceLock;

use lexicon::normalize;
use regex::Regex;

use super::state::{Outcome, Round};
use crate::consts::MAX_GUESS_LEN;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guess {
    Letter(char),
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Not a guess at all; chatter is left alone.
    Ignored,
    /// Letter already revealed or already tried.
    Repeated,
    Hit(char),
    WrongLetter(char),
    WrongWord,
    Won,
}

/// Letters, spaces and hyphens only.
const GUESS_SHAPE: &str = r"^[\p{Alphabetic}\s-]+$";

fn is_guess_shaped(input: &str) -> bool {
    static SHAPE: OnceLock<Option<Regex>> = OnceLock::new();
    SHAPE
        .get_or_init(|| Regex::new(GUESS_SHAPE).ok())
        .as_ref()
        .map_or(false, |shape| shape.is_match(input))
}

/// Reads chat text as a guess. Anything longer than one character is a
/// whole-word attempt; a single letter is a letter guess.
pub fn classify(raw: &str) -> Option<Guess> {
    let input = normalize(raw.trim());
    if input.is_empty() || input.chars().count() > MAX_GUESS_LEN || !is_guess_shaped(&input) {
        return None;
    }
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => Some(Guess::Letter(c)),
        (Some(_), None) => None,
        _ => Some(Guess::Word(input)),
    }
}

/// Applies one chat message to the round and says what happened.
pub fn evaluate(round: &mut Round, author: UserId, raw: &str) -> Verdict {
    if round.is_over() {
        return Verdict::Ignored;
    }
    let guess = match classify(raw) {
        Some(guess) => guess,
        None => return Verdict::Ignored,
    };
    round.attempted.insert(author);

    match guess {
        Guess::Word(word) => {
            if word == normalize(&round.secret) {
                round.credit(author);
                round.reveal_all();
                round.outcome = Outcome::Won;
                Verdict::Won
            } else {
                if !round.wrong.contains(&word) {
                    round.wrong.push(word);
                }
                Verdict::WrongWord
            }
        }
        Guess::Letter(letter) => {
            if round.revealed.contains(&letter) || round.wrong.iter().any(|w| w.chars().eq([letter])) {
                return Verdict::Repeated;
            }
            if round.letters().contains(&letter) {
                round.credit(author);
                round.revealed.insert(letter);
                if round.is_solved() {
                    round.outcome = Outcome::Won;
                    Verdict::Won
                } else {
                    Verdict::Hit(letter)
                }
            } else {
                round.wrong.push(letter.to_string());
                Verdict::WrongLetter(letter)
            }
        }
    }
}
