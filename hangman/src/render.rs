//! Board, status and chat texts. Pure functions of round state.

use std::collections::BTreeSet;

use protocol::Embed;
use tokio::time::Duration;

use crate::game::state::Round;
use crate::types::*;

const HANGMAN_PICS: [&str; 7] = [
    "```\n +---+\n |   |\n     |\n     |\n     |\n     |\n========\n```",
    "```\n +---+\n |   |\n O   |\n     |\n     |\n     |\n========\n```",
    "```\n +---+\n |   |\n O   |\n |   |\n     |\n     |\n========\n```",
    "```\n +---+\n |   |\n O   |\n/|   |\n     |\n     |\n========\n```",
    "```\n +---+\n |   |\n O   |\n/|\\  |\n     |\n     |\n========\n```",
    "```\n +---+\n |   |\n O   |\n/|\\  |\n/    |\n     |\n========\n```",
    "```\n +---+\n |   |\n O   |\n/|\\  |\n/ \\  |\n     |\n========\n```",
];

const HIDDEN: char = '•';
const STATUS_COLOR: u32 = 0x2b6cb0;

/// Gallows drawing for `wrong` mistakes; stays on the last stage past six.
pub fn stage(wrong: usize) -> &'static str {
    HANGMAN_PICS[wrong.min(HANGMAN_PICS.len() - 1)]
}

/// `"m • r"` for `"mar"` with `m` and `r` revealed. Separators show as blanks.
pub fn masked(word: &str, revealed: &BTreeSet<char>) -> String {
    let cells: Vec<String> = word
        .chars()
        .map(|c| match c {
            ' ' | '-' => ' ',
            c if !c.is_alphabetic() || revealed.contains(&c) => c,
            _ => HIDDEN,
        })
        .map(String::from)
        .collect();
    cells.join(" ")
}

/// Whole seconds left, rounded up.
pub fn seconds_left(remaining: Duration) -> u64 {
    (remaining.as_millis() as u64 + 999) / 1000
}

pub fn board(round: &Round, remaining: Duration) -> Embed {
    let wrong = if round.wrong.is_empty() {
        "—".to_string()
    } else {
        format!("`{}`", round.wrong.join("`, `"))
    };
    let description = format!(
        "{}\n**Word:** {}\n\nWrong: {}\nCategory: **{}**\nTime left: **{}** seconds",
        stage(round.wrong.len()),
        masked(&round.secret, &round.revealed),
        wrong,
        round.category,
        seconds_left(remaining),
    );
    Embed::new("🎮 Hangman", description).timestamp(round.started_at)
}

/// The persistent rules-and-status card of the play channel.
pub fn status(active_thread: Option<ChannelId>) -> Embed {
    let rules = "Welcome to **hangman**! Together with the community, guess the hidden word.\n\n\
        • Every round lasts **120 seconds**.\n\
        • From **60s** left, the bot gives an automatic **hint** (one letter) every **20s** (60/40/20).\n\n";
    let status = match active_thread {
        Some(thread) => format!("**Game status:** Active game ➜ {}", thread.mention()),
        None => "**Game status:** No active game.".to_string(),
    };
    Embed::new("ℹ️ Hangman", format!("{}{}", rules, status)).color(STATUS_COLOR)
}

pub fn thread_name(category: &str) -> String {
    format!("🎮 Hangman • {}", category)
}

pub fn announcement(ping: Option<RoleId>, thread: ChannelId, pre_roll: Duration) -> String {
    format!(
        "{}a new hangman round **starts in {} seconds**: {}",
        ping_prefix(ping),
        pre_roll.as_secs(),
        thread.mention()
    )
}

pub fn round_started(ping: Option<RoleId>) -> String {
    format!("{}The round has started! Good luck!", ping_prefix(ping))
}

fn ping_prefix(ping: Option<RoleId>) -> String {
    ping.map(|role| format!("{} ", role.mention())).unwrap_or_default()
}

pub fn winners(round: &Round) -> String {
    let names: Vec<String> = round.contributors.iter().map(|u| u.mention()).collect();
    match names.len() {
        0 => format!("🏆 Well done! You guessed the word **{}**.", round.secret),
        1 => format!("🏆 Well done, {}! You guessed the word **{}**.", names[0], round.secret),
        _ => format!(
            "🏆 Well done, {}! You all guessed the word **{}**.",
            names.join(", "),
            round.secret
        ),
    }
}

pub fn timed_out(round: &Round) -> String {
    format!("⏳ Time is up! The word was **{}**.", round.secret)
}

pub fn teardown_notice(delay: Duration) -> String {
    format!("🧹 This thread will be deleted in {} seconds.", delay.as_secs())
}

pub fn hint(letter: char) -> String {
    format!("💡 Automatic hint: the letter **{}** is in the word.", letter)
}

pub fn hit(letter: char) -> String {
    format!("✅ The letter **{}** is in the word!", letter)
}

pub fn wrong_letter(author: UserId) -> String {
    format!("❌ {} guessed a wrong letter.", author.mention())
}

pub fn wrong_word(author: UserId) -> String {
    format!("❌ {} guessed the wrong word.", author.mention())
}
