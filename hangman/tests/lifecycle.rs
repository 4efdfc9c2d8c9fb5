use std::sync::Arc;

use hangman::consts::*;
use hangman::game::session::Mode;
use hangman::game::state::Stage;
use hangman::game::{Config, Request, TimerType};
use hangman::testing::{Call, MemoryTransport};
use hangman::types::*;
use hangman::{GameError, RoundLifecycle};
use lexicon::store::Document;
use lexicon::{Catalog, CatalogError, MemoryStore};
use protocol::Command;
use tokio::sync::oneshot;
use tokio::time::{self, Duration, Instant};

const PLAY: ChannelId = ChannelId(1);
const PING: RoleId = RoleId(7);

fn catalog(entries: Vec<(&str, Vec<&str>)>) -> Catalog {
    let document: Document = entries
        .into_iter()
        .map(|(category, words)| {
            (
                category.to_string(),
                words.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();
    Catalog::new(MemoryStore::with(document))
}

fn lifecycle(transport: &Arc<MemoryTransport>, catalog: Catalog) -> RoundLifecycle {
    let mut config = Config::new(PLAY);
    config.ping_role = Some(PING);
    RoundLifecycle::new(config, catalog, transport.clone())
}

/// Feeds queued requests (timers mostly) to the lifecycle until `done` holds.
async fn pump_until(lc: &mut RoundLifecycle, done: impl Fn(&RoundLifecycle) -> bool) {
    for _ in 0..64 {
        if done(lc) {
            return;
        }
        assert!(lc.step().await, "request channel closed");
    }
    panic!("condition never reached");
}

async fn pump_until_active(lc: &mut RoundLifecycle) -> ChannelId {
    pump_until(lc, |lc| lc.stage(PLAY) == Stage::Active).await;
    lc.round(PLAY).unwrap().thread
}

/// Plays the active round to a win with one whole-word guess.
async fn win_round(lc: &mut RoundLifecycle) -> ChannelId {
    let thread = pump_until_active(lc).await;
    let secret = lc.round(PLAY).unwrap().secret.clone();
    lc.guess(thread, UserId(10), &secret).await;
    assert_eq!(lc.stage(PLAY), Stage::Resolving);
    thread
}

fn announcement_of(transport: &MemoryTransport, thread: ChannelId) -> MessageId {
    transport
        .calls()
        .into_iter()
        .find_map(|call| match call {
            Call::Send {
                channel,
                message,
                content,
            } if channel == PLAY
                && content.text().map_or(false, |t| t.contains(&thread.mention())) =>
            {
                Some(message)
            }
            _ => None,
        })
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn round_begins_after_the_pre_roll() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));

    lc.start(PLAY, "fructe").await.unwrap();
    assert_eq!(lc.stage(PLAY), Stage::Announcing);
    let thread = transport.threads()[0];
    let announcement = announcement_of(&transport, thread);
    let texts = transport.texts(PLAY);
    assert!(texts[0].starts_with("Preparing"));
    assert!(texts[1].starts_with(&PING.mention()));
    assert!(texts[1].contains("starts in 15 seconds"));

    let announced = Instant::now();
    assert_eq!(pump_until_active(&mut lc).await, thread);
    assert!(announced.elapsed() >= PRE_ROLL);

    let round = lc.round(PLAY).unwrap();
    assert_eq!(round.secret, "mar");
    assert_eq!(round.category, "fructe");
    assert!(round.board.is_some());
    assert_eq!(round.announcement, None);
    assert!(transport.deleted_messages().contains(&announcement));
    assert!(transport
        .texts(thread)
        .iter()
        .any(|t| t.starts_with(&PING.mention()) && t.contains("round has started")));
}

#[tokio::test(start_paused = true)]
async fn one_game_per_channel() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));

    assert!(matches!(lc.stop(PLAY).await, Err(GameError::NoActiveRound)));
    lc.start(PLAY, "fructe").await.unwrap();
    assert!(matches!(lc.start(PLAY, "random").await, Err(GameError::AlreadyActive)));

    pump_until_active(&mut lc).await;
    assert!(matches!(lc.start(PLAY, "fructe").await, Err(GameError::AlreadyActive)));
    assert_eq!(transport.threads().len(), 1);

    lc.stop(PLAY).await.unwrap();
    assert!(matches!(lc.stop(PLAY).await, Err(GameError::NoActiveRound)));
}

#[tokio::test(start_paused = true)]
async fn failed_thread_creation_leaves_nothing_behind() {
    let transport = Arc::new(MemoryTransport::new());
    transport.fail_threads(true);
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));

    assert!(matches!(lc.start(PLAY, "fructe").await, Err(GameError::Transport(_))));
    assert_eq!(lc.stage(PLAY), Stage::Idle);
    assert!(lc.session(PLAY).is_none());
    // only the seed message was posted, and it is gone again
    assert_eq!(transport.texts(PLAY).len(), 1);
    assert_eq!(transport.deleted_messages().len(), 1);

    transport.fail_threads(false);
    lc.start(PLAY, "fructe").await.unwrap();
    assert_eq!(lc.stage(PLAY), Stage::Announcing);
}

#[tokio::test(start_paused = true)]
async fn a_win_tears_down_the_thread_and_announces_the_next_round() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));
    lc.start(PLAY, "fructe").await.unwrap();
    let thread = pump_until_active(&mut lc).await;

    lc.guess(thread, UserId(10), "m").await;
    lc.guess(thread, UserId(11), "MAR").await;
    assert_eq!(lc.stage(PLAY), Stage::Resolving);

    let texts = transport.texts(thread);
    let result = texts.iter().find(|t| t.contains("Well done")).unwrap();
    assert!(result.contains("<@10>, <@11>"));
    assert!(result.contains("**mar**"));
    assert!(result.contains("stays in category **fructe**"));
    assert!(texts.iter().any(|t| t.contains("deleted in 10 seconds")));

    let resolved = Instant::now();
    pump_until(&mut lc, |_| transport.deleted_threads().contains(&thread)).await;
    assert!(resolved.elapsed() >= TEARDOWN_DELAY);
    assert_eq!(lc.stage(PLAY), Stage::Resolving);

    pump_until(&mut lc, |lc| lc.stage(PLAY) == Stage::Announcing).await;
    assert!(resolved.elapsed() >= NEXT_ROUND_GAP);
    assert_eq!(transport.threads().len(), 2);
    assert_eq!(lc.session(PLAY).unwrap().rounds_in_category, 1);
}

#[tokio::test(start_paused = true)]
async fn unsolved_rounds_time_out_after_three_hints() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("tehnologie", vec!["programare"])]));
    lc.start(PLAY, "tehnologie").await.unwrap();
    let thread = pump_until_active(&mut lc).await;
    let board = lc.round(PLAY).unwrap().board.unwrap();

    let started = Instant::now();
    pump_until(&mut lc, |lc| lc.stage(PLAY) == Stage::Resolving).await;
    assert!(started.elapsed() >= ROUND_TIME);

    let texts = transport.texts(thread);
    assert_eq!(texts.iter().filter(|t| t.contains("Automatic hint")).count(), 3);
    let result = texts
        .iter()
        .find(|t| t.contains("Time is up! The word was **programare**"))
        .unwrap();
    assert!(result.contains("stays in category **tehnologie**"));
    assert!(texts.iter().any(|t| t.contains("deleted in 10 seconds")));
    // one refresh per tick and one per hint
    assert!(transport.edits(board) >= 7 + 3);

    pump_until(&mut lc, |_| transport.deleted_threads().contains(&thread)).await;
    pump_until(&mut lc, |lc| lc.stage(PLAY) == Stage::Announcing).await;
    assert_eq!(transport.threads().len(), 2);
    assert_eq!(lc.session(PLAY).unwrap().current_category, "tehnologie");
}

#[tokio::test(start_paused = true)]
async fn a_hint_that_completes_the_word_wins_the_round() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("x", vec!["aaa"])]));
    lc.start(PLAY, "x").await.unwrap();
    let thread = pump_until_active(&mut lc).await;

    pump_until(&mut lc, |lc| lc.stage(PLAY) == Stage::Resolving).await;
    let texts = transport.texts(thread);
    assert!(texts.iter().any(|t| t.contains("Well done! You guessed the word **aaa**")));
    assert!(!texts.iter().any(|t| t.contains("Time is up")));
}

#[tokio::test(start_paused = true)]
async fn fixed_category_rotates_after_three_rounds() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(
        &transport,
        catalog(vec![("fructe", vec!["mar"]), ("legume", vec!["ceapa"])]),
    );
    lc.start(PLAY, "fructe").await.unwrap();

    for _ in 0..2 {
        let thread = win_round(&mut lc).await;
        assert!(transport
            .texts(thread)
            .iter()
            .any(|t| t.contains("stays in category **fructe**")));
    }
    let thread = win_round(&mut lc).await;
    assert!(transport
        .texts(thread)
        .iter()
        .any(|t| t.contains("will be from category **legume**")));

    pump_until_active(&mut lc).await;
    let round = lc.round(PLAY).unwrap();
    assert_eq!(round.category, "legume");
    assert_eq!(round.secret, "ceapa");
}

#[tokio::test(start_paused = true)]
async fn random_mode_stays_random() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(
        &transport,
        catalog(vec![("fructe", vec!["mar"]), ("legume", vec!["ceapa"])]),
    );
    lc.start(PLAY, "Random").await.unwrap();
    assert_eq!(lc.session(PLAY).unwrap().mode, Mode::Random);

    for _ in 0..2 {
        let thread = win_round(&mut lc).await;
        assert!(transport
            .texts(thread)
            .iter()
            .any(|t| t.contains("will be **random**")));
    }
    let names: Vec<String> = transport
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::CreateThread { name, .. } => Some(name),
            _ => None,
        })
        .collect();
    assert!(names.iter().all(|name| name == "🎮 Hangman • random"));
}

#[tokio::test(start_paused = true)]
async fn stop_while_announcing_cleans_up_at_once() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));
    lc.start(PLAY, "fructe").await.unwrap();
    let thread = transport.threads()[0];
    let announcement = announcement_of(&transport, thread);

    let reply = lc.command(PLAY, UserId(1), Command::Stop).await.unwrap();
    assert!(reply.contains("Game stopped"));
    assert_eq!(lc.stage(PLAY), Stage::Idle);
    assert!(lc.session(PLAY).is_none());
    assert!(transport.deleted_threads().contains(&thread));
    assert!(transport.deleted_messages().contains(&announcement));

    // the pre-roll timer went with the game
    assert!(time::timeout(Duration::from_secs(60), lc.step()).await.is_err());
    assert_eq!(lc.stage(PLAY), Stage::Idle);
}

#[tokio::test(start_paused = true)]
async fn stop_during_a_round_cancels_its_clock() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));
    lc.start(PLAY, "fructe").await.unwrap();
    let thread = pump_until_active(&mut lc).await;

    lc.stop(PLAY).await.unwrap();
    assert_eq!(transport.deleted_threads(), vec![thread]);
    assert!(time::timeout(ROUND_TIME * 2, lc.step()).await.is_err());
    assert!(!transport.texts(thread).iter().any(|t| t.contains("Time is up")));
}

#[tokio::test(start_paused = true)]
async fn stop_is_refused_between_rounds() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));
    lc.start(PLAY, "fructe").await.unwrap();
    let thread = win_round(&mut lc).await;

    assert!(matches!(lc.stop(PLAY).await, Err(GameError::NoActiveRound)));
    assert_eq!(lc.stage(PLAY), Stage::Resolving);
    assert!(lc.session(PLAY).is_some());

    // the game carries on into the next round
    pump_until(&mut lc, |lc| lc.stage(PLAY) == Stage::Announcing).await;
    assert!(transport.deleted_threads().contains(&thread));
    lc.stop(PLAY).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn a_round_without_a_word_goes_idle_and_refreshes_the_status() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["", "  "])]));
    lc.start(PLAY, "fructe").await.unwrap();
    let thread = transport.threads()[0];
    assert!(lc.status_message(PLAY).is_none());

    pump_until(&mut lc, |lc| lc.stage(PLAY) == Stage::Idle).await;
    assert!(lc.session(PLAY).is_none());
    assert!(transport.deleted_threads().contains(&thread));
    assert!(lc.status_message(PLAY).is_some());
}

#[tokio::test(start_paused = true)]
async fn stale_timers_are_ignored() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));
    lc.start(PLAY, "fructe").await.unwrap();

    let tx = lc.get_tx();
    for timer in [TimerType::PreRoll, TimerType::Deadline] {
        tx.send(Request::Timer {
            channel: PLAY,
            generation: 999,
            timer,
        })
        .await
        .unwrap();
        assert!(lc.step().await);
        assert_eq!(lc.stage(PLAY), Stage::Announcing);
    }
}

#[tokio::test(start_paused = true)]
async fn board_edit_failures_do_not_stop_the_round() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));
    lc.start(PLAY, "fructe").await.unwrap();
    let thread = pump_until_active(&mut lc).await;
    transport.fail_edits(true);

    lc.guess(thread, UserId(10), "z").await;
    assert_eq!(lc.stage(PLAY), Stage::Active);
    assert_eq!(lc.round(PLAY).unwrap().wrong, vec!["z".to_string()]);
    assert!(transport
        .texts(thread)
        .iter()
        .any(|t| t.contains("<@10> guessed a wrong letter")));
}

#[tokio::test(start_paused = true)]
async fn repeats_and_noise_get_no_feedback() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));
    lc.start(PLAY, "fructe").await.unwrap();
    let thread = pump_until_active(&mut lc).await;
    let before = transport.texts(thread).len();

    lc.guess(thread, UserId(10), "m").await;
    lc.guess(thread, UserId(11), "M").await;
    lc.guess(thread, UserId(11), "m4r").await;
    lc.guess(thread, UserId(11), &"a".repeat(40)).await;
    lc.guess(ChannelId(77), UserId(11), "a").await;

    let texts = transport.texts(thread);
    assert_eq!(texts.len(), before + 1);
    assert!(texts[before].contains("The letter **m** is in the word"));
    assert!(!lc.round(PLAY).unwrap().revealed.contains(&'a'));
}

#[tokio::test(start_paused = true)]
async fn setup_posts_then_edits_the_status_message() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));

    lc.command(PLAY, UserId(1), Command::Setup).await.unwrap();
    let status = lc.status_message(PLAY).unwrap();
    lc.command(PLAY, UserId(1), Command::Setup).await.unwrap();
    assert_eq!(lc.status_message(PLAY), Some(status));
    assert_eq!(transport.edits(status), 1);

    // a status message that vanished is posted again
    transport.fail_edits(true);
    lc.command(PLAY, UserId(1), Command::Setup).await.unwrap();
    assert_ne!(lc.status_message(PLAY), Some(status));
}

#[tokio::test(start_paused = true)]
async fn word_commands_edit_the_catalog() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));

    let reply = lc
        .command(
            PLAY,
            UserId(1),
            Command::Add {
                category: "fructe".to_string(),
                word: "gutuie".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(reply.contains("**gutuie**"));

    let missing = lc
        .command(
            PLAY,
            UserId(1),
            Command::Del {
                category: "legume".to_string(),
                word: "ceapa".to_string(),
            },
        )
        .await;
    assert!(matches!(missing, Err(GameError::Catalog(_))));

    let blank = lc
        .command(
            PLAY,
            UserId(1),
            Command::Add {
                category: "fructe".to_string(),
                word: " ".to_string(),
            },
        )
        .await;
    assert!(matches!(
        blank,
        Err(GameError::Catalog(CatalogError::InvalidWord(_)))
    ));

    // only playable words are ever drawn
    lc.start(PLAY, "fructe").await.unwrap();
    pump_until_active(&mut lc).await;
    let round = lc.round(PLAY).unwrap();
    assert!(!round.secret.is_empty());
    assert!(!round.is_solved());
}

#[tokio::test(start_paused = true)]
async fn a_failed_next_announcement_ends_the_game() {
    let transport = Arc::new(MemoryTransport::new());
    let mut lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));
    lc.start(PLAY, "fructe").await.unwrap();
    win_round(&mut lc).await;

    transport.fail_threads(true);
    pump_until(&mut lc, |lc| lc.stage(PLAY) == Stage::Idle).await;
    assert!(lc.session(PLAY).is_none());
}

#[tokio::test(start_paused = true)]
async fn requests_reach_a_running_lifecycle() {
    let transport = Arc::new(MemoryTransport::new());
    let lc = lifecycle(&transport, catalog(vec![("fructe", vec!["mar"])]));
    let tx = lc.get_tx();
    let handle = tokio::spawn(lc.run());

    let (reply, reply_rx) = oneshot::channel();
    tx.send(Request::Command {
        channel: PLAY,
        author: UserId(1),
        command: Command::Start {
            category: Some("fructe".to_string()),
        },
        reply,
    })
    .await
    .unwrap();
    assert!(reply_rx.await.unwrap().is_ok());

    // status card first, then the seed and the announcement
    let calls = transport.calls();
    assert!(matches!(&calls[0], Call::Send { channel, content, .. } if *channel == PLAY && content.embed().is_some()));
    assert_eq!(transport.threads().len(), 1);
    handle.abort();
}
