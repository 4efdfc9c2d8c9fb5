use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hangman::consts::DEFAULT_PORT;
use hangman::game::Config;
use hangman::gateway::{self, Gateway, StaffPolicy};
use hangman::logger;
use hangman::types::*;
use hangman::RoundLifecycle;
use lexicon::{Catalog, JsonFile, DEFAULT_WORDS_PATH};
use tokio::net::TcpListener;
use tracing::info;

/// Runs the hangman bot behind a websocket chat gateway.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long, env = "HANGMAN_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// JSON word document
    #[clap(short, long, env = "HANGMAN_WORDS", default_value = DEFAULT_WORDS_PATH)]
    words: PathBuf,

    /// Channel where commands are accepted and the status card lives
    #[clap(long, env = "HANGMAN_PLAY_CHANNEL", default_value_t = 1)]
    play_channel: u64,

    /// Role allowed to run staff commands, besides administrators and moderators
    #[clap(long, env = "HANGMAN_STAFF_ROLE")]
    staff_role: Option<u64>,

    /// Role pinged when a round is announced and when it starts
    #[clap(long, env = "HANGMAN_PING_ROLE")]
    ping_role: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();
    let launch_time = tokio::time::Instant::now();

    let play_channel = ChannelId(args.play_channel);
    let gateway = Arc::new(Gateway::new(play_channel));
    let catalog = Catalog::new(JsonFile::new(&args.words));
    let categories = catalog
        .categories()
        .await
        .with_context(|| format!("loading {}", args.words.display()))?;
    info!(words = %args.words.display(), categories = categories.len(), "catalog ready");

    let mut config = Config::new(play_channel);
    config.ping_role = args.ping_role.map(RoleId);
    let lifecycle = RoundLifecycle::new(config, catalog, gateway.clone());
    let game_tx = lifecycle.get_tx();
    let _handle_game = tokio::spawn(lifecycle.run());

    let listener = TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("binding port {}", args.port))?;
    info!(
        micros = launch_time.elapsed().as_micros() as u64,
        "launched"
    );

    let staff = StaffPolicy {
        staff_role: args.staff_role.map(RoleId),
    };
    gateway::serve(listener, gateway, game_tx, staff).await?;
    Ok(())
}
