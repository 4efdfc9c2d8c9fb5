use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lexicon::{Catalog, JsonFile, DEFAULT_WORDS_PATH, RANDOM};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

/// Offline maintenance of the hangman word catalog.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON word document
    #[clap(short, long, env = "HANGMAN_WORDS", default_value = DEFAULT_WORDS_PATH)]
    words: PathBuf,

    #[clap(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Category names, one per line
    List,
    /// Words of one category
    Words { category: String },
    Add { category: String, word: String },
    Del { category: String, word: String },
    /// Draw a word the way a round would
    Pick {
        #[clap(default_value = RANDOM)]
        category: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lexicon=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let catalog = Catalog::new(JsonFile::new(&args.words));

    match args.action {
        Action::List => {
            for category in catalog.categories().await? {
                println!("{}", category);
            }
        }
        Action::Words { category } => {
            let category = lexicon::normalize(&category);
            let words = catalog.words().await?;
            let list = words
                .get(&category)
                .ok_or_else(|| lexicon::CatalogError::UnknownCategory(category.clone()))?;
            for word in list {
                println!("{}", word);
            }
        }
        Action::Add { category, word } => {
            let word = word.trim().to_lowercase();
            if catalog.add_word(&category, &word).await? {
                println!("added {} to {}", word, category);
            } else {
                println!("{} is already in {}", word, category);
            }
        }
        Action::Del { category, word } => {
            let word = word.trim().to_lowercase();
            catalog.remove_word(&category, &word).await?;
            println!("removed {} from {}", word, category);
        }
        Action::Pick { category } => {
            let pick = catalog.pick(&category, &mut StdRng::from_entropy()).await?;
            println!("{} ({})", pick.word, pick.category);
        }
    }
    Ok(())
}
