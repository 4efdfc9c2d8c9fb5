//! Category to word-list catalog for the hangman bot.
//!
//! Names and words are normalised (lowercase, diacritics stripped) before they
//! are stored or looked up, so `"Pisică"` and `"pisica"` are the same word.

mod catalog;
mod error;
mod normalize;
mod seed;
pub mod store;

pub use catalog::{Catalog, Pick, Words, RANDOM};
pub use error::{CatalogError, CatalogResult};
pub use normalize::normalize;
pub use seed::seed;
pub use store::{JsonFile, MemoryStore, Store};

/// Where the word document lives unless configured otherwise.
pub const DEFAULT_WORDS_PATH: &str = "data/words.json";
