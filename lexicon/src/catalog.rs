use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::error::{CatalogError, CatalogResult};
use crate::normalize::normalize;
use crate::seed::seed;
use crate::store::{Document, Store};

/// Category name that asks for a random category.
pub const RANDOM: &str = "random";

/// Normalised category name to its sorted, deduplicated words.
pub type Words = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub word: String,
    pub category: String,
}

/// The word catalog. Every operation reads the store afresh, so edits made by
/// another process (the `lexicon` CLI) are picked up by the next round.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn Store>,
}

impl Catalog {
    pub fn new<S: Store + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_arc(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Current catalog, normalised. Writes the seed document when none exists.
    pub async fn words(&self) -> CatalogResult<Words> {
        match self.store.load().await? {
            Some(document) => Ok(from_document(document)),
            None => {
                let words = seed();
                self.store.save(&to_document(&words)).await?;
                tracing::info!(categories = words.len(), "seeded the word catalog");
                Ok(words)
            }
        }
    }

    /// All category names, sorted.
    pub async fn categories(&self) -> CatalogResult<Vec<String>> {
        Ok(self.words().await?.into_keys().collect())
    }

    pub async fn pick(&self, category: &str, rng: &mut (impl Rng + Send)) -> CatalogResult<Pick> {
        let words = self.words().await?;
        pick_from(&words, category, rng)
    }

    /// Inserts `word` into `category`, creating the category when needed.
    /// Returns `false` without writing anything when the word is already there.
    pub async fn add_word(&self, category: &str, word: &str) -> CatalogResult<bool> {
        let mut words = self.words().await?;
        let category = normalize(category);
        let word = normalize(word.trim());
        if !is_playable(&word) {
            return Err(CatalogError::InvalidWord(word));
        }

        if !words.entry(category.clone()).or_default().insert(word.clone()) {
            tracing::debug!(%category, %word, "word already present");
            return Ok(false);
        }
        self.store.save(&to_document(&words)).await?;
        tracing::info!(%category, %word, "word added");
        Ok(true)
    }

    pub async fn remove_word(&self, category: &str, word: &str) -> CatalogResult<()> {
        let mut words = self.words().await?;
        let category = normalize(category);
        let word = normalize(word);

        let list = words
            .get_mut(&category)
            .ok_or_else(|| CatalogError::UnknownCategory(category.clone()))?;
        if !list.remove(&word) {
            return Err(CatalogError::UnknownWord { category, word });
        }
        self.store.save(&to_document(&words)).await?;
        tracing::info!(%category, %word, "word removed");
        Ok(())
    }
}

/// Picks a word from `category`. `"random"`, an unknown category and an empty
/// one all fall back to a uniformly random category that has words.
pub fn pick_from<R: Rng + ?Sized>(words: &Words, category: &str, rng: &mut R) -> CatalogResult<Pick> {
    let wanted = normalize(category);
    let category = match words.get(&wanted) {
        Some(list) if wanted != RANDOM && !list.is_empty() => wanted,
        _ => words
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(name, _)| name.clone())
            .choose(rng)
            .ok_or(CatalogError::EmptyCatalog)?,
    };
    let word = words[&category]
        .iter()
        .choose(rng)
        .cloned()
        .ok_or(CatalogError::EmptyCatalog)?;
    Ok(Pick { word, category })
}

/// A round needs at least one letter to guess.
fn is_playable(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
}

/// Drops words nobody could guess.
fn from_document(document: Document) -> Words {
    let mut words = Words::new();
    for (category, list) in document {
        words
            .entry(normalize(&category))
            .or_default()
            .extend(list.iter().map(|w| normalize(w.trim())).filter(|w| is_playable(w)));
    }
    words
}

fn to_document(words: &Words) -> Document {
    words
        .iter()
        .map(|(category, list)| (category.clone(), list.iter().cloned().collect()))
        .collect()
}
