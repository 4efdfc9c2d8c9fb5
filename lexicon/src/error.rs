#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("category \"{0}\" does not exist")]
    UnknownCategory(String),

    #[error("word \"{word}\" does not exist in category \"{category}\"")]
    UnknownWord { category: String, word: String },

    #[error("\"{0}\" has no letters to guess")]
    InvalidWord(String),

    #[error("no category has any words")]
    EmptyCatalog,

    #[error("word store: {0}")]
    Io(#[from] std::io::Error),

    #[error("word document is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
