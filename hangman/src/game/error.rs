use lexicon::CatalogError;

use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("a game is already running")]
    AlreadyActive,

    #[error("no active game")]
    NoActiveRound,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("chat platform: {0}")]
    Transport(#[from] TransportError),
}

pub type GameResult<T> = Result<T, GameError>;
