//! Collaborative hangman rounds played in a dedicated chat thread.
//!
//! [`game::RoundLifecycle`] is the actor that owns every round; it talks to the
//! chat platform only through [`transport::ChatTransport`]. The websocket
//! [`gateway`] stands in for the platform when the bot runs standalone.

pub mod consts;
pub mod game;
pub mod gateway;
pub mod logger;
pub mod render;
pub mod testing;
pub mod transport;
pub mod types;

pub use game::{GameError, GameResult, RoundLifecycle};
