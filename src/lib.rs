pub mod agent;
pub mod board;
pub mod check;
pub mod config;
pub mod diff;
pub mod error;
pub mod game;
pub mod repair;
pub mod rules;
pub mod time;
pub mod wire;

pub use board::{Board, Move};
pub use error::GameError;
pub use game::{MatchController, MatchState};
pub use wire::StructuredBoard;
