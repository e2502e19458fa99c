//! Error types for the referee.
//!
//! Errors coming from the agent's turn are recovered inside the match
//! controller and turned into feedback; errors on a human submission are
//! returned to the caller so the move can be resubmitted.

use shakmaty::{Color, Square};
use thiserror::Error;

/// Errors raised by the board model, the rule checks and the match controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// No piece on the origin square.
    #[error("Origin cell {square} is empty: no piece to move")]
    EmptyOrigin { square: Square },

    /// The move does not follow the movement rules for the side.
    #[error("Move {piece} {from}->{to} is not valid")]
    IllegalMove { piece: char, from: Square, to: Square },

    /// The move leaves the mover's own king attacked.
    #[error("{0}")]
    SelfCheck(String),

    /// The board encoding could not be parsed, even after repair.
    #[error("Malformed board encoding: {0}")]
    MalformedEncoding(String),

    /// Both snapshots are identical.
    #[error("Illegal move, expected exactly one piece moved")]
    NoMove,

    /// The snapshots differ by something other than one relocation.
    #[error("Illegal move, found removed={removed:?}, but added={added:?}")]
    AmbiguousMove {
        removed: Vec<String>,
        added: Vec<String>,
    },

    /// The piece on the destination is not the one that left the origin.
    #[error("Piece mismatch: expected {expected} at {square}, found {found}")]
    PieceMismatch {
        expected: char,
        found: char,
        square: Square,
    },

    /// The side's king is not on the board.
    #[error("{0:?} king not found on the board")]
    KingNotFound(Color),

    /// More than one king of a color on the board.
    #[error("{color:?} has {count} kings on the board, expected one")]
    ExtraKing { color: Color, count: usize },

    /// A move was submitted by the side that is not on turn.
    #[error("Not your turn")]
    OutOfTurn,

    /// The match already ended.
    #[error("The match is over")]
    GameOver,

    /// A human command line could not be understood.
    #[error("Invalid input: {0}")]
    InvalidCommand(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
