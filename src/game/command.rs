//! Parser for the local player's input lines.

use shakmaty::{Piece, Square};

use crate::board::parse_square;
use crate::rules::piece_from_code;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum HumanCommand {
    /// "<piece> <origin> <destination>", e.g. "P e2 e4"
    Move { piece: Piece, from: Square, to: Square },
    Board,
    Json,
    Help,
    Quit,
    Invalid(String),
}

pub const MOVE_USAGE: &str = "use: <piece> <origin> <destination> (eg. P e2 e4)";

pub fn parse_human_command(line: &str) -> HumanCommand {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [] => HumanCommand::Invalid(MOVE_USAGE.to_string()),
        ["board"] => HumanCommand::Board,
        ["json"] => HumanCommand::Json,
        ["help"] => HumanCommand::Help,
        ["quit"] | ["exit"] => HumanCommand::Quit,
        [code, from, to] => {
            let Some(piece) = piece_from_code(code) else {
                return HumanCommand::Invalid(format!("unknown piece code '{}'", code));
            };
            match (parse_square(from), parse_square(to)) {
                (Ok(from), Ok(to)) => HumanCommand::Move { piece, from, to },
                (Err(e), _) | (_, Err(e)) => HumanCommand::Invalid(e.to_string()),
            }
        }
        _ => HumanCommand::Invalid(MOVE_USAGE.to_string()),
    }
}
