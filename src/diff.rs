//! Infer the move between two board snapshots.

use crate::board::{squares_by_file, Board, Move};
use crate::error::{GameError, Result};

/// The single relocation turning `prev` into `curr`.
///
/// A square is *vacated* when it held a piece and is now empty, and *filled*
/// when it now holds a piece it did not hold before. A capture therefore
/// shows up as one vacated origin and one filled destination, like a quiet
/// move.
pub fn detect_move(prev: &Board, curr: &Board) -> Result<Move> {
    let mut removed = Vec::new();
    let mut added = Vec::new();

    for sq in squares_by_file() {
        let before = prev.piece_at(sq);
        let after = curr.piece_at(sq);
        match (before, after) {
            (Some(_), None) => removed.push(sq),
            (b, Some(a)) if b != Some(a) => added.push((sq, a)),
            _ => {}
        }
    }

    if removed.is_empty() && added.is_empty() {
        return Err(GameError::NoMove);
    }
    if removed.len() != 1 || added.len() != 1 {
        return Err(GameError::AmbiguousMove {
            removed: removed.iter().map(|s| s.to_string()).collect(),
            added: added.iter().map(|(s, _)| s.to_string()).collect(),
        });
    }

    let from = removed[0];
    let (to, found) = added[0];
    let piece = prev
        .piece_at(from)
        .ok_or(GameError::EmptyOrigin { square: from })?;
    if found != piece {
        return Err(GameError::PieceMismatch {
            expected: piece.char(),
            found: found.char(),
            square: to,
        });
    }
    Ok(Move::new(piece, from, to))
}
