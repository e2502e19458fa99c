//! Check detection.

use std::fmt;

use log::error;
use shakmaty::{Color, Piece, Role, Square};

use crate::board::{side_label, square_offset, Board, Move};
use crate::error::{GameError, Result};
use crate::rules::is_legal;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// An enemy piece attacking a king.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checker {
    pub piece: Piece,
    pub from: Square,
}

impl fmt::Display for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.piece.char(), self.from)
    }
}

/// Enemy pieces attacking the king of `side`.
///
/// Rays stop at the first occupied square. An enemy king is reported only
/// when it is that first blocker and sits one step away.
pub fn find_checkers(board: &Board, side: Color) -> Result<Vec<Checker>> {
    let king_sq = match board.king_square(side) {
        Some(sq) => sq,
        None => {
            error!("{} king not found while looking for checkers", side_label(side));
            return Err(GameError::KingNotFound(side));
        }
    };
    let enemy = side.other();
    let mut checkers = Vec::new();

    let mut push_if = |sq: Square, roles: &[Role]| {
        if let Some(p) = board.piece_at(sq) {
            if p.color == enemy && roles.contains(&p.role) {
                checkers.push(Checker { piece: p, from: sq });
            }
        }
    };

    // Pedoni: caselle da cui un pedone nemico cattura il re
    let toward_enemy = match side {
        Color::White => 1,
        Color::Black => -1,
    };
    for dx in [-1, 1] {
        if let Some(sq) = square_offset(king_sq, dx, toward_enemy) {
            push_if(sq, &[Role::Pawn]);
        }
    }

    for (dx, dy) in KNIGHT_OFFSETS {
        if let Some(sq) = square_offset(king_sq, dx, dy) {
            push_if(sq, &[Role::Knight]);
        }
    }

    let rays = ORTHOGONAL
        .iter()
        .map(|d| (*d, [Role::Rook, Role::Queen]))
        .chain(DIAGONAL.iter().map(|d| (*d, [Role::Bishop, Role::Queen])));
    for ((dx, dy), sliders) in rays {
        let mut step = 1;
        while let Some(sq) = square_offset(king_sq, dx * step, dy * step) {
            if let Some(p) = board.piece_at(sq) {
                if p.color == enemy {
                    if sliders.contains(&p.role) || (p.role == Role::King && step == 1) {
                        checkers.push(Checker { piece: p, from: sq });
                    }
                }
                break;
            }
            step += 1;
        }
    }

    Ok(checkers)
}

/// Warning text when the king of `side` is attacked on `board`.
///
/// With a candidate move, a check that the move (legal for `side`) would
/// clear counts as resolved.
pub fn warn_if_in_check(board: &Board, side: Color, candidate: Option<&Move>) -> Option<String> {
    let mut checkers = match find_checkers(board, side) {
        Ok(c) => c,
        Err(e) => return Some(format!("Error: {}", e)),
    };

    if !checkers.is_empty() {
        if let Some(mv) = candidate {
            if let Ok(true) = is_legal(Some(mv.piece), mv.from, mv.to, board, side) {
                if let Ok(after) = board.apply_move(mv) {
                    if let Ok(remaining) = find_checkers(&after, side) {
                        if remaining.is_empty() {
                            checkers.clear();
                        }
                    }
                }
            }
        }
    }

    if checkers.is_empty() {
        return None;
    }
    let attackers = checkers
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("{} king is under attack: {}", side_label(side), attackers))
}
