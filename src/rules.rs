//! Movement rules for the simplified game.
//!
//! No castling, en passant or promotion. Only the moving piece's geometry,
//! the pawn's occupancy conditions and sliding-path clearance are checked;
//! landing on a piece of the same color is not rejected here.

use shakmaty::{Color, Piece, Role, Square};

use crate::board::{square_offset, Board};
use crate::error::{GameError, Result};

/// File and rank deltas from `from` to `to`.
pub fn deltas(from: Square, to: Square) -> (i32, i32) {
    (
        to.file() as i32 - from.file() as i32,
        to.rank() as i32 - from.rank() as i32,
    )
}

/// Every square strictly between `from` and `to` along their line is empty.
///
/// Callers guarantee the two squares share a rank, file or diagonal.
pub fn is_path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (dx, dy) = deltas(from, to);
    let (sx, sy) = (dx.signum(), dy.signum());
    let steps = dx.abs().max(dy.abs());
    (1..steps).all(|i| match square_offset(from, sx * i, sy * i) {
        Some(sq) => board.is_empty_at(sq),
        None => false,
    })
}

fn pawn_direction(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

fn pawn_home_rank(color: Color) -> u32 {
    match color {
        Color::White => 1,
        Color::Black => 6,
    }
}

fn is_legal_pawn(piece: Piece, from: Square, to: Square, board: &Board) -> bool {
    let (dx, dy) = deltas(from, to);
    let dir = pawn_direction(piece.color);
    let dest_empty = board.is_empty_at(to);

    // avanti di uno
    if dx == 0 && dy == dir && dest_empty {
        return true;
    }

    // doppio passo dalla casa
    if dx == 0 && dy == 2 * dir && from.rank() as u32 == pawn_home_rank(piece.color) && dest_empty {
        if let Some(mid) = square_offset(from, 0, dir) {
            if board.is_empty_at(mid) {
                return true;
            }
        }
    }

    // cattura diagonale
    if dx.abs() == 1 && dy == dir {
        if let Some(target) = board.piece_at(to) {
            return target.color != piece.color;
        }
    }

    false
}

/// Whether `piece` may go from `from` to `to` for `side`.
///
/// With `piece == None` the occupant of `from` is used, and an empty origin
/// is an error.
pub fn is_legal(
    piece: Option<Piece>,
    from: Square,
    to: Square,
    board: &Board,
    side: Color,
) -> Result<bool> {
    let piece = match piece.or_else(|| board.piece_at(from)) {
        Some(p) => p,
        None => return Err(GameError::EmptyOrigin { square: from }),
    };

    if piece.color != side {
        return Ok(false);
    }

    let (dx, dy) = deltas(from, to);
    let (adx, ady) = (dx.abs(), dy.abs());

    let legal = match piece.role {
        Role::Knight => (adx, ady) == (1, 2) || (adx, ady) == (2, 1),
        Role::King => adx.max(ady) == 1,
        Role::Pawn => is_legal_pawn(piece, from, to, board),
        Role::Rook => (dx == 0) != (dy == 0) && is_path_clear(board, from, to),
        Role::Bishop => adx == ady && adx != 0 && is_path_clear(board, from, to),
        Role::Queen => {
            let orthogonal = (dx == 0) != (dy == 0);
            let diagonal = adx == ady && adx != 0;
            (orthogonal || diagonal) && is_path_clear(board, from, to)
        }
    };
    Ok(legal)
}

/// Parse a piece code: upper case for white, lower case for black.
pub fn piece_from_code(code: &str) -> Option<Piece> {
    let mut chars = code.trim().chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Piece::from_char(c)
}
