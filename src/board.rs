// Mapping delle caselle: a1=0, b1=1, ..., h8=63 (lo stesso di shakmaty)

use std::fmt;

use shakmaty::{Color, File, Piece, Rank, Role, Square};

use crate::error::{GameError, Result};

/// A single piece relocation, either typed by the human or inferred by diffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(piece: Piece, from: Square, to: Square) -> Self {
        Self { piece, from, to }
    }

    /// "origin-destination" form used in prompts, e.g. "e7-e5"
    pub fn coordinates(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}->{}", self.piece.char(), self.from, self.to)
    }
}

/// Human readable side name.
pub fn side_label(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// Parse a square like "e4" (case-insensitive).
pub fn parse_square(text: &str) -> Result<Square> {
    let lowered = text.trim().to_ascii_lowercase();
    if lowered.len() != 2 {
        return Err(GameError::InvalidCommand(format!("invalid square '{}'", text)));
    }
    lowered
        .parse::<Square>()
        .map_err(|_| GameError::InvalidCommand(format!("invalid square '{}'", text)))
}

/// Square reached by moving `dx` files and `dy` ranks, if still on the board.
pub fn square_offset(sq: Square, dx: i32, dy: i32) -> Option<Square> {
    let x = sq.file() as i32 + dx;
    let y = sq.rank() as i32 + dy;
    if (0..8).contains(&x) && (0..8).contains(&y) {
        Some(Square::from_coords(File::new(x as u32), Rank::new(y as u32)))
    } else {
        None
    }
}

/// All squares, file by file: a1, a2, ..., a8, b1, ..., h8.
pub fn squares_by_file() -> impl Iterator<Item = Square> {
    (0..8u32).flat_map(|f| (0..8u32).map(move |r| Square::from_coords(File::new(f), Rank::new(r))))
}

/// Total mapping square -> optional piece.
///
/// Values are immutable from the referee's point of view: [`Board::apply`]
/// returns a new board, so trial positions never touch the authoritative one.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    // Board vuota da popolare via encoding strutturato
    pub fn empty() -> Self {
        Self { cells: [None; 64] }
    }

    /// Standard starting position.
    pub fn standard() -> Self {
        let mut board = Self::empty();
        let back_rank = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];
        for (f, role) in back_rank.into_iter().enumerate() {
            let file = File::new(f as u32);
            board.put(Square::from_coords(file, Rank::First), role.of(Color::White));
            board.put(Square::from_coords(file, Rank::Second), Role::Pawn.of(Color::White));
            board.put(Square::from_coords(file, Rank::Seventh), Role::Pawn.of(Color::Black));
            board.put(Square::from_coords(file, Rank::Eighth), role.of(Color::Black));
        }
        board
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq as usize]
    }

    pub fn is_empty_at(&self, sq: Square) -> bool {
        self.cells[sq as usize].is_none()
    }

    // Posiziona un pezzo; sovrascrive l'eventuale occupante
    pub fn put(&mut self, sq: Square, piece: Piece) {
        self.cells[sq as usize] = Some(piece);
    }

    pub fn clear(&mut self, sq: Square) -> Option<Piece> {
        self.cells[sq as usize].take()
    }

    /// Occupied squares with their pieces, file by file.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        squares_by_file().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Move whatever stands on `from` (or `piece`, when given) to `to`.
    ///
    /// The destination occupant, if any, is overwritten.
    pub fn apply(&self, piece: Option<Piece>, from: Square, to: Square) -> Result<Board> {
        let piece = match piece.or_else(|| self.piece_at(from)) {
            Some(p) => p,
            None => return Err(GameError::EmptyOrigin { square: from }),
        };
        let mut next = self.clone();
        next.clear(from);
        next.put(to, piece);
        Ok(next)
    }

    pub fn apply_move(&self, mv: &Move) -> Result<Board> {
        self.apply(Some(mv.piece), mv.from, mv.to)
    }

    /// First square holding the king of `color`.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Role::King.of(color);
        squares_by_file().find(|&sq| self.piece_at(sq) == Some(king))
    }

    pub fn king_count(&self, color: Color) -> usize {
        let king = Role::King.of(color);
        self.cells.iter().filter(|&&c| c == Some(king)).count()
    }

    /// Side whose king has been captured, white checked first.
    pub fn missing_king(&self) -> Option<Color> {
        [Color::White, Color::Black]
            .into_iter()
            .find(|&c| self.king_square(c).is_none())
    }

    /// The game goes on while each side has exactly one king.
    pub fn is_game_active(&self) -> bool {
        [Color::White, Color::Black]
            .into_iter()
            .all(|c| self.king_count(c) == 1)
    }
}

/// Cell-wise comparison of two snapshots.
pub fn boards_equal(a: &Board, b: &Board) -> bool {
    a.cells == b.cells
}

/// "Game in progress" or the winner line.
pub fn game_status(board: &Board) -> String {
    match board.missing_king() {
        Some(loser) => format!("Game over: {} wins!", side_label(loser.other())),
        None => "Game in progress".to_string(),
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(")?;
        for (i, (sq, piece)) in self.pieces().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}{}", piece.char(), sq)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in (0..8u32).rev() {
            write!(f, "{} ", r + 1)?;
            for file in 0..8u32 {
                let sq = Square::from_coords(File::new(file), Rank::new(r));
                let c = self.piece_at(sq).map(|p| p.char()).unwrap_or('.');
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in 0..8u32 {
            write!(f, " {}", File::new(file).char())?;
        }
        writeln!(f)
    }
}
