//! Structured board encoding exchanged with the agent.
//!
//! ```json
//! { "neri":    { "pedoni": ["a7", ...], "alfieri": [...], "cavalli": [...],
//!                "torri": [...], "regina": [...], "re": [...] },
//!   "bianchi": { ... } }
//! ```
//!
//! Unknown keys at either level are ignored. Squares are validated while
//! decoding, so nothing downstream ever sees a loosely typed payload.

use serde::{Deserialize, Serialize};
use shakmaty::{Color, Piece, Role};

use crate::board::{parse_square, squares_by_file, Board};
use crate::error::{GameError, Result};

/// Square lists for one color, one list per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceLists {
    #[serde(default)]
    pub pedoni: Vec<String>,
    #[serde(default)]
    pub alfieri: Vec<String>,
    #[serde(default)]
    pub cavalli: Vec<String>,
    #[serde(default)]
    pub torri: Vec<String>,
    #[serde(default)]
    pub regina: Vec<String>,
    #[serde(default)]
    pub re: Vec<String>,
}

impl PieceLists {
    fn by_role(&self) -> [(Role, &Vec<String>); 6] {
        [
            (Role::Pawn, &self.pedoni),
            (Role::Bishop, &self.alfieri),
            (Role::Knight, &self.cavalli),
            (Role::Rook, &self.torri),
            (Role::Queen, &self.regina),
            (Role::King, &self.re),
        ]
    }

    fn list_mut(&mut self, role: Role) -> &mut Vec<String> {
        match role {
            Role::Pawn => &mut self.pedoni,
            Role::Bishop => &mut self.alfieri,
            Role::Knight => &mut self.cavalli,
            Role::Rook => &mut self.torri,
            Role::Queen => &mut self.regina,
            Role::King => &mut self.re,
        }
    }
}

/// Both colors' piece lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredBoard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neri: Option<PieceLists>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bianchi: Option<PieceLists>,
}

impl StructuredBoard {
    pub fn standard() -> Self {
        encode(&Board::standard())
    }

    pub fn has_both_sides(&self) -> bool {
        self.neri.is_some() && self.bianchi.is_some()
    }

    pub fn side(&self, color: Color) -> Option<&PieceLists> {
        match color {
            Color::White => self.bianchi.as_ref(),
            Color::Black => self.neri.as_ref(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GameError::MalformedEncoding(e.to_string()))
    }
}

/// Build the authoritative grid from an encoding.
///
/// When two entries name the same square the last one wins.
pub fn decode(structured: &StructuredBoard) -> Result<Board> {
    let mut board = Board::empty();
    for color in [Color::Black, Color::White] {
        let Some(lists) = structured.side(color) else {
            continue;
        };
        for (role, squares) in lists.by_role() {
            for text in squares {
                let sq = parse_square(text).map_err(|_| {
                    GameError::MalformedEncoding(format!("invalid square '{}'", text))
                })?;
                board.put(sq, Piece { color, role });
            }
        }
    }
    Ok(board)
}

/// Group a grid back by color and category.
pub fn encode(board: &Board) -> StructuredBoard {
    let mut black = PieceLists::default();
    let mut white = PieceLists::default();
    for sq in squares_by_file() {
        if let Some(piece) = board.piece_at(sq) {
            let lists = match piece.color {
                Color::White => &mut white,
                Color::Black => &mut black,
            };
            lists.list_mut(piece.role).push(sq.to_string());
        }
    }
    StructuredBoard {
        neri: Some(black),
        bianchi: Some(white),
    }
}

/// Full reply object the agent is asked to produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    #[serde(flatten)]
    pub board: StructuredBoard,
    /// Stated move, "e7-e5".
    #[serde(default, rename = "mossa_proposta", skip_serializing_if = "Option::is_none")]
    pub proposed_move: Option<String>,
    #[serde(default, rename = "commento_giocatore", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, rename = "messaggio_avversario", skip_serializing_if = "Option::is_none")]
    pub taunt: Option<String>,
}

impl AgentReply {
    /// Origin and destination of the stated move; "x" is accepted as separator.
    pub fn stated_squares(&self) -> Option<(String, String)> {
        let stated = self.proposed_move.as_deref()?;
        parse_stated_move(stated)
    }
}

pub fn parse_stated_move(stated: &str) -> Option<(String, String)> {
    let normalized = stated.replace(['x', 'X'], "-");
    let mut parts = normalized
        .split(['-', ' '])
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let from = parts.next()?.to_ascii_lowercase();
    let to = parts.next()?.to_ascii_lowercase();
    Some((from, to))
}
