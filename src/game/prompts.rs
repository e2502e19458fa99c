//! Texts sent to the agent.
//!
//! Steering messages are wrapped in square brackets; the agent is told in the
//! session rules that bracketed text is referee feedback.

use shakmaty::Color;

use crate::board::{side_label, Move};
use crate::wire::StructuredBoard;

pub fn bracket(text: &str) -> String {
    format!("[{}]", text.trim())
}

/// The three system messages that open a session.
pub fn session_messages(initial: &StructuredBoard, agent_side: Color, language: &str) -> [String; 3] {
    let side = side_label(agent_side);
    let opponent = side_label(agent_side.other());
    let rules = format!(
        "Rules:\n\
         - Game messages must be written in {language}.\n\
         - Error and warning messages are in English, between square brackets []: they are hints to improve your play.\n\
         - You are a chess expert. The game state is a JSON encoding listing where the black (\"neri\") and white (\"bianchi\") pieces stand:\n\
         {board}\n\
         - You play {side} and answer the move proposed by {opponent}, sent in every message as \"origin-destination\" together with the full board in JSON.\n\
         - The game is over when one of the two king lists (\"re\") is empty.",
        board = initial.to_json_pretty(),
    );
    let objectives = format!(
        "Objectives:\n\
         - Analyse the move proposed by {opponent} and respond. Defend the {side} king if it is in check.\n\
         - Find and propose the most effective move against {opponent}, respecting the rules and the game situation."
    );
    let output = format!(
        "Output: return only a JSON object with:\n\
         - a key \"mossa_proposta\" holding the {side} move as \"origin-destination\" (for example \"e7-e6\");\n\
         - the \"bianchi\" and \"neri\" lists updated according to \"mossa_proposta\";\n\
         - an optional key \"commento_giocatore\" with hints, techniques or history related to the move;\n\
         - an optional key \"messaggio_avversario\" with a challenge for the opponent that does not reveal the strategy."
    );
    [rules, objectives, output]
}

pub fn move_prompt(board: &StructuredBoard, opponent_move: Option<&Move>, opponent: Color) -> String {
    let stated = opponent_move
        .map(Move::coordinates)
        .unwrap_or_else(|| "none".to_string());
    format!(
        "Input: current board state in JSON (already updated with the last move).\n{}\n{} move: {}",
        board.to_json_pretty(),
        side_label(opponent),
        stated
    )
}

pub fn malformed_reply(board: &StructuredBoard) -> String {
    bracket(&format!(
        "The board you sent seems incorrect as JSON, please use this representation and try again to rework a correct move: {}",
        board.to_json()
    ))
}

pub fn unchanged_board(side: Color, stated: &str, corrected: &StructuredBoard) -> String {
    bracket(&format!(
        "Assistant ({}) proposed the move '{}', but the board state has not changed after it: update the board in this way: {}",
        side_label(side),
        stated,
        corrected.to_json()
    ))
}

pub fn unplayable_stated_move(side: Color, stated: &str, board: &StructuredBoard) -> String {
    bracket(&format!(
        "Assistant ({}) proposed the move '{}', but it cannot be played on the actual board state: {}",
        side_label(side),
        stated,
        board.to_json()
    ))
}

pub fn missing_move(side: Color, board: &StructuredBoard) -> String {
    bracket(&format!(
        "Assistant ({}) did not propose a valid move, please provide a valid move for the actual board state: {}",
        side_label(side),
        board.to_json()
    ))
}

pub fn incoherent_board(side: Color, reason: &str, board: &StructuredBoard) -> String {
    bracket(&format!(
        "The board you sent does not match a single move of {} ({}). Move exactly one piece starting from this board: {}",
        side_label(side),
        reason,
        board.to_json()
    ))
}

pub fn illegal_move(side: Color, mv: &Move) -> String {
    bracket(&format!(
        "Illegal move proposed by assistant: '{}->{}' at this point is not valid for {}.",
        mv.from,
        mv.to,
        side_label(side)
    ))
}

pub fn left_in_check(side: Color, warning: &str, board: &StructuredBoard) -> String {
    bracket(&format!(
        "{} - Please ensure the move does not leave the {} king in check in the actual board state: {}",
        warning,
        side_label(side),
        board.to_json()
    ))
}

pub fn accepted_after_retry(side: Color) -> String {
    bracket(&format!(
        "Well done! Assistant ({}) played the last move with success.",
        side_label(side)
    ))
}

pub fn match_outcome(result: &str) -> String {
    bracket(result)
}
