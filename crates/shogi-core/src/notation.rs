use crate::constants::{NOTATION_CAPTURE, NOTATION_DROP, NOTATION_MOVE, NOTATION_PROMOTE};
use crate::game::Game;
use crate::types::{Move, Position};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("illegal move")]
    Illegal,
}

/// Short move text: piece abbreviation, the one-based origin column and
/// row for a board move, `*` for a drop, `x` for a capture or `-`
/// otherwise, then the destination, and a trailing `+` when the piece
/// promoted on arrival, e.g. `P77-76`, `+r23x24`, `G*33`, `s62-73+`.
/// The origin keeps two pieces of one kind reaching the same square apart.
pub fn move_to_notation(mv: &Move) -> String {
    let mut out = mv.piece.to_string();
    match mv.from {
        Some(from) => {
            push_square(&mut out, from);
            out.push(if mv.is_capture() {
                NOTATION_CAPTURE
            } else {
                NOTATION_MOVE
            });
        }
        None => out.push(NOTATION_DROP),
    }
    push_square(&mut out, mv.to);
    if mv.promoted {
        out.push(NOTATION_PROMOTE);
    }
    out
}

fn push_square(out: &mut String, pos: Position) {
    out.push_str(&(u16::from(pos.col) + 1).to_string());
    out.push_str(&(u16::from(pos.row) + 1).to_string());
}

/// Finds the legal move of the side to move that prints as `notation`.
/// A trailing `+` comes back as a promotion request on the returned move.
pub fn parse_notation(notation: &str, game: &Game) -> Result<Move, NotationError> {
    let notation = notation.trim();
    let (body, promote) = match notation.strip_suffix(NOTATION_PROMOTE) {
        Some(body) => (body, true),
        None => (notation, false),
    };
    game.legal_moves()
        .into_iter()
        .find(|mv| move_to_notation(mv) == body)
        .map(|mv| Move {
            promoted: promote,
            ..mv
        })
        .ok_or(NotationError::Illegal)
}
