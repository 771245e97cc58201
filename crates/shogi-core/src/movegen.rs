use crate::board::Board;
use crate::types::{Piece, PieceKind, Position, PositionList, Side};

/// One entry of a movement table, written from Sente's point of view
/// (forward is a negative row delta). Gote mirrors the row delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub row: i8,
    pub col: i8,
    pub slide: bool,
}

const fn step(row: i8, col: i8) -> Step {
    Step {
        row,
        col,
        slide: false,
    }
}

const fn ray(row: i8, col: i8) -> Step {
    Step {
        row,
        col,
        slide: true,
    }
}

pub const KING_STEPS: [Step; 8] = [
    step(-1, -1),
    step(-1, 0),
    step(-1, 1),
    step(0, -1),
    step(0, 1),
    step(1, -1),
    step(1, 0),
    step(1, 1),
];

pub const GOLD_STEPS: [Step; 6] = [
    step(-1, -1),
    step(-1, 0),
    step(-1, 1),
    step(0, -1),
    step(0, 1),
    step(1, 0),
];

pub const SILVER_STEPS: [Step; 5] = [
    step(-1, -1),
    step(-1, 0),
    step(-1, 1),
    step(1, -1),
    step(1, 1),
];

pub const COPPER_STEPS: [Step; 4] = [step(-1, -1), step(-1, 0), step(-1, 1), step(1, 0)];

pub const KNIGHT_STEPS: [Step; 2] = [step(-2, -1), step(-2, 1)];

pub const LANCE_STEPS: [Step; 1] = [ray(-1, 0)];

pub const PAWN_STEPS: [Step; 1] = [step(-1, 0)];

pub const ROOK_STEPS: [Step; 4] = [ray(-1, 0), ray(1, 0), ray(0, -1), ray(0, 1)];

pub const BISHOP_STEPS: [Step; 4] = [ray(-1, -1), ray(-1, 1), ray(1, -1), ray(1, 1)];

pub const DRAGON_STEPS: [Step; 8] = [
    ray(-1, 0),
    ray(1, 0),
    ray(0, -1),
    ray(0, 1),
    step(-1, -1),
    step(-1, 1),
    step(1, -1),
    step(1, 1),
];

pub const HORSE_STEPS: [Step; 8] = [
    ray(-1, -1),
    ray(-1, 1),
    ray(1, -1),
    ray(1, 1),
    step(-1, 0),
    step(1, 0),
    step(0, -1),
    step(0, 1),
];

/// Movement table for a kind in the given promotion state. Promoted
/// Silver, Copper, Knight, Lance and Pawn all move as Gold.
pub const fn steps(kind: PieceKind, promoted: bool) -> &'static [Step] {
    match (kind, promoted) {
        (PieceKind::King, _) => &KING_STEPS,
        (PieceKind::Gold, _) => &GOLD_STEPS,
        (PieceKind::Rook, false) => &ROOK_STEPS,
        (PieceKind::Rook, true) => &DRAGON_STEPS,
        (PieceKind::Bishop, false) => &BISHOP_STEPS,
        (PieceKind::Bishop, true) => &HORSE_STEPS,
        (PieceKind::Silver, false) => &SILVER_STEPS,
        (PieceKind::Copper, false) => &COPPER_STEPS,
        (PieceKind::Knight, false) => &KNIGHT_STEPS,
        (PieceKind::Lance, false) => &LANCE_STEPS,
        (PieceKind::Pawn, false) => &PAWN_STEPS,
        (
            PieceKind::Silver
            | PieceKind::Copper
            | PieceKind::Knight
            | PieceKind::Lance
            | PieceKind::Pawn,
            true,
        ) => &GOLD_STEPS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    /// Squares the piece may actually move to.
    Normal,
    /// Squares the piece controls. Adds friendly-occupied squares, and a
    /// slide that hits the enemy king also covers the square behind it.
    Attack,
}

pub fn destinations(board: &Board, from: Position, piece: Piece, mode: MoveMode) -> PositionList {
    let mut out = PositionList::new();
    for s in steps(piece.kind(), piece.is_promoted()) {
        let (dr, dc) = oriented(*s, piece.side());
        if !s.slide {
            let Some(to) = next_square(board, from, dr, dc) else {
                continue;
            };
            match board.get(to) {
                Some(occupant) if occupant.side() == piece.side() && mode == MoveMode::Normal => {}
                _ => out.push(to),
            }
            continue;
        }

        let mut cur = from;
        while let Some(to) = next_square(board, cur, dr, dc) {
            match board.get(to) {
                None => {
                    out.push(to);
                    cur = to;
                }
                Some(occupant) if occupant.side() == piece.side() => {
                    if mode == MoveMode::Attack {
                        out.push(to);
                    }
                    break;
                }
                Some(occupant) => {
                    out.push(to);
                    if mode == MoveMode::Attack && occupant.kind() == PieceKind::King {
                        if let Some(behind) = next_square(board, to, dr, dc) {
                            out.push(behind);
                        }
                    }
                    break;
                }
            }
        }
    }
    out
}

pub fn attacks(board: &Board, from: Position, piece: Piece) -> PositionList {
    destinations(board, from, piece, MoveMode::Attack)
}

/// Squares holding `by` pieces that attack `square`.
pub fn attackers(board: &Board, square: Position, by: Side) -> PositionList {
    board
        .pieces_of(by)
        .filter(|(from, piece)| attacks(board, *from, *piece).contains(&square))
        .map(|(from, _)| from)
        .collect()
}

pub fn is_square_attacked(board: &Board, square: Position, by: Side) -> bool {
    board
        .pieces_of(by)
        .any(|(from, piece)| attacks(board, from, piece).contains(&square))
}

fn oriented(step: Step, side: Side) -> (i8, i8) {
    match side {
        Side::Sente => (step.row, step.col),
        Side::Gote => (-step.row, step.col),
    }
}

fn next_square(board: &Board, from: Position, dr: i8, dc: i8) -> Option<Position> {
    from.offset(dr, dc).filter(|pos| board.contains(*pos))
}
