use std::fmt;

use crate::board::{Board, BoardError};
use crate::hand::Hand;
use crate::movegen::{attackers, destinations, is_square_attacked, MoveMode};
use crate::types::{Move, MoveList, Piece, PieceKind, Position, PositionList, Side};

/// Stateless legality oracle bound to a variant. Every query reads the
/// board it is given and never mutates it.
pub trait RuleSet: fmt::Debug + Send + Sync {
    fn valid_move(&self, board: &Board, from: Position, to: Position, side: Side) -> bool;

    /// Placement rules for a drop: empty target, no second unpromoted pawn
    /// in the column, and no drop too close to the far edge to ever move.
    fn valid_hand_move(&self, board: &Board, pos: Position, kind: PieceKind, side: Side) -> bool;

    fn is_in_check(&self, board: &Board, square: Position, attacker: Side) -> bool;

    fn is_checkmate(&self, board: &Board, king: Position, side: Side, hand: &Hand) -> bool;

    /// Whether moving `from -> to` attacks the opponent's king. Used for
    /// announcements only.
    fn gives_check(&self, board: &Board, from: Position, to: Position, side: Side) -> bool;

    /// A drop that passes the placement rules and does not leave the
    /// dropping side in check.
    fn legal_drop(&self, board: &Board, pos: Position, kind: PieceKind, side: Side) -> bool {
        self.valid_hand_move(board, pos, kind, side)
            && king_safe_after(board, side, |b| b.put(pos, Piece::new(kind, side)).map(|_| ()))
    }

    fn legal_destinations(&self, board: &Board, from: Position, side: Side) -> PositionList {
        match board.get(from) {
            Some(piece) if piece.side() == side => {
                destinations(board, from, piece, MoveMode::Normal)
                    .into_iter()
                    .filter(|to| self.valid_move(board, from, *to, side))
                    .collect()
            }
            _ => PositionList::new(),
        }
    }

    fn legal_drop_positions(&self, board: &Board, kind: PieceKind, side: Side) -> PositionList {
        board
            .positions()
            .filter(|pos| self.legal_drop(board, *pos, kind, side))
            .collect()
    }

    fn legal_moves(&self, board: &Board, side: Side, hand: &Hand) -> MoveList {
        let mut moves = MoveList::new();
        for (from, piece) in board.pieces_of(side) {
            for to in self.legal_destinations(board, from, side) {
                moves.push(Move::new(from, to, piece, board.get(to)));
            }
        }
        for kind in hand.available() {
            for to in self.legal_drop_positions(board, kind, side) {
                moves.push(Move::drop(to, Piece::new(kind, side)));
            }
        }
        moves
    }
}

/// Shogi legality shared by every configured variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShogiRules;

/// Rows a freshly dropped piece needs in front of it to have any move.
pub const fn drop_reach(kind: PieceKind) -> u8 {
    match kind {
        PieceKind::Pawn | PieceKind::Lance => 1,
        PieceKind::Knight => 2,
        _ => 0,
    }
}

impl RuleSet for ShogiRules {
    fn valid_move(&self, board: &Board, from: Position, to: Position, side: Side) -> bool {
        let Some(piece) = board.get(from) else {
            return false;
        };
        if piece.side() != side {
            return false;
        }
        if !destinations(board, from, piece, MoveMode::Normal).contains(&to) {
            return false;
        }
        king_safe_after(board, side, |b| b.relocate(from, to).map(|_| ()))
    }

    fn valid_hand_move(&self, board: &Board, pos: Position, kind: PieceKind, side: Side) -> bool {
        if kind == PieceKind::King || !board.is_vacant(pos) {
            return false;
        }
        if kind == PieceKind::Pawn && board.has_in_column(Piece::new(PieceKind::Pawn, side), pos.col)
        {
            return false;
        }
        let rows_ahead = match side {
            Side::Sente => pos.row,
            Side::Gote => board.height() - 1 - pos.row,
        };
        rows_ahead >= drop_reach(kind)
    }

    fn is_in_check(&self, board: &Board, square: Position, attacker: Side) -> bool {
        is_square_attacked(board, square, attacker)
    }

    fn is_checkmate(&self, board: &Board, king: Position, side: Side, hand: &Hand) -> bool {
        let attacker = side.opposite();
        if !self.is_in_check(board, king, attacker) {
            return false;
        }
        let Some(king_piece) = board.get(king) else {
            return false;
        };

        for to in destinations(board, king, king_piece, MoveMode::Normal) {
            if king_safe_after(board, side, |b| b.relocate(king, to).map(|_| ())) {
                return false;
            }
        }

        let checkers = attackers(board, king, attacker);
        // Double check: only a king move could help and none does.
        let [checker] = checkers.as_slice() else {
            return true;
        };
        let checker = *checker;
        let between = squares_between(checker, king);

        for (from, piece) in board.pieces_of(side) {
            if from == king {
                continue;
            }
            for to in destinations(board, from, piece, MoveMode::Normal) {
                if (to == checker || between.contains(&to))
                    && king_safe_after(board, side, |b| b.relocate(from, to).map(|_| ()))
                {
                    log::trace!("check at {king:?} answered by {from:?} -> {to:?}");
                    return false;
                }
            }
        }

        for kind in hand.available() {
            for &pos in &between {
                if self.legal_drop(board, pos, kind, side) {
                    log::trace!("check at {king:?} answered by {kind:?} drop on {pos:?}");
                    return false;
                }
            }
        }

        true
    }

    fn gives_check(&self, board: &Board, from: Position, to: Position, side: Side) -> bool {
        let mut scratch = board.clone();
        if scratch.relocate(from, to).is_err() {
            return false;
        }
        scratch
            .king(side.opposite())
            .is_some_and(|king| is_square_attacked(&scratch, king, side))
    }
}

/// Applies `apply` to a scratch copy and reports whether `side`'s king is
/// then free of attack. A side without a king is never in check.
fn king_safe_after(
    board: &Board,
    side: Side,
    apply: impl FnOnce(&mut Board) -> Result<(), BoardError>,
) -> bool {
    let mut scratch = board.clone();
    if apply(&mut scratch).is_err() {
        return false;
    }
    match scratch.king(side) {
        Some(king) => !is_square_attacked(&scratch, king, side.opposite()),
        None => true,
    }
}

/// Squares strictly between two positions sharing a rank, file or
/// diagonal. Empty for any other pair.
pub fn squares_between(a: Position, b: Position) -> PositionList {
    let mut out = PositionList::new();
    let dr = i16::from(b.row) - i16::from(a.row);
    let dc = i16::from(b.col) - i16::from(a.col);
    if (dr == 0 && dc == 0) || (dr != 0 && dc != 0 && dr.abs() != dc.abs()) {
        return out;
    }
    let (sr, sc) = (dr.signum() as i8, dc.signum() as i8);
    let mut cur = a;
    while let Some(next) = cur.offset(sr, sc) {
        if next == b {
            break;
        }
        out.push(next);
        cur = next;
    }
    out
}
