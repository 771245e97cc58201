use arrayvec::ArrayVec;

use crate::types::{HandPiece, PieceKind, Side};

/// Captured pieces one side may drop, kept in the variant's listing order.
/// Kinds outside that listing are never held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    side: Side,
    pieces: ArrayVec<HandPiece, 9>,
}

impl Hand {
    pub fn new(side: Side, kinds: &[PieceKind]) -> Self {
        let mut pieces = ArrayVec::<HandPiece, 9>::new();
        for &kind in kinds {
            if kind != PieceKind::King && !pieces.iter().any(|hp| hp.kind == kind) {
                pieces.push(HandPiece::new(kind, side, 0));
            }
        }
        Self { side, pieces }
    }

    pub const fn side(&self) -> Side {
        self.side
    }

    pub fn accepts(&self, kind: PieceKind) -> bool {
        self.pieces.iter().any(|hp| hp.kind == kind)
    }

    pub fn count(&self, kind: PieceKind) -> u8 {
        self.pieces
            .iter()
            .find(|hp| hp.kind == kind)
            .map_or(0, |hp| hp.count)
    }

    pub fn holds(&self, kind: PieceKind) -> bool {
        self.count(kind) > 0
    }

    /// Adds one piece of `kind`. Returns false if this hand does not take
    /// that kind.
    pub fn add(&mut self, kind: PieceKind) -> bool {
        match self.pieces.iter_mut().find(|hp| hp.kind == kind) {
            Some(hp) => {
                hp.count = hp.count.saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, kind: PieceKind) -> bool {
        match self.pieces.iter_mut().find(|hp| hp.kind == kind && hp.count > 0) {
            Some(hp) => {
                hp.count -= 1;
                true
            }
            None => false,
        }
    }

    pub fn set_count(&mut self, kind: PieceKind, count: u8) -> bool {
        match self.pieces.iter_mut().find(|hp| hp.kind == kind) {
            Some(hp) => {
                hp.count = count;
                true
            }
            None => false,
        }
    }

    /// Every listed kind, including those with a zero count.
    pub fn iter(&self) -> impl Iterator<Item = HandPiece> + '_ {
        self.pieces.iter().copied()
    }

    pub fn available(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.pieces
            .iter()
            .filter(|hp| hp.count > 0)
            .map(|hp| hp.kind)
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.iter().all(|hp| hp.count == 0)
    }
}
