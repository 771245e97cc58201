use crate::constants::MAX_DIMENSION;
use crate::sfen::{encode_layout, parse_layout, SfenError};
use crate::types::{Move, Piece, PieceKind, Position, Side};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("board dimensions {0}x{1} are out of range")]
    InvalidDimensions(u8, u8),
    #[error("position ({}, {}) is off the board", .0.row, .0.col)]
    OutOfBounds(Position),
    #[error("no piece at ({}, {})", .0.row, .0.col)]
    Vacant(Position),
    #[error("source and destination are the same square")]
    SameSquare,
}

/// Fixed-size grid holding at most one piece per cell, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: u8,
    height: u8,
    cells: Vec<Option<Piece>>,
}

impl Board {
    pub fn new(width: u8, height: u8) -> Result<Self, BoardError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(BoardError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; usize::from(width) * usize::from(height)],
        })
    }

    pub fn from_layout(layout: &str) -> Result<Self, SfenError> {
        parse_layout(layout)
    }

    pub fn layout(&self) -> String {
        encode_layout(self)
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    pub const fn height(&self) -> u8 {
        self.height
    }

    pub const fn contains(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |col| Position::new(row, col)))
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.index(pos).ok().and_then(|idx| self.cells[idx])
    }

    /// True when `pos` is on the board and unoccupied.
    pub fn is_vacant(&self, pos: Position) -> bool {
        self.contains(pos) && self.get(pos).is_none()
    }

    /// Overwrites a cell and returns its previous occupant.
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) -> Result<Option<Piece>, BoardError> {
        let idx = self.index(pos)?;
        Ok(std::mem::replace(&mut self.cells[idx], piece))
    }

    pub fn put(&mut self, pos: Position, piece: Piece) -> Result<Option<Piece>, BoardError> {
        self.set(pos, Some(piece))
    }

    pub fn clear(&mut self, pos: Position) -> Result<Option<Piece>, BoardError> {
        self.set(pos, None)
    }

    /// Moves whatever stands on `from` to `to`. The previous occupant of `to`
    /// is removed from the grid and reported as the captured piece.
    pub fn relocate(&mut self, from: Position, to: Position) -> Result<Move, BoardError> {
        if from == to {
            return Err(BoardError::SameSquare);
        }
        let from_idx = self.index(from)?;
        let to_idx = self.index(to)?;
        let piece = self.cells[from_idx].take().ok_or(BoardError::Vacant(from))?;
        let captured = self.cells[to_idx].replace(piece);
        Ok(Move::new(from, to, piece, captured))
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.positions()
            .zip(self.cells.iter())
            .filter_map(|(pos, cell)| cell.map(|piece| (pos, piece)))
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.side() == side)
    }

    pub fn find(&self, kind: PieceKind, side: Side) -> Option<Position> {
        self.pieces_of(side)
            .find(|(_, piece)| piece.kind() == kind)
            .map(|(pos, _)| pos)
    }

    pub fn king(&self, side: Side) -> Option<Position> {
        self.find(PieceKind::King, side)
    }

    /// Whether exactly `piece` (kind, side and promotion state) stands
    /// anywhere in column `col`.
    pub fn has_in_column(&self, piece: Piece, col: u8) -> bool {
        col < self.width
            && (0..self.height).any(|row| self.get(Position::new(row, col)) == Some(piece))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    fn index(&self, pos: Position) -> Result<usize, BoardError> {
        if !self.contains(pos) {
            return Err(BoardError::OutOfBounds(pos));
        }
        Ok(usize::from(pos.row) * usize::from(self.width) + usize::from(pos.col))
    }
}
