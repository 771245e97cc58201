use std::slice;

use thiserror::Error;

use crate::types::Move;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("no move in history")]
    Empty,
}

/// Played moves, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    moves: Vec<Move>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_moves(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn pop(&mut self) -> Result<Move, HistoryError> {
        self.moves.pop().ok_or(HistoryError::Empty)
    }

    pub fn last(&self) -> Result<&Move, HistoryError> {
        self.moves.last().ok_or(HistoryError::Empty)
    }

    pub(crate) fn last_mut(&mut self) -> Result<&mut Move, HistoryError> {
        self.moves.last_mut().ok_or(HistoryError::Empty)
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.moves.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Move> {
        self.moves.iter()
    }

    /// Moves `i..=j` in ascending order, or `j..=i` descending when `i > j`.
    /// Yields nothing if either index is past the end.
    pub fn range(&self, i: usize, j: usize) -> HistoryRange<'_> {
        let len = self.moves.len();
        let slice = if i < len && j < len {
            &self.moves[i.min(j)..=i.max(j)]
        } else {
            &[]
        };
        HistoryRange {
            iter: slice.iter(),
            reverse: i > j,
        }
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn to_vec(&self) -> Vec<Move> {
        self.moves.clone()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct HistoryRange<'a> {
    iter: slice::Iter<'a, Move>,
    reverse: bool,
}

impl<'a> Iterator for HistoryRange<'a> {
    type Item = &'a Move;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reverse {
            self.iter.next_back()
        } else {
            self.iter.next()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for HistoryRange<'_> {}
