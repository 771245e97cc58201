use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Move, Side};

/// Everything needed to resume a game: the current position, the moves
/// that led to it, the variant name and each side's remaining seconds.
/// Choosing an on-disk format is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveGame {
    pub sfen: String,
    pub history: Vec<Move>,
    pub variant: String,
    pub time_left: BTreeMap<Side, u32>,
}

impl SaveGame {
    pub fn time_left(&self, side: Side) -> u32 {
        self.time_left.get(&side).copied().unwrap_or(0)
    }
}
