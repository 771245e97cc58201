use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{
    MINI_HAND, MINI_POSITION, MINI_PROMOTION_ROWS, STANDARD_HAND, STANDARD_POSITION,
    STANDARD_PROMOTION_ROWS,
};
use crate::rules::{RuleSet, ShogiRules};
use crate::types::{PieceKind, Position, Side};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("unknown variant {0:?}")]
    Unknown(String),
}

static SHOGI_RULES: ShogiRules = ShogiRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Standard,
    Mini,
}

impl Variant {
    pub const ALL: [Self; 2] = [Self::Standard, Self::Mini];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Mini => "Mini",
        }
    }

    pub const fn width(self) -> u8 {
        match self {
            Self::Standard => 9,
            Self::Mini => 5,
        }
    }

    pub const fn height(self) -> u8 {
        self.width()
    }

    pub const fn start_sfen(self) -> &'static str {
        match self {
            Self::Standard => STANDARD_POSITION,
            Self::Mini => MINI_POSITION,
        }
    }

    /// Droppable kinds in the order hands are listed and serialized.
    pub const fn hand_kinds(self) -> &'static [PieceKind] {
        match self {
            Self::Standard => &STANDARD_HAND,
            Self::Mini => &MINI_HAND,
        }
    }

    /// Rows in which `side`'s pieces may promote.
    pub const fn promotion_rows(self, side: Side) -> &'static [u8] {
        match self {
            Self::Standard => STANDARD_PROMOTION_ROWS[side.index()],
            Self::Mini => MINI_PROMOTION_ROWS[side.index()],
        }
    }

    pub fn in_promotion_zone(self, pos: Position, side: Side) -> bool {
        self.promotion_rows(side).contains(&pos.row)
    }

    pub fn rule_set(self) -> &'static dyn RuleSet {
        match self {
            Self::Standard | Self::Mini => &SHOGI_RULES,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.name() == s)
            .ok_or_else(|| VariantError::Unknown(s.to_string()))
    }
}
