use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Sente = 0,
    Gote = 1,
}

impl Side {
    pub const ALL: [Self; 2] = [Self::Sente, Self::Gote];

    pub const fn opposite(self) -> Self {
        match self {
            Self::Sente => Self::Gote,
            Self::Gote => Self::Sente,
        }
    }

    pub const fn to_code(self) -> char {
        match self {
            Self::Sente => 'b',
            Self::Gote => 'w',
        }
    }

    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'b' => Some(Self::Sente),
            'w' => Some(Self::Gote),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row delta of one step "forward" for this side. Sente starts at the
    /// bottom of the board and advances toward row 0.
    pub const fn forward(self) -> i8 {
        match self {
            Self::Sente => -1,
            Self::Gote => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sente => f.write_str("Sente"),
            Self::Gote => f.write_str("Gote"),
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    King = 0,
    Rook = 1,
    Bishop = 2,
    Gold = 3,
    Silver = 4,
    Knight = 5,
    Lance = 6,
    Pawn = 7,
    Copper = 8,
}

impl PieceKind {
    pub const ALL: [Self; 9] = [
        Self::King,
        Self::Rook,
        Self::Bishop,
        Self::Gold,
        Self::Silver,
        Self::Knight,
        Self::Lance,
        Self::Pawn,
        Self::Copper,
    ];

    /// Uppercase SFEN letter. Gote pieces use the lowercase form.
    pub const fn sfen_code(self) -> char {
        match self {
            Self::King => 'K',
            Self::Rook => 'R',
            Self::Bishop => 'B',
            Self::Gold => 'G',
            Self::Silver => 'S',
            Self::Knight => 'N',
            Self::Lance => 'L',
            Self::Pawn => 'P',
            Self::Copper => 'C',
        }
    }

    pub const fn from_sfen_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'K' => Some(Self::King),
            'R' => Some(Self::Rook),
            'B' => Some(Self::Bishop),
            'G' => Some(Self::Gold),
            'S' => Some(Self::Silver),
            'N' => Some(Self::Knight),
            'L' => Some(Self::Lance),
            'P' => Some(Self::Pawn),
            'C' => Some(Self::Copper),
            _ => None,
        }
    }

    pub const fn is_promotable(self) -> bool {
        !matches!(self, Self::King | Self::Gold)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::King => "King",
            Self::Rook => "Rook",
            Self::Bishop => "Bishop",
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Knight => "Knight",
            Self::Lance => "Lance",
            Self::Pawn => "Pawn",
            Self::Copper => "Copper",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid piece code {0:?}")]
pub struct PieceCodeError(pub String);

/// A piece as it stands on the board. Kind and side never change; the
/// promoted flag can only be raised, and only on promotable kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Piece {
    kind: PieceKind,
    side: Side,
    promoted: bool,
}

impl Piece {
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Self {
            kind,
            side,
            promoted: false,
        }
    }

    pub const fn kind(self) -> PieceKind {
        self.kind
    }

    pub const fn side(self) -> Side {
        self.side
    }

    pub const fn is_promoted(self) -> bool {
        self.promoted
    }

    pub const fn can_promote(self) -> bool {
        self.kind.is_promotable() && !self.promoted
    }

    /// Returns the promoted form. Unpromotable kinds and already promoted
    /// pieces come back unchanged.
    pub const fn promoted(self) -> Self {
        Self {
            promoted: self.kind.is_promotable(),
            ..self
        }
    }

    pub const fn unpromoted(self) -> Self {
        Self {
            promoted: false,
            ..self
        }
    }

    pub const fn sfen_code(self) -> char {
        match self.side {
            Side::Sente => self.kind.sfen_code(),
            Side::Gote => self.kind.sfen_code().to_ascii_lowercase(),
        }
    }

    /// Parses an abbreviation such as `"P"`, `"k"` or `"+r"`.
    pub fn from_sfen(code: &str) -> Option<Self> {
        let (promoted, rest) = match code.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, code),
        };
        let mut chars = rest.chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let kind = PieceKind::from_sfen_code(ch)?;
        let side = if ch.is_ascii_uppercase() {
            Side::Sente
        } else {
            Side::Gote
        };
        let piece = Self::new(kind, side);
        if promoted {
            piece.can_promote().then(|| piece.promoted())
        } else {
            Some(piece)
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.promoted {
            f.write_str("+")?;
        }
        write!(f, "{}", self.sfen_code())
    }
}

impl From<Piece> for String {
    fn from(piece: Piece) -> Self {
        piece.to_string()
    }
}

impl TryFrom<String> for Piece {
    type Error = PieceCodeError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::from_sfen(&code).ok_or(PieceCodeError(code))
    }
}

/// Zero-based board coordinate. Row 0 is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Shifts by a signed delta. Only rejects negative coordinates; board
    /// bounds are the board's business.
    pub fn offset(self, row: i8, col: i8) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(row)?,
            col: self.col.checked_add_signed(col)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// `None` for a drop from hand.
    pub from: Option<Position>,
    pub to: Position,
    /// The moving piece as it stood before the move.
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promoted: bool,
}

impl Move {
    pub const fn new(from: Position, to: Position, piece: Piece, captured: Option<Piece>) -> Self {
        Self {
            from: Some(from),
            to,
            piece,
            captured,
            promoted: false,
        }
    }

    pub const fn drop(to: Position, piece: Piece) -> Self {
        Self {
            from: None,
            to,
            piece,
            captured: None,
            promoted: false,
        }
    }

    pub const fn is_drop(&self) -> bool {
        self.from.is_none()
    }

    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub const fn side(&self) -> Side {
        self.piece.side
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::notation::move_to_notation(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandPiece {
    pub kind: PieceKind,
    pub side: Side,
    pub count: u8,
}

impl HandPiece {
    pub const fn new(kind: PieceKind, side: Side, count: u8) -> Self {
        Self { kind, side, count }
    }

    pub const fn piece(self) -> Piece {
        Piece::new(self.kind, self.side)
    }
}

/// Unbounded: drops alone can exceed any fixed capacity on the largest
/// boards.
pub type MoveList = Vec<Move>;
/// Large enough for every square of a `MAX_DIMENSION` board.
pub type PositionList = ArrayVec<Position, 256>;
