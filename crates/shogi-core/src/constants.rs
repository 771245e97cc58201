use crate::types::PieceKind;

/// Largest width or height a board may have.
pub const MAX_DIMENSION: u8 = 16;

pub const STANDARD_POSITION: &str =
    "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";
pub const MINI_POSITION: &str = "rbsgk/4p/5/P4/KGSBR b - 1";

pub const STANDARD_HAND: [PieceKind; 7] = [
    PieceKind::Pawn,
    PieceKind::Lance,
    PieceKind::Knight,
    PieceKind::Silver,
    PieceKind::Gold,
    PieceKind::Bishop,
    PieceKind::Rook,
];

pub const MINI_HAND: [PieceKind; 5] = [
    PieceKind::Pawn,
    PieceKind::Silver,
    PieceKind::Gold,
    PieceKind::Bishop,
    PieceKind::Rook,
];

// Rows in which each side's own pieces may promote, indexed by `Side::index`.
pub const STANDARD_PROMOTION_ROWS: [&[u8]; 2] = [&[0, 1, 2], &[6, 7, 8]];
pub const MINI_PROMOTION_ROWS: [&[u8]; 2] = [&[0], &[4]];

pub const NOTATION_DROP: char = '*';
pub const NOTATION_CAPTURE: char = 'x';
pub const NOTATION_MOVE: char = '-';
pub const NOTATION_PROMOTE: char = '+';
