use std::fmt;
use std::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::board::{Board, BoardError};
use crate::types::{HandPiece, Piece, PieceKind, Position, Side};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SfenError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid piece {0:?}")]
    InvalidPiece(String),
    #[error("invalid hand {0:?}")]
    InvalidHand(String),
    #[error("board error: {0}")]
    Board(#[from] BoardError),
}

/// A fully decoded SFEN record. Hand entries keep the order they were
/// written in so that canonical strings encode back to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sfen {
    pub board: Board,
    pub turn: Side,
    pub hand: ArrayVec<HandPiece, 18>,
    pub move_count: u32,
}

impl Sfen {
    pub fn hand_count(&self, kind: PieceKind, side: Side) -> u8 {
        self.hand
            .iter()
            .filter(|hp| hp.kind == kind && hp.side == side)
            .map(|hp| hp.count)
            .sum()
    }
}

impl FromStr for Sfen {
    type Err = SfenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_sfen(s)
    }
}

impl fmt::Display for Sfen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_sfen(self))
    }
}

pub fn parse_sfen(sfen: &str) -> Result<Sfen, SfenError> {
    let parts: Vec<&str> = sfen.trim().split(' ').collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(SfenError::Validation(format!(
            "expected 3 or 4 fields, received {}",
            parts.len()
        )));
    }

    let board = parse_layout(parts[0])?;

    let mut turn_chars = parts[1].chars();
    let turn = match (turn_chars.next().and_then(Side::from_code), turn_chars.next()) {
        (Some(side), None) => side,
        _ => {
            return Err(SfenError::Validation(format!(
                "2nd field (side to move) is invalid [expected 'b' or 'w', received {}]",
                parts[1]
            )))
        }
    };

    let hand = parse_hand(parts[2])?;

    let move_count = match parts.get(3) {
        None => 1,
        Some(field) => match canonical_number(field).then(|| field.parse::<u32>()) {
            Some(Ok(n)) if n > 0 => n,
            _ => {
                return Err(SfenError::Validation(format!(
                    "4th field (move count) is invalid [expected a positive integer, received {field}]"
                )))
            }
        },
    };

    Ok(Sfen {
        board,
        turn,
        hand,
        move_count,
    })
}

pub fn encode_sfen(sfen: &Sfen) -> String {
    format!(
        "{} {} {} {}",
        encode_layout(&sfen.board),
        sfen.turn.to_code(),
        encode_hand(&sfen.hand),
        sfen.move_count
    )
}

/// Parses the board field alone. Dimensions come from the layout itself:
/// one row per `/`-separated segment, every row the same width.
pub fn parse_layout(layout: &str) -> Result<Board, SfenError> {
    let mut rows: Vec<Vec<Option<Piece>>> = Vec::new();
    for (ri, row) in layout.split('/').enumerate() {
        let mut cells = Vec::new();
        let mut chars = row.chars().peekable();
        while let Some(ch) = chars.next() {
            if let Some(digit) = ch.to_digit(10) {
                if digit == 0 {
                    return Err(SfenError::Validation(format!(
                        "1st field (board) is invalid [leading zero] in row {}",
                        ri + 1
                    )));
                }
                let mut run = digit;
                while let Some(next) = chars.peek().and_then(|c| c.to_digit(10)) {
                    run = run * 10 + next;
                    chars.next();
                }
                if run == 0 || run > u32::from(crate::constants::MAX_DIMENSION) {
                    return Err(SfenError::Validation(format!(
                        "1st field (board) is invalid [empty run of {run}] in row {}",
                        ri + 1
                    )));
                }
                cells.extend(std::iter::repeat_n(None, run as usize));
            } else if ch == '+' {
                let code = chars
                    .next()
                    .map(|next| format!("+{next}"))
                    .unwrap_or_else(|| "+".to_string());
                let piece = Piece::from_sfen(&code).ok_or(SfenError::InvalidPiece(code))?;
                cells.push(Some(piece));
            } else {
                let code = ch.to_string();
                let piece = Piece::from_sfen(&code).ok_or(SfenError::InvalidPiece(code))?;
                cells.push(Some(piece));
            }
        }
        if cells.is_empty() {
            return Err(SfenError::Validation(format!(
                "1st field (board) is invalid [row {} is empty]",
                ri + 1
            )));
        }
        if let Some(first) = rows.first() {
            if first.len() != cells.len() {
                return Err(SfenError::Validation(format!(
                    "1st field (board) is invalid [expected {} squares, received {}] in row {}",
                    first.len(),
                    cells.len(),
                    ri + 1
                )));
            }
        }
        rows.push(cells);
    }

    let height = u8::try_from(rows.len()).unwrap_or(u8::MAX);
    let width = u8::try_from(rows[0].len()).unwrap_or(u8::MAX);
    let mut board = Board::new(width, height)?;
    for (row, cells) in rows.into_iter().enumerate() {
        for (col, cell) in cells.into_iter().enumerate() {
            if let Some(piece) = cell {
                board.put(Position::new(row as u8, col as u8), piece)?;
            }
        }
    }
    Ok(board)
}

pub fn encode_layout(board: &Board) -> String {
    let mut placement = String::new();
    for row in 0..board.height() {
        if row > 0 {
            placement.push('/');
        }
        let mut empties = 0u8;
        for col in 0..board.width() {
            match board.get(Position::new(row, col)) {
                Some(piece) => {
                    if empties > 0 {
                        placement.push_str(&empties.to_string());
                        empties = 0;
                    }
                    placement.push_str(&piece.to_string());
                }
                None => empties += 1,
            }
        }
        if empties > 0 {
            placement.push_str(&empties.to_string());
        }
    }
    placement
}

/// Plain decimal digits without a sign or leading zero.
fn canonical_number(field: &str) -> bool {
    !field.is_empty() && !field.starts_with('0') && field.bytes().all(|b| b.is_ascii_digit())
}

fn parse_hand(segment: &str) -> Result<ArrayVec<HandPiece, 18>, SfenError> {
    let mut hand = ArrayVec::new();
    if segment == "-" {
        return Ok(hand);
    }
    if segment.is_empty() {
        return Err(SfenError::InvalidHand(segment.to_string()));
    }

    let invalid = || SfenError::InvalidHand(segment.to_string());
    let mut chars = segment.chars().peekable();
    while chars.peek().is_some() {
        if chars.peek() == Some(&'0') {
            return Err(invalid());
        }
        let mut count: Option<u32> = None;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            count = Some(count.unwrap_or(0) * 10 + digit);
            if count > Some(u32::from(u8::MAX)) {
                return Err(invalid());
            }
            chars.next();
        }
        // An explicit count of one would not survive re-encoding.
        if matches!(count, Some(n) if n < 2) {
            return Err(invalid());
        }
        let code = chars.next().ok_or_else(invalid)?;
        let kind = PieceKind::from_sfen_code(code).ok_or_else(invalid)?;
        if kind == PieceKind::King {
            return Err(invalid());
        }
        let side = if code.is_ascii_uppercase() {
            Side::Sente
        } else {
            Side::Gote
        };
        if hand
            .iter()
            .any(|hp: &HandPiece| hp.kind == kind && hp.side == side)
        {
            return Err(invalid());
        }
        let count = count.unwrap_or(1) as u8;
        hand.try_push(HandPiece::new(kind, side, count))
            .map_err(|_| invalid())?;
    }
    Ok(hand)
}

fn encode_hand(hand: &[HandPiece]) -> String {
    let mut out = String::new();
    for hp in hand.iter().filter(|hp| hp.count > 0) {
        if hp.count > 1 {
            out.push_str(&hp.count.to_string());
        }
        out.push(hp.piece().sfen_code());
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}
