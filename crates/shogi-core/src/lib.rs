pub mod board;
pub mod clock;
pub mod constants;
pub mod game;
pub mod hand;
pub mod history;
pub mod movegen;
pub mod notation;
pub mod rules;
pub mod save;
pub mod sfen;
pub mod types;
pub mod variant;

pub use board::{Board, BoardError};
pub use clock::{ClockError, ClockEvent, Clocks, TimeControl};
pub use constants::{MINI_POSITION, STANDARD_POSITION};
pub use game::{Game, GameError, GameEvent, Outcome};
pub use hand::Hand;
pub use history::{History, HistoryError, HistoryRange};
pub use movegen::{attacks, destinations, is_square_attacked, MoveMode};
pub use notation::{move_to_notation, parse_notation, NotationError};
pub use rules::{RuleSet, ShogiRules};
pub use save::SaveGame;
pub use sfen::{encode_sfen, parse_sfen, Sfen, SfenError};
pub use types::{
    HandPiece, Move, MoveList, Piece, PieceCodeError, PieceKind, Position, PositionList, Side,
};
pub use variant::{Variant, VariantError};
