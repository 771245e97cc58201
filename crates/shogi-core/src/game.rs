use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arrayvec::ArrayVec;
use crossbeam::channel::{self, Receiver, Sender};
use thiserror::Error;

use crate::board::{Board, BoardError};
use crate::clock::{ClockError, ClockEvent, Clocks, TimeControl};
use crate::hand::Hand;
use crate::history::{History, HistoryError};
use crate::rules::RuleSet;
use crate::save::SaveGame;
use crate::sfen::{parse_sfen, Sfen, SfenError};
use crate::types::{Move, MoveList, Piece, PieceKind, Position, PositionList, Side};
use crate::variant::{Variant, VariantError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid sfen: {0}")]
    Sfen(#[from] SfenError),
    #[error(transparent)]
    Variant(#[from] VariantError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("board error: {0}")]
    Board(#[from] BoardError),
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error("{variant} is played on {expected}x{expected}, position is {width}x{height}")]
    DimensionMismatch {
        variant: Variant,
        expected: u8,
        width: u8,
        height: u8,
    },
    #[error("{variant} hands cannot hold {kind:?}")]
    UnexpectedHandPiece { variant: Variant, kind: PieceKind },
    #[error("{variant} is not played with {kind:?}")]
    UnexpectedBoardPiece { variant: Variant, kind: PieceKind },
}

/// Notifications sent to subscribers. Receivers should re-read whatever
/// game state they display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Changed,
    Check { side: Side },
    Checkmate { loser: Side },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Side },
    Timeout { winner: Side },
    Stopped,
}

#[derive(Debug)]
pub struct Game {
    variant: Variant,
    rules: &'static dyn RuleSet,
    board: Board,
    hands: [Hand; 2],
    turn: Side,
    move_count: u32,
    history: History,
    changed: bool,
    running: Arc<AtomicBool>,
    clocks: Option<Clocks>,
    subscribers: Vec<Sender<GameEvent>>,
}

impl Game {
    /// An untimed game from the variant's start position.
    pub fn new(variant: Variant) -> Self {
        Self::from_sfen(variant, variant.start_sfen())
            .expect("variant start position must be valid")
    }

    pub fn with_time_control(variant: Variant, control: TimeControl) -> Result<Self, GameError> {
        let sfen = parse_sfen(variant.start_sfen())?;
        Self::from_parts(
            variant,
            sfen,
            History::new(),
            control,
            [control.seconds; 2],
        )
    }

    pub fn from_sfen(variant: Variant, sfen: &str) -> Result<Self, GameError> {
        let sfen = parse_sfen(sfen)?;
        Self::from_parts(variant, sfen, History::new(), TimeControl::new(0), [0; 2])
    }

    /// Resumes a saved game. Clocks restart only when both sides have
    /// time left.
    pub fn from_save(save: &SaveGame, tick: Duration) -> Result<Self, GameError> {
        let variant: Variant = save.variant.parse()?;
        let sfen = parse_sfen(&save.sfen)?;
        let times = Side::ALL.map(|side| save.time_left(side));
        let control = TimeControl::new(times[0].max(times[1])).with_tick(tick);
        Self::from_parts(
            variant,
            sfen,
            History::from_moves(save.history.clone()),
            control,
            times,
        )
    }

    fn from_parts(
        variant: Variant,
        sfen: Sfen,
        history: History,
        control: TimeControl,
        times: [u32; 2],
    ) -> Result<Self, GameError> {
        let hands = hands_from_sfen(variant, &sfen)?;
        let running = Arc::new(AtomicBool::new(true));
        let clocks = if control.is_timed() && times.iter().all(|t| *t > 0) {
            Some(Clocks::start(control, times, sfen.turn, Arc::clone(&running))?)
        } else {
            None
        };
        Ok(Self {
            variant,
            rules: variant.rule_set(),
            board: sfen.board,
            hands,
            turn: sfen.turn,
            move_count: sfen.move_count,
            history,
            changed: false,
            running,
            clocks,
            subscribers: Vec::new(),
        })
    }

    /// Replaces the position with `sfen` and clears the history.
    pub fn load(&mut self, sfen: &str) -> Result<(), GameError> {
        let sfen = parse_sfen(sfen)?;
        self.hands = hands_from_sfen(self.variant, &sfen)?;
        self.board = sfen.board;
        self.turn = sfen.turn;
        self.move_count = sfen.move_count;
        self.history = History::new();
        if let Some(clocks) = &self.clocks {
            clocks.switch_to(self.turn);
        }
        self.mark_changed();
        Ok(())
    }

    pub const fn variant(&self) -> Variant {
        self.variant
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hand(&self, side: Side) -> &Hand {
        &self.hands[side.index()]
    }

    pub const fn turn(&self) -> Side {
        self.turn
    }

    pub const fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Flips on every applied move, drop, undo or promotion.
    pub const fn changed(&self) -> bool {
        self.changed
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Seconds left on `side`'s clock; zero in an untimed game.
    pub fn time(&self, side: Side) -> u32 {
        self.clocks.as_ref().map_or(0, |clocks| clocks.remaining(side))
    }

    pub fn is_timed(&self) -> bool {
        self.clocks.is_some()
    }

    pub fn sfen(&self) -> Sfen {
        let mut hand = ArrayVec::new();
        for side in Side::ALL {
            for hp in self.hands[side.index()].iter().filter(|hp| hp.count > 0) {
                hand.push(hp);
            }
        }
        Sfen {
            board: self.board.clone(),
            turn: self.turn,
            hand,
            move_count: self.move_count,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        let (tx, rx) = channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscribe_clock(&self) -> Option<Receiver<ClockEvent>> {
        self.clocks.as_ref().map(Clocks::subscribe)
    }

    pub fn is_valid_move(&self, from: Position, to: Position) -> bool {
        self.rules.valid_move(&self.board, from, to, self.turn)
    }

    pub fn valid_move_positions(&self, from: Position) -> PositionList {
        self.rules.legal_destinations(&self.board, from, self.turn)
    }

    /// Whether the side to move may drop `piece` on `pos`. The piece must
    /// belong to the side to move and be in its hand.
    pub fn is_valid_hand_move(&self, pos: Position, piece: Piece) -> bool {
        self.can_drop(piece) && self.rules.legal_drop(&self.board, pos, piece.kind(), piece.side())
    }

    pub fn valid_hand_move_positions(&self, piece: Piece) -> PositionList {
        if !self.can_drop(piece) {
            return PositionList::new();
        }
        self.rules
            .legal_drop_positions(&self.board, piece.kind(), piece.side())
    }

    fn can_drop(&self, piece: Piece) -> bool {
        piece.side() == self.turn
            && !piece.is_promoted()
            && self.hands[piece.side().index()].holds(piece.kind())
    }

    /// A move by a promotable piece that starts or ends inside its side's
    /// promotion zone.
    pub fn is_promotable_move(&self, from: Position, to: Position) -> bool {
        self.board.get(from).is_some_and(|piece| {
            piece.can_promote()
                && (self.variant.in_promotion_zone(from, piece.side())
                    || self.variant.in_promotion_zone(to, piece.side()))
        })
    }

    pub fn gives_check(&self, from: Position, to: Position) -> bool {
        self.rules.gives_check(&self.board, from, to, self.turn)
    }

    pub fn is_in_check(&self, side: Side) -> bool {
        self.board
            .king(side)
            .is_some_and(|king| self.rules.is_in_check(&self.board, king, side.opposite()))
    }

    pub fn is_checkmate(&self, side: Side) -> bool {
        self.board.king(side).is_some_and(|king| {
            self.rules
                .is_checkmate(&self.board, king, side, &self.hands[side.index()])
        })
    }

    pub fn legal_moves(&self) -> MoveList {
        if !self.is_running() {
            return MoveList::new();
        }
        self.rules
            .legal_moves(&self.board, self.turn, &self.hands[self.turn.index()])
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if let Some(loser) = self.clocks.as_ref().and_then(Clocks::expired) {
            return Some(Outcome::Timeout {
                winner: loser.opposite(),
            });
        }
        if self.is_checkmate(self.turn) {
            return Some(Outcome::Checkmate {
                winner: self.turn.opposite(),
            });
        }
        (!self.is_running()).then_some(Outcome::Stopped)
    }

    /// Moves the piece on `from` to `to` for the side to move. Returns the
    /// applied move, or `None` if it is not legal.
    pub fn move_piece(&mut self, from: Position, to: Position) -> Option<Move> {
        if !self.is_running() || !self.is_valid_move(from, to) {
            return None;
        }
        let mv = self.board.relocate(from, to).ok()?;
        if let Some(captured) = mv.captured {
            if !self.hands[self.turn.index()].add(captured.kind()) {
                log::warn!("{} hand has no slot for captured {captured}", self.turn);
            }
        }
        Some(self.finish_ply(mv))
    }

    /// Drops `piece` from the mover's hand onto `pos`.
    pub fn play_hand(&mut self, pos: Position, piece: Piece) -> Option<Move> {
        if !self.is_running() || !self.is_valid_hand_move(pos, piece) {
            return None;
        }
        self.board.put(pos, piece).ok()?;
        self.hands[piece.side().index()].remove(piece.kind());
        Some(self.finish_ply(Move::drop(pos, piece)))
    }

    /// Applies a move value produced by `legal_moves` or notation parsing,
    /// promoting afterwards when its `promoted` flag is set.
    pub fn play(&mut self, mv: &Move) -> Option<Move> {
        let applied = match mv.from {
            Some(from) => self.move_piece(from, mv.to)?,
            None => self.play_hand(mv.to, mv.piece)?,
        };
        if mv.promoted && self.promote_piece_at(mv.to) {
            return self.history.last().ok().copied();
        }
        Some(applied)
    }

    /// Promotes the piece on `pos` if it is promotable, not yet promoted and
    /// standing in its side's promotion zone. A piece dropped on the last
    /// ply cannot promote.
    ///
    /// Only a promotion of the last move's piece is recorded, as that move's
    /// `promoted` flag. Promoting any other piece changes the board but adds
    /// nothing to the history, so undo and notation replay do not see it.
    pub fn promote_piece_at(&mut self, pos: Position) -> bool {
        let Some(piece) = self.board.get(pos) else {
            return false;
        };
        if !piece.can_promote() || !self.variant.in_promotion_zone(pos, piece.side()) {
            return false;
        }
        let last_ply = self.history.last_mut().ok().filter(|mv| mv.to == pos);
        if let Some(last) = last_ply {
            if last.is_drop() {
                return false;
            }
            last.promoted = true;
        }
        if self.board.put(pos, piece.promoted()).is_err() {
            return false;
        }
        log::debug!("promoted {piece} at {pos:?}");
        self.mark_changed();
        true
    }

    /// Takes back the last ply. Board occupancy, hands, turn and move count
    /// return to what they were before it.
    pub fn undo(&mut self) -> Result<Move, GameError> {
        let mv = self.history.pop()?;
        let mover = mv.side();
        match mv.from {
            Some(from) => {
                self.board.set(from, Some(mv.piece))?;
                self.board.set(mv.to, mv.captured)?;
                if let Some(captured) = mv.captured {
                    self.hands[mover.index()].remove(captured.kind());
                }
            }
            None => {
                self.board.clear(mv.to)?;
                self.hands[mover.index()].add(mv.piece.kind());
            }
        }
        self.move_count = self.move_count.saturating_sub(1).max(1);
        self.turn = mover;
        if let Some(clocks) = &self.clocks {
            clocks.switch_to(self.turn);
        }
        log::debug!("undid {mv}");
        self.mark_changed();
        Ok(mv)
    }

    /// Ends the game: clears the running flag and joins the clock threads.
    /// Safe to call more than once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(clocks) = self.clocks.as_mut() {
            clocks.stop();
        }
    }

    pub fn to_save(&self) -> SaveGame {
        SaveGame {
            sfen: self.sfen().to_string(),
            history: self.history.to_vec(),
            variant: self.variant.name().to_string(),
            time_left: Side::ALL
                .into_iter()
                .map(|side| (side, self.time(side)))
                .collect(),
        }
    }

    fn finish_ply(&mut self, mv: Move) -> Move {
        log::debug!("{} played {mv}", self.turn);
        self.history.push(mv);
        self.move_count += 1;
        self.turn = self.turn.opposite();
        if let Some(clocks) = &self.clocks {
            clocks.switch_to(self.turn);
        }
        self.mark_changed();
        self.announce_check();
        mv
    }

    fn announce_check(&mut self) {
        let side = self.turn;
        if !self.is_in_check(side) {
            return;
        }
        if self.is_checkmate(side) {
            log::info!("checkmate, {} wins", side.opposite());
            if let Some(clocks) = &self.clocks {
                clocks.pause(side);
            }
            self.emit(GameEvent::Checkmate { loser: side });
        } else {
            log::debug!("{side} is in check");
            self.emit(GameEvent::Check { side });
        }
    }

    fn mark_changed(&mut self) {
        self.changed = !self.changed;
        self.emit(GameEvent::Changed);
    }

    fn emit(&mut self, event: GameEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

fn hands_from_sfen(variant: Variant, sfen: &Sfen) -> Result<[Hand; 2], GameError> {
    let (width, height) = (sfen.board.width(), sfen.board.height());
    if width != variant.width() || height != variant.height() {
        return Err(GameError::DimensionMismatch {
            variant,
            expected: variant.width(),
            width,
            height,
        });
    }

    // Anything on the board may be captured, so it must fit in a hand.
    let foreign = sfen.board.pieces().map(|(_, piece)| piece.kind()).find(|kind| {
        *kind != PieceKind::King && !variant.hand_kinds().contains(kind)
    });
    if let Some(kind) = foreign {
        return Err(GameError::UnexpectedBoardPiece { variant, kind });
    }

    let mut hands = Side::ALL.map(|side| Hand::new(side, variant.hand_kinds()));
    for hp in &sfen.hand {
        if !hands[hp.side.index()].set_count(hp.kind, hp.count) {
            return Err(GameError::UnexpectedHandPiece {
                variant,
                kind: hp.kind,
            });
        }
    }
    Ok(hands)
}
