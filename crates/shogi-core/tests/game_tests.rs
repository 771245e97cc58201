use std::time::Duration;

use shogi_core::history::HistoryError;
use shogi_core::types::{Piece, PieceKind, Position, Side};
use shogi_core::{
    parse_notation, Game, GameError, GameEvent, Outcome, SaveGame, Variant, VariantError,
    MINI_POSITION, STANDARD_POSITION,
};

fn sq(row: u8, col: u8) -> Position {
    Position::new(row, col)
}

#[test]
fn new_game_starts_with_sente() {
    let game = Game::new(Variant::Standard);
    assert_eq!(game.turn(), Side::Sente);
    assert_eq!(game.move_count(), 1);
    assert_eq!(game.sfen().to_string(), STANDARD_POSITION);
    assert!(game.history().is_empty());
    assert!(game.is_running());
    assert!(!game.is_timed());
    assert_eq!(game.time(Side::Sente), 0);
    assert_eq!(game.legal_moves().len(), 30);

    let mini = Game::new(Variant::Mini);
    assert_eq!(mini.sfen().to_string(), MINI_POSITION);
}

#[test]
fn move_flips_turn_and_counts() {
    let mut game = Game::new(Variant::Standard);
    let mv = game.move_piece(sq(6, 4), sq(5, 4)).expect("pawn push");
    assert_eq!(mv.from, Some(sq(6, 4)));
    assert_eq!(mv.to, sq(5, 4));
    assert_eq!(mv.piece, Piece::new(PieceKind::Pawn, Side::Sente));
    assert_eq!(game.turn(), Side::Gote);
    assert_eq!(game.move_count(), 2);
    assert_eq!(game.history().len(), 1);
    assert_eq!(
        game.sfen().to_string(),
        "lnsgkgsnl/1r5b1/ppppppppp/9/9/4P4/PPPP1PPPP/1B5R1/LNSGKGSNL w - 2"
    );
}

#[test]
fn illegal_moves_change_nothing() {
    let mut game = Game::new(Variant::Standard);
    let before = game.sfen();

    assert_eq!(game.move_piece(sq(6, 4), sq(4, 4)), None);
    // Gote's pawn on Sente's turn.
    assert_eq!(game.move_piece(sq(2, 4), sq(3, 4)), None);
    assert_eq!(game.move_piece(sq(4, 4), sq(3, 4)), None);
    assert_eq!(game.move_piece(sq(6, 4), sq(9, 4)), None);
    assert!(!game.is_valid_move(sq(8, 1), sq(6, 2)));

    assert_eq!(game.sfen(), before);
    assert!(game.history().is_empty());
    assert!(!game.changed());
}

#[test]
fn capture_goes_to_hand_unpromoted() {
    let mut game = Game::from_sfen(Variant::Standard, "4k4/9/9/9/4+p4/4R4/9/9/4K4 b - 1")
        .expect("valid position");
    let events = game.subscribe();

    let mv = game.move_piece(sq(5, 4), sq(4, 4)).expect("rook takes tokin");
    assert_eq!(
        mv.captured,
        Some(Piece::new(PieceKind::Pawn, Side::Gote).promoted())
    );
    assert_eq!(game.hand(Side::Sente).count(PieceKind::Pawn), 1);
    assert_eq!(game.hand(Side::Gote).count(PieceKind::Pawn), 0);
    assert_eq!(game.sfen().to_string(), "4k4/9/9/9/4R4/9/9/9/4K4 w P 2");

    assert_eq!(events.try_recv(), Ok(GameEvent::Changed));
    assert_eq!(events.try_recv(), Ok(GameEvent::Check { side: Side::Gote }));
    assert!(events.try_recv().is_err());
    assert!(game.is_in_check(Side::Gote));
}

#[test]
fn undo_restores_capture() {
    let mut game = Game::from_sfen(Variant::Standard, "4k4/9/9/9/4+p4/4R4/9/9/4K4 b - 1")
        .expect("valid position");
    let before = game.sfen();
    let mv = game.move_piece(sq(5, 4), sq(4, 4)).unwrap();

    assert_eq!(game.undo(), Ok(mv));
    assert_eq!(game.sfen(), before);
    assert_eq!(game.turn(), Side::Sente);
    assert_eq!(game.move_count(), 1);
    assert!(game.hand(Side::Sente).is_empty());
    assert!(!game.changed());
}

#[test]
fn undo_on_empty_history_is_an_error() {
    let mut game = Game::new(Variant::Mini);
    assert_eq!(
        game.undo(),
        Err(GameError::History(HistoryError::Empty))
    );
}

#[test]
fn drops_from_hand() {
    let mut game =
        Game::from_sfen(Variant::Mini, "rbsgk/4p/5/P4/KGSBR b G 1").expect("valid position");
    let gold = Piece::new(PieceKind::Gold, Side::Sente);

    assert_eq!(game.valid_hand_move_positions(gold).len(), 13);
    assert!(game.is_valid_hand_move(sq(2, 2), gold));
    assert!(!game.is_valid_hand_move(sq(4, 4), gold));
    assert!(game
        .valid_hand_move_positions(Piece::new(PieceKind::Silver, Side::Sente))
        .is_empty());

    assert_eq!(
        game.play_hand(sq(2, 2), Piece::new(PieceKind::Gold, Side::Gote)),
        None
    );
    assert_eq!(game.play_hand(sq(2, 2), gold.promoted()), None);
    assert_eq!(
        game.play_hand(sq(2, 2), Piece::new(PieceKind::Silver, Side::Sente)),
        None
    );

    let before = game.sfen();
    let mv = game.play_hand(sq(2, 2), gold).expect("gold drop");
    assert!(mv.is_drop());
    assert_eq!(mv.piece, gold);
    assert_eq!(game.board().get(sq(2, 2)), Some(gold));
    assert_eq!(game.hand(Side::Sente).count(PieceKind::Gold), 0);
    assert_eq!(game.turn(), Side::Gote);
    assert_eq!(game.move_count(), 2);

    game.undo().expect("undo drop");
    assert_eq!(game.sfen(), before);
    assert_eq!(game.hand(Side::Sente).count(PieceKind::Gold), 1);
}

#[test]
fn promotion_requires_zone() {
    let mut game = Game::new(Variant::Standard);
    assert!(!game.promote_piece_at(sq(6, 4)));
    assert!(!game.promote_piece_at(sq(2, 4)));
    assert!(!game.promote_piece_at(sq(4, 4)));
    assert!(!game.changed());

    let mut game =
        Game::from_sfen(Variant::Standard, "4k4/9/4S4/9/9/9/9/9/4K4 w - 1").expect("valid position");
    assert!(game.promote_piece_at(sq(2, 4)));
    assert!(game.board().get(sq(2, 4)).unwrap().is_promoted());
    assert!(game.changed());

    let after = game.sfen();
    assert!(!game.promote_piece_at(sq(2, 4)));
    assert_eq!(game.sfen(), after);
    assert_eq!(after.to_string(), "4k4/9/4+S4/9/9/9/9/9/4K4 w - 1");
}

#[test]
fn gote_promotes_on_far_rows() {
    let mut game =
        Game::from_sfen(Variant::Mini, "4k/5/5/5/Kp3 b - 1").expect("valid position");
    assert!(game.promote_piece_at(sq(4, 1)));
    assert_eq!(game.sfen().to_string(), "4k/5/5/5/K+p3 b - 1");
}

#[test]
fn promotion_marks_last_move_and_undoes_cleanly() {
    let mut game =
        Game::from_sfen(Variant::Standard, "4k4/9/9/4S4/9/9/9/9/4K4 b - 1").expect("valid position");
    assert!(game.is_promotable_move(sq(3, 4), sq(2, 4)));
    let before = game.sfen();

    game.move_piece(sq(3, 4), sq(2, 4)).expect("silver advances");
    assert!(game.promote_piece_at(sq(2, 4)));
    let last = *game.history().last().unwrap();
    assert!(last.promoted);
    assert_eq!(last.to_string(), "S54-53+");

    let undone = game.undo().unwrap();
    assert!(undone.promoted);
    assert_eq!(game.sfen(), before);
    assert!(!game.board().get(sq(3, 4)).unwrap().is_promoted());
}

#[test]
fn promotable_moves_enter_or_leave_the_zone() {
    let game =
        Game::from_sfen(Variant::Standard, "4k4/9/3S5/9/4S4/9/9/9/G3K4 b - 1").expect("valid position");
    assert!(game.is_promotable_move(sq(2, 3), sq(3, 2)));
    assert!(!game.is_promotable_move(sq(4, 4), sq(3, 4)));
    assert!(!game.is_promotable_move(sq(8, 0), sq(7, 0)));
    assert!(!game.is_promotable_move(sq(5, 5), sq(4, 5)));
}

#[test]
fn dropped_piece_cannot_promote_at_once() {
    let mut game =
        Game::from_sfen(Variant::Standard, "4k4/9/9/9/9/9/9/9/4K4 b S 1").expect("valid position");
    game.play_hand(sq(2, 2), Piece::new(PieceKind::Silver, Side::Sente))
        .expect("silver drop");
    assert!(!game.promote_piece_at(sq(2, 2)));
    assert!(!game.board().get(sq(2, 2)).unwrap().is_promoted());
}

#[test]
fn checkmate_is_announced() {
    let mut game =
        Game::from_sfen(Variant::Standard, "k8/9/8r/7r1/4K4/7r1/9/9/9 w - 1").expect("valid position");
    let events = game.subscribe();
    assert_eq!(game.outcome(), None);

    game.move_piece(sq(2, 8), sq(4, 8)).expect("rook swings over");
    assert_eq!(events.try_recv(), Ok(GameEvent::Changed));
    assert_eq!(
        events.try_recv(),
        Ok(GameEvent::Checkmate { loser: Side::Sente })
    );
    assert!(game.is_checkmate(Side::Sente));
    assert!(game.legal_moves().is_empty());
    assert_eq!(
        game.outcome(),
        Some(Outcome::Checkmate {
            winner: Side::Gote
        })
    );
}

#[test]
fn changed_flag_toggles() {
    let mut game = Game::new(Variant::Mini);
    assert!(!game.changed());
    game.move_piece(sq(3, 0), sq(2, 0)).expect("pawn push");
    assert!(game.changed());
    game.undo().unwrap();
    assert!(!game.changed());
}

#[test]
fn dropped_subscribers_are_pruned() {
    let mut game = Game::new(Variant::Mini);
    let kept = game.subscribe();
    drop(game.subscribe());
    game.move_piece(sq(3, 0), sq(2, 0)).expect("pawn push");
    assert_eq!(kept.try_recv(), Ok(GameEvent::Changed));
}

#[test]
fn load_errors() {
    assert!(matches!(
        Game::from_sfen(Variant::Standard, "not an sfen"),
        Err(GameError::Sfen(_))
    ));
    assert_eq!(
        Game::from_sfen(Variant::Standard, MINI_POSITION).unwrap_err(),
        GameError::DimensionMismatch {
            variant: Variant::Standard,
            expected: 9,
            width: 5,
            height: 5,
        }
    );
    assert_eq!(
        Game::from_sfen(Variant::Mini, "rbsgk/4p/5/P4/KGSBR b L 1").unwrap_err(),
        GameError::UnexpectedHandPiece {
            variant: Variant::Mini,
            kind: PieceKind::Lance,
        }
    );
}

#[test]
fn load_replaces_position() {
    let mut game = Game::new(Variant::Mini);
    game.move_piece(sq(3, 0), sq(2, 0)).unwrap();
    game.load("4k/5/5/5/K4 w 2P 7").unwrap();
    assert_eq!(game.turn(), Side::Gote);
    assert_eq!(game.move_count(), 7);
    assert!(game.history().is_empty());
    assert_eq!(game.hand(Side::Sente).count(PieceKind::Pawn), 2);
    assert_eq!(game.sfen().to_string(), "4k/5/5/5/K4 w 2P 7");
}

#[test]
fn save_round_trip() {
    let mut game = Game::new(Variant::Standard);
    game.move_piece(sq(6, 2), sq(5, 2)).unwrap();
    game.move_piece(sq(2, 6), sq(3, 6)).unwrap();

    let save = game.to_save();
    assert_eq!(save.variant, "Standard");
    assert_eq!(save.history.len(), 2);
    assert_eq!(save.time_left(Side::Sente), 0);

    let json = serde_json::to_string(&save).expect("serialize save");
    let decoded: SaveGame = serde_json::from_str(&json).expect("deserialize save");
    assert_eq!(decoded, save);

    let mut restored = Game::from_save(&decoded, Duration::from_secs(1)).expect("restore");
    assert_eq!(restored.sfen(), game.sfen());
    assert_eq!(restored.history(), game.history());
    assert_eq!(restored.turn(), Side::Sente);
    assert!(!restored.is_timed());

    restored.undo().expect("undo restored move");
    assert_eq!(restored.turn(), Side::Gote);
    assert_eq!(
        restored.board().get(sq(2, 6)),
        Some(Piece::new(PieceKind::Pawn, Side::Gote))
    );
}

#[test]
fn save_with_unknown_variant_fails() {
    let mut save = Game::new(Variant::Mini).to_save();
    save.variant = "Chu".to_string();
    assert_eq!(
        Game::from_save(&save, Duration::from_secs(1)).unwrap_err(),
        GameError::Variant(VariantError::Unknown("Chu".to_string()))
    );
}

#[test]
fn stopped_game_refuses_moves() {
    let mut game = Game::new(Variant::Mini);
    game.stop();
    game.stop();
    assert!(!game.is_running());
    assert_eq!(game.move_piece(sq(3, 0), sq(2, 0)), None);
    assert!(game.legal_moves().is_empty());
    assert_eq!(game.outcome(), Some(Outcome::Stopped));
}

#[test]
fn board_pieces_must_fit_the_variant_hand() {
    assert_eq!(
        Game::from_sfen(Variant::Standard, "4k4/9/9/9/4c4/4R4/9/9/4K4 b - 1").unwrap_err(),
        GameError::UnexpectedBoardPiece {
            variant: Variant::Standard,
            kind: PieceKind::Copper,
        }
    );
    assert_eq!(
        Game::from_sfen(Variant::Mini, "rbsgk/4p/5/L4/KGSBR b - 1").unwrap_err(),
        GameError::UnexpectedBoardPiece {
            variant: Variant::Mini,
            kind: PieceKind::Lance,
        }
    );

    let mut game = Game::new(Variant::Standard);
    let before = game.sfen();
    assert!(game.load("4k4/9/9/9/4c4/4R4/9/9/4K4 b - 1").is_err());
    assert_eq!(game.sfen(), before);
}

#[test]
fn notation_tells_twin_golds_apart() {
    let mut game =
        Game::from_sfen(Variant::Standard, "4k4/9/9/9/9/9/9/3G1G3/4K4 b - 1").expect("valid position");
    let left = parse_notation("G48-57", &game).expect("left gold steps up");
    let right = parse_notation("G68-57", &game).expect("right gold steps up");
    assert_eq!(left.from, Some(sq(7, 3)));
    assert_eq!(right.from, Some(sq(7, 5)));
    assert_eq!(left.to, right.to);
    assert!(parse_notation("G-57", &game).is_err());

    game.play(&right).expect("play right gold");
    assert_eq!(game.board().get(sq(7, 5)), None);
    assert_eq!(
        game.board().get(sq(7, 3)),
        Some(Piece::new(PieceKind::Gold, Side::Sente))
    );
    assert_eq!(game.history().last().unwrap().to_string(), "G68-57");
}

#[test]
fn promoting_an_unmoved_piece_leaves_history_alone() {
    let mut game =
        Game::from_sfen(Variant::Standard, "4k4/9/S8/9/9/9/9/9/4K4 b - 1").expect("valid position");
    game.move_piece(sq(8, 4), sq(8, 3)).expect("king steps aside");
    let recorded = *game.history().last().unwrap();

    assert!(game.promote_piece_at(sq(2, 0)));
    assert_eq!(game.history().len(), 1);
    assert_eq!(*game.history().last().unwrap(), recorded);
    assert!(!recorded.promoted);

    game.undo().expect("undo king move");
    assert!(game.board().get(sq(2, 0)).unwrap().is_promoted());
}
