// SPDX-License-Identifier: MIT OR Apache-2.0

use goban_core::record::replay;
use goban_core::{
    Board, Color, Coord, EndReason, GameResult, GameSession, GameSettings, Phase, Prisoners,
    ScoringRule, SessionError, Stone, Territory,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn started(size: u8, komi: f32, rule: ScoringRule) -> GameSession {
    let mut session = GameSession::new();
    session
        .begin_game(GameSettings::new(size, komi, rule))
        .unwrap();
    session
}

fn play_all(session: &mut GameSession, moves: &[(usize, usize)]) {
    for &(x, y) in moves {
        let outcome = session.play(x, y).unwrap();
        assert!(outcome.accepted, "move ({}, {}) was rejected", x, y);
    }
}

fn is_transition_error(result: Result<impl std::fmt::Debug, SessionError>) -> bool {
    matches!(result, Err(SessionError::InvalidTransition { .. }))
}

#[test]
fn test_full_game_lifecycle() {
    let mut session = GameSession::new();
    assert_eq!(session.phase(), Phase::PreGame);

    session
        .begin_game(GameSettings::new(9, 6.5, ScoringRule::Japanese))
        .unwrap();
    assert_eq!(session.phase(), Phase::Playing);

    // Black surrounds the White stone at (1,1)
    play_all(
        &mut session,
        &[(0, 1), (1, 1), (2, 1), (8, 8), (1, 0), (8, 7)],
    );
    let outcome = session.play(1, 2).unwrap();
    assert!(outcome.accepted);
    assert_eq!(outcome.captured_white, 1);

    let view = session.view();
    assert_eq!(view.stone_at(1, 1), Stone::Empty);
    assert_eq!(view.prisoners, Prisoners { black: 1, white: 0 });
    assert_eq!(view.next_to_play, Color::White);
    assert_eq!(view.last_move, Some(Coord::new(1, 2)));
}

#[test]
fn test_double_pass_ends_game() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    session.play(4, 4).unwrap();
    session.pass().unwrap();
    assert_eq!(session.phase(), Phase::Playing);
    session.pass().unwrap();

    assert_eq!(session.phase(), Phase::GameOver);
    let end = session.end().expect("finished game has an end state");
    assert_eq!(end.reason, EndReason::DoublePass);
    assert_eq!(end.resigner, None);
    assert_eq!(end.score.black_total, 81.0);
    assert_eq!(end.result.to_string(), "B+74.5");

    let view = session.view();
    assert!(view.score.is_some());
    assert_eq!(view.end_reason, Some(EndReason::DoublePass));
    assert_eq!(view.territory_at(0, 0), Territory::Black);
    assert_eq!(view.territory_at(4, 4), Territory::None);
}

#[test]
fn test_non_consecutive_passes_do_not_end_game() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    session.pass().unwrap();
    session.play(4, 4).unwrap();
    session.pass().unwrap();
    assert_eq!(session.phase(), Phase::Playing);
}

#[test]
fn test_resignation() {
    let mut session = started(9, 6.5, ScoringRule::Japanese);
    play_all(&mut session, &[(2, 2), (6, 6)]);

    let result = session.resign(Color::Black).unwrap();
    assert_eq!(result, GameResult::resignation(Color::Black));
    assert_eq!(result.to_string(), "W+R");
    assert_eq!(session.phase(), Phase::GameOver);

    let view = session.view();
    assert_eq!(view.end_reason, Some(EndReason::Resign));
    assert_eq!(view.resigner, Some(Color::Black));
    assert!(view.score.is_some());
}

#[test]
fn test_resign_while_reviewing() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    play_all(&mut session, &[(4, 4)]);
    session.enter_review(Some(0)).unwrap();
    play_all(&mut session, &[(0, 0)]);

    let result = session.resign(Color::White).unwrap();
    assert_eq!(result.to_string(), "B+R");
    assert_eq!(session.phase(), Phase::GameOver);
    assert!(session.is_reviewing());

    // Final score is taken from the main line, not the review position
    let end = session.end().unwrap();
    assert_eq!(end.score.stones_black, 1);
    assert_eq!(end.territory.owner_at(Coord::new(0, 0)), Territory::Black);
    assert!(session.view().score.is_none());
    assert_eq!(session.view().stone_at(0, 0), Stone::Black);

    session.exit_review().unwrap();
    let view = session.view();
    assert_eq!(view.resigner, Some(Color::White));
    assert!(view.score.is_some());
    assert_eq!(view.stone_at(0, 0), Stone::Empty);
    assert_eq!(session.export_sgf(), "(;GM[1]FF[4]SZ[9]KM[6.5];B[ee];RE[B+R])");
}

#[test]
fn test_ko_through_session() {
    let mut session = started(9, 6.5, ScoringRule::Japanese);
    play_all(
        &mut session,
        &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (2, 2), (8, 8), (1, 1)],
    );

    assert_eq!(session.play(2, 1).unwrap().captured_white, 1);
    let before = session.view().board().clone();
    let rejected = session.play(1, 1).unwrap();
    assert!(!rejected.accepted);
    assert_eq!(session.view().board(), &before);
    assert_eq!(session.record().len(), 9);

    play_all(&mut session, &[(8, 0), (0, 8)]);
    let retake = session.play(1, 1).unwrap();
    assert!(retake.accepted);
    assert_eq!(retake.captured_black, 1);
    assert_eq!(session.view().prisoners, Prisoners { black: 1, white: 1 });
}

#[test]
fn test_invalid_coordinate() {
    let mut session = started(9, 6.5, ScoringRule::Japanese);
    assert_eq!(
        session.play(9, 0),
        Err(SessionError::InvalidCoordinate { x: 9, y: 0, size: 9 })
    );
    assert!(session.record().is_empty());
}

#[test]
fn test_invalid_transitions_change_nothing() {
    let mut session = GameSession::new();
    assert!(is_transition_error(session.play(0, 0)));
    assert!(is_transition_error(session.pass()));
    assert!(is_transition_error(session.undo()));
    assert!(is_transition_error(session.resign(Color::Black)));
    assert!(is_transition_error(session.enter_review(None)));
    assert!(is_transition_error(session.exit_review()));
    assert!(is_transition_error(session.next_move()));
    assert!(is_transition_error(session.live_score()));
    assert_eq!(session.phase(), Phase::PreGame);

    session
        .begin_game(GameSettings::new(9, 6.5, ScoringRule::Japanese))
        .unwrap();
    assert!(is_transition_error(
        session.begin_game(GameSettings::new(13, 6.5, ScoringRule::Japanese))
    ));
    assert_eq!(session.settings().size, 9);
    assert!(is_transition_error(session.undo()));
    assert!(is_transition_error(session.prev_move()));
    assert!(is_transition_error(session.step_to(0)));

    session.play(4, 4).unwrap();
    session.enter_review(None).unwrap();
    assert!(is_transition_error(session.undo()));
    assert_eq!(session.record().len(), 1);
    session.exit_review().unwrap();

    session.pass().unwrap();
    session.pass().unwrap();
    assert_eq!(session.phase(), Phase::GameOver);
    assert!(is_transition_error(session.undo()));
    assert!(is_transition_error(session.play(0, 0)));
    assert!(is_transition_error(session.pass()));
    assert!(is_transition_error(session.resign(Color::Black)));
    assert_eq!(session.record().len(), 3);
}

#[test]
fn test_invalid_settings() {
    let mut session = GameSession::new();
    let result = session.begin_game(GameSettings::new(0, 6.5, ScoringRule::Chinese));
    assert!(matches!(result, Err(SessionError::InvalidSettings(_))));
    assert_eq!(session.phase(), Phase::PreGame);
}

#[test]
fn test_new_game_discards_history() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    play_all(&mut session, &[(4, 4), (3, 3)]);
    session.resign(Color::White).unwrap();

    session.new_game();
    assert_eq!(session.phase(), Phase::PreGame);
    assert!(session.record().is_empty());
    assert!(session.end().is_none());
    assert!(session.view().result.is_none());

    session
        .begin_game(GameSettings::new(13, 0.5, ScoringRule::Japanese))
        .unwrap();
    assert_eq!(session.view().board().size(), 13);
}

#[test]
fn test_undo_restores_previous_position() {
    let mut session = started(9, 6.5, ScoringRule::Japanese);
    play_all(
        &mut session,
        &[(0, 1), (1, 1), (2, 1), (8, 8), (1, 0), (8, 7), (1, 2)],
    );
    assert_eq!(session.view().prisoners.black, 1);

    let removed = session.undo().unwrap();
    assert_eq!(removed.point, Some(Coord::new(1, 2)));
    assert_eq!(removed.color, Color::Black);

    let view = session.view();
    assert_eq!(view.stone_at(1, 1), Stone::White);
    assert_eq!(view.prisoners, Prisoners::default());
    assert_eq!(view.next_to_play, Color::Black);
    assert_eq!(session.record().tip(), &replay(9, &session.record().main_line()[..6]).board);
}

#[test]
fn test_undo_round_trip_over_random_games() {
    let mut rng = StdRng::seed_from_u64(0x601d);

    for _ in 0..20 {
        let mut session = started(7, 6.5, ScoringRule::Japanese);
        let mut history: Vec<(Board, Prisoners)> =
            vec![(session.record().tip().clone(), session.record().prisoners())];

        for _ in 0..60 {
            let last_was_pass = session
                .record()
                .main_line()
                .last()
                .map_or(false, |mv| mv.is_pass());
            if !last_was_pass && rng.gen_bool(0.05) {
                session.pass().unwrap();
            } else {
                let mut placed = false;
                for _ in 0..20 {
                    let (x, y) = (rng.gen_range(0..7), rng.gen_range(0..7));
                    if session.play(x, y).unwrap().accepted {
                        placed = true;
                        break;
                    }
                }
                if !placed {
                    break;
                }
            }
            history.push((session.record().tip().clone(), session.record().prisoners()));
        }

        let played = session.record().len();
        assert_eq!(history.len(), played + 1);

        for expected in history.iter().rev().skip(1) {
            session.undo().unwrap();
            assert_eq!(session.record().tip(), &expected.0);
            assert_eq!(session.record().prisoners(), expected.1);
        }

        assert!(session.record().is_empty());
        assert_eq!(session.record().tip(), &Board::new(7));
        assert_eq!(session.record().prisoners(), Prisoners::default());
        assert!(is_transition_error(session.undo()));
    }
}

#[test]
fn test_review_isolation() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    play_all(&mut session, &[(2, 2), (6, 6), (2, 6), (6, 2)]);
    let main_view = session.view();
    let main_board = main_view.board().clone();
    let main_black = main_board.count_stones(Color::Black);

    session.enter_review(Some(2)).unwrap();
    assert!(session.is_reviewing());
    assert_eq!(session.view().shown_index, 2);
    assert_eq!(session.view().stone_at(2, 6), Stone::Empty);

    play_all(&mut session, &[(4, 4), (5, 5)]);
    session.pass().unwrap();
    play_all(&mut session, &[(3, 3)]);

    assert_eq!(session.record().len(), 4);
    assert_eq!(session.record().tip(), &main_board);
    assert_eq!(
        session.record().tip().count_stones(Color::Black),
        main_black
    );
    assert_eq!(session.phase(), Phase::Playing);

    session.exit_review().unwrap();
    let after = session.view();
    assert_eq!(after.board(), &main_board);
    assert_eq!(after.shown_index, main_view.shown_index);
    assert_eq!(after.last_move, main_view.last_move);
    assert_eq!(after.next_to_play, main_view.next_to_play);
}

#[test]
fn test_review_double_pass_does_not_end_game() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    session.play(4, 4).unwrap();
    session.enter_review(None).unwrap();
    session.pass().unwrap();
    session.pass().unwrap();
    assert_eq!(session.phase(), Phase::Playing);
    assert!(session.end().is_none());
}

#[test]
fn test_review_truncation() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    play_all(&mut session, &[(0, 0), (8, 8), (0, 8)]);

    session.enter_review(None).unwrap();
    play_all(&mut session, &[(4, 4), (4, 5)]);
    assert_eq!(session.view().total_moves, 5);

    assert_eq!(session.prev_move().unwrap(), 4);
    play_all(&mut session, &[(3, 3)]);

    let branch = session.record().review().unwrap();
    assert_eq!(branch.base(), 3);
    assert_eq!(branch.cursor(), 5);
    let points: Vec<_> = branch.moves().iter().map(|mv| mv.point).collect();
    assert_eq!(
        points,
        vec![Some(Coord::new(4, 4)), Some(Coord::new(3, 3))]
    );
    assert_eq!(session.view().stone_at(4, 5), Stone::Empty);
    assert_eq!(session.view().stone_at(3, 3), Stone::Black);
}

#[test]
fn test_review_navigation_and_numbers() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    play_all(&mut session, &[(0, 0), (8, 8)]);
    session.enter_review(None).unwrap();
    play_all(&mut session, &[(4, 4), (5, 5), (3, 3)]);

    let view = session.view();
    assert_eq!(view.move_number_at(4, 4), Some(1));
    assert_eq!(view.move_number_at(5, 5), Some(2));
    assert_eq!(view.move_number_at(3, 3), Some(3));
    assert_eq!(view.move_number_at(0, 0), None);
    assert_eq!(view.last_move, Some(Coord::new(3, 3)));

    assert_eq!(session.jump_start().unwrap(), 0);
    let view = session.view();
    assert_eq!(view.board(), &Board::new(9));
    assert_eq!(view.last_move, None);
    assert_eq!(view.next_to_play, Color::Black);

    assert_eq!(session.step_to(3).unwrap(), 3);
    let view = session.view();
    assert_eq!(view.stone_at(4, 4), Stone::Black);
    assert_eq!(view.stone_at(5, 5), Stone::Empty);
    assert_eq!(view.move_number_at(4, 4), Some(1));
    assert_eq!(view.last_move, Some(Coord::new(4, 4)));

    assert_eq!(session.next_move().unwrap(), 4);
    assert_eq!(session.jump_end().unwrap(), 5);
    assert_eq!(session.next_move().unwrap(), 5);
    assert_eq!(session.step_to(100).unwrap(), 5);

    // Navigation never changes the branch
    assert_eq!(session.record().review().unwrap().moves().len(), 3);

    // Outside review nothing is numbered
    session.exit_review().unwrap();
    assert_eq!(session.view().move_number_at(4, 4), None);
}

#[test]
fn test_reentering_review_clears_branch() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    play_all(&mut session, &[(0, 0)]);
    session.enter_review(None).unwrap();
    play_all(&mut session, &[(4, 4)]);
    assert_eq!(session.enter_review(Some(0)).unwrap(), 0);
    assert!(session.record().review().unwrap().moves().is_empty());
    assert_eq!(session.view().stone_at(4, 4), Stone::Empty);
}

#[test]
fn test_review_of_finished_game() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    session.play(4, 4).unwrap();
    session.pass().unwrap();
    session.pass().unwrap();
    let result = session.result();

    assert_eq!(session.enter_review(Some(1)).unwrap(), 1);
    let view = session.view();
    assert!(view.score.is_none());
    assert_eq!(view.territory_at(0, 0), Territory::None);
    assert_eq!(view.result, result);

    let outcome = session.play(2, 2).unwrap();
    assert!(outcome.accepted);
    assert_eq!(session.view().stone_at(2, 2), Stone::White);
    assert_eq!(session.phase(), Phase::GameOver);
    assert!(is_transition_error(session.undo()));

    session.exit_review().unwrap();
    let view = session.view();
    assert_eq!(view.phase, Phase::GameOver);
    assert_eq!(view.stone_at(2, 2), Stone::Empty);
    assert!(view.score.is_some());
    assert_eq!(view.territory_at(0, 0), Territory::Black);
    assert_eq!(session.result(), result);
}

#[test]
fn test_live_score_is_pure() {
    let mut session = started(9, 6.5, ScoringRule::Chinese);
    play_all(&mut session, &[(4, 4)]);
    let before = session.view().board().clone();

    let first = session.live_score().unwrap();
    let second = session.live_score().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.score.black_total, 81.0);
    assert_eq!(first.territory.owner_at(Coord::new(0, 0)), Territory::Black);
    assert_eq!(session.view().board(), &before);
    assert_eq!(session.phase(), Phase::Playing);
    assert!(session.view().score.is_none());
    assert_eq!(session.view().territory_at(0, 0), Territory::None);
}

#[test]
fn test_live_score_follows_review_position() {
    let mut session = started(9, 0.0, ScoringRule::Japanese);
    play_all(
        &mut session,
        &[(0, 1), (1, 1), (2, 1), (8, 8), (1, 0), (8, 7), (1, 2)],
    );
    assert_eq!(session.live_score().unwrap().score.prisoners_black, 1);

    session.enter_review(Some(2)).unwrap();
    let live = session.live_score().unwrap();
    assert_eq!(live.score.prisoners_black, 0);
    assert_eq!(live.score.stones_black, 1);
    assert_eq!(live.score.stones_white, 1);
}
