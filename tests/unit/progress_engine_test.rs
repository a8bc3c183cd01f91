//! Unit tests for the progress engine and mini-game adapters over the built-in catalog

use chrono::{DateTime, TimeZone, Utc};
use stagequest::catalog::Catalog;
use stagequest::minigames::{
    apply_results, MiniGameAdapter, MiniGameError, PasswordEvent, PasswordPuzzle, PlatformEvent,
    PlatformGame,
};
use stagequest::progress::{
    get_or_create_player, PlayerRecord, ProgressEngine, ProgressError, Submission,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 12, 10, 18, 0, 0).unwrap()
}

fn new_player(catalog: &Catalog) -> PlayerRecord {
    get_or_create_player(None, "kid@example.org", "Kid", None, catalog, now()).unwrap()
}

#[test]
fn test_full_regular_stage() {
    let catalog = Catalog::builtin().unwrap();
    let engine = ProgressEngine::new(&catalog);
    let record = new_player(&catalog);

    let (record, first) = engine
        .submit_answer(&record, 1, 0, &Submission::OptionIndex(1), now())
        .unwrap();
    let (record, wrong) = engine
        .submit_answer(&record, 1, 1, &Submission::OptionIndex(0), now())
        .unwrap();
    let (record, second) = engine
        .submit_answer(&record, 1, 1, &Submission::OptionIndex(2), now())
        .unwrap();
    let (record, last) = engine
        .submit_answer(&record, 1, 2, &Submission::text(" Controller ").unwrap(), now())
        .unwrap();

    assert_eq!(first.points_awarded, 10);
    assert!(!wrong.correct);
    assert_eq!(wrong.points_awarded, 0);
    assert!(!second.stage_newly_completed);
    assert!(last.stage_newly_completed);

    let progress = record.stage_progress(1).unwrap();
    assert!(progress.completed);
    assert_eq!(progress.score, 40);
    assert_eq!(progress.attempts, 4);
    assert_eq!(record.total_score(), 40);
}

#[test]
fn test_case_sensitive_free_text() {
    let catalog = Catalog::builtin().unwrap();
    let engine = ProgressEngine::new(&catalog);
    let record = new_player(&catalog);

    let (record, lower) = engine
        .submit_answer(&record, 2, 2, &Submission::text("ok").unwrap(), now())
        .unwrap();
    let (_, upper) = engine
        .submit_answer(&record, 2, 2, &Submission::text("OK").unwrap(), now())
        .unwrap();

    assert!(!lower.correct);
    assert!(upper.correct);
    assert_eq!(upper.points_awarded, 30);
}

#[test]
fn test_repeat_correct_answer_scores_once() {
    let catalog = Catalog::builtin().unwrap();
    let engine = ProgressEngine::new(&catalog);
    let record = new_player(&catalog);

    let (once, _) = engine
        .submit_answer(&record, 3, 0, &Submission::OptionIndex(1), now())
        .unwrap();
    let (twice, outcome) = engine
        .submit_answer(&once, 3, 0, &Submission::OptionIndex(1), now())
        .unwrap();

    assert!(outcome.correct);
    assert_eq!(outcome.points_awarded, 0);
    assert_eq!(twice.stage_progress(3).unwrap().score, 15);
    assert_eq!(twice.stage_progress(3).unwrap().attempts, 2);
}

#[test]
fn test_locked_stage_leaves_record() {
    let catalog = Catalog::builtin().unwrap();
    let engine = ProgressEngine::new(&catalog);
    let record = new_player(&catalog);
    let early = Utc.with_ymd_and_hms(2026, 11, 30, 0, 0, 0).unwrap();

    let result = engine.submit_answer(&record, 6, 0, &Submission::MiniGame { passed: true }, early);
    assert!(matches!(
        result,
        Err(ProgressError::StageLocked { stage_id: 6, .. })
    ));
    assert_eq!(record.total_attempts(), 0);
}

#[test]
fn test_blank_text_rejected_before_engine() {
    assert!(matches!(
        Submission::text("   "),
        Err(ProgressError::BlankSubmission)
    ));
}

#[test]
fn test_password_puzzle_through_engine() {
    let catalog = Catalog::builtin().unwrap();
    let engine = ProgressEngine::new(&catalog);
    let mut puzzle = PasswordPuzzle::new(catalog.stage(4).unwrap()).unwrap();
    let mut record = new_player(&catalog);

    for (index, code) in [(0, "smart"), (1, "9"), (1, " 8 "), (2, "Sci Tob")] {
        let event = PasswordEvent::CodeEntered {
            challenge_index: index,
            code: code.to_string(),
        };
        let results = puzzle
            .handle_event(record.stage_progress(4).unwrap(), &event)
            .unwrap();
        let (next, _) = apply_results(&engine, &record, 4, &results, now()).unwrap();
        puzzle.commit(event, &results);
        record = next;
    }

    let progress = record.stage_progress(4).unwrap();
    assert!(progress.completed);
    assert_eq!(progress.score, 70);
    assert_eq!(progress.attempts, 4);
    assert_eq!(puzzle.failed_attempts(1), 1);
}

#[test]
fn test_platform_game_needs_code_fix_first() {
    let catalog = Catalog::builtin().unwrap();
    let engine = ProgressEngine::new(&catalog);
    let mut game = PlatformGame::new(catalog.stage(5).unwrap()).unwrap();
    let record = new_player(&catalog);

    let early = game.handle_event(record.stage_progress(5).unwrap(), &PlatformEvent::LevelCleared);
    assert!(matches!(
        early,
        Err(MiniGameError::OutOfOrder { blocked_by: 1, .. })
    ));

    let code_fix = PlatformEvent::CodeFixSubmitted("robot.turn Left()".to_string());
    let fix = game
        .handle_event(record.stage_progress(5).unwrap(), &code_fix)
        .unwrap();
    let (record, _) = apply_results(&engine, &record, 5, &fix, now()).unwrap();
    game.commit(code_fix, &fix);

    let cleared = game
        .handle_event(record.stage_progress(5).unwrap(), &PlatformEvent::LevelCleared)
        .unwrap();
    let (record, outcomes) = apply_results(&engine, &record, 5, &cleared, now()).unwrap();
    game.commit(PlatformEvent::LevelCleared, &cleared);
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[1].stage_newly_completed);
    assert_eq!(record.stage_progress(5).unwrap().score, 100);

    let again = game
        .handle_event(record.stage_progress(5).unwrap(), &PlatformEvent::LevelCleared)
        .unwrap();
    assert!(again.is_empty());
}

#[test]
fn test_mixed_submissions_keep_progress_consistent() {
    let catalog = Catalog::builtin().unwrap();
    let engine = ProgressEngine::new(&catalog);
    let mut record = new_player(&catalog);

    let steps = vec![
        (1, 2, Submission::text("sensor").unwrap()),
        (1, 2, Submission::text("CONTROLLER").unwrap()),
        (2, 1, Submission::OptionIndex(3)),
        (1, 0, Submission::OptionIndex(1)),
        (3, 1, Submission::text("same").unwrap()),
        (1, 2, Submission::text("controller").unwrap()),
        (2, 2, Submission::text("ok").unwrap()),
        (1, 1, Submission::OptionIndex(0)),
        (2, 2, Submission::text("OK").unwrap()),
        (1, 1, Submission::OptionIndex(2)),
        (3, 0, Submission::OptionIndex(0)),
        (2, 0, Submission::OptionIndex(1)),
        (3, 0, Submission::OptionIndex(1)),
        (2, 1, Submission::OptionIndex(0)),
        (1, 0, Submission::OptionIndex(1)),
    ];

    for (step, (stage_id, index, submission)) in steps.into_iter().enumerate() {
        let (next, _) = engine
            .submit_answer(&record, stage_id, index, &submission, now())
            .unwrap();

        for (before, after) in record.progress.iter().zip(&next.progress) {
            assert!(after.score >= before.score, "step {}: score went down", step);
            assert!(
                after
                    .completed_challenge_indices
                    .is_superset(&before.completed_challenge_indices),
                "step {}: credited indices shrank",
                step
            );
        }
        for progress in &next.progress {
            let stage = catalog.stage(progress.stage_id).unwrap();
            assert_eq!(progress.mismatch_with(stage), None, "step {}", step);
            assert_eq!(
                progress.completed,
                progress.completed_count() == stage.challenges.len(),
                "step {}",
                step
            );
        }
        record = next;
    }

    assert_eq!(record.stages_completed(), 3);
    assert_eq!(record.total_score(), 40 + 60 + 40);
    assert_eq!(record.total_attempts(), 15);
}
