//! Integration test for a complete game season through the service
//!
//! Registers players against the built-in catalog, plays every stage type
//! and checks what ends up in the database and on the leaderboard.

use chrono::{DateTime, Duration, TimeZone, Utc};
use stagequest::catalog::Catalog;
use stagequest::minigames::{
    PasswordEvent, PasswordPuzzle, PlatformEvent, PlatformGame, RobotLab, RobotLabEvent,
};
use stagequest::progress::{ProgressError, Submission};
use stagequest::service::{GameService, ServiceError};
use stagequest::storage::{Database, PlayerStore};

fn season_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 12, 13, 10, 0, 0).unwrap()
}

fn service() -> GameService<Database> {
    GameService::new(
        Database::open_in_memory().expect("Failed to create database"),
        Catalog::builtin().expect("Built-in catalog"),
    )
}

fn answer(service: &GameService<Database>, who: &str, stage: u32, index: usize, submission: Submission) {
    let report = service
        .submit(who, stage, index, &submission, season_end())
        .expect("Submission failed");
    assert!(report.outcome.correct, "stage {} challenge {}", stage, index);
}

fn clear_regular_stages(service: &GameService<Database>, who: &str) {
    answer(service, who, 1, 0, Submission::OptionIndex(1));
    answer(service, who, 1, 1, Submission::OptionIndex(2));
    answer(service, who, 1, 2, Submission::text("controller").unwrap());
    answer(service, who, 2, 0, Submission::OptionIndex(1));
    answer(service, who, 2, 1, Submission::OptionIndex(0));
    answer(service, who, 2, 2, Submission::text("OK").unwrap());
    answer(service, who, 3, 0, Submission::OptionIndex(1));
    answer(service, who, 3, 1, Submission::text("Same").unwrap());
}

fn clear_password_stage(service: &GameService<Database>, who: &str) {
    let mut puzzle = PasswordPuzzle::new(service.catalog().stage(4).unwrap()).unwrap();
    for (index, code) in [(0, "SMART"), (1, "8"), (2, "scitob")] {
        service
            .play_mini_game(
                who,
                &mut puzzle,
                PasswordEvent::CodeEntered {
                    challenge_index: index,
                    code: code.to_string(),
                },
                season_end(),
            )
            .unwrap();
    }
}

fn clear_platform_stage(service: &GameService<Database>, who: &str) {
    let mut game = PlatformGame::new(service.catalog().stage(5).unwrap()).unwrap();
    service
        .play_mini_game(
            who,
            &mut game,
            PlatformEvent::CodeFixSubmitted("if obstacle: turnLeft()".to_string()),
            season_end(),
        )
        .unwrap();
    service
        .play_mini_game(who, &mut game, PlatformEvent::LevelCleared, season_end())
        .unwrap();
}

fn clear_robot_lab(service: &GameService<Database>, who: &str) -> Option<bool> {
    let mut lab = RobotLab::new(service.catalog().stage(6).unwrap()).unwrap();
    let events = vec![
        RobotLabEvent::DesignSubmitted(vec![
            "Wheels".to_string(),
            "Camera".to_string(),
            "Gripper".to_string(),
        ]),
        RobotLabEvent::ProgramSubmitted(vec![
            "forward".to_string(),
            "turn".to_string(),
            "pick".to_string(),
        ]),
        RobotLabEvent::SimulationProgress { collected: 2 },
        RobotLabEvent::SimulationProgress { collected: 5 },
        RobotLabEvent::SimulationProgress { collected: 6 },
        RobotLabEvent::IdeaSubmitted("A robot that waters the school garden".to_string()),
    ];

    let mut all_completed = None;
    for event in events {
        let report = service.play_mini_game(who, &mut lab, event, season_end()).unwrap();
        if let Some(summary) = report.completion {
            all_completed = Some(summary.all_completed());
        }
    }
    all_completed
}

#[test]
fn test_full_season() {
    let service = service();
    service
        .register("Ana@Example.org", "Ana", Some("0912000000"), season_end() - Duration::days(40))
        .unwrap();

    clear_regular_stages(&service, "ana@example.org");
    clear_password_stage(&service, "ana@example.org");
    clear_platform_stage(&service, "ana@example.org");
    let all_completed = clear_robot_lab(&service, "ana@example.org");

    assert_eq!(all_completed, Some(true));

    let stored = service.store().load_player("ana@example.org").unwrap().unwrap();
    assert_eq!(stored.stages_completed(), 6);
    assert_eq!(stored.total_score(), 40 + 60 + 40 + 70 + 100 + 100);
    // Simulation updates that credit nothing are not attempts.
    assert_eq!(stored.stage_progress(6).unwrap().attempts, 4);
    for (progress, stage) in stored.progress.iter().zip(service.catalog().stages()) {
        assert_eq!(progress.stage_id, stage.id);
        assert_eq!(progress.score, stage.max_score());
        assert_eq!(progress.completed_challenge_indices.len(), stage.challenges.len());
    }
}

#[test]
fn test_leaderboard_after_play() {
    let service = service();
    let registered = season_end() - Duration::days(30);
    service.register("ana@example.org", "Ana", None, registered).unwrap();
    service.register("ben@example.org", "Ben", None, registered).unwrap();
    service.register("cai@example.org", "Cai", None, registered).unwrap();

    clear_regular_stages(&service, "ana@example.org");
    clear_password_stage(&service, "ben@example.org");
    answer(&service, "ben@example.org", 3, 0, Submission::OptionIndex(1));
    answer(&service, "ben@example.org", 3, 1, Submission::text("same").unwrap());
    answer(&service, "cai@example.org", 1, 0, Submission::OptionIndex(1));

    let leaderboard = service.leaderboard().unwrap();
    let order: Vec<&str> = leaderboard
        .entries
        .iter()
        .map(|e| e.identity.as_str())
        .collect();
    // Ana: 3 stages, 140 points. Ben: 2 stages, 110 points. Cai: 0 stages.
    assert_eq!(order, vec!["ana@example.org", "ben@example.org", "cai@example.org"]);
    assert_eq!(leaderboard.entries[1].total_score, 110);
}

#[test]
fn test_reregistration_mid_season_keeps_progress() {
    let service = service();
    let registered = season_end() - Duration::days(30);
    service.register("ana@example.org", "Ana", None, registered).unwrap();
    clear_password_stage(&service, "ana@example.org");

    let record = service
        .register(" ANA@example.org", "Ana Maria", None, season_end())
        .unwrap();
    assert_eq!(record.display_name, "Ana Maria");
    assert_eq!(record.registered_at, registered);
    assert_eq!(record.last_active_at, season_end());
    assert!(record.stage_progress(4).unwrap().completed);
}

#[test]
fn test_rejected_inputs_leave_store_unchanged() {
    let service = service();
    let before_unlock = Utc.with_ymd_and_hms(2026, 11, 3, 9, 0, 0).unwrap();
    service.register("ana@example.org", "Ana", None, before_unlock).unwrap();
    let snapshot = service.player("ana@example.org").unwrap();

    let locked = service.submit("ana@example.org", 2, 0, &Submission::OptionIndex(1), before_unlock);
    assert!(matches!(
        locked,
        Err(ServiceError::Progress(ProgressError::StageLocked { .. }))
    ));

    let out_of_range = service.submit("ana@example.org", 1, 7, &Submission::OptionIndex(0), before_unlock);
    assert!(matches!(
        out_of_range,
        Err(ServiceError::Progress(ProgressError::ChallengeIndexOutOfRange { .. }))
    ));

    let mismatch = service.submit(
        "ana@example.org",
        1,
        0,
        &Submission::text("Sensor").unwrap(),
        before_unlock,
    );
    assert!(matches!(
        mismatch,
        Err(ServiceError::Progress(ProgressError::SubmissionMismatch { .. }))
    ));

    assert_eq!(service.player("ana@example.org").unwrap(), snapshot);
}
