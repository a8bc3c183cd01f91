//! Unit tests for leaderboard ranking and participation statistics

use chrono::{DateTime, TimeZone, Utc};
use stagequest::catalog::Catalog;
use stagequest::leaderboards::{compute_leaderboard, participation_report, Leaderboard};
use stagequest::progress::{PlayerRecord, StageProgress};

fn registered() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 20, 12, 0, 0).unwrap()
}

/// Player with the first `stages` stages completed, all points on stage 1.
fn player(identity: &str, stages: u32, score: u32) -> PlayerRecord {
    let progress = (1..=6)
        .map(|id| {
            let mut progress = StageProgress::new(id);
            progress.completed = id <= stages;
            if id == 1 {
                progress.score = score;
            }
            progress
        })
        .collect();

    PlayerRecord {
        identity: identity.to_string(),
        display_name: identity.to_uppercase(),
        contact: None,
        registered_at: registered(),
        last_active_at: registered(),
        progress,
    }
}

#[test]
fn test_stages_before_score() {
    let players = vec![
        player("p1", 2, 100),
        player("p2", 2, 150),
        player("p3", 1, 200),
    ];

    let ranked = compute_leaderboard(&players);
    let order: Vec<&str> = ranked.iter().map(|e| e.identity.as_str()).collect();
    assert_eq!(order, vec!["p2", "p1", "p3"]);
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[2].rank, 3);
}

#[test]
fn test_ties_keep_input_order() {
    let players = vec![player("b", 1, 50), player("a", 1, 50), player("c", 1, 50)];
    let order: Vec<String> = compute_leaderboard(&players)
        .into_iter()
        .map(|e| e.identity)
        .collect();
    assert_eq!(order, vec!["b", "a", "c"]);
}

#[test]
fn test_empty_leaderboard() {
    let leaderboard = Leaderboard::from_players(&[]);
    assert_eq!(leaderboard.total_players(), 0);
    assert!(leaderboard.top(10).is_empty());
}

#[test]
fn test_top_and_find() {
    let players = vec![player("p1", 0, 10), player("p2", 3, 10)];
    let leaderboard = Leaderboard::from_players(&players);

    assert_eq!(leaderboard.top(1).len(), 1);
    assert_eq!(leaderboard.top(1)[0].identity, "p2");
    assert_eq!(leaderboard.find_player("p1").map(|e| e.rank), Some(2));
    assert!(leaderboard.find_player("nobody").is_none());
}

#[test]
fn test_participation_percentages() {
    let catalog = Catalog::builtin().unwrap();
    let players = vec![player("p1", 2, 0), player("p2", 1, 0), player("p3", 0, 0), player("p4", 1, 0)];

    let report = participation_report(&players, &catalog);
    assert_eq!(report.total_players, 4);
    assert_eq!(report.stages.len(), 6);
    assert_eq!(report.stages[0].completed_count, 3);
    assert!((report.stages[0].completion_percentage - 75.0).abs() < f64::EPSILON);
    assert!((report.stages[1].completion_percentage - 25.0).abs() < f64::EPSILON);
    assert_eq!(report.stages[5].completed_count, 0);
    assert_eq!(report.participants[0].total_stages, 6);
    assert_eq!(report.participants[0].stages_completed, 2);
}

#[test]
fn test_participation_without_players() {
    let catalog = Catalog::builtin().unwrap();
    let report = participation_report(&[], &catalog);
    assert_eq!(report.total_players, 0);
    assert!(report
        .stages
        .iter()
        .all(|s| s.completion_percentage == 0.0));
}
