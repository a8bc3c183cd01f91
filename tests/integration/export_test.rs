//! Integration test for admin export and statistics against a file database

use chrono::{TimeZone, Utc};
use stagequest::catalog::Catalog;
use stagequest::leaderboards::{participants_csv, GameDataExport};
use stagequest::progress::Submission;
use stagequest::service::{GameService, ServiceError};
use stagequest::storage::config::{load_config_from, save_config_to, AppConfig};
use stagequest::storage::Database;

#[test]
fn test_export_from_configured_paths() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    let mut config = AppConfig::default();
    config.game.admin_identity = Some("Coach@School.org".to_string());
    save_config_to(&config, &config_path).unwrap();
    let config = load_config_from(&config_path).unwrap();

    let now = Utc.with_ymd_and_hms(2026, 11, 10, 8, 0, 0).unwrap();
    {
        let database = Database::open(&config.database_path()).unwrap();
        let service = GameService::new(database, Catalog::builtin().unwrap());
        service
            .register("ana@example.org", "Ana, Jr.", Some("0912"), now)
            .unwrap();
        service
            .submit("ana@example.org", 1, 0, &Submission::OptionIndex(1), now)
            .unwrap();
    }

    // Reopen to read what was committed.
    let database = Database::open(&config.database_path()).unwrap();
    let service = GameService::new(database, Catalog::builtin().unwrap())
        .with_admin(config.game.admin_identity.as_deref().unwrap())
        .unwrap();

    assert!(matches!(
        service.export("ana@example.org", now),
        Err(ServiceError::NotAuthorized(_))
    ));

    let export = service.export("coach@school.org", now).unwrap();
    let path = export.write_to_dir(&config.export_dir()).unwrap();
    assert_eq!(path, dir.path().join("exports").join("game_data_2026-11-10.json"));

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["version"], "1.0");
    assert_eq!(value["players"][0]["identity"], "ana@example.org");
    assert_eq!(value["players"][0]["progress"][0]["score"], 10);

    let parsed = GameDataExport::from_json(&content).unwrap();
    assert_eq!(parsed.players.len(), 1);
    assert_eq!(parsed.players[0].total_score(), 10);

    let report = service.participation_report("COACH@school.org").unwrap();
    assert_eq!(report.total_players, 1);
    let csv = participants_csv(&report);
    assert!(csv.contains("ana@example.org,\"Ana, Jr.\",0912,"));
}
