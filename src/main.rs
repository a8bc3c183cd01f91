//! StageQuest command-line front end.
//!
//! Drives the game service against the player database in the data
//! directory. `stats` and `export` are admin commands.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stagequest::catalog::Catalog;
use stagequest::leaderboards::participants_csv;
use stagequest::progress::Submission;
use stagequest::service::GameService;
use stagequest::storage::config::{self, AppConfig};
use stagequest::storage::Database;

#[derive(Parser)]
#[command(name = "stagequest")]
#[command(version, about = "StageQuest - time-gated learning stages and leaderboard")]
struct Cli {
    /// Config file (default: config.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stages and when they unlock
    Stages,

    /// Register a player or update their details
    Register {
        /// Player email
        identity: String,
        /// Name shown on the leaderboard
        name: String,
        /// Optional phone number
        #[arg(long)]
        contact: Option<String>,
    },

    /// Answer a quiz or free-text challenge
    Answer {
        /// Player email
        identity: String,
        /// Stage id
        stage: u32,
        /// Challenge index within the stage (0-based)
        challenge: usize,
        /// Chosen option for a quiz
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        option: Option<usize>,
        /// Answer for a free-text challenge
        #[arg(long)]
        text: Option<String>,
    },

    /// Show the leaderboard
    Leaderboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Number of entries to show (default: 10)
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show participation statistics (admin)
    Stats {
        /// Admin email
        #[arg(long)]
        admin: String,
        /// Print the participants table as CSV
        #[arg(long)]
        csv: bool,
    },

    /// Export all player data as JSON (admin)
    Export {
        /// Admin email
        #[arg(long)]
        admin: String,
        /// Output directory (default: configured export directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Starting StageQuest v{}", env!("CARGO_PKG_VERSION"));

    let service = open_service(&config)?;

    match cli.command {
        Commands::Stages => cmd_stages(service.catalog()),
        Commands::Register {
            identity,
            name,
            contact,
        } => {
            let record = service.register(&identity, &name, contact.as_deref(), Utc::now())?;
            println!(
                "Registered {} ({}) with {} stages",
                record.display_name,
                record.identity,
                record.progress.len()
            );
            Ok(())
        }
        Commands::Answer {
            identity,
            stage,
            challenge,
            option,
            text,
        } => {
            let submission = match (option, text) {
                (Some(index), _) => Submission::OptionIndex(index),
                (None, Some(text)) => Submission::text(&text)?,
                (None, None) => bail!("Either --option or --text is required"),
            };
            cmd_answer(&service, &identity, stage, challenge, &submission)
        }
        Commands::Leaderboard { json, limit } => {
            let leaderboard = service.leaderboard()?;
            let entries = leaderboard.top(limit);
            if json {
                println!("{}", serde_json::to_string_pretty(entries)?);
                return Ok(());
            }
            if entries.is_empty() {
                println!("No players yet");
            }
            for entry in entries {
                println!(
                    "{:>3}. {:<24} {:>2} stages {:>5} pts",
                    entry.rank, entry.display_name, entry.stages_completed_count, entry.total_score
                );
            }
            Ok(())
        }
        Commands::Stats { admin, csv } => {
            let report = service.participation_report(&admin)?;
            if csv {
                print!("{}", participants_csv(&report));
                return Ok(());
            }
            println!("Players: {}", report.total_players);
            for stage in &report.stages {
                println!(
                    "Stage {} {:<28} {:>4} completed ({:.1}%)",
                    stage.stage_id, stage.title, stage.completed_count, stage.completion_percentage
                );
            }
            Ok(())
        }
        Commands::Export { admin, dir } => {
            let export = service.export(&admin, Utc::now())?;
            let dir = dir.unwrap_or_else(|| config.export_dir());
            let path = export
                .write_to_dir(&dir)
                .with_context(|| format!("Failed to write export to {}", dir.display()))?;
            println!("Exported {} players to {}", export.players.len(), path.display());
            Ok(())
        }
    }
}

fn open_service(config: &AppConfig) -> Result<GameService<Database>> {
    let catalog = match &config.game.catalog_path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => Catalog::builtin().context("Built-in catalog is invalid")?,
    };

    let db_path = config.database_path();
    let database = Database::open(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let service = GameService::new(database, catalog);
    match &config.game.admin_identity {
        Some(admin) => Ok(service.with_admin(admin)?),
        None => Ok(service),
    }
}

fn cmd_stages(catalog: &Catalog) -> Result<()> {
    let now = Utc::now();
    for stage in catalog.stages() {
        let state = if stage.is_unlocked(now) { "open" } else { "locked" };
        println!(
            "{:>2}. {:<28} {:<16} {:>4} pts  {:<6} unlocks {}",
            stage.id,
            stage.title,
            stage.special_type,
            stage.max_score(),
            state,
            stage.unlock_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    if let Some(remaining) = catalog.time_until_next_unlock(now) {
        println!(
            "Next stage unlocks in {}d {}h {}m",
            remaining.num_days(),
            remaining.num_hours() % 24,
            remaining.num_minutes() % 60
        );
    }
    Ok(())
}

fn cmd_answer(
    service: &GameService<Database>,
    identity: &str,
    stage: u32,
    challenge: usize,
    submission: &Submission,
) -> Result<()> {
    let report = service.submit(identity, stage, challenge, submission, Utc::now())?;
    if report.outcome.correct {
        println!("Correct! +{} points", report.outcome.points_awarded);
    } else {
        println!("Not quite, try again");
    }
    if let Some(summary) = report.completion {
        println!(
            "Stage {} \"{}\" complete with {} points ({}/{} stages)",
            summary.stage_id,
            summary.stage_title,
            summary.stage_score,
            summary.stages_completed,
            summary.total_stages
        );
        if summary.all_completed() {
            println!("Every stage complete!");
        }
    }
    Ok(())
}
