mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    Service, cmd_backup_export, cmd_backup_import, cmd_calendar, cmd_clear, cmd_export_csv,
    cmd_goal, cmd_history, cmd_metrics_add, cmd_metrics_delete, cmd_metrics_list, cmd_migrate,
    cmd_note, cmd_show, cmd_stats, cmd_streak, cmd_water, cmd_workout,
};
use crate::config::Config;
use fitlog_core::streak::DEFAULT_CALENDAR_WEEKS;

#[derive(Parser)]
#[command(
    name = "fitlog",
    version,
    about = "Daily fitness goals, streaks, and history",
    long_about = "Track four daily goals (protein, steps, water, workout).\n\
                  A day with 3 or more goals done counts toward your streak."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark a goal done (or undone with --undo)
    Goal {
        /// Goal name: protein, steps, water, workout
        goal: String,
        /// Clear the goal instead of marking it
        #[arg(long)]
        undo: bool,
        /// Date to log for (YYYY-MM-DD, today, yesterday; default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set today's water glasses (250 ml each)
    Water {
        /// Number of glasses drunk so far
        glasses: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach a note to a day
    Note {
        /// Note text
        text: String,
        /// Date to annotate (YYYY-MM-DD, today, yesterday; default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one day's goals
    #[command(alias = "today")]
    Show {
        /// Date to show (YYYY-MM-DD, today, yesterday; default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recent days
    History {
        /// Number of days to show
        #[arg(short, long, default_value = "7")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Completion rates over a period
    Stats {
        /// Number of days to include
        #[arg(short, long, default_value = "30")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recompute current and best streak
    Streak {
        /// Days to look back (default: FITLOG_STREAK_WINDOW or 35)
        #[arg(short, long)]
        window: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Weekly calendar of completed goals
    Calendar {
        /// Number of weeks to show
        #[arg(short, long, default_value_t = DEFAULT_CALENDAR_WEEKS)]
        weeks: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tick a workout badge for this week (mon/wed/fri)
    Workout {
        /// Workout day: mon, wed, fri (or A, B, C)
        day: String,
        /// Clear the badge instead of setting it
        #[arg(long)]
        undo: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Body-metrics check-ins (waist, weight, progress photos)
    Metrics {
        #[command(subcommand)]
        command: MetricsCommands,
    },
    /// Backfill daily logs from legacy checklist and streak data
    Migrate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export or import a full JSON backup
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// Export daily logs as CSV
    ExportCsv {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete every daily log
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MetricsCommands {
    /// Record a check-in (at least one of --waist, --weight, --photos)
    Add {
        /// Waist circumference in cm
        #[arg(long)]
        waist: Option<f64>,
        /// Body weight
        #[arg(long)]
        weight: Option<f64>,
        /// Unit for --weight: kg or lbs
        #[arg(short, long, default_value = "kg")]
        unit: String,
        /// Progress photos were taken
        #[arg(long)]
        photos: bool,
        /// Date of the check-in (YYYY-MM-DD, today, yesterday; default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List check-ins, newest first
    List {
        /// Only show the last N days
        #[arg(short, long)]
        days: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a check-in by ID
    Delete {
        /// Check-in ID (from `metrics list`)
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BackupCommands {
    /// Write a backup document
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore from a backup document
    Import {
        /// Path to the backup JSON file
        file: PathBuf,
        /// Replace existing logs instead of merging
        #[arg(long)]
        replace: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FITLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");
    let svc = Service::open(&config.db_path)?;

    // Legacy data is folded in on every start; already-present dates are skipped.
    // Migration errors are logged and do not stop the command.
    if !matches!(cli.command, Commands::Migrate { .. } | Commands::Clear { .. }) {
        match svc.migrate_legacy() {
            Ok(summary) if summary.checklist_migrated + summary.streak_days_migrated > 0 => {
                tracing::info!(?summary, "migrated legacy data");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %format!("{e:#}"), "skipping legacy migration"),
        }
    }

    match cli.command {
        Commands::Goal {
            goal,
            undo,
            date,
            json,
        } => cmd_goal(&svc, &goal, undo, date, json),
        Commands::Water { glasses, json } => cmd_water(&svc, glasses, json),
        Commands::Note { text, date, json } => cmd_note(&svc, &text, date, json),
        Commands::Show { date, json } => cmd_show(&svc, date, json),
        Commands::History { days, json } => cmd_history(&svc, days, json),
        Commands::Stats { days, json } => cmd_stats(&svc, days, json),
        Commands::Streak { window, json } => {
            cmd_streak(&svc, window.unwrap_or(config.streak_window), json)
        }
        Commands::Calendar { weeks, json } => cmd_calendar(&svc, weeks, json),
        Commands::Workout { day, undo, json } => cmd_workout(&svc, &day, undo, json),
        Commands::Metrics { command } => match command {
            MetricsCommands::Add {
                waist,
                weight,
                unit,
                photos,
                date,
                json,
            } => cmd_metrics_add(&svc, waist, weight, &unit, photos, date, json),
            MetricsCommands::List { days, json } => cmd_metrics_list(&svc, days, json),
            MetricsCommands::Delete { id, json } => cmd_metrics_delete(&svc, id, json),
        },
        Commands::Migrate { json } => cmd_migrate(&svc, json),
        Commands::Backup { command } => match command {
            BackupCommands::Export { output } => cmd_backup_export(&svc, output.as_deref()),
            BackupCommands::Import {
                file,
                replace,
                json,
            } => cmd_backup_import(&svc, &file, replace, json),
        },
        Commands::ExportCsv { output } => cmd_export_csv(&svc, output.as_deref()),
        Commands::Clear { yes, json } => cmd_clear(&svc, yes, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_goal_command() {
        let cli = Cli::try_parse_from(["fitlog", "goal", "water", "--date", "2024-06-15"]).unwrap();
        match cli.command {
            Commands::Goal { goal, undo, date, .. } => {
                assert_eq!(goal, "water");
                assert!(!undo);
                assert_eq!(date.as_deref(), Some("2024-06-15"));
            }
            _ => panic!("expected goal command"),
        }
    }

    #[test]
    fn test_parse_metrics_add() {
        let cli = Cli::try_parse_from([
            "fitlog", "metrics", "add", "--weight", "180", "-u", "lbs", "--photos",
        ])
        .unwrap();
        match cli.command {
            Commands::Metrics {
                command:
                    MetricsCommands::Add {
                        waist,
                        weight,
                        unit,
                        photos,
                        ..
                    },
            } => {
                assert_eq!(waist, None);
                assert_eq!(weight, Some(180.0));
                assert_eq!(unit, "lbs");
                assert!(photos);
            }
            _ => panic!("expected metrics add"),
        }
    }

    #[test]
    fn test_today_alias() {
        let cli = Cli::try_parse_from(["fitlog", "today"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { date: None, .. }));
    }
}
