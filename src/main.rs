//! fitflow - Progressive training companion

use std::io::{BufRead, Write as _};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use fitflow::catalog::{self, DayType};
use fitflow::server::{self, MemStorage};
use fitflow::session::{SessionState, WorkoutSession, WorkoutSummary};
use fitflow::store::ProgressStore;
use fitflow::sync::{SyncClient, SyncOutcome};
use fitflow::tui::App;

const DB_PATH: &str = "fitflow.db";

#[derive(Parser)]
#[command(name = "fitflow")]
#[command(author, version, about = "Progressive training companion")]
struct Cli {
    /// Path to the local progress database
    #[arg(long, env = "FITFLOW_DB", default_value = DB_PATH)]
    db: String,

    /// Base URL of the remote CRUD API
    #[arg(long, env = "FITFLOW_API", default_value = "http://localhost:5000")]
    api: String,

    /// User id for settings and stats
    #[arg(long, env = "FITFLOW_USER", default_value = "default-user")]
    user: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI dashboard
    Tui,

    /// Run a workout for a training day (A, B or C)
    Start {
        /// Training day
        day: DayType,
    },

    /// Show current week, weekly progress and streak
    Status,

    /// Set or step the current program week
    Week {
        /// Week number to jump to
        week: Option<u32>,

        /// Advance one week
        #[arg(long, conflicts_with = "week")]
        next: bool,

        /// Go back one week
        #[arg(long, conflicts_with_all = ["week", "next"])]
        prev: bool,
    },

    /// Show or change user settings
    Settings {
        /// Enable/disable automatic week progression
        #[arg(long)]
        auto_progression: Option<bool>,

        /// Enable/disable workout reminders
        #[arg(long)]
        reminders: Option<bool>,

        /// Enable/disable rest day alerts
        #[arg(long)]
        rest_day_alerts: Option<bool>,

        /// Training goal (e.g. general_fitness, strength)
        #[arg(long)]
        goal: Option<String>,

        /// Experience level (beginner, intermediate, advanced)
        #[arg(long)]
        experience: Option<String>,

        /// Comma-separated equipment list
        #[arg(long, value_delimiter = ',')]
        equipment: Option<Vec<String>>,
    },

    /// Push pending workout data to the remote API
    Sync,

    /// Export all local data as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Reset all progress (week back to 1, completion log cleared)
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Run the CRUD API server with in-memory storage
    Serve {
        /// Listen port
        #[arg(short, long, env = "FITFLOW_PORT", default_value = "5000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store = ProgressStore::open(&cli.db, &cli.user)?;

    match cli.command {
        Some(Commands::Tui) | None => {
            let mut app = App::new(store)?;
            app.run()?;
        }

        Some(Commands::Start { day }) => {
            run_workout(&store, &cli.api, day).await?;
        }

        Some(Commands::Status) => {
            print_status(&store)?;
        }

        Some(Commands::Week { week, next, prev }) => {
            let current = store.current_week()?;
            let target = match week {
                Some(w) => w,
                None if next => current + 1,
                None if prev => current.saturating_sub(1).max(1),
                None => current,
            };
            let week = store.set_week(target)?;
            println!("Current week: {week}");
        }

        Some(Commands::Settings {
            auto_progression,
            reminders,
            rest_day_alerts,
            goal,
            experience,
            equipment,
        }) => {
            let mut settings = store.settings()?;
            let changed = auto_progression.is_some()
                || reminders.is_some()
                || rest_day_alerts.is_some()
                || goal.is_some()
                || experience.is_some()
                || equipment.is_some();

            if let Some(v) = auto_progression {
                settings.auto_progression = v;
            }
            if let Some(v) = reminders {
                settings.workout_reminders = v;
            }
            if let Some(v) = rest_day_alerts {
                settings.rest_day_alerts = v;
            }
            if let Some(v) = goal {
                settings.goal = v;
            }
            if let Some(v) = experience {
                settings.experience_level = v;
            }
            if let Some(v) = equipment {
                settings.equipment = v;
            }
            if changed {
                store.update_settings(&settings)?;
                println!("Settings updated.");
            }

            println!("Goal:             {}", settings.goal);
            println!("Experience:       {}", settings.experience_level);
            println!("Equipment:        {}", settings.equipment.join(", "));
            println!("Auto progression: {}", settings.auto_progression);
            println!("Reminders:        {}", settings.workout_reminders);
            println!("Rest day alerts:  {}", settings.rest_day_alerts);
        }

        Some(Commands::Sync) => {
            let client = SyncClient::new(&cli.api);
            match client.retry_pending(&store).await? {
                SyncOutcome::Nothing => println!("Nothing to sync."),
                SyncOutcome::Synced {
                    sessions,
                    completions,
                } => println!("Synced {sessions} session(s), {completions} completion(s)."),
                SyncOutcome::Deferred => {
                    println!("Sync failed, data kept locally for the next attempt.")
                }
            }
        }

        Some(Commands::Export { out }) => {
            let bundle = serde_json::to_string_pretty(&store.export_data()?)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, bundle)?;
                    println!("Exported to {path}");
                }
                None => println!("{bundle}"),
            }
        }

        Some(Commands::Reset { yes }) => {
            if yes {
                store.reset_progress()?;
                println!("Progress has been reset.");
            } else {
                println!("Pass --yes to confirm resetting all progress.");
            }
        }

        Some(Commands::Serve { port }) => {
            server::serve(MemStorage::shared(), port).await?;
        }
    }

    Ok(())
}

fn print_status(store: &ProgressStore) -> Result<()> {
    let progress = store.weekly_progress()?;
    println!("Week {} of {}", store.current_week()?, catalog::TOTAL_WEEKS);
    println!(
        "This week: {}/{} workouts ({}%)",
        progress.completed, progress.total, progress.percentage
    );
    println!("Streak: {} day(s)", store.streak()?);
    println!("Total workouts: {}", store.total_workouts()?);
    if let Some(last) = store.last_workout()? {
        println!(
            "Last workout: day {} | {} | {} kcal",
            last.day_type,
            format_time(last.duration),
            last.calories_burned
        );
    }
    let pending = store.pending_count()?;
    if pending > 0 {
        println!("Pending sync: {pending} payload(s)");
    }
    Ok(())
}

/// Interactive workout runner: one prompt per exercise.
async fn run_workout(store: &ProgressStore, api: &str, day: DayType) -> Result<()> {
    let week = store.current_week()?;
    let mut session = WorkoutSession::new(day, week);

    if session.state() == SessionState::Empty {
        println!("No exercise data for day {day}.");
        return Ok(());
    }

    let day_info = catalog::training_day(day);
    println!("{} - week {week}", day_info.name);
    println!(
        "{} exercises, ~{} min",
        day_info.exercise_count, day_info.estimated_minutes
    );
    println!();

    session.start();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    let summary = loop {
        let exercise = session
            .current_exercise()
            .expect("in-progress session has a current exercise");
        let phase = session
            .current_phase()
            .expect("in-progress session has a phase");

        println!(
            "[{}] {} ({}/{})",
            phase.name(),
            exercise.name,
            session.overall_index() + 1,
            session.total_exercises()
        );
        if let Some(formula) = session.current_formula() {
            println!("  {formula}");
        }
        for step in exercise.instructions {
            println!("  - {step}");
        }

        let paused = if session.is_paused() { " [paused]" } else { "" };
        print!(
            "({}){} n=next p=prev s=pause a=abandon > ",
            format_time(session.elapsed_secs()),
            paused
        );
        std::io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                session.abandon();
                println!("\nWorkout abandoned.");
                return Ok(());
            }
        };

        match line.trim() {
            "" | "n" => {
                if let Some(summary) = session.advance() {
                    break summary;
                }
            }
            "p" => session.retreat(),
            "s" => session.toggle_pause(),
            "a" | "q" => {
                session.abandon();
                println!("Workout abandoned.");
                return Ok(());
            }
            other => println!("Unknown input: {other}"),
        }
        println!();
    };

    finish_workout(store, api, &summary).await
}

async fn finish_workout(store: &ProgressStore, api: &str, summary: &WorkoutSummary) -> Result<()> {
    store.record_completion(summary)?;
    store.mark_setup_complete()?;

    println!();
    println!("Workout complete!");
    println!(
        "  Time: {} | Exercises: {} | Calories: {}",
        format_time(summary.duration),
        summary.exercises_completed,
        summary.calories_burned
    );

    if store.auto_progress()? {
        println!("  Weekly quota met - advanced to week {}.", store.current_week()?);
    }

    let next = summary.day_type.next();
    println!("  Next up: {}", catalog::training_day(next).name);

    // Best-effort push; failure keeps the payload queued.
    let client = SyncClient::new(api);
    match client.retry_pending(store).await {
        Ok(SyncOutcome::Synced { .. }) => println!("  Synced to server."),
        Ok(SyncOutcome::Deferred) => println!("  Offline - will sync later."),
        Ok(SyncOutcome::Nothing) => {}
        Err(err) => warn!(error = %err, "sync attempt failed"),
    }

    Ok(())
}

fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
