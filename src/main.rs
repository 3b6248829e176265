use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use court_planner::{
    BookingService, CivilCalendar, ConflictDetector, Court, Database, RemoteStore, SystemClock,
    Training, TrainingStore, config::AppConfig, db::write_trainings_csv, find_free_windows,
    generate_slots, utilization_by_day,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "court-planner")]
#[command(about = "Court availability and training bookings")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print slot boundaries between two clock times
    Slots {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Slot length in minutes (defaults to slots.step_minutes)
        #[arg(long)]
        step: Option<i32>,
    },
    /// Print the availability grid of a court
    Grid {
        #[arg(long)]
        court: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Book a training after checking for overlaps
    Book {
        #[arg(long)]
        court: String,
        #[arg(long)]
        team: String,
        #[arg(long)]
        team_name: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Export a court's trainings to CSV
    Export {
        #[arg(long)]
        court: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("court_planner=debug");

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    if let Command::Slots { start, end, step } = &args.command {
        let step = step.unwrap_or(config.slots.step_minutes);
        for boundary in generate_slots(start, end, step) {
            println!("{boundary}");
        }
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(run_with_configured_store(args.command, config))
}

async fn run_with_configured_store(command: Command, config: AppConfig) -> Result<()> {
    if let Some(url) = config.database.url.clone() {
        tracing::info!("Connecting to database...");
        let database = Database::new(&url)
            .await
            .context("Failed to connect to PostgreSQL database")?;
        tracing::info!("Database connected successfully");

        if let Command::Export { court, out } = &command {
            let path = database.export_to_csv(court, out, &SystemClock).await?;
            println!("Exported to {}", path.display());
            return Ok(());
        }

        let court_id = command_court(&command);
        let court = database
            .get_court(court_id)
            .await
            .context("Failed to load court")?
            .with_context(|| format!("Court '{court_id}' not found"))?;

        return run(Arc::new(database), court, command, &config).await;
    }

    if let Some(base_url) = config.remote.base_url.clone() {
        let store = RemoteStore::new(base_url, &config.network)
            .context("Failed to create remote store client")?;
        tracing::info!("Remote store client initialized");

        // The remote store only holds trainings; courts use the default hours.
        let mut court = Court::new(command_court(&command), "");
        court.id = command_court(&command).to_string();

        return run(Arc::new(store), court, command, &config).await;
    }

    anyhow::bail!("No store configured. Set DATABASE_URL or COURTS__REMOTE__BASE_URL")
}

fn command_court(command: &Command) -> &str {
    match command {
        Command::Grid { court, .. } | Command::Book { court, .. } | Command::Export { court, .. } => {
            court
        }
        Command::Slots { .. } => "",
    }
}

async fn run<S: TrainingStore>(
    store: Arc<S>,
    court: Court,
    command: Command,
    config: &AppConfig,
) -> Result<()> {
    let calendar = CivilCalendar::from_config(&config.calendar);
    let detector = ConflictDetector::new(config.booking.conflict_scope, calendar);
    let service = BookingService::new(store, Arc::new(SystemClock), detector);

    match command {
        Command::Grid { from, days, .. } => {
            let grid = service
                .availability(&court, from, days, config.slots.step_minutes)
                .await?;

            for slot in &grid {
                let status = match slot.training() {
                    Some(training) => training.team_name.as_str(),
                    None => "free",
                };
                println!(
                    "{} {}-{} {}",
                    calendar.date_of(&slot.date),
                    slot.start_time,
                    slot.end_time,
                    status
                );
            }

            for day in utilization_by_day(&grid, &calendar) {
                println!("{}: {:.0}% booked", day.date, day.percent_booked());
            }
            for window in find_free_windows(&grid, &calendar, config.slots.step_minutes) {
                println!(
                    "free {} {}-{}",
                    window.date, window.start_time, window.end_time
                );
            }
        }
        Command::Book {
            team,
            team_name,
            date,
            start,
            end,
            notes,
            ..
        } => {
            let mut candidate = Training::new(
                court.id.clone(),
                team,
                team_name,
                start,
                end,
                calendar.start_of_day(date),
            );
            candidate.court_name = court.name.clone();
            candidate.notes = notes;

            match service.book(candidate).await {
                Ok(booked) => println!("Booked {} ({})", booked.time_range(), booked.id),
                Err(e) if e.is_conflict() => {
                    println!("Time already booked: {e}");
                }
                Err(e) => return Err(e).context("Could not save training"),
            }
        }
        Command::Export { out, .. } => {
            let trainings = service
                .store()
                .trainings_for_court(&court.id)
                .await
                .context("Failed to fetch trainings for export")?;
            let path = write_trainings_csv(trainings, &out, &court.id, &SystemClock).await?;
            println!("Exported to {}", path.display());
        }
        Command::Slots { .. } => {}
    }

    Ok(())
}
