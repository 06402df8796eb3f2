//! `roadsched` CLI: evaluate road-event schedules from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Is the event active right now? (schedule JSON on stdin)
//! roadsched --default-timezone America/Montreal includes < schedule.json
//!
//! # At a given instant
//! roadsched includes -i schedule.json --at 2026-03-02T14:30:00Z
//!
//! # Active at any point in a window?
//! roadsched range -i schedule.json --start 2026-03-14 --end 2026-03-16T09:00
//!
//! # Concrete periods, as JSON
//! roadsched periods -i schedule.json --from 2026-03-01 --to 2026-03-31
//!
//! # The events API filter, with its range cap
//! roadsched filter -i schedule.json --in-effect-on 2026-03-01,2026-03-20
//!
//! # Ids of active events with nothing left to run
//! roadsched archive -i events.json
//! ```

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use road_schedule::filter::DEFAULT_MAX_RANGE_DAYS;
use road_schedule::text::{parse_date, parse_moment};
use road_schedule::timezone::parse_timezone;
use road_schedule::{
    find_archivable, DstPolicy, FilterConfig, InEffectOn, Moment, RoadEventDocument, Schedule,
};
use serde::Serialize;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "roadsched",
    version,
    about = "Evaluate road-event schedules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Time zone for schedules that do not name one
    #[arg(long, global = true, env = "ROADSCHED_DEFAULT_TIMEZONE")]
    default_timezone: Option<String>,

    /// Longest window accepted by `filter`
    #[arg(long, global = true, env = "ROADSCHED_MAX_RANGE_DAYS", default_value_t = DEFAULT_MAX_RANGE_DAYS)]
    max_range_days: i64,

    /// How to place wall-clock times that fall in a DST gap
    #[arg(long, global = true, value_enum, default_value_t = DstArg::WallClock)]
    dst_policy: DstArg,
}

#[derive(Subcommand)]
enum Commands {
    /// Is the event active at an instant?
    Includes {
        /// Input schedule JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Instant, local datetime, or date (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Is the event active at any point in a window?
    Range {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// List concrete active periods as JSON
    Periods {
        #[arg(short, long)]
        input: Option<String>,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Occurrence dates per open-ended component
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Does the event have any period ending after now?
    Remaining {
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Apply the `in_effect_on` filter
    Filter {
        #[arg(short, long)]
        input: Option<String>,
        /// `now`, an instant, or `start,end`
        #[arg(long)]
        in_effect_on: String,
    },
    /// Print ids of active road events with no remaining periods
    Archive {
        /// Input JSON array of road events (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DstArg {
    Skip,
    ShiftForward,
    WallClock,
}

impl From<DstArg> for DstPolicy {
    fn from(arg: DstArg) -> Self {
        match arg {
            DstArg::Skip => DstPolicy::Skip,
            DstArg::ShiftForward => DstPolicy::ShiftForward,
            DstArg::WallClock => DstPolicy::WallClock,
        }
    }
}

#[derive(Serialize)]
struct PeriodOutput {
    start: String,
    end: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let fallback = cli
        .default_timezone
        .as_deref()
        .map(parse_timezone)
        .transpose()
        .context("Invalid --default-timezone")?;
    let policy = DstPolicy::from(cli.dst_policy);

    match cli.command {
        Commands::Includes { input, at } => {
            let schedule = load_schedule(input.as_deref(), fallback, policy)?;
            let at = match at {
                Some(at) => parse_instant(&at)?,
                None => Moment::from(Utc::now()),
            };
            println!("{}", schedule.includes(at));
        }
        Commands::Range { input, start, end } => {
            let schedule = load_schedule(input.as_deref(), fallback, policy)?;
            let active = schedule
                .active_within_range(parse_instant(&start)?, parse_instant(&end)?)
                .context("Failed to evaluate range")?;
            println!("{}", active);
        }
        Commands::Periods {
            input,
            from,
            to,
            limit,
        } => {
            let schedule = load_schedule(input.as_deref(), fallback, policy)?;
            let periods = schedule
                .to_periods(limit, parse_day(from.as_deref())?, parse_day(to.as_deref())?)
                .context("Failed to expand schedule")?;
            let output: Vec<PeriodOutput> = periods
                .iter()
                .map(|p| PeriodOutput {
                    start: p.start.to_rfc3339(),
                    end: p.end.to_rfc3339(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Remaining { input } => {
            let schedule = load_schedule(input.as_deref(), fallback, policy)?;
            let remaining = schedule
                .has_remaining_periods()
                .context("Failed to expand schedule")?;
            println!("{}", remaining);
        }
        Commands::Filter {
            input,
            in_effect_on,
        } => {
            let schedule = load_schedule(input.as_deref(), fallback, policy)?;
            let filter: InEffectOn = in_effect_on
                .parse()
                .with_context(|| format!("Invalid --in-effect-on: {}", in_effect_on))?;
            let config = FilterConfig {
                max_range_days: cli.max_range_days,
            };
            let matched = filter
                .matches(&schedule, &config, Utc::now())
                .context("Filter rejected")?;
            println!("{}", matched);
        }
        Commands::Archive { input } => {
            let json = read_input(input.as_deref())?;
            let events: Vec<RoadEventDocument> =
                serde_json::from_str(&json).context("Failed to parse road events")?;
            let report = find_archivable(&events, fallback, Utc::now())?;
            for id in &report.archivable {
                println!("{}", id);
            }
            eprintln!(
                "{} of {} active events can be archived",
                report.archivable.len(),
                report.checked
            );
        }
    }

    Ok(())
}

fn load_schedule(path: Option<&str>, fallback: Option<Tz>, policy: DstPolicy) -> Result<Schedule> {
    let json = read_input(path)?;
    let schedule = Schedule::from_json(&json, fallback).context("Failed to load schedule")?;
    Ok(schedule.with_dst_policy(policy))
}

fn parse_instant(value: &str) -> Result<Moment> {
    parse_moment(value).with_context(|| format!("Invalid instant: {}", value))
}

fn parse_day(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|v| parse_date(v).with_context(|| format!("Invalid date: {}", v)))
        .transpose()
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
