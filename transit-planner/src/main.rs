//! Benchmark harness: load a GTFS feed, compile it, and plan random
//! station-to-station queries.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_planner::domain::{SECONDS_PER_DAY, ServiceTime, Station, TimeError};
use transit_planner::network::{BuildError, TransitNetwork};
use transit_planner::planner::{ConfigError, PlanError, PlanResult, PlannerConfig, plan_query};
use transit_planner::schedule::gtfs::{FeedError, FeedOptions, load_feed};
use transit_planner::schedule::{ScheduleError, TimeWindow};

const DEFAULT_START: &str = "08:30:00";
const DEFAULT_QUERIES: usize = 100;

/// Query endpoints must be further apart than this many walking ranges, so
/// their walkable stops never overlap.
const PAIR_SPACING: f64 = 2.1;
const MAX_PAIR_ATTEMPTS: usize = 1000;

#[derive(Debug, thiserror::Error)]
enum HarnessError {
    #[error("{name} is not set")]
    MissingVar { name: &'static str },

    #[error("{name}={value:?} is invalid: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("the schedule has fewer than two stations")]
    TooFewStations,

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Window(#[from] ScheduleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Harness settings read from `TRANSIT_*` environment variables.
struct Settings {
    feed_dir: PathBuf,
    date: NaiveDate,
    start: ServiceTime,
    queries: usize,
    seed: u64,
    planner: PlannerConfig,
    quiet: bool,
}

impl Settings {
    fn from_env() -> Result<Self, HarnessError> {
        let feed_dir = std::env::var("TRANSIT_FEED_DIR")
            .map(PathBuf::from)
            .map_err(|_| HarnessError::MissingVar {
                name: "TRANSIT_FEED_DIR",
            })?;

        let date = match std::env::var("TRANSIT_DATE") {
            Ok(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| {
                HarnessError::InvalidVar {
                    name: "TRANSIT_DATE",
                    reason: e.to_string(),
                    value,
                }
            })?,
            Err(_) => chrono::Local::now().date_naive(),
        };

        let start = ServiceTime::parse(
            &std::env::var("TRANSIT_START").unwrap_or_else(|_| DEFAULT_START.to_string()),
        )?;

        let queries = parse_var("TRANSIT_QUERIES", DEFAULT_QUERIES)?;
        let seed = parse_var("TRANSIT_SEED", 0)?;

        let planner = match std::env::var("TRANSIT_PLANNER_CONFIG") {
            Ok(path) => PlannerConfig::from_json_file(path)?,
            Err(_) => PlannerConfig::default(),
        };

        Ok(Self {
            feed_dir,
            date,
            start,
            queries,
            seed,
            planner,
            quiet: std::env::var_os("TRANSIT_QUIET").is_some(),
        })
    }

    /// Twenty-four hours from the start time.
    fn window(&self) -> Result<TimeWindow, HarnessError> {
        let end = self.start.saturating_add_secs(SECONDS_PER_DAY);
        Ok(TimeWindow::new(self.start, end)?)
    }
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, HarnessError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| HarnessError::InvalidVar {
            name,
            reason: e.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "aborting");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), HarnessError> {
    let settings = Settings::from_env()?;
    let window = settings.window()?;

    let started = Instant::now();
    let schedule = load_feed(&settings.feed_dir, &FeedOptions::new(settings.date, window))?;
    info!(
        feed = %settings.feed_dir.display(),
        date = %settings.date,
        %window,
        stations = schedule.station_count(),
        trips = schedule.trip_count(),
        visits = schedule.visit_count(),
        transfers = schedule.transfers().len(),
        elapsed = ?started.elapsed(),
        "loaded schedule"
    );

    let started = Instant::now();
    let mut network = TransitNetwork::build(&schedule)?;
    info!(
        vertices = network.vertex_count(),
        arcs = network.arc_count(),
        elapsed = ?started.elapsed(),
        "compiled network"
    );

    let stations: Vec<&Station> = schedule.stations().collect();
    if stations.len() < 2 {
        return Err(HarnessError::TooFewStations);
    }

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut total_search = Duration::ZERO;
    let (mut planned, mut unreachable, mut skipped) = (0usize, 0usize, 0usize);

    for query in 0..settings.queries {
        let min_km = PAIR_SPACING * settings.planner.max_walk_km();
        let Some((from, to)) = pick_pair(&mut rng, &stations, min_km) else {
            warn!(query, min_km, "no station pair far enough apart, skipping query");
            skipped += 1;
            continue;
        };

        let outcome = match plan_query(
            &mut network,
            &schedule,
            from.coordinates,
            to.coordinates,
            settings.start,
            &settings.planner,
        ) {
            Ok(outcome) => outcome,
            Err(err) if !err.is_fatal() => {
                warn!(query, from = %from, to = %to, %err, "skipping query");
                skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        total_search += outcome.search_time;
        planned += 1;

        match &outcome.result {
            PlanResult::Itinerary(itinerary) => {
                if !settings.quiet {
                    println!("#{query}: {from} -> {to}");
                    print!("{}", itinerary.narrate(&schedule));
                }
            }
            PlanResult::Unreachable => {
                unreachable += 1;
                if !settings.quiet {
                    println!("#{query}: {from} -> {to}: no route in the window");
                }
            }
            PlanResult::SameLocation => {
                if !settings.quiet {
                    println!("#{query}: {from} -> {to}: already there");
                }
            }
        }
    }

    let mean = match u32::try_from(planned) {
        Ok(n) if n > 0 => total_search / n,
        _ => Duration::ZERO,
    };
    info!(planned, unreachable, skipped, mean_search = ?mean, "finished queries");
    Ok(())
}

/// Draw an origin station, then redraw the destination until it is more
/// than `min_km` away. Gives up after [`MAX_PAIR_ATTEMPTS`] draws.
fn pick_pair<'s, R: Rng>(
    rng: &mut R,
    stations: &[&'s Station],
    min_km: f64,
) -> Option<(&'s Station, &'s Station)> {
    if stations.is_empty() {
        return None;
    }
    let from = stations[rng.random_range(0..stations.len())];
    (0..MAX_PAIR_ATTEMPTS)
        .map(|_| stations[rng.random_range(0..stations.len())])
        .find(|to| from.coordinates.distance_km(&to.coordinates) > min_km)
        .map(|to| (from, to))
}
