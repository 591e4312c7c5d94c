//! favcast: weather for favourite places through a fetch-through cache.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use favcast_core::{AppError, Config};
use favcast_weather::{
    CachePolicy, Coordinates, OpenWeatherClient, TtlStore, WeatherCache, WeatherKind,
    WeatherPayload,
};

#[derive(Parser)]
#[command(name = "favcast", about = "Weather for favourite places, fetched through a TTL cache")]
struct Cli {
    /// Config file (defaults to <config dir>/favcast/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print current conditions as JSON
    Current {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Print the forecast series as JSON
    Forecast {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Render every location's current weather and forecast, repeatedly
    Dashboard {
        /// LAT,LON; repeat for each favourite
        #[arg(long = "location", required = true, allow_hyphen_values = true, value_parser = parse_location)]
        locations: Vec<Coordinates>,

        /// How many times to render the dashboard
        #[arg(long, default_value_t = 2)]
        rounds: u32,
    },
}

fn parse_location(raw: &str) -> Result<Coordinates, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {:?}", raw))?;
    Coordinates::parse(lat, lon).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = favcast_core::init() {
        eprintln!("favcast: {:#}", e);
        return ExitCode::FAILURE;
    }

    match start(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Log the full failure and print the short message meant for the user.
fn report(error: &AppError) {
    match error {
        AppError::Other(inner) => tracing::error!("{:#}", inner),
        other => tracing::error!("{}", other),
    }
    eprintln!("favcast: {}", error.user_message());
}

async fn start(cli: Cli) -> Result<(), AppError> {
    let (config, _) = Config::load_validated(cli.config.as_deref())?;
    let api_key = Config::api_key()?;

    let client = OpenWeatherClient::from_config(&config.provider, api_key)?;
    let cache = WeatherCache::new(
        TtlStore::new(),
        Arc::new(client),
        CachePolicy::from_config(&config.cache),
    );

    let shutdown = CancellationToken::new();
    let sweeper = cache.spawn_sweeper(
        Duration::from_secs(config.cache.sweep_interval_secs),
        shutdown.clone(),
    );

    let result = run(cli.command, &cache).await;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!("Cache sweeper ended abnormally: {}", e);
    }

    result
}

async fn run(command: Command, cache: &WeatherCache) -> Result<(), AppError> {
    match command {
        Command::Current { lat, lon } => {
            let snapshot = cache.current(Coordinates::new(lat, lon)?).await?;
            let rendered = serde_json::to_string_pretty(snapshot.as_ref())
                .context("Failed to render current weather")?;
            println!("{}", rendered);
        }
        Command::Forecast { lat, lon } => {
            let series = cache.forecast(Coordinates::new(lat, lon)?).await?;
            let rendered = serde_json::to_string_pretty(series.as_ref())
                .context("Failed to render forecast")?;
            println!("{}", rendered);
        }
        Command::Dashboard { locations, rounds } => {
            for round in 1..=rounds {
                println!("Dashboard render {} of {}", round, rounds);
                render_dashboard(cache, &locations).await;
            }
            let stats = cache.stats();
            println!(
                "\nCache: {} hits, {} upstream fetches, {} coalesced, {} failures",
                stats.hits, stats.misses, stats.coalesced, stats.failures
            );
        }
    }
    Ok(())
}

/// Fetch both kinds for every location in parallel. A failing location is
/// reported on its own line and does not affect the others.
async fn render_dashboard(cache: &WeatherCache, locations: &[Coordinates]) {
    let mut tasks = tokio::task::JoinSet::new();
    for (index, coords) in locations.iter().copied().enumerate() {
        for kind in [WeatherKind::Current, WeatherKind::Forecast] {
            let cache = cache.clone();
            tasks.spawn(async move { (index, kind, coords, cache.get(kind, coords).await) });
        }
    }

    let mut lines = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, kind, coords, outcome)) => {
                let line = match outcome {
                    Ok(payload) => summarize(&payload),
                    Err(e) => format!("unavailable ({})", e.user_message()),
                };
                lines.push((index, kind, coords, line));
            }
            Err(e) => tracing::error!("Dashboard task failed: {}", e),
        }
    }

    lines.sort_by_key(|(index, kind, _, _)| (*index, *kind == WeatherKind::Forecast));
    for (_, kind, coords, line) in lines {
        println!(
            "  {:>9.4},{:<10.4} {:<8} {}",
            coords.latitude, coords.longitude, kind, line
        );
    }
}

fn summarize(payload: &WeatherPayload) -> String {
    match payload {
        WeatherPayload::Current(snapshot) => {
            let description = snapshot
                .primary_condition()
                .map(|c| c.description.as_str())
                .unwrap_or("unknown");
            format!(
                "{} {:.1}° {}, wind {:.1} {}, sunrise {}, sunset {}",
                snapshot.name,
                snapshot.main.temp,
                description,
                snapshot.wind.speed,
                snapshot.wind.cardinal(),
                snapshot.sunrise_local().unwrap_or_default(),
                snapshot.sunset_local().unwrap_or_default(),
            )
        }
        WeatherPayload::Forecast(series) => {
            let temps = series.list.iter().map(|s| s.main.temp);
            let low = temps.clone().fold(f64::INFINITY, f64::min);
            let high = temps.fold(f64::NEG_INFINITY, f64::max);
            if series.list.is_empty() {
                "no forecast samples".to_string()
            } else {
                format!("{} samples, {:.1}° to {:.1}°", series.list.len(), low, high)
            }
        }
    }
}
