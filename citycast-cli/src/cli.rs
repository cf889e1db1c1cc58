use anyhow::Context;
use citycast_core::{Config, MockGenerator, UnitSystem, WeatherService, WeatherSnapshot};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, PasswordDisplayMode, Select};
use tracing::{debug, warn};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Current weather and a 3-day forecast")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Temperature unit used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayUnit {
    C,
    F,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferred request units.
    Configure,

    /// Show weather for one or more cities.
    Show {
        /// City names; repeated names are shown once.
        #[arg(required = true)]
        cities: Vec<String>,

        /// Temperature unit for display.
        #[arg(long, value_enum, default_value_t = DisplayUnit::C)]
        unit: DisplayUnit,

        /// Print snapshots as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Skip the provider and show generated demo data.
        #[arg(long)]
        offline: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                cities,
                unit,
                json,
                offline,
            } => show(&cities, unit, json, offline).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    config.set_api_key(api_key.to_string());

    let options = vec![UnitSystem::Standard, UnitSystem::Metric, UnitSystem::Imperial];
    let current = options
        .iter()
        .position(|u| *u == config.openweather.units)
        .unwrap_or(0);
    config.openweather.units = Select::new("Units to request from the provider:", options)
        .with_starting_cursor(current)
        .prompt()
        .context("Failed to read unit system")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(cities: &[String], unit: DisplayUnit, json: bool, offline: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let service = if offline {
        WeatherService::offline(MockGenerator::new(config.fallback.delay()))
    } else {
        WeatherService::from_config(&config)?
    };

    let shown = search_all(&service, cities).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        let cards: Vec<String> = shown.iter().map(|s| render::card(s, unit)).collect();
        println!("{}", cards.join("\n"));
    }

    Ok(())
}

/// Resolve every city in argument order. Blank arguments are skipped.
async fn search_all(service: &WeatherService, cities: &[String]) -> anyhow::Result<Vec<WeatherSnapshot>> {
    let mut shown: Vec<WeatherSnapshot> = Vec::new();
    for city in cities {
        if city.trim().is_empty() {
            warn!("skipping blank city argument");
            continue;
        }

        let (snapshot, source) = service.get_weather_with_source(city).await?;
        debug!(city = %city, ?source, "search resolved");
        upsert_by_name(&mut shown, snapshot);
    }

    Ok(shown)
}

/// Insert `snapshot`, replacing an entry for the same location name in place.
fn upsert_by_name(shown: &mut Vec<WeatherSnapshot>, snapshot: WeatherSnapshot) {
    match shown
        .iter_mut()
        .find(|s| s.location.name == snapshot.location.name)
    {
        Some(existing) => *existing = snapshot,
        None => shown.push(snapshot),
    }
}
