use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use omniflow::{
    normalize, prepare_prompt, DetailedWeather, NormalizeContext, Provider, RouteComposition,
    RouteStats, RouteStep, Settings, SettingsStore, StoredSettings, TrafficPredictor,
    TrafficPromptBuilder, TripRequest,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "omniflow",
    author,
    version,
    about = "Traffic congestion forecasts for a planned trip"
)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, env = "OMNIFLOW_SETTINGS_FILE")]
    settings_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ask the configured provider for a forecast and print it as JSON
    Predict {
        #[command(flatten)]
        trip: TripArgs,
        #[arg(long)]
        provider: Option<Provider>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the prompt that would be sent, without calling any provider
    Prompt {
        #[command(flatten)]
        trip: TripArgs,
    },
    /// Normalize raw model output (stdin when FILE is omitted)
    Normalize {
        file: Option<PathBuf>,
        /// First hour of a synthesized chart
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..24))]
        hour: u32,
        #[arg(long)]
        weather: Option<PathBuf>,
    },
    /// Manage the saved provider and key
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    Show,
    Save {
        #[arg(long)]
        provider: Provider,
        #[arg(long)]
        api_key: Option<String>,
    },
    Clear,
}

#[derive(Debug, Args)]
struct TripArgs {
    #[arg(long)]
    origin: String,
    #[arg(long)]
    destination: String,
    /// Local departure time, e.g. 2024-05-14T07:30
    #[arg(long)]
    at: String,
    /// JSON file with the destination forecast
    #[arg(long)]
    weather: Option<PathBuf>,
    /// JSON file with route stats and either a composition or routing steps
    #[arg(long)]
    route: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RouteFile {
    stats: RouteStats,
    #[serde(default)]
    composition: Option<RouteComposition>,
    #[serde(default)]
    steps: Vec<RouteStep>,
    #[serde(default)]
    polyline: Vec<[f64; 2]>,
}

impl RouteFile {
    fn composition(&self) -> Option<RouteComposition> {
        match &self.composition {
            Some(composition) => Some(composition.clone()),
            None if !self.steps.is_empty() => Some(RouteComposition::from_steps(&self.steps)),
            None => None,
        }
    }
}

struct Trip {
    request: TripRequest,
    polyline: Vec<[f64; 2]>,
}

impl TripArgs {
    fn load(&self) -> anyhow::Result<Trip> {
        let weather = self
            .weather
            .as_deref()
            .map(read_json::<DetailedWeather>)
            .transpose()?;
        let route = self.route.as_deref().map(read_json::<RouteFile>).transpose()?;

        let mut request = TripRequest::new(&self.origin, &self.destination, &self.at)
            .with_weather(weather);
        let mut polyline = Vec::new();
        if let Some(route) = route {
            request = request.with_route(Some(route.stats), route.composition());
            polyline = route.polyline;
        }
        Ok(Trip { request, polyline })
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn settings_store(path: Option<PathBuf>) -> anyhow::Result<SettingsStore> {
    match path {
        Some(path) => Ok(SettingsStore::new(path)),
        None => Ok(SettingsStore::default_location()?),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsView {
    path: String,
    provider: Provider,
    api_key_saved: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = settings_store(cli.settings_file)?;

    match cli.command {
        Command::Predict {
            trip,
            provider,
            api_key,
            model,
        } => {
            let mut settings = Settings::default()
                .apply_stored(&store.load()?)
                .apply_env()?;
            if let Some(provider) = provider {
                settings.provider = provider;
            }
            if let Some(api_key) = api_key {
                settings = settings.with_api_key(api_key);
            }
            if let Some(model) = model {
                settings = settings.with_model(model);
            }

            tracing::info!(
                provider = %settings.provider,
                settings_file = %store.path().display(),
                "settings loaded"
            );

            let trip = trip.load()?;
            let dispatcher = settings.dispatcher()?;
            let mut prediction = TrafficPredictor::new(dispatcher)
                .predict(&trip.request)
                .await?;
            if !trip.polyline.is_empty() {
                prediction = prediction.with_route_coordinates(trip.polyline);
            }
            print_json(&prediction)?;
        }
        Command::Prompt { trip } => {
            let trip = trip.load()?;
            let prepared = prepare_prompt(&TrafficPromptBuilder::new(), &trip.request)?;
            println!("{}", prepared.text);
        }
        Command::Normalize {
            file,
            hour,
            weather,
        } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut raw = String::new();
                    std::io::stdin()
                        .read_to_string(&mut raw)
                        .context("failed to read stdin")?;
                    raw
                }
            };
            let weather = weather
                .as_deref()
                .map(read_json::<DetailedWeather>)
                .transpose()?
                .map(DetailedWeather::normalized);
            tracing::debug!(bytes = raw.len(), hour, "normalizing model output");
            let context = NormalizeContext::new(hour).with_weather(weather);
            print_json(&normalize(&raw, &context))?;
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => {
                let stored = store.load()?;
                print_json(&SettingsView {
                    path: store.path().display().to_string(),
                    provider: stored.provider,
                    api_key_saved: stored.api_key.is_some(),
                })?;
            }
            SettingsAction::Save { provider, api_key } => {
                store.save(&StoredSettings { provider, api_key })?;
                eprintln!("saved to {}", store.path().display());
            }
            SettingsAction::Clear => {
                store.clear()?;
                eprintln!("removed {}", store.path().display());
            }
        },
    }

    Ok(())
}
