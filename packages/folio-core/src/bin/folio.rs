//! Folio CLI - portfolio analytics, markers and routes.
//!
//! All results are printed as JSON on stdout; logs go to stderr.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use folio_core::{
    analytics::{analyze, AnalysisRequest},
    markers::{JsonMarkerStore, MarkerStore},
    prices::{fetch_prices, JsonPriceFile, PriceProvider, PriceSummary},
    routes::{GoogleDirectionsClient, ModeSelection, RoutePlanner},
    ApiResponse, FolioConfig, WeightVector,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - portfolio simulation, markers and routes")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a weighted portfolio and compute risk metrics
    Analyze {
        /// JSON price file
        #[arg(short, long)]
        prices: PathBuf,
        /// Asset weight in percent, e.g. AAPL=60 (repeatable)
        #[arg(short, long = "weight", value_parser = parse_weight, required = true)]
        weights: Vec<(String, f64)>,
        /// Starting capital
        #[arg(short, long)]
        investment: Option<f64>,
        /// Days in the stress scenario
        #[arg(long)]
        stress_window: Option<usize>,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Latest close and period range for a symbol
    Quote {
        /// JSON price file
        #[arg(short, long)]
        prices: PathBuf,
        /// Stock symbol
        #[arg(short, long)]
        symbol: String,
    },
    /// Marker management commands
    Marker {
        #[command(subcommand)]
        action: MarkerAction,
    },
    /// Route between two saved markers
    Route {
        /// Origin marker label
        #[arg(long)]
        from: String,
        /// Destination marker label
        #[arg(long)]
        to: String,
        /// driving, walking or both
        #[arg(short, long, default_value = "driving")]
        mode: ModeSelection,
    },
}

#[derive(Subcommand)]
enum MarkerAction {
    /// List saved markers
    List,
    /// Save a marker
    Add {
        /// Place name (defaults to "Marker N")
        #[arg(short, long, default_value = "")]
        label: String,
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Remove a marker by id
    Remove {
        /// Marker id
        #[arg(long)]
        id: Uuid,
    },
}

fn parse_weight(s: &str) -> std::result::Result<(String, f64), String> {
    let (symbol, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=PERCENT, got '{}'", s))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|e| format!("invalid weight '{}': {}", weight, e))?;
    Ok((symbol.trim().to_string(), weight))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FolioConfig::from_file(path)?,
        None => FolioConfig::load()?,
    };

    let output = match cli.command {
        Commands::Analyze {
            prices,
            weights,
            investment,
            stress_window,
            start,
            end,
        } => respond(handle_analyze(
            &config,
            prices,
            weights,
            investment,
            stress_window,
            start,
            end,
        )),
        Commands::Quote { prices, symbol } => respond(handle_quote(prices, &symbol)),
        Commands::Marker { action } => respond(handle_marker(&config, action)),
        Commands::Route { from, to, mode } => respond(handle_route(&config, &from, &to, mode)),
    };

    println!("{}", output);
    Ok(())
}

/// Wrap a handler result in the JSON envelope.
fn respond<T: Serialize>(result: folio_core::Result<T>) -> String {
    let rendered = match result {
        Ok(data) => serde_json::to_string_pretty(&ApiResponse::ok(data)),
        Err(e) => serde_json::to_string_pretty(&ApiResponse::<()>::err(e.to_string())),
    };
    rendered.unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"{}"}}"#, e))
}

fn handle_analyze(
    config: &FolioConfig,
    prices: PathBuf,
    weights: Vec<(String, f64)>,
    investment: Option<f64>,
    stress_window: Option<usize>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> folio_core::Result<serde_json::Value> {
    let weights = WeightVector::from_percentages(weights)?;
    let provider = JsonPriceFile::open(&prices)?;

    let symbols: Vec<String> = weights.symbols().map(str::to_string).collect();
    let series = fetch_prices(&provider, &symbols, start, end);

    let mut request = AnalysisRequest::from_config(series, weights, &config.analysis);
    if let Some(amount) = investment {
        request.initial_investment = amount;
    }
    if let Some(window) = stress_window {
        request = request.with_stress_window(window);
    }

    let analysis = analyze(&request)?;
    Ok(json!({ "analysis": analysis }))
}

fn handle_quote(prices: PathBuf, symbol: &str) -> folio_core::Result<serde_json::Value> {
    let provider = JsonPriceFile::open(&prices)?;
    let series = provider.price_history(symbol, None, None)?;

    let summary = PriceSummary::from_series(&series).ok_or(folio_core::Error::InsufficientData {
        symbol: series.symbol.clone(),
        points: 0,
    })?;
    Ok(json!({ "quote": summary }))
}

fn handle_marker(
    config: &FolioConfig,
    action: MarkerAction,
) -> folio_core::Result<serde_json::Value> {
    let mut store = JsonMarkerStore::open(config.markers_path())?;

    match action {
        MarkerAction::List => {
            let markers = store.list()?;
            Ok(json!({ "markers": markers, "count": markers.len() }))
        }
        MarkerAction::Add { label, lat, lon } => {
            let marker = store.append(&label, lat, lon)?;
            Ok(json!({ "marker": marker }))
        }
        MarkerAction::Remove { id } => {
            let removed = store.delete(id)?;
            Ok(json!({ "removed": removed }))
        }
    }
}

fn handle_route(
    config: &FolioConfig,
    from: &str,
    to: &str,
    mode: ModeSelection,
) -> folio_core::Result<serde_json::Value> {
    let store = JsonMarkerStore::open(config.markers_path())?;

    let directions = &config.directions;
    let client = GoogleDirectionsClient::new(
        directions.resolved_api_key(),
        &directions.language,
        Duration::from_secs(directions.timeout_secs),
    )?;

    let planner = RoutePlanner::new(client).with_walking_limit(directions.walking_limit_km);
    let plan = planner.plan_between(&store, from, to, mode)?;
    Ok(json!({ "route": plan }))
}
