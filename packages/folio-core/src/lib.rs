//! Folio Core - Portfolio return and risk analytics.
//!
//! This crate provides:
//!
//! - **Return normalization**: daily returns from raw price histories
//! - **Portfolio aggregation**: weighted returns, value curve, calendar annualization
//! - **Risk metrics**: historical VaR/CVaR, max drawdown, stress scenario, correlation
//! - **Markers**: labelled map coordinates with stable identifiers
//! - **Routes**: directions lookups per travel mode
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use folio_core::analytics::{analyze, AnalysisRequest};
//! use folio_core::{PriceSeries, WeightVector};
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
//! let aapl = PriceSeries::from_closes("AAPL", &[(d(2), 100.0), (d(3), 101.0), (d(4), 103.0)]).unwrap();
//! let msft = PriceSeries::from_closes("MSFT", &[(d(2), 50.0), (d(3), 49.0), (d(4), 50.5)]).unwrap();
//!
//! let weights = WeightVector::from_percentages([("AAPL", 60.0), ("MSFT", 40.0)]).unwrap();
//! let request = AnalysisRequest::new(vec![aapl, msft], weights, 1_000_000.0);
//!
//! let analysis = analyze(&request).unwrap();
//! let result = analysis.result.expect("aligned dates");
//! println!("Final value: {:.2}", result.summary.final_value);
//! ```

pub mod analytics;
pub mod config;
pub mod markers;
pub mod prices;
pub mod routes;
pub mod types;

// Re-export commonly used types
pub use types::{ApiResponse, PricePoint, PriceSeries, ReturnPoint, ReturnSeries, ValuePoint};

// Re-export main functionality
pub use analytics::{
    analyze, AnalysisRequest, AnalysisWarning, PortfolioAnalysis, RiskReport, WeightVector,
};
pub use config::FolioConfig;
pub use markers::{JsonMarkerStore, Marker, MarkerStore, MemoryMarkerStore};
pub use prices::{JsonPriceFile, PriceProvider, PriceSummary};
pub use routes::{RouteOutcome, RoutePlanner, TravelMode};

/// Error types for folio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Insufficient data for {symbol}: {points} usable points")]
    InsufficientData { symbol: String, points: usize },

    #[error("No valid assets remain after exclusions")]
    NoValidAssets,

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Marker not found: {0}")]
    MarkerNotFound(String),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;
