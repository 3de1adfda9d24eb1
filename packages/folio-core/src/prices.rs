//! Price history providers and quote summaries.

use crate::types::{PricePoint, PriceSeries};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Source of daily closing prices.
///
/// Implementations may fail or return an empty series; callers treat both
/// as "no data for this symbol".
pub trait PriceProvider {
    fn price_history(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries>;
}

#[derive(Debug, Deserialize)]
struct RawPricePoint {
    date: NaiveDate,
    /// `null` marks a missing close
    close: Option<f64>,
}

/// Price histories loaded from a JSON file.
///
/// Format: `{ "AAPL": [{ "date": "2024-01-02", "close": 185.6 }, ...], ... }`
#[derive(Debug, Clone, Default)]
pub struct JsonPriceFile {
    series: BTreeMap<String, PriceSeries>,
}

impl JsonPriceFile {
    /// Load and validate all series in a file.
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a price file. A symbol whose history is invalid (for example a
    /// repeated date) is skipped with a warning; the others still load.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<RawPricePoint>> = serde_json::from_str(content)?;

        let mut series = BTreeMap::new();
        for (symbol, points) in raw {
            let points = points
                .into_iter()
                .map(|p| PricePoint::new(p.date, p.close.unwrap_or(f64::NAN)))
                .collect();
            match PriceSeries::new(&symbol, points) {
                Ok(parsed) => {
                    series.insert(parsed.symbol.clone(), parsed);
                }
                Err(e) => tracing::warn!(symbol = %symbol, "Skipping price history: {}", e),
            }
        }

        tracing::debug!(symbols = series.len(), "Loaded price file");
        Ok(Self { series })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|s| s.as_str())
    }
}

impl PriceProvider for JsonPriceFile {
    fn price_history(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries> {
        self.series
            .get(&symbol.to_uppercase())
            .map(|s| s.between(start, end))
            .ok_or_else(|| Error::Provider(format!("no price history for {}", symbol)))
    }
}

/// Fetch price histories for several symbols.
///
/// A provider failure for one symbol yields an empty series for it; the
/// other symbols are still fetched.
pub fn fetch_prices<P: PriceProvider + ?Sized>(
    provider: &P,
    symbols: &[String],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<PriceSeries> {
    symbols
        .iter()
        .map(|symbol| match provider.price_history(symbol, start, end) {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(symbol = %symbol, "Price provider failed: {}", e);
                PriceSeries::empty(symbol)
            }
        })
        .collect()
}

/// Latest close and period range for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSummary {
    pub symbol: String,
    pub latest_close: f64,
    pub latest_date: NaiveDate,
    /// Highest close in the period
    pub period_high: f64,
    /// Lowest close in the period
    pub period_low: f64,
    pub start_date: NaiveDate,
    /// Number of usable closes
    pub observations: usize,
}

impl PriceSummary {
    /// Summarize usable closes; `None` when there are none.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let usable: Vec<&PricePoint> = series
            .points()
            .iter()
            .filter(|p| p.close.is_finite() && p.close > 0.0)
            .collect();

        let first = usable.first()?;
        let last = usable.last()?;

        let period_high = usable.iter().map(|p| p.close).fold(f64::MIN, f64::max);
        let period_low = usable.iter().map(|p| p.close).fold(f64::MAX, f64::min);

        Some(Self {
            symbol: series.symbol.clone(),
            latest_close: last.close,
            latest_date: last.date,
            period_high,
            period_low,
            start_date: first.date,
            observations: usable.len(),
        })
    }
}
