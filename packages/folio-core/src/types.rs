//! Core data types for the folio analytics engine.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single closing price observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closing prices for one asset, ordered by strictly increasing date.
///
/// Missing trading days are simply absent. The series may be empty when a
/// provider had nothing for the symbol; the normalizer excludes such assets.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceSeries {
    /// Asset identifier (uppercase)
    pub symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series, sorting points by date.
    ///
    /// Returns an error if two points share the same date.
    pub fn new(symbol: &str, mut points: Vec<PricePoint>) -> Result<Self> {
        points.sort_by_key(|p| p.date);

        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(Error::InvalidInput(format!(
                "duplicate date {} in price series for {}",
                pair[0].date,
                symbol.to_uppercase()
            )));
        }

        Ok(Self {
            symbol: symbol.to_uppercase(),
            points,
        })
    }

    /// Create a series from `(date, close)` pairs.
    pub fn from_closes(symbol: &str, closes: &[(NaiveDate, f64)]) -> Result<Self> {
        let points = closes
            .iter()
            .map(|&(date, close)| PricePoint::new(date, close))
            .collect();
        Self::new(symbol, points)
    }

    /// An empty series, used when a provider returned no data.
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Keep only points within the inclusive date range.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let points = self
            .points
            .iter()
            .filter(|p| start.map_or(true, |s| p.date >= s))
            .filter(|p| end.map_or(true, |e| p.date <= e))
            .copied()
            .collect();

        Self {
            symbol: self.symbol.clone(),
            points,
        }
    }
}

/// A fractional return dated at the later of its two prices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    /// Fractional return (0.01 = 1%)
    pub value: f64,
}

/// Daily returns for one asset (or for the whole portfolio).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnSeries {
    /// Asset identifier, or `PORTFOLIO` for aggregated returns
    pub symbol: String,
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Raw return values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Look up the return on a given date.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }
}

/// Portfolio value on a given date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// API response wrapper used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
