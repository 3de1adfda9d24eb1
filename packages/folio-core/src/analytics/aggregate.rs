//! Portfolio aggregation: date alignment, weighted returns and value curve.

use super::weights::WeightVector;
use crate::types::{ReturnPoint, ReturnSeries, ValuePoint};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Symbol used for the aggregated portfolio return series.
pub const PORTFOLIO_SYMBOL: &str = "PORTFOLIO";

/// Asset returns restricted to the dates every asset has in common.
#[derive(Debug, Clone)]
pub struct AlignedReturns {
    /// Common dates, ascending
    pub dates: Vec<NaiveDate>,
    /// One column per asset, each with exactly `dates.len()` points
    pub columns: Vec<ReturnSeries>,
}

impl AlignedReturns {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Intersect the dates of every series and keep only those rows.
pub fn align_returns(series: &[ReturnSeries]) -> AlignedReturns {
    let Some((first, rest)) = series.split_first() else {
        return AlignedReturns {
            dates: Vec::new(),
            columns: Vec::new(),
        };
    };

    let dates: Vec<NaiveDate> = first
        .points
        .iter()
        .map(|p| p.date)
        .filter(|&date| rest.iter().all(|s| s.get(date).is_some()))
        .collect();

    let columns = series
        .iter()
        .map(|s| ReturnSeries {
            symbol: s.symbol.clone(),
            points: dates
                .iter()
                .filter_map(|&date| s.get(date).map(|value| ReturnPoint { date, value }))
                .collect(),
        })
        .collect();

    let longest = series.iter().map(|s| s.len()).max().unwrap_or(0);
    if dates.len() < longest {
        tracing::debug!(
            common = dates.len(),
            longest,
            "Date alignment dropped non-overlapping rows"
        );
    }

    AlignedReturns { dates, columns }
}

/// Weighted sum of aligned asset returns for each common date.
pub fn portfolio_returns(aligned: &AlignedReturns, weights: &WeightVector) -> ReturnSeries {
    let fractions: Vec<f64> = aligned
        .columns
        .iter()
        .map(|c| weights.fraction(&c.symbol).unwrap_or(0.0))
        .collect();

    let points = aligned
        .dates
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let value = aligned
                .columns
                .iter()
                .zip(&fractions)
                .map(|(column, w)| column.points[i].value * w)
                .sum();
            ReturnPoint { date, value }
        })
        .collect();

    ReturnSeries {
        symbol: PORTFOLIO_SYMBOL.to_string(),
        points,
    }
}

/// Compound returns into a value curve starting from `initial_investment`.
///
/// The first point already includes the first return.
pub fn value_series(returns: &ReturnSeries, initial_investment: f64) -> Vec<ValuePoint> {
    let mut value = initial_investment;
    returns
        .points
        .iter()
        .map(|r| {
            value *= 1.0 + r.value;
            ValuePoint {
                date: r.date,
                value,
            }
        })
        .collect()
}

/// Calculate holding period return as a percentage.
pub fn holding_period_return(initial_value: f64, final_value: f64) -> f64 {
    if initial_value <= 0.0 {
        return 0.0;
    }
    ((final_value - initial_value) / initial_value) * 100.0
}

/// Annualize a total return over elapsed calendar days.
///
/// Returns the annualized return as a fraction, or `None` when no calendar
/// time has elapsed.
pub fn annualize_calendar_return(
    initial_value: f64,
    final_value: f64,
    elapsed_days: i64,
) -> Option<f64> {
    if elapsed_days <= 0 || initial_value <= 0.0 {
        return None;
    }

    let growth = final_value / initial_value;
    Some(growth.powf(365.0 / elapsed_days as f64) - 1.0)
}

/// Summary scalars for a simulated portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioSummary {
    /// Starting capital
    pub initial_investment: f64,
    /// Value after the last aligned return
    pub final_value: f64,
    /// Total return percentage
    pub total_return_pct: f64,
    /// Calendar-annualized return percentage (None when no days elapsed)
    pub annualized_return_pct: Option<f64>,
    /// First aligned date
    pub start_date: NaiveDate,
    /// Last aligned date
    pub end_date: NaiveDate,
    /// Number of aligned daily returns
    pub observations: usize,
}

impl PortfolioSummary {
    /// Summarize a value curve.
    pub fn from_values(initial_investment: f64, values: &[ValuePoint]) -> Result<Self> {
        let (first, last) = match (values.first(), values.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(Error::InsufficientData {
                    symbol: PORTFOLIO_SYMBOL.to_string(),
                    points: 0,
                })
            }
        };

        let elapsed_days = (last.date - first.date).num_days();

        Ok(Self {
            initial_investment,
            final_value: last.value,
            total_return_pct: holding_period_return(initial_investment, last.value),
            annualized_return_pct: annualize_calendar_return(
                initial_investment,
                last.value,
                elapsed_days,
            )
            .map(|r| r * 100.0),
            start_date: first.date,
            end_date: last.date,
            observations: values.len(),
        })
    }
}
