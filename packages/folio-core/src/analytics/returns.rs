//! Price normalization: raw closing prices to daily returns.

use crate::types::{PriceSeries, ReturnPoint, ReturnSeries};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// An asset dropped from the portfolio before aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExcludedAsset {
    pub symbol: String,
    /// Human-readable reason
    pub reason: String,
}

/// Output of normalizing a batch of price series.
#[derive(Debug, Clone, Default)]
pub struct NormalizedReturns {
    /// One return series per surviving asset, in input order
    pub series: Vec<ReturnSeries>,
    /// Assets that could not produce any usable return
    pub excluded: Vec<ExcludedAsset>,
}

/// A price that can anchor a return. Zero, negative and non-finite closes count as missing.
fn is_usable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Calculate simple daily returns for one asset.
///
/// Each return is dated at the later of the two closes. Returns touching an
/// unusable price are skipped rather than propagated.
///
/// # Errors
///
/// `Error::InsufficientData` if the series has fewer than 2 points, or if no
/// defined return remains after skipping unusable prices.
pub fn daily_returns(prices: &PriceSeries) -> Result<ReturnSeries> {
    if prices.len() < 2 {
        return Err(Error::InsufficientData {
            symbol: prices.symbol.clone(),
            points: prices.len(),
        });
    }

    let mut points = Vec::with_capacity(prices.len() - 1);
    let mut skipped = 0usize;

    for pair in prices.points().windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if !is_usable_price(prev.close) || !is_usable_price(curr.close) {
            skipped += 1;
            continue;
        }

        let value = curr.close / prev.close - 1.0;
        if value.is_finite() {
            points.push(ReturnPoint {
                date: curr.date,
                value,
            });
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        tracing::debug!(
            symbol = %prices.symbol,
            skipped,
            "Skipped undefined returns around unusable prices"
        );
    }

    if points.is_empty() {
        return Err(Error::InsufficientData {
            symbol: prices.symbol.clone(),
            points: prices
                .points()
                .iter()
                .filter(|p| is_usable_price(p.close))
                .count(),
        });
    }

    Ok(ReturnSeries {
        symbol: prices.symbol.clone(),
        points,
    })
}

/// Normalize every asset, excluding the ones with insufficient data.
///
/// Exclusion is local to the asset; the rest of the batch is still returned.
pub fn normalize(prices: &[PriceSeries]) -> NormalizedReturns {
    let mut out = NormalizedReturns::default();

    for series in prices {
        match daily_returns(series) {
            Ok(returns) => out.series.push(returns),
            Err(e) => {
                tracing::warn!(symbol = %series.symbol, "Excluding asset: {}", e);
                out.excluded.push(ExcludedAsset {
                    symbol: series.symbol.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    out
}
