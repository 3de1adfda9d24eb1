//! Portfolio risk metrics calculation.
//!
//! Historical VaR/CVaR, annualized return and volatility, Sharpe-like ratio,
//! max drawdown, worst/best days and a short-horizon stress scenario.

use crate::types::{ReturnPoint, ReturnSeries, ValuePoint};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Daily standard deviations below this are treated as zero volatility.
pub const ZERO_VOLATILITY_EPSILON: f64 = 1e-12;

/// Default number of days used for the stress scenario and worst/best lists.
pub const DEFAULT_STRESS_WINDOW: usize = 5;

/// Annualized return statistics for a daily return series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnStatistics {
    /// Mean daily return (fraction)
    pub daily_mean: f64,
    /// Sample standard deviation of daily returns (fraction)
    pub daily_std: f64,
    /// Mean daily return × trading days
    pub annualized_return: f64,
    /// Daily standard deviation × √(trading days)
    pub annualized_volatility: f64,
    /// Annualized return / annualized volatility, undefined at zero volatility
    pub sharpe_ratio: Option<f64>,
    /// Number of daily returns used
    pub observations: usize,
}

/// Historical risk report for a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskReport {
    /// 5th percentile of daily returns
    pub var_95: f64,
    /// 1st percentile of daily returns
    pub var_99: f64,
    /// Mean of returns at or below `var_95`
    pub cvar_95: f64,
    /// Mean of returns at or below `var_99`
    pub cvar_99: f64,
    /// Worst peak-to-trough decline (≤ 0)
    pub max_drawdown: f64,
    /// Lowest daily returns, worst first
    pub worst_days: Vec<ReturnPoint>,
    /// Highest daily returns, best first
    pub best_days: Vec<ReturnPoint>,
    /// Days compounded in the stress scenario
    pub stress_window: usize,
    /// `(1 + mean(worst k))^k - 1`
    pub stress_return: f64,
    /// Final portfolio value after applying `stress_return`
    pub stress_projected_value: f64,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|r| (r - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    let std = variance.sqrt();
    if std < ZERO_VOLATILITY_EPSILON {
        0.0
    } else {
        std
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Quantile with linear interpolation between order statistics.
///
/// `q` is clamped to [0, 1]. Returns `None` for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted(values);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Historical Value at Risk as a daily return threshold.
///
/// # Arguments
///
/// * `returns` - Daily returns
/// * `confidence` - Confidence level (e.g., 0.95 for 95%)
///
/// # Returns
///
/// The `(1 - confidence)` quantile of the returns. A loss is negative.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> Option<f64> {
    quantile(returns, 1.0 - confidence)
}

/// Conditional VaR: the mean of all returns at or below the VaR threshold.
pub fn conditional_value_at_risk(returns: &[f64], confidence: f64) -> Option<f64> {
    let var = value_at_risk(returns, confidence)?;
    let tail: Vec<f64> = returns.iter().copied().filter(|&r| r <= var).collect();

    if tail.is_empty() {
        return Some(var);
    }
    Some(mean(&tail))
}

/// Calculate annualized return, volatility and the Sharpe-like ratio.
pub fn return_statistics(returns: &[f64]) -> ReturnStatistics {
    let daily_mean = mean(returns);
    let daily_std = sample_std(returns);

    let annualized_return = daily_mean * TRADING_DAYS_PER_YEAR;
    let annualized_volatility = daily_std * TRADING_DAYS_PER_YEAR.sqrt();

    let sharpe_ratio = if annualized_volatility > 0.0 {
        Some(annualized_return / annualized_volatility)
    } else {
        None
    };

    ReturnStatistics {
        daily_mean,
        daily_std,
        annualized_return,
        annualized_volatility,
        sharpe_ratio,
        observations: returns.len(),
    }
}

/// Calculate maximum drawdown from a value curve.
///
/// Returns `min(value[t] / max(value[0..=t]) - 1)`, which is never positive.
pub fn max_drawdown(values: &[ValuePoint]) -> f64 {
    let mut running_max = f64::NEG_INFINITY;
    let mut max_drawdown: f64 = 0.0;

    for point in values {
        if point.value > running_max {
            running_max = point.value;
        }
        if running_max > 0.0 {
            let drawdown = point.value / running_max - 1.0;
            if drawdown < max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    max_drawdown
}

/// The `k` lowest returns, worst first.
pub fn worst_days(returns: &ReturnSeries, k: usize) -> Vec<ReturnPoint> {
    let mut points = returns.points.clone();
    points.sort_by(|a, b| a.value.total_cmp(&b.value).then(a.date.cmp(&b.date)));
    points.truncate(k);
    points
}

/// The `k` highest returns, best first.
pub fn best_days(returns: &ReturnSeries, k: usize) -> Vec<ReturnPoint> {
    let mut points = returns.points.clone();
    points.sort_by(|a, b| b.value.total_cmp(&a.value).then(a.date.cmp(&b.date)));
    points.truncate(k);
    points
}

/// Compound the mean of the `window` worst returns over `window` days.
///
/// The window is capped at the number of returns. Returns the stress return
/// and the window actually used.
pub fn stress_scenario(returns: &[f64], window: usize) -> (f64, usize) {
    let k = window.min(returns.len());
    if k == 0 {
        return (0.0, 0);
    }

    let ordered = sorted(returns);
    let stress = (1.0 + mean(&ordered[..k])).powi(k as i32) - 1.0;
    (stress, k)
}

/// Calculate the full risk report for a portfolio.
///
/// # Arguments
///
/// * `returns` - Daily portfolio returns
/// * `values` - Portfolio value curve built from the same returns
/// * `stress_window` - Days used for the stress scenario and worst/best lists
///
/// # Errors
///
/// `Error::InsufficientData` if there are no returns, `Error::InvalidInput`
/// if the stress window is zero.
pub fn calculate_risk_report(
    returns: &ReturnSeries,
    values: &[ValuePoint],
    stress_window: usize,
) -> Result<RiskReport> {
    if stress_window == 0 {
        return Err(Error::InvalidInput(
            "stress window must be positive".to_string(),
        ));
    }

    let raw = returns.values();
    let insufficient = || Error::InsufficientData {
        symbol: returns.symbol.clone(),
        points: raw.len(),
    };

    let var_95 = value_at_risk(&raw, 0.95).ok_or_else(insufficient)?;
    let var_99 = value_at_risk(&raw, 0.99).ok_or_else(insufficient)?;
    let cvar_95 = conditional_value_at_risk(&raw, 0.95).ok_or_else(insufficient)?;
    let cvar_99 = conditional_value_at_risk(&raw, 0.99).ok_or_else(insufficient)?;

    let (stress_return, window) = stress_scenario(&raw, stress_window);
    let final_value = values.last().map(|v| v.value).unwrap_or(0.0);

    Ok(RiskReport {
        var_95,
        var_99,
        cvar_95,
        cvar_99,
        max_drawdown: max_drawdown(values),
        worst_days: worst_days(returns, window),
        best_days: best_days(returns, window),
        stress_window: window,
        stress_return,
        stress_projected_value: final_value * (1.0 + stress_return),
    })
}
