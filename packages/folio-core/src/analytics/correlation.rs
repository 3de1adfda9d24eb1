//! Pairwise Pearson correlation of asset returns.

use super::aggregate::AlignedReturns;
use super::risk::ZERO_VOLATILITY_EPSILON;
use serde::{Deserialize, Serialize};

/// Symmetric correlation matrix over a set of assets.
///
/// An entry is `None` when either series has zero variance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two symbols, if both are present and defined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s.eq_ignore_ascii_case(a))?;
        let j = self.symbols.iter().position(|s| s.eq_ignore_ascii_case(b))?;
        self.values[i][j]
    }
}

/// Pearson correlation coefficient of two equally long samples.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let std_x = (var_x / n).sqrt();
    let std_y = (var_y / n).sqrt();
    if std_x < ZERO_VOLATILITY_EPSILON || std_y < ZERO_VOLATILITY_EPSILON {
        return None;
    }

    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// Build the correlation matrix for aligned asset returns.
///
/// Returns `None` unless at least two assets share at least two dates.
pub fn correlation_matrix(aligned: &AlignedReturns) -> Option<CorrelationMatrix> {
    if aligned.columns.len() < 2 || aligned.len() < 2 {
        return None;
    }

    let columns: Vec<Vec<f64>> = aligned.columns.iter().map(|c| c.values()).collect();
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let rho = pearson(&columns[i], &columns[j]);
            values[i][j] = rho;
            values[j][i] = rho;
        }
    }

    Some(CorrelationMatrix {
        symbols: aligned.columns.iter().map(|c| c.symbol.clone()).collect(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregate::align_returns;
    use crate::types::{ReturnPoint, ReturnSeries};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn returns(symbol: &str, values: &[f64]) -> ReturnSeries {
        ReturnSeries {
            symbol: symbol.to_string(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, &value)| ReturnPoint {
                    date: NaiveDate::from_ymd_opt(2024, 2, i as u32 + 1).unwrap(),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn test_pearson_perfect() {
        let x = [0.01, 0.02, -0.01, 0.03];
        let y: Vec<f64> = x.iter().map(|v| v * 2.0 + 0.001).collect();
        let z: Vec<f64> = x.iter().map(|v| -v).collect();

        assert_relative_eq!(pearson(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(&x, &z).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        assert_eq!(pearson(&[0.01, 0.01, 0.01], &[0.01, 0.02, 0.03]), None);
        assert_eq!(pearson(&[0.01], &[0.02]), None);
        assert_eq!(pearson(&[0.01, 0.02], &[0.02]), None);
    }

    #[test]
    fn test_correlation_matrix() {
        let a = returns("A", &[0.01, 0.02, -0.01, 0.03]);
        let b = returns("B", &[-0.01, -0.02, 0.01, -0.03]);
        let c = returns("C", &[0.02, -0.01, 0.00, 0.01]);

        let matrix = correlation_matrix(&align_returns(&[a, b, c])).unwrap();

        assert_eq!(matrix.symbols, vec!["A", "B", "C"]);
        assert_relative_eq!(matrix.get("A", "A").unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(matrix.get("A", "B").unwrap(), -1.0, epsilon = 1e-12);
        assert_eq!(matrix.get("A", "C"), matrix.get("C", "A"));
        assert_eq!(matrix.get("A", "Z"), None);
    }

    #[test]
    fn test_correlation_matrix_single_asset() {
        let a = returns("A", &[0.01, 0.02, -0.01]);
        assert!(correlation_matrix(&align_returns(&[a])).is_none());
    }
}
