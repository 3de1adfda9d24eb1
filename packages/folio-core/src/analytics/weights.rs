//! Portfolio weights expressed in percent.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that weights sum to 100.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Asset weights in percent, summing to 100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightVector {
    entries: Vec<(String, f64)>,
}

impl WeightVector {
    /// Validate caller-supplied percentages.
    ///
    /// Every weight must be finite and non-negative, symbols must be unique
    /// (case-insensitive) and the total must be 100.
    pub fn from_percentages<I, S>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut entries: Vec<(String, f64)> = Vec::new();

        for (symbol, weight) in weights {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if symbol.is_empty() {
                return Err(Error::InvalidWeights("empty asset symbol".to_string()));
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidWeights(format!(
                    "{} has invalid weight {}",
                    symbol, weight
                )));
            }
            if entries.iter().any(|(s, _)| *s == symbol) {
                return Err(Error::InvalidWeights(format!("{} listed twice", symbol)));
            }
            entries.push((symbol, weight));
        }

        if entries.is_empty() {
            return Err(Error::InvalidWeights("no assets selected".to_string()));
        }

        let total: f64 = entries.iter().map(|(_, w)| w).sum();
        if (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::InvalidWeights(format!(
                "weights sum to {}, expected 100",
                total
            )));
        }

        Ok(Self { entries })
    }

    /// Rescale the weights of the surviving assets so they sum to 100 again.
    ///
    /// Symbols in `survivors` that carry no weight are ignored.
    ///
    /// # Errors
    ///
    /// `Error::NoValidAssets` if nothing survives or the surviving weight is zero.
    pub fn renormalize<S: AsRef<str>>(&self, survivors: &[S]) -> Result<Self> {
        let kept: Vec<(String, f64)> = self
            .entries
            .iter()
            .filter(|(symbol, _)| {
                survivors
                    .iter()
                    .any(|s| s.as_ref().eq_ignore_ascii_case(symbol))
            })
            .cloned()
            .collect();

        let total: f64 = kept.iter().map(|(_, w)| w).sum();
        if kept.is_empty() || total <= 0.0 {
            return Err(Error::NoValidAssets);
        }

        if kept.len() < self.entries.len() {
            tracing::info!(
                surviving = kept.len(),
                requested = self.entries.len(),
                surviving_weight = total,
                "Renormalizing weights over surviving assets"
            );
        }

        let entries = kept
            .into_iter()
            .map(|(symbol, w)| (symbol, w * 100.0 / total))
            .collect();

        Ok(Self { entries })
    }

    /// Weight in percent for a symbol.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, w)| *w)
    }

    /// Weight as a fraction of 1.
    pub fn fraction(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).map(|w| w / 100.0)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(s, w)| (s.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_from_percentages() {
        let weights = WeightVector::from_percentages([("aapl", 60.0), ("MSFT", 40.0)]).unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights.get("AAPL"), Some(60.0));
        assert_eq!(weights.fraction("msft"), Some(0.4));
    }

    #[test]
    fn test_from_percentages_bad_sum() {
        let result = WeightVector::from_percentages([("AAPL", 60.0), ("MSFT", 30.0)]);
        assert!(matches!(result, Err(Error::InvalidWeights(_))));
    }

    #[test]
    fn test_from_percentages_rejects_negative_and_duplicates() {
        let negative = WeightVector::from_percentages([("AAPL", 120.0), ("MSFT", -20.0)]);
        assert!(matches!(negative, Err(Error::InvalidWeights(_))));

        let duplicate = WeightVector::from_percentages([("AAPL", 50.0), ("aapl", 50.0)]);
        assert!(matches!(duplicate, Err(Error::InvalidWeights(_))));

        let empty = WeightVector::from_percentages(Vec::<(&str, f64)>::new());
        assert!(matches!(empty, Err(Error::InvalidWeights(_))));
    }

    #[test]
    fn test_renormalize_subset() {
        let weights =
            WeightVector::from_percentages([("A", 60.0), ("B", 25.0), ("C", 15.0)]).unwrap();

        let renormalized = weights.renormalize(&["B", "C"]).unwrap();

        assert_eq!(renormalized.len(), 2);
        assert_abs_diff_eq!(renormalized.total(), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(renormalized.get("B").unwrap(), 62.5, epsilon = 1e-9);
        assert_abs_diff_eq!(renormalized.get("C").unwrap(), 37.5, epsilon = 1e-9);
    }

    #[test]
    fn test_renormalize_sums_to_hundred_for_every_subset() {
        let weights = WeightVector::from_percentages([
            ("A", 7.0),
            ("B", 13.0),
            ("C", 29.0),
            ("D", 51.0),
        ])
        .unwrap();
        let symbols = ["A", "B", "C", "D"];

        for mask in 1u32..16 {
            let subset: Vec<&str> = symbols
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, s)| *s)
                .collect();

            let renormalized = weights.renormalize(&subset).unwrap();
            assert_abs_diff_eq!(renormalized.total(), 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_renormalize_zero_weight_survivors() {
        let weights = WeightVector::from_percentages([("A", 100.0), ("B", 0.0)]).unwrap();
        assert!(matches!(weights.renormalize(&["B"]), Err(Error::NoValidAssets)));
        assert!(matches!(
            weights.renormalize::<&str>(&[]),
            Err(Error::NoValidAssets)
        ));
    }
}
