//! End-to-end portfolio analysis.
//!
//! Normalizer → aggregator → statistics, recomputed from scratch per request.

use super::aggregate::{align_returns, portfolio_returns, value_series, PortfolioSummary};
use super::correlation::{correlation_matrix, CorrelationMatrix};
use super::returns::{normalize, ExcludedAsset};
use super::risk::{
    calculate_risk_report, return_statistics, ReturnStatistics, RiskReport, DEFAULT_STRESS_WINDOW,
};
use super::weights::WeightVector;
use crate::config::AnalysisConfig;
use crate::types::{PriceSeries, ReturnSeries, ValuePoint};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Fewer aligned returns than this make the statistics meaningless.
pub const DEFAULT_MIN_ALIGNED_RETURNS: usize = 2;

/// Inputs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Price history per asset
    pub prices: Vec<PriceSeries>,
    /// Requested weights in percent, summing to 100
    pub weights: WeightVector,
    /// Starting capital
    pub initial_investment: f64,
    /// Days used for the stress scenario and worst/best lists
    pub stress_window: usize,
    /// Minimum number of common dates required for statistics
    pub min_aligned_returns: usize,
}

impl AnalysisRequest {
    pub fn new(prices: Vec<PriceSeries>, weights: WeightVector, initial_investment: f64) -> Self {
        Self {
            prices,
            weights,
            initial_investment,
            stress_window: DEFAULT_STRESS_WINDOW,
            min_aligned_returns: DEFAULT_MIN_ALIGNED_RETURNS,
        }
    }

    /// Build a request using the defaults from configuration.
    pub fn from_config(
        prices: Vec<PriceSeries>,
        weights: WeightVector,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            prices,
            weights,
            initial_investment: config.initial_investment,
            stress_window: config.stress_window,
            min_aligned_returns: config.min_aligned_returns,
        }
    }

    pub fn with_stress_window(mut self, window: usize) -> Self {
        self.stress_window = window;
        self
    }

    pub fn with_min_aligned_returns(mut self, min: usize) -> Self {
        self.min_aligned_returns = min;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.initial_investment.is_finite() || self.initial_investment <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "initial investment must be positive, got {}",
                self.initial_investment
            )));
        }
        if self.stress_window == 0 {
            return Err(Error::InvalidInput(
                "stress window must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Non-fatal conditions noticed during an analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// Too few common dates across surviving assets; no statistics were computed.
    AlignmentInsufficient { common_dates: usize, required: usize },
    /// Date alignment shortened the usable history.
    RangeShrunk { common_dates: usize, longest: usize },
}

/// Requested and effective weight of an included asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Allocation {
    pub symbol: String,
    /// Weight as requested by the caller (percent)
    pub requested_weight: f64,
    /// Weight after renormalizing over surviving assets (percent)
    pub effective_weight: f64,
}

/// Computed metrics, present only when the aligned history is usable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioResult {
    pub summary: PortfolioSummary,
    pub statistics: ReturnStatistics,
    pub risk: RiskReport,
    /// Only when at least two assets contribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationMatrix>,
    pub portfolio_returns: ReturnSeries,
    pub values: Vec<ValuePoint>,
}

/// Outcome of an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioAnalysis {
    pub included: Vec<Allocation>,
    pub excluded: Vec<ExcludedAsset>,
    pub warnings: Vec<AnalysisWarning>,
    pub result: Option<PortfolioResult>,
}

/// Run the full analysis for a request.
///
/// Assets with insufficient history are excluded and the remaining weights
/// renormalized. When the surviving assets share too few dates, the analysis
/// carries an `AlignmentInsufficient` warning and no result.
///
/// # Errors
///
/// * `Error::InvalidInput` for a non-positive investment or stress window
/// * `Error::NoValidAssets` if no weighted asset survives normalization
pub fn analyze(request: &AnalysisRequest) -> Result<PortfolioAnalysis> {
    request.validate()?;

    let mut selected = Vec::with_capacity(request.weights.len());
    for symbol in request.weights.symbols() {
        match request
            .prices
            .iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
        {
            Some(series) => selected.push(series.clone()),
            None => selected.push(PriceSeries::empty(symbol)),
        }
    }

    for unweighted in request
        .prices
        .iter()
        .filter(|p| request.weights.get(&p.symbol).is_none())
    {
        tracing::debug!(symbol = %unweighted.symbol, "Ignoring price series without a weight");
    }

    let normalized = normalize(&selected);
    let survivors: Vec<&str> = normalized.series.iter().map(|s| s.symbol.as_str()).collect();
    let weights = request.weights.renormalize(&survivors)?;

    let included = weights
        .iter()
        .map(|(symbol, effective_weight)| Allocation {
            symbol: symbol.to_string(),
            requested_weight: request.weights.get(symbol).unwrap_or(0.0),
            effective_weight,
        })
        .collect();

    let mut analysis = PortfolioAnalysis {
        included,
        excluded: normalized.excluded,
        warnings: Vec::new(),
        result: None,
    };

    let aligned = align_returns(&normalized.series);
    let longest = normalized.series.iter().map(|s| s.len()).max().unwrap_or(0);

    if aligned.len() < request.min_aligned_returns.max(1) {
        tracing::warn!(
            common_dates = aligned.len(),
            required = request.min_aligned_returns,
            "Not enough overlapping dates for statistics"
        );
        analysis.warnings.push(AnalysisWarning::AlignmentInsufficient {
            common_dates: aligned.len(),
            required: request.min_aligned_returns,
        });
        return Ok(analysis);
    }

    if aligned.len() < longest {
        analysis.warnings.push(AnalysisWarning::RangeShrunk {
            common_dates: aligned.len(),
            longest,
        });
    }

    let returns = portfolio_returns(&aligned, &weights);
    let values = value_series(&returns, request.initial_investment);
    let summary = PortfolioSummary::from_values(request.initial_investment, &values)?;
    let statistics = return_statistics(&returns.values());
    let risk = calculate_risk_report(&returns, &values, request.stress_window)?;
    let correlation = correlation_matrix(&aligned);

    tracing::info!(
        assets = aligned.columns.len(),
        observations = returns.len(),
        final_value = summary.final_value,
        "Portfolio analysis complete"
    );

    analysis.result = Some(PortfolioResult {
        summary,
        statistics,
        risk,
        correlation,
        portfolio_returns: returns,
        values,
    });

    Ok(analysis)
}
