//! Portfolio analytics engine.
//!
//! Turns per-asset price histories and a weight vector into a value curve,
//! return statistics and a historical risk report.

mod aggregate;
mod correlation;
mod engine;
mod returns;
mod risk;
mod weights;

pub use aggregate::{
    align_returns, annualize_calendar_return, holding_period_return, portfolio_returns,
    value_series, AlignedReturns, PortfolioSummary, PORTFOLIO_SYMBOL,
};
pub use correlation::{correlation_matrix, pearson, CorrelationMatrix};
pub use engine::{
    analyze, Allocation, AnalysisRequest, AnalysisWarning, PortfolioAnalysis, PortfolioResult,
    DEFAULT_MIN_ALIGNED_RETURNS,
};
pub use returns::{daily_returns, normalize, ExcludedAsset, NormalizedReturns};
pub use risk::{
    best_days, calculate_risk_report, conditional_value_at_risk, max_drawdown, quantile,
    return_statistics, stress_scenario, value_at_risk, worst_days, ReturnStatistics, RiskReport,
    DEFAULT_STRESS_WINDOW, TRADING_DAYS_PER_YEAR,
};
pub use weights::{WeightVector, WEIGHT_SUM_TOLERANCE};
