use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::{Duration, NaiveDate};
use folio_core::analytics::{analyze, calculate_risk_report, AnalysisRequest, AnalysisWarning};
use folio_core::prices::fetch_prices;
use folio_core::{JsonPriceFile, PriceSeries, WeightVector};

fn series(symbol: &str, first: NaiveDate, closes: &[f64]) -> PriceSeries {
    let pairs: Vec<_> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| (first + Duration::days(i as i64), c))
        .collect();
    PriceSeries::from_closes(symbol, &pairs).unwrap()
}

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

#[test]
fn test_two_asset_portfolio() {
    let weights = WeightVector::from_percentages([("A", 60.0), ("B", 40.0)]).unwrap();
    let request = AnalysisRequest::new(
        vec![
            series("A", jan(1), &[100.0, 110.0, 121.0]),
            series("B", jan(1), &[50.0, 45.0, 49.5]),
        ],
        weights,
        1_000_000.0,
    );

    let analysis = analyze(&request).unwrap();
    assert!(analysis.excluded.is_empty());
    assert!(analysis.warnings.is_empty());

    let result = analysis.result.unwrap();
    let returns = result.portfolio_returns.values();
    assert_eq!(returns.len(), 2);
    // 0.6 * 0.10 + 0.4 * -0.10, then 0.6 * 0.10 + 0.4 * 0.10
    assert_relative_eq!(returns[0], 0.02, epsilon = 1e-12);
    assert_relative_eq!(returns[1], 0.10, epsilon = 1e-12);

    let expected: f64 = returns.iter().map(|r| 1.0 + r).product::<f64>() * 1_000_000.0;
    assert_relative_eq!(result.summary.final_value, expected, epsilon = 1e-6);
    assert_relative_eq!(result.summary.final_value, 1_122_000.0, epsilon = 1e-6);
    assert_relative_eq!(result.summary.total_return_pct, 12.2, epsilon = 1e-9);

    // A grows a constant 10% per day, so its correlation is undefined
    let corr = result.correlation.unwrap();
    assert!(corr.get("A", "B").is_none());
    assert_relative_eq!(corr.get("B", "B").unwrap(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_short_history_asset_is_dropped() {
    let closes: Vec<f64> = (0..10).map(|i| 20.0 + i as f64 * 0.5).collect();
    let weights = WeightVector::from_percentages([("A", 60.0), ("B", 40.0)]).unwrap();
    let request = AnalysisRequest::new(
        vec![series("A", jan(1), &[100.0]), series("B", jan(1), &closes)],
        weights,
        10_000.0,
    );

    let analysis = analyze(&request).unwrap();

    assert_eq!(analysis.excluded.len(), 1);
    assert_eq!(analysis.excluded[0].symbol, "A");
    assert_eq!(analysis.included.len(), 1);
    assert_eq!(analysis.included[0].symbol, "B");
    assert_relative_eq!(analysis.included[0].requested_weight, 40.0);
    assert_relative_eq!(analysis.included[0].effective_weight, 100.0, epsilon = 1e-9);

    let result = analysis.result.unwrap();
    assert_eq!(result.portfolio_returns.len(), 9);
    assert_relative_eq!(
        result.summary.final_value,
        10_000.0 * closes[9] / closes[0],
        epsilon = 1e-6
    );
    assert!(result.correlation.is_none());
}

#[test]
fn test_constant_growth_has_no_risk() {
    let closes: Vec<f64> = (0..31).map(|i| 100.0 * 1.01f64.powi(i)).collect();
    let weights = WeightVector::from_percentages([("A", 100.0)]).unwrap();
    let request = AnalysisRequest::new(vec![series("A", jan(1), &closes)], weights, 1_000.0);

    let result = analyze(&request).unwrap().result.unwrap();

    assert_eq!(result.risk.max_drawdown, 0.0);
    assert_abs_diff_eq!(result.risk.var_95, 0.01, epsilon = 1e-9);
    assert_abs_diff_eq!(result.risk.var_99, 0.01, epsilon = 1e-9);
    assert_eq!(result.statistics.annualized_volatility, 0.0);
    assert!(result.statistics.sharpe_ratio.is_none());
}

#[test]
fn test_disjoint_dates_produce_warning_only() {
    let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let weights = WeightVector::from_percentages([("A", 50.0), ("B", 50.0)]).unwrap();
    let request = AnalysisRequest::new(
        vec![
            series("A", jan(1), &[10.0, 11.0, 12.0]),
            series("B", feb, &[20.0, 21.0, 22.0]),
        ],
        weights,
        1_000.0,
    );

    let analysis = analyze(&request).unwrap();

    assert!(analysis.result.is_none());
    assert!(analysis.excluded.is_empty());
    assert_eq!(
        analysis.warnings,
        vec![AnalysisWarning::AlignmentInsufficient {
            common_dates: 0,
            required: 2,
        }]
    );
}

fn volatile_request() -> AnalysisRequest {
    let a = [100.0, 97.0, 99.5, 104.0, 101.0, 95.0, 98.0, 103.5, 102.0, 106.0, 99.0, 100.5];
    let b = [40.0, 41.0, 39.0, 39.5, 42.0, 41.0, 40.0, 43.0, 42.5, 41.0, 44.0, 45.0];
    let weights = WeightVector::from_percentages([("A", 70.0), ("B", 30.0)]).unwrap();
    AnalysisRequest::new(
        vec![series("A", jan(1), &a), series("B", jan(1), &b)],
        weights,
        50_000.0,
    )
    .with_stress_window(3)
}

#[test]
fn test_analysis_is_repeatable() {
    let request = volatile_request();
    let first = analyze(&request).unwrap();
    let second = analyze(&request).unwrap();
    assert_eq!(first, second);

    let result = first.result.unwrap();
    let again = calculate_risk_report(&result.portfolio_returns, &result.values, 3).unwrap();
    assert_eq!(again, result.risk);
}

#[test]
fn test_risk_report_orderings() {
    let result = analyze(&volatile_request()).unwrap().result.unwrap();
    let risk = &result.risk;

    assert!(risk.cvar_95 <= risk.var_95);
    assert!(risk.cvar_99 <= risk.var_99);
    assert!(risk.var_99 <= risk.var_95);
    assert!(risk.max_drawdown < 0.0);
    assert!(risk.stress_return < 0.0);
    assert_eq!(risk.worst_days.len(), 3);
    assert!(risk.worst_days[0].value <= risk.worst_days[2].value);
    assert!(risk.best_days[0].value >= risk.best_days[2].value);

    let last = result.values.last().unwrap().value;
    assert_relative_eq!(
        risk.stress_projected_value,
        last * (1.0 + risk.stress_return),
        epsilon = 1e-9
    );
}

#[test]
fn test_invalid_ticker_in_price_file_is_excluded() {
    let file = JsonPriceFile::from_json(
        r#"{
            "GOOD": [
                { "date": "2024-01-01", "close": 10.0 },
                { "date": "2024-01-02", "close": 11.0 },
                { "date": "2024-01-03", "close": 12.1 }
            ],
            "BAD": [
                { "date": "2024-01-01", "close": 5.0 },
                { "date": "2024-01-01", "close": 5.5 }
            ]
        }"#,
    )
    .unwrap();

    let weights = WeightVector::from_percentages([("GOOD", 70.0), ("BAD", 30.0)]).unwrap();
    let symbols: Vec<String> = weights.symbols().map(str::to_string).collect();
    let prices = fetch_prices(&file, &symbols, None, None);

    let analysis = analyze(&AnalysisRequest::new(prices, weights, 1_000.0)).unwrap();

    assert_eq!(analysis.excluded.len(), 1);
    assert_eq!(analysis.excluded[0].symbol, "BAD");
    let result = analysis.result.unwrap();
    assert_relative_eq!(result.summary.final_value, 1_210.0, epsilon = 1e-9);
}
