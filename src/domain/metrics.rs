//! Return-series performance metrics.
//!
//! Every ratio is `Option<f64>`: `None` marks a value that cannot be computed
//! from the series (no observations, zero or undefined volatility, no
//! downside observations). Nothing here divides by zero or reports a
//! placeholder zero.

use crate::domain::returns::InstrumentReturns;
use rayon::prelude::*;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03;
pub const DEFAULT_TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsParams {
    pub risk_free_rate: f64,
    pub trading_days_per_year: f64,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsResult {
    pub instrument_id: String,
    pub annualized_return: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub sortino_ratio: Option<f64>,
}

impl MetricsResult {
    pub fn not_computable(instrument_id: &str) -> Self {
        Self {
            instrument_id: instrument_id.to_string(),
            annualized_return: None,
            max_drawdown: None,
            sharpe_ratio: None,
            sortino_ratio: None,
        }
    }

    pub fn is_fully_computable(&self) -> bool {
        self.annualized_return.is_some()
            && self.max_drawdown.is_some()
            && self.sharpe_ratio.is_some()
            && self.sortino_ratio.is_some()
    }
}

pub fn compute_metrics(instrument_id: &str, returns: &[f64], params: &MetricsParams) -> MetricsResult {
    if returns.is_empty() {
        return MetricsResult::not_computable(instrument_id);
    }

    let annualized = annualized_return(returns, params.trading_days_per_year);

    MetricsResult {
        instrument_id: instrument_id.to_string(),
        annualized_return: annualized,
        max_drawdown: max_drawdown(returns),
        sharpe_ratio: annualized.and_then(|a| sharpe_ratio(returns, a, params)),
        sortino_ratio: annualized.and_then(|a| sortino_ratio(returns, a, params)),
    }
}

/// Metrics for every instrument, computed in parallel and ordered by
/// instrument id.
pub fn compute_metrics_batch(series: &[InstrumentReturns], params: &MetricsParams) -> Vec<MetricsResult> {
    let mut results: Vec<MetricsResult> = series
        .par_iter()
        .map(|s| {
            let result = compute_metrics(&s.instrument_id, &s.return_values(), params);
            if !result.is_fully_computable() {
                tracing::debug!(
                    instrument = %s.instrument_id,
                    observations = s.rows.len(),
                    "some metrics are not computable"
                );
            }
            result
        })
        .collect();

    results.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));
    results
}

/// `(Π(1 + r))^(periods_per_year / n) - 1` with `n` the number of return
/// observations.
///
/// The exponent uses the observation count rather than elapsed calendar
/// time, so series with gaps are annualized as if they were contiguous.
pub fn annualized_return(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    finite(growth.powf(periods_per_year / returns.len() as f64) - 1.0)
}

/// Deepest decline of the compounded wealth index from its running peak,
/// as a non-positive fraction. The index starts at the first return.
pub fn max_drawdown(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }

    let mut wealth = 1.0_f64;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for r in returns {
        wealth *= 1.0 + r;
        if wealth > peak {
            peak = wealth;
        }
        let dd = wealth / peak - 1.0;
        if dd < max_dd {
            max_dd = dd;
        }
    }

    finite(max_dd)
}

pub fn sharpe_ratio(returns: &[f64], annualized: f64, params: &MetricsParams) -> Option<f64> {
    let volatility = sample_std(returns)? * params.trading_days_per_year.sqrt();
    if volatility == 0.0 || !volatility.is_finite() {
        return None;
    }
    finite((annualized - params.risk_free_rate) / volatility)
}

/// Like Sharpe, but the deviation is taken only over excess returns
/// `r - risk_free_rate` that are negative. The threshold is the configured
/// rate as given, not scaled down to one period.
pub fn sortino_ratio(returns: &[f64], annualized: f64, params: &MetricsParams) -> Option<f64> {
    let downside: Vec<f64> = returns
        .iter()
        .map(|r| r - params.risk_free_rate)
        .filter(|excess| *excess < 0.0)
        .collect();

    let downside_dev = sample_std(&downside)? * params.trading_days_per_year.sqrt();
    if downside_dev == 0.0 || !downside_dev.is_finite() {
        return None;
    }
    finite((annualized - params.risk_free_rate) / downside_dev)
}

/// `last / first - 1` over a close series, without annualizing.
pub fn period_return(closes: &[f64]) -> Option<f64> {
    let first = *closes.first()?;
    let last = *closes.last()?;
    if first <= 0.0 {
        return None;
    }
    finite(last / first - 1.0)
}

/// Mean over standard deviation of per-period returns, not annualized.
pub fn daily_sharpe(returns: &[f64]) -> Option<f64> {
    let std = sample_std(returns)?;
    if std == 0.0 {
        return None;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    finite(mean / std)
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    // identical values must give exactly zero, not rounding noise
    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    finite(variance.sqrt())
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::returns::DerivedRow;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(id: &str, returns: &[f64]) -> InstrumentReturns {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut close = 100.0;
        let mut rows = vec![DerivedRow {
            date: start,
            close,
            simple_return: None,
            ma_short: None,
            ma_long: None,
        }];
        for (i, r) in returns.iter().enumerate() {
            close *= 1.0 + r;
            rows.push(DerivedRow {
                date: start + chrono::Duration::days(i as i64 + 1),
                close,
                simple_return: Some(*r),
                ma_short: None,
                ma_long: None,
            });
        }
        InstrumentReturns {
            instrument_id: id.to_string(),
            rows,
        }
    }

    #[test]
    fn annualized_return_uses_observation_count() {
        // 1.1 growth over 126 observations → 1.1^2 - 1
        let mut returns = vec![0.0; 125];
        returns.push(0.1);
        let annual = annualized_return(&returns, 252.0).unwrap();
        assert_relative_eq!(annual, 0.21, epsilon = 1e-9);
    }

    #[test]
    fn annualized_return_flat_series() {
        let returns = vec![0.0; 252];
        assert_relative_eq!(annualized_return(&returns, 252.0).unwrap(), 0.0);
    }

    #[test]
    fn annualized_return_empty() {
        assert_eq!(annualized_return(&[], 252.0), None);
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        // wealth: 1.1, 0.99, 1.089, 0.8712 → trough 0.8712 against peak 1.1
        let returns = [0.1, -0.1, 0.1, -0.2];
        let dd = max_drawdown(&returns).unwrap();
        assert_relative_eq!(dd, 0.8712 / 1.1 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn max_drawdown_zero_when_increasing() {
        let returns = [0.01, 0.02, 0.0, 0.03];
        assert_eq!(max_drawdown(&returns), Some(0.0));
    }

    #[test]
    fn max_drawdown_starts_at_first_return() {
        // the running peak begins at the first wealth value, not at 1.0
        assert_eq!(max_drawdown(&[-0.1]), Some(0.0));
        let dd = max_drawdown(&[-0.1, -0.1]).unwrap();
        assert_relative_eq!(dd, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_matches_formula() {
        let returns = [0.01, -0.005, 0.02, 0.0, -0.01];
        let params = MetricsParams::default();
        let annual = annualized_return(&returns, 252.0).unwrap();
        let std = sample_std(&returns).unwrap();

        let sharpe = sharpe_ratio(&returns, annual, &params).unwrap();

        assert_relative_eq!(sharpe, (annual - 0.03) / (std * 252.0_f64.sqrt()), epsilon = 1e-12);
    }

    #[test]
    fn sharpe_not_computable_for_constant_returns() {
        let returns = [0.001; 10];
        let params = MetricsParams::default();
        let annual = annualized_return(&returns, 252.0).unwrap();
        assert_eq!(sharpe_ratio(&returns, annual, &params), None);
    }

    #[test]
    fn sharpe_not_computable_for_single_return() {
        let params = MetricsParams::default();
        assert_eq!(sharpe_ratio(&[0.01], 0.5, &params), None);
    }

    #[test]
    fn sortino_uses_downside_only() {
        let params = MetricsParams {
            risk_free_rate: 0.0,
            trading_days_per_year: 252.0,
        };
        let returns = [0.02, -0.01, 0.03, -0.03, 0.01];
        let annual = annualized_return(&returns, 252.0).unwrap();

        let sortino = sortino_ratio(&returns, annual, &params).unwrap();

        // downside excess: [-0.01, -0.03], sample std = sqrt(0.0002)
        let expected = annual / (0.0002_f64.sqrt() * 252.0_f64.sqrt());
        assert_relative_eq!(sortino, expected, epsilon = 1e-9);
    }

    #[test]
    fn sortino_not_computable_without_downside() {
        let params = MetricsParams::default();
        let returns = [0.04, 0.05, 0.035];
        let annual = annualized_return(&returns, 252.0).unwrap();
        assert_eq!(sortino_ratio(&returns, annual, &params), None);
    }

    #[test]
    fn sortino_threshold_is_unscaled_rate() {
        // every return is below 0.03, so all three count as downside
        let params = MetricsParams::default();
        let returns = [0.01, 0.02, 0.015];
        let annual = annualized_return(&returns, 252.0).unwrap();

        let sortino = sortino_ratio(&returns, annual, &params).unwrap();

        // excess [-0.02, -0.01, -0.015] has the same spread as the returns
        let expected = (annual - 0.03) / (sample_std(&returns).unwrap() * 252.0_f64.sqrt());
        assert_relative_eq!(sortino, expected, epsilon = 1e-9);
        assert!(compute_metrics("A", &returns, &params).sortino_ratio.is_some());
    }

    #[test]
    fn sortino_single_downside_not_computable() {
        let params = MetricsParams::default();
        let returns = [0.05, 0.01, 0.04];
        let annual = annualized_return(&returns, 252.0).unwrap();
        assert_eq!(sortino_ratio(&returns, annual, &params), None);
    }

    #[test]
    fn compute_metrics_empty_series() {
        let result = compute_metrics("sz.000001", &[], &MetricsParams::default());
        assert_eq!(result, MetricsResult::not_computable("sz.000001"));
    }

    #[test]
    fn compute_metrics_single_return() {
        let result = compute_metrics("sz.000001", &[0.05], &MetricsParams::default());
        assert!(result.annualized_return.is_some());
        assert_eq!(result.max_drawdown, Some(0.0));
        assert_eq!(result.sharpe_ratio, None);
        assert_eq!(result.sortino_ratio, None);
    }

    #[test]
    fn compute_metrics_is_deterministic() {
        let returns: Vec<f64> = (0..100).map(|i| ((i * 37) % 11) as f64 / 1000.0 - 0.004).collect();
        let params = MetricsParams::default();
        let a = compute_metrics("A", &returns, &params);
        let b = compute_metrics("A", &returns, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn batch_is_ordered_and_isolated() {
        let series = vec![
            make_series("sz.000002", &[0.01, -0.02, 0.03, -0.01]),
            make_series("sh.600000", &[]),
        ];

        let results = compute_metrics_batch(&series, &MetricsParams::default());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], MetricsResult::not_computable("sh.600000"));
        assert_eq!(results[1].instrument_id, "sz.000002");
        assert!(results[1].is_fully_computable());
    }

    #[test]
    fn period_return_basic() {
        assert_relative_eq!(period_return(&[10.0, 12.0, 15.0]).unwrap(), 0.5);
        assert_eq!(period_return(&[]), None);
        assert_eq!(period_return(&[0.0, 1.0]), None);
        assert_eq!(period_return(&[10.0]), Some(0.0));
    }

    #[test]
    fn daily_sharpe_basic() {
        let returns = [0.01, 0.03];
        // mean 0.02, sample std sqrt(0.0002)
        assert_relative_eq!(
            daily_sharpe(&returns).unwrap(),
            0.02 / 0.0002_f64.sqrt(),
            epsilon = 1e-9
        );
        assert_eq!(daily_sharpe(&[0.01, 0.01]), None);
        assert_eq!(daily_sharpe(&[0.01]), None);
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        assert_relative_eq!(sample_std(&[1.0, 2.0, 3.0, 4.0]).unwrap(), (5.0_f64 / 3.0).sqrt());
        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(sample_std(&[]), None);
    }
}
