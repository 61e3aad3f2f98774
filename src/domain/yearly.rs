//! Calendar-year breakdown of an instrument's performance.
//!
//! Each year is scored on its own closes: the first trading day of a year has
//! no return, even when the previous year's close is known.

use crate::domain::metrics::{daily_sharpe, max_drawdown, period_return};
use crate::domain::returns::InstrumentReturns;
use chrono::Datelike;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyMetrics {
    pub instrument_id: String,
    pub year: i32,
    pub period_return: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub daily_sharpe: Option<f64>,
}

pub fn compute_yearly_metrics(series: &InstrumentReturns) -> Vec<YearlyMetrics> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for row in &series.rows {
        by_year.entry(row.date.year()).or_default().push(row.close);
    }

    by_year
        .into_iter()
        .map(|(year, closes)| {
            let returns: Vec<f64> = closes
                .windows(2)
                .map(|w| w[1] / w[0] - 1.0)
                .filter(|r| r.is_finite())
                .collect();

            YearlyMetrics {
                instrument_id: series.instrument_id.clone(),
                year,
                period_return: period_return(&closes),
                max_drawdown: max_drawdown(&returns),
                daily_sharpe: daily_sharpe(&returns),
            }
        })
        .collect()
}

pub fn compute_yearly_metrics_batch(series: &[InstrumentReturns]) -> Vec<YearlyMetrics> {
    series.iter().flat_map(compute_yearly_metrics).collect()
}
