//! Flat output rows shared by the CSV and JSON report adapters.
//!
//! Field names are the column names consumers of the result files expect.

use crate::domain::code::{CodeNormalizer, StandardCodes};
use crate::domain::metrics::MetricsResult;
use crate::domain::resample::PeriodBar;
use crate::domain::returns::InstrumentReturns;
use crate::domain::signal::{Signal, SignalOutcome};
use crate::domain::yearly::YearlyMetrics;
use chrono::NaiveDate;
use serde::Serialize;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize)]
pub struct MetricsRow<'a> {
    pub code: &'a str,
    pub annual_return: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
}

impl<'a> From<&'a MetricsResult> for MetricsRow<'a> {
    fn from(m: &'a MetricsResult) -> Self {
        Self {
            code: &m.instrument_id,
            annual_return: m.annualized_return,
            max_drawdown: m.max_drawdown,
            sharpe: m.sharpe_ratio,
            sortino: m.sortino_ratio,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignalRow<'a> {
    pub code: &'a str,
    pub action: String,
    pub momentum: Option<f64>,
}

impl<'a> From<&'a Signal> for SignalRow<'a> {
    fn from(s: &'a Signal) -> Self {
        let momentum = match s.outcome {
            SignalOutcome::Ready { momentum, .. } => Some(momentum),
            SignalOutcome::InsufficientData { .. } => None,
        };
        Self {
            code: &s.instrument_id,
            action: s.outcome.label(),
            momentum,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BarRow<'a> {
    pub code: &'a str,
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl<'a> BarRow<'a> {
    pub fn new(code: &'a str, bar: &PeriodBar) -> Self {
        Self {
            code,
            date: bar.label.format(DATE_FORMAT).to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReturnRow<'a> {
    pub code: &'a str,
    pub date: String,
    pub close: f64,
    pub returns: Option<f64>,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
}

pub fn return_rows(series: &[InstrumentReturns]) -> Vec<ReturnRow<'_>> {
    series
        .iter()
        .flat_map(|s| {
            s.rows.iter().map(move |row| ReturnRow {
                code: &s.instrument_id,
                date: row.date.format(DATE_FORMAT).to_string(),
                close: row.close,
                returns: row.simple_return,
                ma_short: row.ma_short,
                ma_long: row.ma_long,
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct YearlyRow<'a> {
    pub code: &'a str,
    pub year: i32,
    pub period_return: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub sharpe: Option<f64>,
}

impl<'a> From<&'a YearlyMetrics> for YearlyRow<'a> {
    fn from(y: &'a YearlyMetrics) -> Self {
        Self {
            code: &y.instrument_id,
            year: y.year,
            period_return: y.period_return,
            max_drawdown: y.max_drawdown,
            sharpe: y.daily_sharpe,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PortfolioRow {
    pub date: String,
    pub returns: f64,
}

impl From<&(NaiveDate, f64)> for PortfolioRow {
    fn from((date, returns): &(NaiveDate, f64)) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            returns: *returns,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CodeRow<'a> {
    pub code: &'a str,
    pub detail_code: String,
    pub kline_code: String,
}

impl<'a> From<&'a String> for CodeRow<'a> {
    fn from(code: &'a String) -> Self {
        let (detail_code, kline_code) = StandardCodes.normalize(code);
        Self {
            code,
            detail_code,
            kline_code,
        }
    }
}
