//! Simple returns and trailing moving averages per instrument.
//!
//! return[t] = close[t] / close[t-1] - 1, absent for the first observation.
//! MA(n)[t] = mean(close[t-n+1..=t]), absent until n observations exist.

use crate::domain::ohlcv::PricePoint;
use crate::domain::panel::{InstrumentSeries, group_panel};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageWindows {
    pub short: usize,
    pub long: usize,
}

impl Default for MovingAverageWindows {
    fn default() -> Self {
        Self { short: 5, long: 20 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnPoint {
    pub instrument_id: String,
    pub date: NaiveDate,
    pub simple_return: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub date: NaiveDate,
    pub close: f64,
    pub simple_return: Option<f64>,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct InstrumentReturns {
    pub instrument_id: String,
    pub rows: Vec<DerivedRow>,
}

impl InstrumentReturns {
    /// The defined returns, oldest first. Empty for fewer than two observations.
    pub fn returns(&self) -> Vec<ReturnPoint> {
        self.rows
            .iter()
            .filter_map(|row| {
                row.simple_return.map(|r| ReturnPoint {
                    instrument_id: self.instrument_id.clone(),
                    date: row.date,
                    simple_return: r,
                })
            })
            .collect()
    }

    pub fn return_values(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|row| row.simple_return).collect()
    }
}

pub fn build_returns(panel: &[PricePoint], windows: MovingAverageWindows) -> Vec<InstrumentReturns> {
    group_panel(panel)
        .iter()
        .map(|series| derive_series(series, windows))
        .collect()
}

pub fn derive_series(series: &InstrumentSeries, windows: MovingAverageWindows) -> InstrumentReturns {
    let closes = series.closes();
    let ma_short = trailing_mean(&closes, windows.short);
    let ma_long = trailing_mean(&closes, windows.long);

    let rows = series
        .points
        .iter()
        .enumerate()
        .map(|(i, point)| DerivedRow {
            date: point.date,
            close: point.close,
            simple_return: if i == 0 {
                None
            } else {
                simple_return(closes[i - 1], closes[i])
            },
            ma_short: ma_short[i],
            ma_long: ma_long[i],
        })
        .collect();

    InstrumentReturns {
        instrument_id: series.instrument_id.clone(),
        rows,
    }
}

fn simple_return(prev: f64, curr: f64) -> Option<f64> {
    let r = curr / prev - 1.0;
    r.is_finite().then_some(r)
}

fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let warmup = window.saturating_sub(1);
    (0..values.len())
        .map(|i| {
            if window == 0 || i < warmup {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Mean return across instruments for every date where at least one
/// instrument has a defined return.
pub fn equal_weight_returns(series: &[InstrumentReturns]) -> Vec<(NaiveDate, f64)> {
    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for s in series {
        for row in &s.rows {
            if let Some(r) = row.simple_return {
                let entry = buckets.entry(row.date).or_insert((0.0, 0));
                entry.0 += r;
                entry.1 += 1;
            }
        }
    }

    buckets
        .into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect()
}
