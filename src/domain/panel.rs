//! Per-instrument series and the unified timeline of a price panel.

use crate::domain::ohlcv::PricePoint;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct InstrumentSeries {
    pub instrument_id: String,
    pub points: Vec<PricePoint>,
}

impl InstrumentSeries {
    /// Builds a series sorted ascending by date. When a date repeats, the
    /// later row in input order wins.
    pub fn new(instrument_id: String, mut points: Vec<PricePoint>) -> Self {
        let before = points.len();
        // dedup keeps the first of each run; reverse so the last input row survives.
        points.reverse();
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        if points.len() != before {
            tracing::warn!(
                instrument = %instrument_id,
                dropped = before - points.len(),
                "duplicate dates in series, keeping the last row per date"
            );
        }

        Self {
            instrument_id,
            points,
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

/// Splits a flat panel into one series per instrument, ordered by instrument id.
pub fn group_panel(panel: &[PricePoint]) -> Vec<InstrumentSeries> {
    let mut groups: BTreeMap<&str, Vec<PricePoint>> = BTreeMap::new();
    for point in panel {
        groups
            .entry(point.instrument_id.as_str())
            .or_default()
            .push(point.clone());
    }

    groups
        .into_iter()
        .map(|(id, points)| InstrumentSeries::new(id.to_string(), points))
        .collect()
}

pub fn build_unified_timeline(series: &[InstrumentSeries]) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.date))
        .collect();
    unique_dates.into_iter().collect()
}
