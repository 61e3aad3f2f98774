#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use stockmetrics::domain::code::codes_match;
use stockmetrics::domain::error::StockMetricsError;
pub use stockmetrics::domain::ohlcv::PricePoint;
use stockmetrics::ports::data_port::DataPort;

/// In-memory panel standing in for the CSV adapter.
pub struct MockDataPort {
    pub points: Vec<PricePoint>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            error: None,
        }
    }

    pub fn with_points(mut self, points: Vec<PricePoint>) -> Self {
        self.points.extend(points);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    fn check(&self) -> Result<(), StockMetricsError> {
        match &self.error {
            Some(reason) => Err(StockMetricsError::Data {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn in_bounds(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
}

impl DataPort for MockDataPort {
    fn fetch_panel(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StockMetricsError> {
        self.check()?;
        Ok(self
            .points
            .iter()
            .filter(|p| in_bounds(p.date, start_date, end_date))
            .cloned()
            .collect())
    }

    fn fetch_series(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StockMetricsError> {
        self.check()?;
        let mut points: Vec<PricePoint> = self
            .points
            .iter()
            .filter(|p| codes_match(&p.instrument_id, code) && in_bounds(p.date, start_date, end_date))
            .cloned()
            .collect();
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    fn list_codes(&self) -> Result<Vec<String>, StockMetricsError> {
        self.check()?;
        let mut codes: Vec<String> = self.points.iter().map(|p| p.instrument_id.clone()).collect();
        codes.sort();
        codes.dedup();
        Ok(codes)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(code: &str, date: NaiveDate, close: f64) -> PricePoint {
    PricePoint {
        instrument_id: code.to_string(),
        date,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: Some(1_000),
    }
}

/// One point per calendar day starting at `start`, one per close.
pub fn series_from_closes(code: &str, start: NaiveDate, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| make_point(code, start + Duration::days(i as i64), *close))
        .collect()
}

/// Closes drifting upward with a deterministic oscillation, so the series
/// has both up and down days.
pub fn noisy_uptrend(n: usize, start_price: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            start_price * 1.002_f64.powf(t) * (1.0 + 0.03 * (t * 0.9).sin())
        })
        .collect()
}

pub fn write_panel_csv(dir: &std::path::Path, points: &[PricePoint]) -> std::path::PathBuf {
    let mut content = String::from("code,date,open,high,low,close,volume\n");
    for p in points {
        content.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            p.instrument_id,
            p.date.format("%Y-%m-%d"),
            p.open,
            p.high,
            p.low,
            p.close,
            p.volume.map(|v| v.to_string()).unwrap_or_default()
        ));
    }
    let path = dir.join("panel.csv");
    std::fs::write(&path, content).unwrap();
    path
}
