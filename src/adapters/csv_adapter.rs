//! CSV price-panel adapter.
//!
//! Reads a single panel file with a header row naming at least
//! `code,date,open,high,low,close` and optionally `volume`, in any column
//! order. Rows that cannot be parsed or carry non-positive prices are skipped
//! with a warning so one bad instrument never blocks the rest of the panel.

use crate::domain::code::codes_match;
use crate::domain::error::StockMetricsError;
use crate::domain::ohlcv::PricePoint;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

struct Columns {
    code: usize,
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, StockMetricsError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| StockMetricsError::Data {
                reason: format!("missing {} column", name),
            })
        };

        Ok(Self {
            code: require("code")?,
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<Vec<PricePoint>, StockMetricsError> {
        let content = fs::read_to_string(&self.path).map_err(|e| StockMetricsError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| StockMetricsError::Data {
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Columns::from_headers(headers)?;

        let mut points = Vec::new();
        let mut skipped = 0usize;

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| StockMetricsError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            match parse_record(&record, &columns) {
                Ok(point) => points.push(point),
                Err(reason) => {
                    skipped += 1;
                    // header is line 1
                    tracing::warn!(line = line + 2, %reason, "skipping panel row");
                }
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            rows = points.len(),
            skipped,
            "loaded price panel"
        );
        Ok(points)
    }
}

fn parse_record(record: &csv::StringRecord, columns: &Columns) -> Result<PricePoint, String> {
    let field = |idx: usize, name: &str| {
        record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| format!("missing {} value", name))
    };
    let price = |idx: usize, name: &str| -> Result<f64, String> {
        field(idx, name)?
            .parse::<f64>()
            .map_err(|e| format!("invalid {} value: {}", name, e))
    };

    let code = field(columns.code, "code")?;
    if code.is_empty() {
        return Err("empty code".to_string());
    }
    let date = NaiveDate::parse_from_str(field(columns.date, "date")?, "%Y-%m-%d")
        .map_err(|e| format!("invalid date format: {}", e))?;

    let volume = match columns.volume {
        Some(idx) => parse_volume(field(idx, "volume")?)?,
        None => None,
    };

    let point = PricePoint {
        instrument_id: code.to_string(),
        date,
        open: price(columns.open, "open")?,
        high: price(columns.high, "high")?,
        low: price(columns.low, "low")?,
        close: price(columns.close, "close")?,
        volume,
    };

    if !point.has_valid_prices() {
        return Err(format!("non-positive price for {} on {}", point.instrument_id, point.date));
    }
    Ok(point)
}

fn parse_volume(raw: &str) -> Result<Option<u64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(Some(v));
    }
    // some exports write volumes as floats, e.g. "12345.0"
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v.round() as u64)),
        _ => Err(format!("invalid volume value: {}", raw)),
    }
}

fn in_bounds(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
}

impl DataPort for CsvAdapter {
    fn fetch_panel(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StockMetricsError> {
        let mut points = self.load()?;
        points.retain(|p| in_bounds(p.date, start_date, end_date));
        Ok(points)
    }

    fn fetch_series(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StockMetricsError> {
        let mut points = self.load()?;
        points.retain(|p| codes_match(&p.instrument_id, code) && in_bounds(p.date, start_date, end_date));
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    fn list_codes(&self) -> Result<Vec<String>, StockMetricsError> {
        let codes: BTreeSet<String> = self.load()?.into_iter().map(|p| p.instrument_id).collect();
        Ok(codes.into_iter().collect())
    }
}
