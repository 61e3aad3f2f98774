//! Calendar resampling of daily bars.
//!
//! Aggregation per bucket: first open, max high, min low, last close, summed
//! volume. Buckets are only emitted when at least one trading day falls
//! inside.
//!
//! Weeks close on Monday: a weekly bucket runs Tuesday through the following
//! Monday and is labelled by that Monday. Month, quarter and year buckets are
//! labelled by their first calendar day.

use crate::domain::ohlcv::PricePoint;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Period {
    /// Label date of the bucket containing `date`.
    pub fn bucket_label(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => {
                let to_monday = (7 - date.weekday().num_days_from_monday()) % 7;
                date + chrono::Duration::days(to_monday as i64)
            }
            Period::Month => date.with_day(1).unwrap_or(date),
            Period::Quarter => {
                let month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
            }
            Period::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period '{0}' (expected day, week, month, quarter or year)")]
pub struct ParsePeriodError(pub String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Period::Day),
            "w" | "week" | "weekly" => Ok(Period::Week),
            "m" | "month" | "monthly" => Ok(Period::Month),
            "q" | "quarter" | "quarterly" => Ok(Period::Quarter),
            "y" | "year" | "yearly" => Ok(Period::Year),
            _ => Err(ParsePeriodError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodBar {
    pub label: NaiveDate,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PeriodBar {
    fn open_with(label: NaiveDate, point: &PricePoint) -> Self {
        Self {
            label,
            first_date: point.date,
            last_date: point.date,
            open: point.open,
            high: point.high,
            low: point.low,
            close: point.close,
            volume: point.volume,
        }
    }

    fn absorb(&mut self, point: &PricePoint) {
        self.last_date = point.date;
        self.high = self.high.max(point.high);
        self.low = self.low.min(point.low);
        self.close = point.close;
        self.volume = match (self.volume, point.volume) {
            (Some(a), Some(b)) => Some(a.saturating_add(b)),
            (a, b) => a.or(b),
        };
    }
}

/// Resamples one instrument's daily series. Input need not be sorted.
pub fn resample(daily: &[PricePoint], period: Period) -> Vec<PeriodBar> {
    let mut sorted: Vec<&PricePoint> = daily.iter().collect();
    sorted.sort_by_key(|p| p.date);

    let mut bars: Vec<PeriodBar> = Vec::new();
    for point in sorted {
        let label = period.bucket_label(point.date);
        match bars.last_mut() {
            Some(bar) if bar.label == label => bar.absorb(point),
            _ => bars.push(PeriodBar::open_with(label, point)),
        }
    }
    bars
}
