//! Result output port.

use crate::domain::error::StockMetricsError;
use crate::domain::metrics::MetricsResult;
use crate::domain::resample::PeriodBar;
use crate::domain::returns::InstrumentReturns;
use crate::domain::signal::Signal;
use crate::domain::yearly::YearlyMetrics;
use chrono::NaiveDate;
use std::io::Write;

/// Writes analysis results as tables. Values that are not computable are
/// written as empty fields or nulls, never as zero.
pub trait ReportPort {
    fn write_metrics(&self, results: &[MetricsResult], out: &mut dyn Write) -> Result<(), StockMetricsError>;

    fn write_signals(&self, signals: &[Signal], out: &mut dyn Write) -> Result<(), StockMetricsError>;

    fn write_bars(&self, code: &str, bars: &[PeriodBar], out: &mut dyn Write) -> Result<(), StockMetricsError>;

    fn write_returns(&self, series: &[InstrumentReturns], out: &mut dyn Write) -> Result<(), StockMetricsError>;

    fn write_yearly(&self, rows: &[YearlyMetrics], out: &mut dyn Write) -> Result<(), StockMetricsError>;

    fn write_portfolio(&self, curve: &[(NaiveDate, f64)], out: &mut dyn Write) -> Result<(), StockMetricsError>;

    /// One row per instrument code, with its detail and kline notations.
    fn write_codes(&self, codes: &[String], out: &mut dyn Write) -> Result<(), StockMetricsError>;
}
