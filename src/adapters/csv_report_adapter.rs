//! CSV report adapter implementing ReportPort.
//!
//! Not-computable values become empty fields. A header row is always
//! written, even for an empty table.

use crate::adapters::report_rows::{
    BarRow, CodeRow, MetricsRow, PortfolioRow, SignalRow, YearlyRow, return_rows,
};
use crate::domain::error::StockMetricsError;
use crate::domain::metrics::MetricsResult;
use crate::domain::resample::PeriodBar;
use crate::domain::returns::InstrumentReturns;
use crate::domain::signal::Signal;
use crate::domain::yearly::YearlyMetrics;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

pub struct CsvReportAdapter;

fn write_table<T: Serialize>(
    header: &[&str],
    rows: &[T],
    out: &mut dyn Write,
) -> Result<(), StockMetricsError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write_metrics(&self, results: &[MetricsResult], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<MetricsRow> = results.iter().map(MetricsRow::from).collect();
        write_table(
            &["code", "annual_return", "max_drawdown", "sharpe", "sortino"],
            &rows,
            out,
        )
    }

    fn write_signals(&self, signals: &[Signal], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<SignalRow> = signals.iter().map(SignalRow::from).collect();
        write_table(&["code", "action", "momentum"], &rows, out)
    }

    fn write_bars(&self, code: &str, bars: &[PeriodBar], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<BarRow> = bars.iter().map(|b| BarRow::new(code, b)).collect();
        write_table(
            &["code", "date", "open", "high", "low", "close", "volume"],
            &rows,
            out,
        )
    }

    fn write_returns(&self, series: &[InstrumentReturns], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        write_table(
            &["code", "date", "close", "returns", "ma_short", "ma_long"],
            &return_rows(series),
            out,
        )
    }

    fn write_yearly(&self, rows: &[YearlyMetrics], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<YearlyRow> = rows.iter().map(YearlyRow::from).collect();
        write_table(
            &["code", "year", "period_return", "max_drawdown", "sharpe"],
            &rows,
            out,
        )
    }

    fn write_portfolio(&self, curve: &[(NaiveDate, f64)], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<PortfolioRow> = curve.iter().map(PortfolioRow::from).collect();
        write_table(&["date", "returns"], &rows, out)
    }

    fn write_codes(&self, codes: &[String], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<CodeRow> = codes.iter().map(CodeRow::from).collect();
        write_table(&["code", "detail_code", "kline_code"], &rows, out)
    }
}
