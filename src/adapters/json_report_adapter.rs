//! JSON report adapter implementing ReportPort.
//!
//! Each table is written as a pretty-printed array of objects. Values that
//! are not computable become `null`.

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

pub struct JsonReportAdapter;

fn write_array<T: Serialize>(rows: &[T], out: &mut dyn Write) -> Result<(), StockMetricsError> {
    serde_json::to_writer_pretty(&mut *out, rows)?;
    writeln!(out)?;
    Ok(())
}

impl ReportPort for JsonReportAdapter {
    fn write_metrics(&self, results: &[MetricsResult], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<MetricsRow> = results.iter().map(MetricsRow::from).collect();
        write_array(&rows, out)
    }

    fn write_signals(&self, signals: &[Signal], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<SignalRow> = signals.iter().map(SignalRow::from).collect();
        write_array(&rows, out)
    }

    fn write_bars(&self, code: &str, bars: &[PeriodBar], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<BarRow> = bars.iter().map(|b| BarRow::new(code, b)).collect();
        write_array(&rows, out)
    }

    fn write_returns(&self, series: &[InstrumentReturns], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        write_array(&return_rows(series), out)
    }

    fn write_yearly(&self, rows: &[YearlyMetrics], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<YearlyRow> = rows.iter().map(YearlyRow::from).collect();
        write_array(&rows, out)
    }

    fn write_portfolio(&self, curve: &[(NaiveDate, f64)], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<PortfolioRow> = curve.iter().map(PortfolioRow::from).collect();
        write_array(&rows, out)
    }

    fn write_codes(&self, codes: &[String], out: &mut dyn Write) -> Result<(), StockMetricsError> {
        let rows: Vec<CodeRow> = codes.iter().map(CodeRow::from).collect();
        write_array(&rows, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn render_metrics(results: &[MetricsResult]) -> Value {
        let mut buf: Vec<u8> = Vec::new();
        JsonReportAdapter.write_metrics(results, &mut buf).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn not_computable_is_null() {
        let value = render_metrics(&[MetricsResult::not_computable("sz.000001")]);

        let row = &value[0];
        assert_eq!(row["code"], "sz.000001");
        assert!(row["annual_return"].is_null());
        assert!(row["max_drawdown"].is_null());
        assert!(row["sharpe"].is_null());
        assert!(row["sortino"].is_null());
    }

    #[test]
    fn empty_results_is_empty_array() {
        let value = render_metrics(&[]);
        assert_eq!(value, Value::Array(vec![]));
    }

    #[test]
    fn yearly_rows_keep_year_as_number() {
        let rows = vec![YearlyMetrics {
            instrument_id: "sh.600000".into(),
            year: 2023,
            period_return: Some(0.12),
            max_drawdown: Some(-0.08),
            daily_sharpe: None,
        }];
        let mut buf: Vec<u8> = Vec::new();
        JsonReportAdapter.write_yearly(&rows, &mut buf).unwrap();

        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["year"], 2023);
        assert_eq!(value[0]["period_return"], 0.12);
        assert!(value[0]["sharpe"].is_null());
    }
}
