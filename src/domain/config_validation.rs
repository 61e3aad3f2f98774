//! Configuration validation.
//!
//! Checks every analysis setting before a run starts. Absent keys fall back
//! to their defaults and are not errors.

use crate::domain::error::StockMetricsError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), StockMetricsError> {
    validate_risk_free_rate(config)?;
    validate_trading_days(config)?;
    validate_windows(config)?;
    validate_lookback(config)?;
    validate_thresholds(config)?;
    validate_dates(config)?;
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), StockMetricsError> {
    let value = config.get_double("metrics", "risk_free_rate", 0.03);
    if !(0.0..1.0).contains(&value) {
        return Err(StockMetricsError::invalid(
            "metrics",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_trading_days(config: &dyn ConfigPort) -> Result<(), StockMetricsError> {
    let value = config.get_double("metrics", "trading_days_per_year", 252.0);
    if value <= 0.0 || !value.is_finite() {
        return Err(StockMetricsError::invalid(
            "metrics",
            "trading_days_per_year",
            "trading_days_per_year must be positive",
        ));
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), StockMetricsError> {
    let short = config.get_int("returns", "short_window", 5);
    let long = config.get_int("returns", "long_window", 20);
    if short < 1 {
        return Err(StockMetricsError::invalid(
            "returns",
            "short_window",
            "short_window must be at least 1",
        ));
    }
    if long <= short {
        return Err(StockMetricsError::invalid(
            "returns",
            "long_window",
            "long_window must be greater than short_window",
        ));
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), StockMetricsError> {
    let value = config.get_int("signal", "lookback", 60);
    if value < 1 {
        return Err(StockMetricsError::invalid(
            "signal",
            "lookback",
            "lookback must be at least 1",
        ));
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), StockMetricsError> {
    let buy = config.get_double("signal", "buy_threshold", 0.10);
    let sell = config.get_double("signal", "sell_threshold", -0.10);
    if buy < 0.0 {
        return Err(StockMetricsError::invalid(
            "signal",
            "buy_threshold",
            "buy_threshold must be non-negative",
        ));
    }
    if sell > 0.0 {
        return Err(StockMetricsError::invalid(
            "signal",
            "sell_threshold",
            "sell_threshold must be non-positive",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), StockMetricsError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(StockMetricsError::invalid(
                "data",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, StockMetricsError> {
    match config.get_string("data", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                StockMetricsError::invalid(
                    "data",
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
    }
}
