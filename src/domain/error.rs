//! Error types for the data, config and output shell around the metrics core.
//!
//! The computations themselves never fail: insufficient history or degenerate
//! volatility are reported as "not computable" values on the result types.

#[derive(Debug, thiserror::Error)]
pub enum StockMetricsError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("output error: {reason}")]
    Output { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockMetricsError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        StockMetricsError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for StockMetricsError {
    fn from(err: csv::Error) -> Self {
        StockMetricsError::Output {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StockMetricsError {
    fn from(err: serde_json::Error) -> Self {
        StockMetricsError::Output {
            reason: err.to_string(),
        }
    }
}

impl From<&StockMetricsError> for std::process::ExitCode {
    fn from(err: &StockMetricsError) -> Self {
        let code: u8 = match err {
            StockMetricsError::Io(_) | StockMetricsError::Output { .. } => 1,
            StockMetricsError::ConfigParse { .. }
            | StockMetricsError::ConfigMissing { .. }
            | StockMetricsError::ConfigInvalid { .. } => 2,
            StockMetricsError::Data { .. } => 3,
            StockMetricsError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
