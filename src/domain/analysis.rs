//! Parameters of one analysis run, resolved from configuration.

use crate::domain::metrics::MetricsParams;
use crate::domain::returns::MovingAverageWindows;
use crate::domain::signal::{DEFAULT_LOOKBACK, MomentumThresholds};
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub panel_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub metrics: MetricsParams,
    pub windows: MovingAverageWindows,
    pub lookback: usize,
    pub thresholds: MomentumThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            panel_path: None,
            output_dir: None,
            start_date: None,
            end_date: None,
            metrics: MetricsParams::default(),
            windows: MovingAverageWindows::default(),
            lookback: DEFAULT_LOOKBACK,
            thresholds: MomentumThresholds::default(),
        }
    }
}
