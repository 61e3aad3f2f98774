//! Price-panel access port.

use crate::domain::error::StockMetricsError;
use crate::domain::ohlcv::PricePoint;
use chrono::NaiveDate;

pub trait DataPort {
    /// All rows dated within the optional inclusive bounds.
    fn fetch_panel(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StockMetricsError>;

    /// Rows of one instrument, sorted by date. `code` may be given in either
    /// identifier notation.
    fn fetch_series(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StockMetricsError>;

    fn list_codes(&self) -> Result<Vec<String>, StockMetricsError>;
}
