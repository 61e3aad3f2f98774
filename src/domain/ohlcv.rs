//! Daily price row of an instrument panel.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub instrument_id: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PricePoint {
    /// True when every price is finite and strictly positive.
    pub fn has_valid_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
}
