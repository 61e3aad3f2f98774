//! Core domain types and computations.

pub mod analysis;
pub mod code;
pub mod config_validation;
pub mod error;
pub mod metrics;
pub mod ohlcv;
pub mod panel;
pub mod resample;
pub mod returns;
pub mod signal;
pub mod yearly;
