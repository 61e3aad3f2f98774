//! stockmetrics: return, risk and momentum metrics for daily stock panels.
//!
//! Hexagonal architecture: pure computations in [`domain`], port traits in
//! [`ports`], file-backed implementations in [`adapters`], and the command
//! line shell in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
