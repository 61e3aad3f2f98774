//! Momentum signal at the latest observation.
//!
//! momentum = close[t] / close[t - lookback] - 1, with t the last observation.
//! BUY above the buy threshold, SELL below the sell threshold, HOLD otherwise;
//! both thresholds are exclusive.

use crate::domain::ohlcv::PricePoint;
use crate::domain::panel::group_panel;
use std::fmt;

pub const DEFAULT_LOOKBACK: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumThresholds {
    pub buy: f64,
    pub sell: f64,
}

impl Default for MomentumThresholds {
    fn default() -> Self {
        Self {
            buy: 0.10,
            sell: -0.10,
        }
    }
}

impl MomentumThresholds {
    pub fn classify(&self, momentum: f64) -> Action {
        if momentum > self.buy {
            Action::Buy
        } else if momentum < self.sell {
            Action::Sell
        } else {
            Action::Hold
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome {
    Ready { action: Action, momentum: f64 },
    InsufficientData { observations: usize, required: usize },
}

impl SignalOutcome {
    pub fn action(&self) -> Option<Action> {
        match self {
            SignalOutcome::Ready { action, .. } => Some(*action),
            SignalOutcome::InsufficientData { .. } => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            SignalOutcome::Ready { action, .. } => action.to_string(),
            SignalOutcome::InsufficientData { .. } => "INSUFFICIENT_DATA".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub instrument_id: String,
    pub outcome: SignalOutcome,
}

/// Signal from a close series already in chronological order.
pub fn momentum_signal(closes: &[f64], lookback: usize, thresholds: &MomentumThresholds) -> SignalOutcome {
    let required = lookback.saturating_add(1);
    if lookback == 0 || closes.len() <= lookback {
        return SignalOutcome::InsufficientData {
            observations: closes.len(),
            required,
        };
    }

    let last = closes[closes.len() - 1];
    let base = closes[closes.len() - 1 - lookback];
    let momentum = last / base - 1.0;
    if !momentum.is_finite() {
        return SignalOutcome::InsufficientData {
            observations: closes.len(),
            required,
        };
    }

    SignalOutcome::Ready {
        action: thresholds.classify(momentum),
        momentum,
    }
}

/// One signal per instrument in the panel, ordered by instrument id.
pub fn momentum_signals(panel: &[PricePoint], lookback: usize, thresholds: &MomentumThresholds) -> Vec<Signal> {
    group_panel(panel)
        .into_iter()
        .map(|series| {
            let outcome = momentum_signal(&series.closes(), lookback, thresholds);
            if let SignalOutcome::InsufficientData {
                observations,
                required,
            } = outcome
            {
                tracing::warn!(
                    instrument = %series.instrument_id,
                    observations,
                    required,
                    "insufficient history for momentum signal"
                );
            }
            Signal {
                instrument_id: series.instrument_id,
                outcome,
            }
        })
        .collect()
}
