//! Open position tracking and closed trade outcomes.

use serde::Serialize;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TargetHit,
    StopHit,
    SignalReversal,
    EndOfData,
}

/// A long position opened at the close of `entry_index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub entry_index: usize,
    pub entry_price: f64,
}

impl OpenPosition {
    pub fn new(entry_index: usize, entry_price: f64) -> Self {
        Self {
            entry_index,
            entry_price,
        }
    }

    /// Fractional move from entry: (price - entry) / entry.
    pub fn change(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }

    /// `stop_loss` is a signed fraction, e.g. -0.01.
    pub fn should_stop_loss(&self, price: f64, stop_loss: Option<f64>) -> bool {
        stop_loss.is_some_and(|stop| self.change(price) <= stop)
    }

    pub fn should_take_profit(&self, price: f64, take_profit: Option<f64>) -> bool {
        take_profit.is_some_and(|target| self.change(price) >= target)
    }

    /// Price at which a take-profit fraction is reached.
    pub fn target_price(&self, take_profit: f64) -> f64 {
        self.entry_price * (1.0 + take_profit)
    }

    pub fn close(self, exit_index: usize, exit_price: f64, exit_reason: ExitReason) -> TradeOutcome {
        TradeOutcome {
            entry_index: self.entry_index,
            entry_price: self.entry_price,
            exit_index,
            exit_price,
            exit_reason,
            pnl_fraction: self.change(exit_price),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeOutcome {
    pub entry_index: usize,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub pnl_fraction: f64,
}

impl TradeOutcome {
    pub fn is_win(&self) -> bool {
        self.pnl_fraction > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}
