//! Technical indicator implementations.
//!
//! Every indicator takes a slice of prices and returns a series of the same
//! length where `None` marks warm-up bars (or values that cannot be defined).
//! Library-wide conventions:
//! - EMA is seeded with the SMA of its first `period` inputs.
//! - The MACD signal line smooths only the defined part of the MACD line.
//! - A zero period is rejected with [`SweepError::InvalidParameter`].
//!
//! - `IndicatorType`: which indicator produced a series, with its parameters
//! - `IndicatorSeries`: an index-aligned series of optional values

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::{calculate_bollinger, BollingerBand};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;

use crate::domain::error::SweepError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries<T = f64> {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<T>>,
}

impl<T: Copy> IndicatorSeries<T> {
    pub fn new(indicator_type: IndicatorType, values: Vec<Option<T>>) -> Self {
        Self {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`; `None` for warm-up bars and out-of-range indices.
    pub fn get(&self, index: usize) -> Option<T> {
        self.values.get(index).copied().flatten()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Index of the first defined value.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|v| v.is_some())
    }
}

/// Reject a zero lookback before any work is done.
pub(crate) fn require_period(indicator: &str, period: usize) -> Result<(), SweepError> {
    if period == 0 {
        return Err(SweepError::invalid_parameter(
            indicator,
            "period must be greater than 0",
        ));
    }
    Ok(())
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
