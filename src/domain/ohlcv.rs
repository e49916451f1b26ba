//! OHLCV candles and the read-only price series built from them.

use crate::domain::error::SweepError;
use serde::{Deserialize, Serialize};

/// One OHLCV record. `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Ordered candles plus index-aligned column arrays.
///
/// Built once per sweep and only ever handed out by shared reference, so
/// every derived column keeps `len() == candles.len()`.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    candles: Vec<Candle>,
    timestamps: Vec<i64>,
    opens: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
    closes: Vec<f64>,
    volumes: Vec<f64>,
}

impl PriceSeries {
    /// Validates ordering and finiteness, then splits the candles into columns.
    pub fn new(candles: Vec<Candle>) -> Result<Self, SweepError> {
        for (i, candle) in candles.iter().enumerate() {
            let prices = [candle.open, candle.high, candle.low, candle.close];
            if prices.iter().any(|p| !p.is_finite()) {
                return Err(SweepError::malformed(format!(
                    "candle {i} has a non-finite price"
                )));
            }
            if i > 0 && candle.timestamp < candles[i - 1].timestamp {
                return Err(SweepError::malformed(format!(
                    "timestamp decreases at candle {i} ({} < {})",
                    candle.timestamp,
                    candles[i - 1].timestamp
                )));
            }
        }

        Ok(Self {
            timestamps: candles.iter().map(|c| c.timestamp).collect(),
            opens: candles.iter().map(|c| c.open).collect(),
            highs: candles.iter().map(|c| c.high).collect(),
            lows: candles.iter().map(|c| c.low).collect(),
            closes: candles.iter().map(|c| c.close).collect(),
            volumes: candles.iter().map(|c| c.volume).collect(),
            candles,
        })
    }

    /// Series where open/high/low all equal the close. Handy for indicator work.
    pub fn from_closes(closes: &[f64]) -> Result<Self, SweepError> {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: i as i64,
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect();
        Self::new(candles)
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn opens(&self) -> &[f64] {
        &self.opens
    }

    pub fn highs(&self) -> &[f64] {
        &self.highs
    }

    pub fn lows(&self) -> &[f64] {
        &self.lows
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// First and last timestamps, if any candles are loaded.
    pub fn time_range(&self) -> Option<(i64, i64)> {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(&first), Some(&last)) => Some((first, last)),
            _ => None,
        }
    }
}
