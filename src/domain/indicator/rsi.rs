//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100, including the flat 0/0 case.
//!
//! Warmup: bars 0..n are absent; bar n is the first defined value.

use crate::domain::error::SweepError;
use crate::domain::indicator::{require_period, IndicatorSeries, IndicatorType};

pub fn calculate_rsi(prices: &[f64], period: usize) -> Result<IndicatorSeries, SweepError> {
    require_period("RSI", period)?;

    let mut values: Vec<Option<f64>> = vec![None; prices.len()];
    if prices.len() <= period {
        return Ok(IndicatorSeries::new(IndicatorType::Rsi(period), values));
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let (gain, loss) = split_change(prices[i] - prices[i - 1]);
        avg_gain += gain;
        avg_loss += loss;
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    values[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    let n = period as f64;
    for i in (period + 1)..prices.len() {
        let (gain, loss) = split_change(prices[i] - prices[i - 1]);
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        values[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    Ok(IndicatorSeries::new(IndicatorType::Rsi(period), values))
}

fn split_change(change: f64) -> (f64, f64) {
    if change > 0.0 {
        (change, 0.0)
    } else {
        (0.0, -change)
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
