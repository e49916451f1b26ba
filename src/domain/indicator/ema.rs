//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are absent.

use crate::domain::error::SweepError;
use crate::domain::indicator::{require_period, IndicatorSeries, IndicatorType};

pub fn calculate_ema(prices: &[f64], period: usize) -> Result<IndicatorSeries, SweepError> {
    require_period("EMA", period)?;
    Ok(IndicatorSeries::new(
        IndicatorType::Ema(period),
        ema_values(prices, period),
    ))
}

/// Raw EMA recurrence shared with the MACD signal line. `period` must be > 0.
pub(crate) fn ema_values(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(prices.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &price) in prices.iter().enumerate() {
        if i + 1 < period {
            sum += price;
            values.push(None);
        } else if i + 1 == period {
            sum += price;
            ema = sum / period as f64;
            values.push(Some(ema));
        } else {
            ema = price * k + ema * (1.0 - k);
            values.push(Some(ema));
        }
    }

    values
}
