//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are absent.

use crate::domain::error::SweepError;
use crate::domain::indicator::{require_period, IndicatorSeries, IndicatorType};

pub fn calculate_sma(prices: &[f64], period: usize) -> Result<IndicatorSeries, SweepError> {
    require_period("SMA", period)?;

    let values = (0..prices.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &prices[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect();

    Ok(IndicatorSeries::new(IndicatorType::Sma(period), values))
}
