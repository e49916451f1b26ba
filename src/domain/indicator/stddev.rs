//! Standard Deviation indicator.
//!
//! Population standard deviation over n prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) bars are absent.

use crate::domain::error::SweepError;
use crate::domain::indicator::{require_period, IndicatorSeries, IndicatorType};

pub fn calculate_stddev(prices: &[f64], period: usize) -> Result<IndicatorSeries, SweepError> {
    require_period("STDDEV", period)?;

    let values = (0..prices.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &prices[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            Some(population_stddev(window, mean))
        })
        .collect();

    Ok(IndicatorSeries::new(IndicatorType::Stddev(period), values))
}

/// Population standard deviation of `window` around a precomputed `mean`.
pub(crate) fn population_stddev(window: &[f64], mean: f64) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let variance = window
        .iter()
        .map(|p| {
            let diff = p - mean;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;
    variance.sqrt()
}
