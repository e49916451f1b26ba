//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Warmup: first (period-1) bars are absent.

use crate::domain::error::SweepError;
use crate::domain::indicator::stddev::population_stddev;
use crate::domain::indicator::{calculate_sma, IndicatorSeries, IndicatorType};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn calculate_bollinger(
    prices: &[f64],
    period: usize,
    multiplier: f64,
) -> Result<IndicatorSeries<BollingerBand>, SweepError> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(SweepError::invalid_parameter(
            "BOLLINGER multiplier",
            format!("must be a non-negative number, got {multiplier}"),
        ));
    }
    let sma = calculate_sma(prices, period)?;

    let values = sma
        .values
        .iter()
        .enumerate()
        .map(|(i, middle)| {
            middle.map(|middle| {
                let window = &prices[i + 1 - period..=i];
                let width = multiplier * population_stddev(window, middle);
                BollingerBand {
                    upper: middle + width,
                    middle,
                    lower: middle - width,
                }
            })
        })
        .collect();

    Ok(IndicatorSeries::new(
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100: (multiplier * 100.0).round() as u32,
        },
        values,
    ))
}
