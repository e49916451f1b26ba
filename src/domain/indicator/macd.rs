//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow), defined once both EMAs are
//! Signal Line = EMA(signal) over the defined part of the MACD line only
//! Histogram = MACD Line - Signal Line
//!
//! Warmup: the line starts at max(fast, slow) - 1, the signal and histogram
//! another (signal - 1) bars later.

use crate::domain::error::SweepError;
use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{require_period, IndicatorSeries, IndicatorType};

/// The three index-aligned MACD outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd_line: IndicatorSeries,
    pub signal_line: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn calculate_macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<MacdSeries, SweepError> {
    require_period("MACD fast", fast)?;
    require_period("MACD slow", slow)?;
    require_period("MACD signal", signal_period)?;

    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    let ema_fast = ema_values(prices, fast);
    let ema_slow = ema_values(prices, slow);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let mut signal_line: Vec<Option<f64>> = vec![None; prices.len()];
    let line_start = fast.max(slow) - 1;
    if line_start < prices.len() {
        let defined: Vec<f64> = macd_line[line_start..].iter().flatten().copied().collect();
        for (offset, value) in ema_values(&defined, signal_period).into_iter().enumerate() {
            signal_line[line_start + offset] = value;
        }
    }

    let histogram: Vec<Option<f64>> = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    Ok(MacdSeries {
        macd_line: IndicatorSeries::new(indicator_type.clone(), macd_line),
        signal_line: IndicatorSeries::new(indicator_type.clone(), signal_line),
        histogram: IndicatorSeries::new(indicator_type, histogram),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::calculate_ema;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_warmup_12_26_9() {
        let prices = rising(40);
        let macd = calculate_macd(&prices, 12, 26, 9).unwrap();

        assert_eq!(macd.macd_line.first_defined(), Some(25));

        let warmup = 25 + 8;
        for i in 0..warmup {
            assert!(macd.signal_line.get(i).is_none(), "Index {} should be absent", i);
            assert!(macd.histogram.get(i).is_none());
        }
        assert!(macd.signal_line.get(warmup).is_some());
        assert!(macd.histogram.get(warmup).is_some());
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0).collect();
        let macd = calculate_macd(&prices, 12, 26, 9).unwrap();

        for i in 0..prices.len() {
            if let (Some(line), Some(signal)) = (macd.macd_line.get(i), macd.signal_line.get(i)) {
                assert_eq!(macd.histogram.get(i), Some(line - signal));
            }
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let prices = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let macd = calculate_macd(&prices, 3, 5, 2).unwrap();

        let ema_fast = calculate_ema(&prices, 3).unwrap();
        let ema_slow = calculate_ema(&prices, 5).unwrap();

        for i in 0..prices.len() {
            let expected = match (ema_fast.get(i), ema_slow.get(i)) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            };
            assert_eq!(macd.macd_line.get(i), expected, "MACD line mismatch at index {}", i);
        }
    }

    #[test]
    fn macd_signal_seeded_from_defined_line_only() {
        let prices = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let macd = calculate_macd(&prices, 3, 5, 2).unwrap();

        // line starts at index 4; signal seed is the mean of line[4] and line[5]
        let seed = (macd.macd_line.get(4).unwrap() + macd.macd_line.get(5).unwrap()) / 2.0;
        assert!(macd.signal_line.get(4).is_none());
        assert!((macd.signal_line.get(5).unwrap() - seed).abs() < f64::EPSILON);
    }

    #[test]
    fn macd_fast_slower_than_slow_still_aligns() {
        let prices = rising(20);
        let macd = calculate_macd(&prices, 8, 4, 3).unwrap();
        assert_eq!(macd.macd_line.first_defined(), Some(7));
        assert_eq!(macd.signal_line.first_defined(), Some(9));
    }

    #[test]
    fn macd_outputs_match_input_length() {
        let prices = rising(7);
        let macd = calculate_macd(&prices, 3, 5, 9).unwrap();
        assert_eq!(macd.macd_line.len(), 7);
        assert_eq!(macd.signal_line.len(), 7);
        assert_eq!(macd.histogram.len(), 7);
        assert_eq!(macd.signal_line.defined_count(), 0);
    }

    #[test]
    fn macd_indicator_type() {
        let macd = calculate_macd(&[100.0, 101.0, 102.0], 5, 10, 3).unwrap();
        assert_eq!(
            macd.histogram.indicator_type,
            IndicatorType::Macd {
                fast: 5,
                slow: 10,
                signal: 3
            }
        );
    }

    #[test]
    fn macd_empty_prices() {
        let macd = calculate_macd(&[], 12, 26, 9).unwrap();
        assert!(macd.macd_line.is_empty());
        assert!(macd.histogram.is_empty());
    }

    #[test]
    fn macd_zero_period() {
        let prices = [100.0, 101.0, 102.0];
        assert!(calculate_macd(&prices, 0, 26, 9).is_err());
        assert!(calculate_macd(&prices, 12, 0, 9).is_err());
        assert!(calculate_macd(&prices, 12, 26, 0).is_err());
    }
}
