//! EMA crossover filtered by RSI and MACD momentum.
//!
//! Entry when the fast EMA crosses above the slow EMA, RSI sits strictly
//! inside the configured band and the MACD histogram is positive. The
//! position exits when a bar's high reaches the target, or when the fast
//! EMA crosses back below the slow EMA.

use crate::domain::error::SweepError;
use crate::domain::grid::ParameterPoint;
use crate::domain::indicator::{calculate_ema, calculate_macd, calculate_rsi, IndicatorSeries};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::strategy::{
    check_exit_fractions, EndOfDataPolicy, ExitPolicy, PreparedStrategy, Signals, StrategyTemplate,
    TargetTrigger,
};

pub const NAME: &str = "ema_crossover";

const AXES: &[&str] = &[
    "ema_fast",
    "ema_slow",
    "rsi_length",
    "macd_fast",
    "macd_slow",
    "macd_signal",
];

#[derive(Debug, Clone, PartialEq)]
pub struct EmaCrossover {
    pub take_profit: f64,
    pub rsi_lower: f64,
    pub rsi_upper: f64,
}

impl Default for EmaCrossover {
    fn default() -> Self {
        EmaCrossover {
            take_profit: 0.02,
            rsi_lower: 50.0,
            rsi_upper: 80.0,
        }
    }
}

impl EmaCrossover {
    pub fn with_settings(setting: impl Fn(&str, f64) -> f64) -> Self {
        let defaults = Self::default();
        EmaCrossover {
            take_profit: setting("take_profit", defaults.take_profit),
            rsi_lower: setting("rsi_lower", defaults.rsi_lower),
            rsi_upper: setting("rsi_upper", defaults.rsi_upper),
        }
    }
}

struct EmaCrossoverSignals {
    fast: IndicatorSeries,
    slow: IndicatorSeries,
    rsi: IndicatorSeries,
    histogram: IndicatorSeries,
    rsi_lower: f64,
    rsi_upper: f64,
}

impl EmaCrossoverSignals {
    /// `Some((previous diff, current diff))` of fast - slow at `index`.
    fn spread(&self, index: usize) -> Option<(f64, f64)> {
        let prev = index.checked_sub(1)?;
        let before = self.fast.get(prev)? - self.slow.get(prev)?;
        let now = self.fast.get(index)? - self.slow.get(index)?;
        Some((before, now))
    }
}

impl Signals for EmaCrossoverSignals {
    fn entry(&self, index: usize, _price: f64) -> bool {
        let Some((before, now)) = self.spread(index) else {
            return false;
        };
        let crossed_up = before < 0.0 && now > 0.0;
        let rsi_ok = self
            .rsi
            .get(index)
            .is_some_and(|r| r > self.rsi_lower && r < self.rsi_upper);
        let momentum = self.histogram.get(index).is_some_and(|h| h > 0.0);
        crossed_up && rsi_ok && momentum
    }

    fn reversal(&self, index: usize) -> bool {
        self.spread(index)
            .is_some_and(|(before, now)| before > 0.0 && now < 0.0)
    }
}

impl StrategyTemplate for EmaCrossover {
    fn name(&self) -> &str {
        NAME
    }

    fn required_axes(&self) -> &'static [&'static str] {
        AXES
    }

    fn prepare(
        &self,
        series: &PriceSeries,
        point: &ParameterPoint,
    ) -> Result<PreparedStrategy, SweepError> {
        let closes = series.closes();

        let fast = calculate_ema(closes, point.period("ema_fast")?)?;
        let slow = calculate_ema(closes, point.period("ema_slow")?)?;
        let rsi = calculate_rsi(closes, point.period("rsi_length")?)?;
        let macd = calculate_macd(
            closes,
            point.period("macd_fast")?,
            point.period("macd_slow")?,
            point.period("macd_signal")?,
        )?;

        let take_profit = point.number_or("take_profit", self.take_profit);
        check_exit_fractions(None, Some(take_profit))?;

        Ok(PreparedStrategy {
            signals: Box::new(EmaCrossoverSignals {
                fast,
                slow,
                rsi,
                histogram: macd.histogram,
                rsi_lower: self.rsi_lower,
                rsi_upper: self.rsi_upper,
            }),
            exit_policy: ExitPolicy {
                stop_loss: None,
                take_profit: Some(take_profit),
                target_trigger: TargetTrigger::High,
                end_of_data: EndOfDataPolicy::default(),
            },
        })
    }
}
