//! Bollinger/MACD mean-reversion rules.
//!
//! Entry: close at or below the lower Bollinger band while the MACD
//! histogram is positive. Exit: close-based stop-loss / take-profit.

use crate::domain::error::SweepError;
use crate::domain::grid::ParameterPoint;
use crate::domain::indicator::{calculate_bollinger, calculate_macd, BollingerBand, IndicatorSeries};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::strategy::{
    check_exit_fractions, EndOfDataPolicy, ExitPolicy, PreparedStrategy, Signals, StrategyTemplate,
    TargetTrigger,
};

pub const NAME: &str = "bollinger_macd";

const AXES: &[&str] = &["bb_period", "bb_mult", "macd_fast", "macd_slow", "macd_signal"];

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerMacd {
    /// Used when the grid has no `stop_loss` axis.
    pub stop_loss: f64,
    /// Used when the grid has no `take_profit` axis.
    pub take_profit: f64,
}

impl Default for BollingerMacd {
    fn default() -> Self {
        BollingerMacd {
            stop_loss: -0.01,
            take_profit: 0.02,
        }
    }
}

impl BollingerMacd {
    /// Defaults, each passed through `setting(key, default)`.
    pub fn with_settings(setting: impl Fn(&str, f64) -> f64) -> Self {
        let defaults = Self::default();
        BollingerMacd {
            stop_loss: setting("stop_loss", defaults.stop_loss),
            take_profit: setting("take_profit", defaults.take_profit),
        }
    }
}

struct BollingerMacdSignals {
    bands: IndicatorSeries<BollingerBand>,
    histogram: IndicatorSeries,
}

impl Signals for BollingerMacdSignals {
    fn entry(&self, index: usize, price: f64) -> bool {
        match (self.bands.get(index), self.histogram.get(index)) {
            (Some(band), Some(hist)) => price <= band.lower && hist > 0.0,
            _ => false,
        }
    }
}

impl StrategyTemplate for BollingerMacd {
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

        let bands = calculate_bollinger(closes, point.period("bb_period")?, point.number("bb_mult")?)?;
        let macd = calculate_macd(
            closes,
            point.period("macd_fast")?,
            point.period("macd_slow")?,
            point.period("macd_signal")?,
        )?;

        let stop_loss = point.number_or("stop_loss", self.stop_loss);
        let take_profit = point.number_or("take_profit", self.take_profit);
        check_exit_fractions(Some(stop_loss), Some(take_profit))?;

        Ok(PreparedStrategy {
            signals: Box::new(BollingerMacdSignals {
                bands,
                histogram: macd.histogram,
            }),
            exit_policy: ExitPolicy {
                stop_loss: Some(stop_loss),
                take_profit: Some(take_profit),
                target_trigger: TargetTrigger::Close,
                end_of_data: EndOfDataPolicy::default(),
            },
        })
    }
}
