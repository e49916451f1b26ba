//! Built-in strategy templates.

pub mod bollinger_macd;
pub mod ema_crossover;

pub use bollinger_macd::BollingerMacd;
pub use ema_crossover::EmaCrossover;

use crate::domain::error::SweepError;
use crate::domain::strategy::StrategyTemplate;

/// Names accepted by [`by_name`].
pub const STRATEGY_NAMES: &[&str] = &[bollinger_macd::NAME, ema_crossover::NAME];

/// A template with its built-in defaults.
pub fn by_name(name: &str) -> Result<Box<dyn StrategyTemplate>, SweepError> {
    with_settings(name, |_, default| default)
}

/// A template whose tunable fields are looked up through
/// `setting(key, built-in default)`.
pub fn with_settings(
    name: &str,
    setting: impl Fn(&str, f64) -> f64,
) -> Result<Box<dyn StrategyTemplate>, SweepError> {
    match name.trim() {
        bollinger_macd::NAME => Ok(Box::new(BollingerMacd::with_settings(setting))),
        ema_crossover::NAME => Ok(Box::new(EmaCrossover::with_settings(setting))),
        other => Err(SweepError::UnknownStrategy {
            name: other.to_string(),
        }),
    }
}
