//! Strategy rule definitions: entry signals, exit policy, and the template
//! trait that turns a parameter point into prepared signals.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SweepError;
use crate::domain::grid::ParameterPoint;
use crate::domain::ohlcv::PriceSeries;

/// Which bar field a take-profit target is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetTrigger {
    /// Bar close, evaluated together with the stop.
    Close,
    /// Bar high; the fill is the target price itself.
    High,
}

/// What happens to a position still open after the last bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfDataPolicy {
    /// Close at the last bar's close with an end-of-data exit.
    #[default]
    ForceClose,
    /// Drop the open position without recording a trade.
    Discard,
}

impl FromStr for EndOfDataPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "force_close" => Ok(EndOfDataPolicy::ForceClose),
            "discard" => Ok(EndOfDataPolicy::Discard),
            other => Err(format!(
                "unknown end_of_data policy '{other}' (expected force_close or discard)"
            )),
        }
    }
}

impl fmt::Display for EndOfDataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndOfDataPolicy::ForceClose => write!(f, "force_close"),
            EndOfDataPolicy::Discard => write!(f, "discard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitPolicy {
    /// Signed fraction, e.g. -0.01 for a 1% stop.
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub target_trigger: TargetTrigger,
    pub end_of_data: EndOfDataPolicy,
}

impl ExitPolicy {
    pub fn with_end_of_data(self, end_of_data: EndOfDataPolicy) -> Self {
        Self {
            end_of_data,
            ..self
        }
    }
}

/// Precomputed entry/reversal predicates for one parameter point.
///
/// Implementations own their indicator series; nothing is recomputed while
/// the simulator scans.
pub trait Signals: Send + Sync {
    fn entry(&self, index: usize, price: f64) -> bool;

    /// Exit signal checked while a position is open.
    fn reversal(&self, _index: usize) -> bool {
        false
    }
}

/// Signals plus exit policy, ready to hand to the simulator.
pub struct PreparedStrategy {
    pub signals: Box<dyn Signals>,
    pub exit_policy: ExitPolicy,
}

/// A family of rules parameterized by grid axes.
pub trait StrategyTemplate: Send + Sync {
    fn name(&self) -> &str;

    /// Axes that every parameter point must provide.
    fn required_axes(&self) -> &'static [&'static str];

    fn prepare(
        &self,
        series: &PriceSeries,
        point: &ParameterPoint,
    ) -> Result<PreparedStrategy, SweepError>;
}

/// Validate the signed stop/target fractions a template resolved.
pub(crate) fn check_exit_fractions(
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
) -> Result<(), SweepError> {
    if let Some(stop) = stop_loss {
        if !stop.is_finite() || stop >= 0.0 {
            return Err(SweepError::invalid_parameter(
                "stop_loss",
                format!("must be a negative fraction, got {stop}"),
            ));
        }
    }
    if let Some(target) = take_profit {
        if !target.is_finite() || target <= 0.0 {
            return Err(SweepError::invalid_parameter(
                "take_profit",
                format!("must be a positive fraction, got {target}"),
            ));
        }
    }
    Ok(())
}
