//! Configuration validation.
//!
//! Checks every sweep config field before any data is loaded, so a bad
//! key is reported once instead of failing every grid point.

use crate::domain::error::SweepError;
use crate::domain::grid::{Constraint, MAX_AXIS_LEN, MAX_GRID_SIZE};
use crate::domain::strategies;
use crate::domain::strategy::EndOfDataPolicy;
use crate::ports::config_port::ConfigPort;

pub const SWEEP_SECTION: &str = "sweep";
pub const STRATEGY_SECTION: &str = "strategy";

/// Section holding one axis definition, e.g. `[axis.bb_period]`.
pub fn axis_section(axis: &str) -> String {
    format!("axis.{axis}")
}

pub fn validate_sweep_config(config: &dyn ConfigPort) -> Result<(), SweepError> {
    let axes = validate_axes(config)?;
    for section in unlisted_axis_sections(config, &axes) {
        tracing::warn!(%section, "axis section is not listed in [sweep] axes; ignored");
    }
    validate_strategy(config, &axes)?;
    validate_constraints(config, &axes)?;
    validate_top_k(config)?;
    validate_progress_every(config)?;
    validate_end_of_data(config)?;
    validate_exit_defaults(config)?;
    validate_rsi_band(config)?;
    Ok(())
}

/// `[axis.*]` sections that no listed axis refers to.
pub fn unlisted_axis_sections(config: &dyn ConfigPort, axes: &[String]) -> Vec<String> {
    let listed: Vec<String> = axes.iter().map(|a| axis_section(a).to_lowercase()).collect();
    config
        .sections()
        .into_iter()
        .filter(|s| s.starts_with("axis.") && !listed.contains(&s.to_lowercase()))
        .collect()
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SweepError {
    SweepError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> SweepError {
    SweepError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

/// The key parsed as a number, `None` when absent.
fn number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, SweepError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(section, key, format!("'{}' is not a number", raw.trim()))),
    }
}

fn whole_number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, SweepError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{}' is not an integer", raw.trim()))),
    }
}

fn validate_axes(config: &dyn ConfigPort) -> Result<Vec<String>, SweepError> {
    let axes = config.get_list(SWEEP_SECTION, "axes");
    if axes.is_empty() {
        return Err(missing(SWEEP_SECTION, "axes"));
    }
    let mut size = 1usize;
    for axis in &axes {
        let len = validate_axis_section(config, axis)?;
        size = size
            .checked_mul(len)
            .filter(|&size| size <= MAX_GRID_SIZE)
            .ok_or_else(|| {
                invalid(
                    SWEEP_SECTION,
                    "axes",
                    format!("grid grows past {MAX_GRID_SIZE} combinations at axis {axis}"),
                )
            })?;
    }
    Ok(axes)
}

/// Checks one `[axis.<name>]` section and returns its value count.
fn validate_axis_section(config: &dyn ConfigPort, axis: &str) -> Result<usize, SweepError> {
    let section = axis_section(axis);

    if config.get_string(&section, "values").is_some() {
        let values = config.get_list(&section, "values");
        if values.is_empty() {
            return Err(invalid(&section, "values", "value list is empty"));
        }
        for value in &values {
            if !value.parse::<f64>().is_ok_and(f64::is_finite) {
                return Err(invalid(&section, "values", format!("'{value}' is not a number")));
            }
        }
        if values.len() > MAX_AXIS_LEN {
            return Err(invalid(&section, "values", format!("more than {MAX_AXIS_LEN} values")));
        }
        return Ok(values.len());
    }

    let start = number(config, &section, "start")?.ok_or_else(|| missing(&section, "start"))?;
    let end = number(config, &section, "end")?.ok_or_else(|| missing(&section, "end"))?;
    if start > end {
        return Err(invalid(&section, "start", "start must not be after end"));
    }
    let step = number(config, &section, "step")?.unwrap_or(1.0);
    if step <= 0.0 {
        return Err(invalid(&section, "step", "step must be positive"));
    }
    let span = ((end - start) / step).floor();
    if !span.is_finite() || span >= MAX_AXIS_LEN as f64 {
        return Err(invalid(
            &section,
            "end",
            format!("range has more than {MAX_AXIS_LEN} values"),
        ));
    }
    Ok(span as usize + 1)
}

fn validate_strategy(config: &dyn ConfigPort, axes: &[String]) -> Result<(), SweepError> {
    let name = config
        .get_string(SWEEP_SECTION, "strategy")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| missing(SWEEP_SECTION, "strategy"))?;
    let template = strategies::by_name(&name)?;

    for required in template.required_axes() {
        if !axes.iter().any(|a| a == required) {
            return Err(invalid(
                SWEEP_SECTION,
                "axes",
                format!("strategy {} requires axis {required}", template.name()),
            ));
        }
    }
    Ok(())
}

fn validate_constraints(config: &dyn ConfigPort, axes: &[String]) -> Result<(), SweepError> {
    for raw in config.get_list(SWEEP_SECTION, "constraints") {
        let constraint: Constraint = raw
            .parse()
            .map_err(|reason: String| invalid(SWEEP_SECTION, "constraints", reason))?;
        let (Constraint::LessThan(a, b) | Constraint::LessOrEqual(a, b)) = &constraint;
        for name in [a, b] {
            if !axes.contains(name) {
                return Err(invalid(
                    SWEEP_SECTION,
                    "constraints",
                    format!("'{constraint}' references unknown axis {name}"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_top_k(config: &dyn ConfigPort) -> Result<(), SweepError> {
    match whole_number(config, SWEEP_SECTION, "top_k")? {
        Some(k) if k < 1 => Err(invalid(SWEEP_SECTION, "top_k", "top_k must be at least 1")),
        _ => Ok(()),
    }
}

fn validate_progress_every(config: &dyn ConfigPort) -> Result<(), SweepError> {
    match whole_number(config, SWEEP_SECTION, "progress_every")? {
        Some(n) if n < 0 => Err(invalid(
            SWEEP_SECTION,
            "progress_every",
            "progress_every must be non-negative",
        )),
        _ => Ok(()),
    }
}

fn validate_end_of_data(config: &dyn ConfigPort) -> Result<(), SweepError> {
    if let Some(raw) = config.get_string(SWEEP_SECTION, "end_of_data") {
        raw.parse::<EndOfDataPolicy>()
            .map_err(|reason| invalid(SWEEP_SECTION, "end_of_data", reason))?;
    }
    Ok(())
}

fn validate_exit_defaults(config: &dyn ConfigPort) -> Result<(), SweepError> {
    if let Some(stop) = number(config, STRATEGY_SECTION, "stop_loss")? {
        if stop >= 0.0 {
            return Err(invalid(
                STRATEGY_SECTION,
                "stop_loss",
                "stop_loss must be a negative fraction",
            ));
        }
    }
    if let Some(target) = number(config, STRATEGY_SECTION, "take_profit")? {
        if target <= 0.0 {
            return Err(invalid(
                STRATEGY_SECTION,
                "take_profit",
                "take_profit must be a positive fraction",
            ));
        }
    }
    Ok(())
}

fn validate_rsi_band(config: &dyn ConfigPort) -> Result<(), SweepError> {
    let lower = number(config, STRATEGY_SECTION, "rsi_lower")?.unwrap_or(50.0);
    let upper = number(config, STRATEGY_SECTION, "rsi_upper")?.unwrap_or(80.0);
    if !(0.0..=100.0).contains(&lower) || !(0.0..=100.0).contains(&upper) {
        return Err(invalid(
            STRATEGY_SECTION,
            "rsi_lower",
            "RSI bounds must be between 0 and 100",
        ));
    }
    if lower >= upper {
        return Err(invalid(
            STRATEGY_SECTION,
            "rsi_lower",
            "rsi_lower must be below rsi_upper",
        ));
    }
    Ok(())
}
