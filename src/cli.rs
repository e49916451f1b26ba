//! CLI definition and dispatch.

use chrono::DateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_adapter::JsonAdapter;
use crate::adapters::json_report_adapter::{self, JsonReportAdapter};
use crate::domain::config_validation::{
    axis_section, validate_sweep_config, STRATEGY_SECTION, SWEEP_SECTION,
};
use crate::domain::error::SweepError;
use crate::domain::grid::{Axis, Constraint, ParameterGrid, ParameterValue};
use crate::domain::strategies;
use crate::domain::strategy::{EndOfDataPolicy, StrategyTemplate};
use crate::domain::sweep::{run_sweep, SweepOptions, SweepReport};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sweeptrader", about = "Indicator strategy parameter sweeps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a parameter sweep
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        /// Candle file, overriding `[sweep] data`
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Report path; the report goes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        top: Option<usize>,
        /// Evaluate grid points on the current thread only
        #[arg(long)]
        sequential: bool,
    },
    /// Validate a sweep configuration and summarize its grid
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show candle count and time range of a data file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct SweepOverrides {
    pub top: Option<usize>,
    pub sequential: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), SweepError> {
    match cli.command {
        Command::Sweep {
            config,
            data,
            output,
            top,
            sequential,
        } => run_sweep_command(
            &config,
            data.as_deref(),
            output.as_deref(),
            &SweepOverrides { top, sequential },
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data } => run_info(&data),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SweepError> {
    FileConfigAdapter::from_file(path)
}

/// Picks the data adapter from the file extension; anything but `.csv` is JSON.
pub fn data_port_for(path: &Path) -> Box<dyn DataPort> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvAdapter::new())
    } else {
        Box::new(JsonAdapter::new())
    }
}

fn run_sweep_command(
    config_path: &Path,
    data_override: Option<&Path>,
    output_path: Option<&Path>,
    overrides: &SweepOverrides,
) -> Result<(), SweepError> {
    tracing::info!(path = %config_path.display(), "loading config");
    let config = load_config(config_path)?;

    let data_path = resolve_data_path(&config, config_path, data_override)?;
    let data_port = data_port_for(&data_path);
    let report = run_sweep_pipeline(&config, data_port.as_ref(), &data_path, overrides)?;

    print_summary(&report);

    match output_path {
        Some(path) => JsonReportAdapter::new().write(&report, path)?,
        None => println!("{}", json_report_adapter::render(&report)?),
    }
    Ok(())
}

/// Validate, build, load and sweep. Every config error surfaces before the
/// data file is touched.
pub fn run_sweep_pipeline(
    config: &dyn ConfigPort,
    data_port: &dyn DataPort,
    data_path: &Path,
    overrides: &SweepOverrides,
) -> Result<SweepReport, SweepError> {
    validate_sweep_config(config)?;
    let strategy = build_strategy(config)?;
    let grid = build_grid(config)?;
    let mut options = build_sweep_options(config)?;
    if let Some(top) = overrides.top {
        options.top_k = top;
    }
    if overrides.sequential {
        options.parallel = false;
    }

    tracing::info!(path = %data_path.display(), "loading candles");
    let series = data_port.load_series(data_path)?;
    if series.is_empty() {
        tracing::warn!("data file has no candles; every run will have zero trades");
    }

    Ok(run_sweep(&series, &grid, strategy.as_ref(), &options))
}

/// `--data` wins; otherwise `[sweep] data`, relative to the config file.
pub fn resolve_data_path(
    config: &dyn ConfigPort,
    config_path: &Path,
    data_override: Option<&Path>,
) -> Result<PathBuf, SweepError> {
    if let Some(path) = data_override {
        return Ok(path.to_path_buf());
    }
    let configured = config
        .get_string(SWEEP_SECTION, "data")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SweepError::ConfigMissing {
            section: SWEEP_SECTION.into(),
            key: "data".into(),
        })?;
    let path = PathBuf::from(configured.trim());
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(config_path
        .parent()
        .map(|dir| dir.join(&path))
        .unwrap_or(path))
}

pub fn build_strategy(config: &dyn ConfigPort) -> Result<Box<dyn StrategyTemplate>, SweepError> {
    let name = config
        .get_string(SWEEP_SECTION, "strategy")
        .ok_or_else(|| SweepError::ConfigMissing {
            section: SWEEP_SECTION.into(),
            key: "strategy".into(),
        })?;

    strategies::with_settings(&name, |key, default| {
        config.get_double(STRATEGY_SECTION, key, default)
    })
}

fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> SweepError {
    SweepError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_value(section: &str, key: &str, raw: &str) -> Result<ParameterValue, SweepError> {
    let raw = raw.trim();
    let parsed = if raw.contains(['.', 'e', 'E']) {
        raw.parse().ok().map(ParameterValue::Float)
    } else {
        raw.parse().ok().map(ParameterValue::Int)
    };
    parsed.ok_or_else(|| config_invalid(section, key, format!("'{raw}' is not a number")))
}

/// One axis from its `[axis.<name>]` section: a `values` list, or a
/// `start`/`end`/`step` range that is float-valued when any bound has a
/// decimal point.
pub fn build_axis(config: &dyn ConfigPort, name: &str) -> Result<Axis, SweepError> {
    let section = axis_section(name);

    if config.get_string(&section, "values").is_some() {
        let values = config
            .get_list(&section, "values")
            .iter()
            .map(|raw| parse_value(&section, "values", raw))
            .collect::<Result<Vec<_>, _>>()?;
        return Axis::list(name, values);
    }

    let field = |key: &str| -> Result<Option<ParameterValue>, SweepError> {
        config
            .get_string(&section, key)
            .map(|raw| parse_value(&section, key, &raw))
            .transpose()
    };
    let require = |key: &str| -> Result<ParameterValue, SweepError> {
        field(key)?.ok_or_else(|| SweepError::ConfigMissing {
            section: section.clone(),
            key: key.to_string(),
        })
    };

    let start = require("start")?;
    let end = require("end")?;
    let step = field("step")?;

    match (start, end, step) {
        (ParameterValue::Int(s), ParameterValue::Int(e), None) => Axis::int_range(name, s, e, 1),
        (ParameterValue::Int(s), ParameterValue::Int(e), Some(ParameterValue::Int(st))) => {
            Axis::int_range(name, s, e, st)
        }
        (s, e, st) => Axis::float_range(
            name,
            s.as_f64(),
            e.as_f64(),
            st.map_or(1.0, |v| v.as_f64()),
        ),
    }
}

pub fn build_grid(config: &dyn ConfigPort) -> Result<ParameterGrid, SweepError> {
    let axes = config
        .get_list(SWEEP_SECTION, "axes")
        .iter()
        .map(|name| build_axis(config, name))
        .collect::<Result<Vec<_>, _>>()?;

    let constraints = config
        .get_list(SWEEP_SECTION, "constraints")
        .iter()
        .map(|raw| {
            raw.parse::<Constraint>()
                .map_err(|reason| config_invalid(SWEEP_SECTION, "constraints", reason))
        })
        .collect::<Result<Vec<_>, _>>()?;

    ParameterGrid::new(axes, constraints)
}

pub fn build_sweep_options(config: &dyn ConfigPort) -> Result<SweepOptions, SweepError> {
    let defaults = SweepOptions::default();

    let end_of_data = config
        .get_string(SWEEP_SECTION, "end_of_data")
        .map(|raw| {
            raw.parse::<EndOfDataPolicy>()
                .map_err(|reason| config_invalid(SWEEP_SECTION, "end_of_data", reason))
        })
        .transpose()?;

    let default_every = defaults.progress_every.unwrap_or(0) as i64;
    let progress_every = match config.get_int(SWEEP_SECTION, "progress_every", default_every) {
        n if n <= 0 => None,
        n => Some(n as usize),
    };

    Ok(SweepOptions {
        top_k: config
            .get_int(SWEEP_SECTION, "top_k", defaults.top_k as i64)
            .max(1) as usize,
        progress_every,
        parallel: config.get_bool(SWEEP_SECTION, "parallel", defaults.parallel),
        end_of_data,
    })
}

fn print_summary(report: &SweepReport) {
    eprintln!(
        "\n=== {} sweep: {} evaluated, {} pruned, {} failed (of {}) ===",
        report.strategy,
        report.evaluated,
        report.pruned,
        report.failures.len(),
        report.cartesian_size,
    );

    if report.results.is_empty() {
        eprintln!("No successful runs.");
        return;
    }

    eprintln!("\n=== Top {} ===", report.top().len());
    for (rank, r) in report.top().iter().enumerate() {
        let pnl_sign = if r.total_pnl_pct >= 0.0 { "+" } else { "" };
        eprintln!(
            "  #{:<3} win {:>5.1}%  trades {:>4}  score {:>4}  pnl {}{:.2}%  {}",
            rank + 1,
            r.win_rate_pct,
            r.total_trades,
            r.score,
            pnl_sign,
            r.total_pnl_pct,
            r.point,
        );
    }
}

fn run_validate(config_path: &Path) -> Result<(), SweepError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(config_path)?;

    validate_sweep_config(&config)?;
    let strategy = build_strategy(&config)?;
    let grid = build_grid(&config)?;
    let options = build_sweep_options(&config)?;

    eprintln!("\nStrategy: {}", strategy.name());
    eprintln!("\nAxes:");
    for axis in grid.axes() {
        let first = axis.values().first().map(ToString::to_string).unwrap_or_default();
        let last = axis.values().last().map(ToString::to_string).unwrap_or_default();
        eprintln!("  {}: {} values ({} .. {})", axis.name(), axis.len(), first, last);
    }
    if !grid.constraints().is_empty() {
        eprintln!("\nConstraints:");
        for constraint in grid.constraints() {
            eprintln!("  {constraint}");
        }
    }

    eprintln!("\nCartesian size:     {}", grid.cartesian_size());
    eprintln!("Valid combinations: {}", grid.count_valid());
    eprintln!("Top K:              {}", options.top_k);
    match options.end_of_data {
        Some(policy) => eprintln!("End of data:        {policy}"),
        None => eprintln!("End of data:        strategy default"),
    }
    eprintln!("\nSweep configuration is valid.");
    Ok(())
}

/// Epoch milliseconds as a UTC date-time, or the raw number when out of range.
pub fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn run_info(data_path: &Path) -> Result<(), SweepError> {
    let series = data_port_for(data_path).load_series(data_path)?;

    match series.time_range() {
        Some((first, last)) => println!(
            "{}: {} candles, {} to {}",
            data_path.display(),
            series.len(),
            format_timestamp(first),
            format_timestamp(last),
        ),
        None => eprintln!("{}: no candles", data_path.display()),
    }
    Ok(())
}
