//! Parameter sweep: simulate every surviving grid point and rank the runs.
//!
//! Points are evaluated independently. With `parallel` set they are spread
//! over the rayon pool; the indexed collect keeps enumeration order, so the
//! single stable sort at the end gives the same ranking either way.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::error::SweepError;
use crate::domain::grid::{ParameterGrid, ParameterPoint};
use crate::domain::metrics::RunResult;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::simulator::simulate;
use crate::domain::strategy::{EndOfDataPolicy, StrategyTemplate};

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    pub top_k: usize,
    /// Log progress every N evaluated points; `None` disables it.
    pub progress_every: Option<usize>,
    pub parallel: bool,
    /// Replaces every template's end-of-data policy when set.
    pub end_of_data: Option<EndOfDataPolicy>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        SweepOptions {
            top_k: 10,
            progress_every: Some(1000),
            parallel: true,
            end_of_data: None,
        }
    }
}

/// A grid point whose evaluation failed. Never ranked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRun {
    pub point: ParameterPoint,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub strategy: String,
    /// Ranked best first.
    pub results: Vec<RunResult>,
    pub failures: Vec<FailedRun>,
    pub cartesian_size: usize,
    pub pruned: usize,
    pub evaluated: usize,
    pub top_k: usize,
}

impl SweepReport {
    pub fn best(&self) -> Option<&RunResult> {
        self.results.first()
    }

    pub fn top(&self) -> &[RunResult] {
        &self.results[..self.top_k.min(self.results.len())]
    }
}

/// Simulate one parameter point.
pub fn evaluate_point(
    series: &PriceSeries,
    strategy: &dyn StrategyTemplate,
    point: &ParameterPoint,
    end_of_data: Option<EndOfDataPolicy>,
) -> Result<RunResult, SweepError> {
    let prepared = strategy.prepare(series, point)?;
    let policy = match end_of_data {
        Some(end_of_data) => prepared.exit_policy.with_end_of_data(end_of_data),
        None => prepared.exit_policy,
    };
    let trades = simulate(series, prepared.signals.as_ref(), &policy);
    tracing::debug!(%point, trades = trades.len(), "evaluated");
    Ok(RunResult::from_trades(point.clone(), &trades))
}

/// Counts evaluated points across workers and says when a progress line is due.
struct Progress {
    done: AtomicUsize,
    total: usize,
    every: Option<usize>,
}

impl Progress {
    fn new(total: usize, every: Option<usize>) -> Self {
        Self {
            done: AtomicUsize::new(0),
            total,
            every: every.filter(|&n| n > 0),
        }
    }

    /// Records one evaluated point; `Some((done, total))` when it completes
    /// a reporting interval.
    fn tick(&self) -> Option<(usize, usize)> {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let every = self.every?;
        (done % every == 0).then_some((done, self.total))
    }
}

pub fn run_sweep(
    series: &PriceSeries,
    grid: &ParameterGrid,
    strategy: &dyn StrategyTemplate,
    options: &SweepOptions,
) -> SweepReport {
    let cartesian_size = grid.cartesian_size();
    let points: Vec<ParameterPoint> = grid.iter().collect();
    let pruned = cartesian_size - points.len();
    tracing::info!(
        strategy = strategy.name(),
        axes = grid.axes().len(),
        cartesian_size,
        combinations = points.len(),
        candles = series.len(),
        parallel = options.parallel,
        "starting sweep"
    );

    let progress = Progress::new(points.len(), options.progress_every);
    let evaluate = |point: ParameterPoint| {
        let outcome = evaluate_point(series, strategy, &point, options.end_of_data)
            .map_err(|e| FailedRun {
                point,
                error: e.to_string(),
            });
        if let Some((done, total)) = progress.tick() {
            tracing::info!(done, total, "sweep progress");
        }
        outcome
    };

    let outcomes: Vec<_> = if options.parallel {
        points.into_par_iter().map(evaluate).collect()
    } else {
        points.into_iter().map(evaluate).collect()
    };

    let evaluated = outcomes.len();
    let mut results = Vec::with_capacity(evaluated);
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(failed) => {
                tracing::warn!(point = %failed.point, error = %failed.error, "combination failed");
                failures.push(failed);
            }
        }
    }

    rank_results(&mut results);

    tracing::info!(
        evaluated,
        pruned,
        failed = failures.len(),
        "sweep finished"
    );

    SweepReport {
        strategy: strategy.name().to_string(),
        results,
        failures,
        cartesian_size,
        pruned,
        evaluated,
        top_k: options.top_k,
    }
}

/// Stable sort, best first: win rate, then wins, then trade count.
pub fn rank_results(results: &mut [RunResult]) {
    results.sort_by(|a, b| {
        b.win_rate_pct
            .total_cmp(&a.win_rate_pct)
            .then(b.wins.cmp(&a.wins))
            .then(b.total_trades.cmp(&a.total_trades))
    });
}
