//! Per-run performance summary.

use serde::Serialize;

use super::grid::ParameterPoint;
use super::position::TradeOutcome;

/// Summary of one simulated parameter point. Percentages are in percent
/// units (a 1% move is `1.0`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub point: ParameterPoint,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate_pct: f64,
    pub total_pnl_pct: f64,
    /// wins - losses
    pub score: i64,
    pub avg_pnl_pct: f64,
    pub largest_win_pct: f64,
    pub largest_loss_pct: f64,
    pub profit_factor: f64,
    pub avg_bars_held: f64,
}

impl RunResult {
    pub fn from_trades(point: ParameterPoint, trades: &[TradeOutcome]) -> Self {
        let mut wins = 0usize;
        let mut total_pnl = 0.0_f64;
        let mut gross_win = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut bars_held = 0usize;

        for trade in trades {
            let pnl = trade.pnl_fraction;
            total_pnl += pnl;
            bars_held += trade.bars_held();
            if trade.is_win() {
                wins += 1;
                gross_win += pnl;
                largest_win = largest_win.max(pnl);
            } else {
                gross_loss += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            }
        }

        let total_trades = trades.len();
        let losses = total_trades - wins;

        let win_rate_pct = if total_trades > 0 {
            wins as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let avg_pnl_pct = if total_trades > 0 {
            total_pnl / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            gross_win / gross_loss
        } else if gross_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_bars_held = if total_trades > 0 {
            bars_held as f64 / total_trades as f64
        } else {
            0.0
        };

        RunResult {
            point,
            total_trades,
            wins,
            losses,
            win_rate_pct,
            total_pnl_pct: total_pnl * 100.0,
            score: wins as i64 - losses as i64,
            avg_pnl_pct,
            largest_win_pct: largest_win * 100.0,
            largest_loss_pct: largest_loss * 100.0,
            profit_factor,
            avg_bars_held,
        }
    }
}
