//! Single-run trade simulation.
//!
//! A long-only FLAT / IN_POSITION state machine over the bars of a
//! [`PriceSeries`]. Entries fill at the bar close. While a position is open,
//! each later bar is checked in order: stop (close), target (close or high),
//! reversal signal. The first bar that triggers closes the trade. At most
//! one position is open at any index.

use crate::domain::ohlcv::PriceSeries;
use crate::domain::position::{ExitReason, OpenPosition, TradeOutcome};
use crate::domain::strategy::{EndOfDataPolicy, ExitPolicy, Signals, TargetTrigger};

/// Replay `signals` over `series`. Trades come back in chronological order.
pub fn simulate(series: &PriceSeries, signals: &dyn Signals, policy: &ExitPolicy) -> Vec<TradeOutcome> {
    let closes = series.closes();
    let highs = series.highs();
    let mut trades = Vec::new();
    let mut position: Option<OpenPosition> = None;

    for (i, &close) in closes.iter().enumerate() {
        match position {
            Some(open) => {
                if let Some(trade) = check_exit(&open, i, close, highs[i], signals, policy) {
                    trades.push(trade);
                    position = None;
                }
            }
            None => {
                if signals.entry(i, close) {
                    position = Some(OpenPosition::new(i, close));
                }
            }
        }
    }

    if let Some(open) = position {
        match policy.end_of_data {
            EndOfDataPolicy::ForceClose => {
                let last = closes.len() - 1;
                trades.push(open.close(last, closes[last], ExitReason::EndOfData));
            }
            EndOfDataPolicy::Discard => {
                tracing::trace!(entry_index = open.entry_index, "discarding open position");
            }
        }
    }

    trades
}

fn check_exit(
    open: &OpenPosition,
    index: usize,
    close: f64,
    high: f64,
    signals: &dyn Signals,
    policy: &ExitPolicy,
) -> Option<TradeOutcome> {
    if open.should_stop_loss(close, policy.stop_loss) {
        return Some(open.close(index, close, ExitReason::StopHit));
    }

    if let Some(target) = policy.take_profit {
        match policy.target_trigger {
            TargetTrigger::Close if open.should_take_profit(close, Some(target)) => {
                return Some(open.close(index, close, ExitReason::TargetHit));
            }
            TargetTrigger::High if open.should_take_profit(high, Some(target)) => {
                return Some(open.close(index, open.target_price(target), ExitReason::TargetHit));
            }
            _ => {}
        }
    }

    if signals.reversal(index) {
        return Some(open.close(index, close, ExitReason::SignalReversal));
    }

    None
}
