#![allow(dead_code)]

use std::cell::Cell;
use std::io::Write;
use std::path::Path;

use sweeptrader::domain::error::SweepError;
use sweeptrader::domain::grid::ParameterPoint;
pub use sweeptrader::domain::ohlcv::{Candle, PriceSeries};
use sweeptrader::domain::strategy::{
    EndOfDataPolicy, ExitPolicy, PreparedStrategy, Signals, StrategyTemplate, TargetTrigger,
};
use sweeptrader::ports::data_port::DataPort;

/// Serves fixed candles, or a fixed error, and counts loads.
pub struct MockDataPort {
    pub candles: Vec<Candle>,
    pub error: Option<String>,
    pub loads: Cell<usize>,
}

impl MockDataPort {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            error: None,
            loads: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            candles: Vec::new(),
            error: Some(reason.to_string()),
            loads: Cell::new(0),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_candles(&self, _path: &Path) -> Result<Vec<Candle>, SweepError> {
        self.loads.set(self.loads.get() + 1);
        match &self.error {
            Some(reason) => Err(SweepError::malformed(reason.clone())),
            None => Ok(self.candles.clone()),
        }
    }
}

pub fn make_candle(timestamp: i64, close: f64) -> Candle {
    Candle {
        timestamp,
        open: close,
        high: close * 1.005,
        low: close * 0.995,
        close,
        volume: 1000.0,
    }
}

/// One candle per minute starting at 2024-01-01T00:00:00Z.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    const START: i64 = 1_704_067_200_000;
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_candle(START + i as i64 * 60_000, c))
        .collect()
}

/// Trend plus two superimposed waves; deterministic.
pub fn wavy_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + 4.0 * (t / 6.0).sin() + 1.5 * (t / 2.3).cos()
        })
        .collect()
}

pub fn wavy_series(count: usize) -> PriceSeries {
    PriceSeries::from_closes(&wavy_closes(count)).unwrap()
}

/// Candles as a JSON array of `[ts, o, h, l, c, v]` tuples.
pub fn candles_json(candles: &[Candle]) -> String {
    let rows: Vec<String> = candles
        .iter()
        .map(|c| {
            format!(
                "[{}, {}, {}, {}, {}, {}]",
                c.timestamp, c.open, c.high, c.low, c.close, c.volume
            )
        })
        .collect();
    format!("[{}]", rows.join(", "))
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Enters whenever `index % every == 0`; exits on a +/- `band` close move.
pub struct EveryNth;

struct EveryNthSignals(usize);

impl Signals for EveryNthSignals {
    fn entry(&self, index: usize, _price: f64) -> bool {
        index % self.0 == 0
    }
}

impl StrategyTemplate for EveryNth {
    fn name(&self) -> &str {
        "every_nth"
    }

    fn required_axes(&self) -> &'static [&'static str] {
        &["every", "band"]
    }

    fn prepare(
        &self,
        _series: &PriceSeries,
        point: &ParameterPoint,
    ) -> Result<PreparedStrategy, SweepError> {
        let every = point.period("every")?;
        let band = point.number("band")?;
        Ok(PreparedStrategy {
            signals: Box::new(EveryNthSignals(every)),
            exit_policy: ExitPolicy {
                stop_loss: Some(-band),
                take_profit: Some(band),
                target_trigger: TargetTrigger::Close,
                end_of_data: EndOfDataPolicy::ForceClose,
            },
        })
    }
}
