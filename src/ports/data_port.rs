//! Data access port trait.

use std::path::Path;

use crate::domain::error::SweepError;
use crate::domain::ohlcv::{Candle, PriceSeries};

pub trait DataPort {
    /// Candles in file order. Format problems are `MalformedInput`.
    fn load_candles(&self, path: &Path) -> Result<Vec<Candle>, SweepError>;

    /// Load and validate into a [`PriceSeries`].
    fn load_series(&self, path: &Path) -> Result<PriceSeries, SweepError> {
        PriceSeries::new(self.load_candles(path)?)
    }
}
