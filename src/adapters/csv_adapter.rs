//! CSV candle file adapter.
//!
//! Expects a header row naming `timestamp,open,high,low,close,volume`
//! (any column order).

use crate::domain::error::SweepError;
use crate::domain::ohlcv::Candle;
use crate::ports::data_port::DataPort;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvAdapter;

impl CsvAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl DataPort for CsvAdapter {
    fn load_candles(&self, path: &Path) -> Result<Vec<Candle>, SweepError> {
        let content = fs::read_to_string(path)?;
        parse_csv(&content)
    }
}

pub fn parse_csv(content: &str) -> Result<Vec<Candle>, SweepError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    rdr.deserialize::<Candle>()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|e| SweepError::malformed(format!("record {index}: {e}")))
        })
        .collect()
}
