//! JSON candle file adapter.
//!
//! Accepts a top-level array, or an object wrapping the array under `ohlcv`,
//! `data`, or its first array-valued field. Each record is either a
//! `[timestamp, open, high, low, close, volume]` tuple or an object keyed by
//! field name (`timestamp` or `time`). Prices may be JSON numbers or numeric
//! strings. Timestamps may also be RFC 3339 strings, stored as epoch
//! milliseconds.

use std::fs;
use std::path::Path;

use chrono::DateTime;
use serde_json::{Map, Value};

use crate::domain::error::SweepError;
use crate::domain::ohlcv::Candle;
use crate::ports::data_port::DataPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonAdapter;

impl JsonAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl DataPort for JsonAdapter {
    fn load_candles(&self, path: &Path) -> Result<Vec<Candle>, SweepError> {
        let content = fs::read_to_string(path)?;
        parse_candles(&content)
    }
}

pub fn parse_candles(content: &str) -> Result<Vec<Candle>, SweepError> {
    let parsed: Value = serde_json::from_str(content)?;
    let records = candle_array(&parsed)?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| match record {
            Value::Array(fields) => from_tuple(index, fields),
            Value::Object(fields) => from_object(index, fields),
            _ => Err(SweepError::malformed(format!(
                "record {index} is neither an array nor an object"
            ))),
        })
        .collect()
}

fn candle_array(parsed: &Value) -> Result<&Vec<Value>, SweepError> {
    match parsed {
        Value::Array(records) => Ok(records),
        Value::Object(map) => ["ohlcv", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .or_else(|| map.values().find_map(Value::as_array))
            .ok_or_else(|| SweepError::malformed("no candle array found in JSON object")),
        _ => Err(SweepError::malformed("expected a JSON array of candles")),
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn timestamp(value: Option<&Value>, index: usize) -> Result<i64, SweepError> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(index as i64);
    };
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().or_else(|| {
            DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.timestamp_millis())
        }),
        _ => None,
    };
    parsed.ok_or_else(|| SweepError::malformed(format!("record {index} has an invalid timestamp")))
}

fn build(
    index: usize,
    timestamp: i64,
    open: Option<&Value>,
    high: Option<&Value>,
    low: Option<&Value>,
    close: Option<&Value>,
    volume: Option<&Value>,
) -> Result<Candle, SweepError> {
    let close = close
        .and_then(number)
        .ok_or_else(|| SweepError::malformed(format!("record {index} has no numeric close")))?;
    let or_close = |field: Option<&Value>| field.and_then(number).unwrap_or(close);

    Ok(Candle {
        timestamp,
        open: or_close(open),
        high: or_close(high),
        low: or_close(low),
        close,
        volume: volume.and_then(number).unwrap_or(0.0),
    })
}

fn from_tuple(index: usize, fields: &[Value]) -> Result<Candle, SweepError> {
    build(
        index,
        timestamp(fields.first(), index)?,
        fields.get(1),
        fields.get(2),
        fields.get(3),
        fields.get(4),
        fields.get(5),
    )
}

fn from_object(index: usize, fields: &Map<String, Value>) -> Result<Candle, SweepError> {
    let ts = fields
        .get("timestamp")
        .filter(|v| !v.is_null())
        .or_else(|| fields.get("time"));
    build(
        index,
        timestamp(ts, index)?,
        fields.get("open"),
        fields.get("high"),
        fields.get("low"),
        fields.get("close"),
        fields.get("volume"),
    )
}
