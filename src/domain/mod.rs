//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod position;
pub mod strategy;
pub mod strategies;
pub mod simulator;
pub mod grid;
pub mod metrics;
pub mod sweep;
pub mod config_validation;
pub mod error;
