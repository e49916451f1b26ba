//! N-dimensional parameter grids.
//!
//! A [`ParameterGrid`] is a list of named [`Axis`] definitions plus
//! cross-axis [`Constraint`]s. [`ParameterGrid::iter`] lazily walks the
//! cartesian product in nested lexicographic order (the first axis varies
//! slowest, the last fastest) and skips cells that violate a constraint.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::error::SweepError;

/// Most values a single axis may hold.
pub const MAX_AXIS_LEN: usize = 1_000_000;

/// Most cells a grid's cartesian product may hold, before pruning.
pub const MAX_GRID_SIZE: usize = 10_000_000;

fn too_long(name: &str) -> SweepError {
    SweepError::invalid_parameter(name, format!("axis has more than {MAX_AXIS_LEN} values"))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
}

impl ParameterValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParameterValue::Int(v) => v as f64,
            ParameterValue::Float(v) => v,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Int(v) => write!(f, "{v}"),
            ParameterValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for ParameterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            ParameterValue::Int(v) => serializer.serialize_i64(v),
            ParameterValue::Float(v) => serializer.serialize_f64(v),
        }
    }
}

/// One named dimension of the grid with its materialized values.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    name: String,
    values: Vec<ParameterValue>,
}

impl Axis {
    /// Inclusive integer range `start..=end` in increments of `step`.
    pub fn int_range(name: &str, start: i64, end: i64, step: i64) -> Result<Self, SweepError> {
        if step <= 0 {
            return Err(SweepError::invalid_parameter(name, "step must be positive"));
        }
        if start > end {
            return Err(SweepError::invalid_parameter(
                name,
                format!("start {start} is after end {end}"),
            ));
        }
        let count = (end as i128 - start as i128) / step as i128 + 1;
        if count > MAX_AXIS_LEN as i128 {
            return Err(too_long(name));
        }
        let values = (start..=end)
            .step_by(step as usize)
            .map(ParameterValue::Int)
            .collect();
        Ok(Self {
            name: name.to_string(),
            values,
        })
    }

    /// Inclusive float range. Values are `start + k * step`, so no error
    /// accumulates across long ranges.
    pub fn float_range(name: &str, start: f64, end: f64, step: f64) -> Result<Self, SweepError> {
        if !(start.is_finite() && end.is_finite() && step.is_finite()) {
            return Err(SweepError::invalid_parameter(name, "range bounds must be finite"));
        }
        if step <= 0.0 {
            return Err(SweepError::invalid_parameter(name, "step must be positive"));
        }
        if start > end {
            return Err(SweepError::invalid_parameter(
                name,
                format!("start {start} is after end {end}"),
            ));
        }
        let span = ((end - start) / step + 1e-9).floor();
        if !span.is_finite() || span >= MAX_AXIS_LEN as f64 {
            return Err(too_long(name));
        }
        let count = span as usize + 1;
        let values = (0..count)
            .map(|k| ParameterValue::Float(start + k as f64 * step))
            .collect();
        Ok(Self {
            name: name.to_string(),
            values,
        })
    }

    /// Explicit value list, enumerated in the given order.
    pub fn list(name: &str, values: Vec<ParameterValue>) -> Result<Self, SweepError> {
        if values.is_empty() {
            return Err(SweepError::invalid_parameter(name, "value list is empty"));
        }
        if values.iter().any(|v| !v.as_f64().is_finite()) {
            return Err(SweepError::invalid_parameter(name, "values must be finite"));
        }
        if values.len() > MAX_AXIS_LEN {
            return Err(too_long(name));
        }
        Ok(Self {
            name: name.to_string(),
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A cross-axis predicate a grid point must satisfy to be simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    LessThan(String, String),
    LessOrEqual(String, String),
}

impl Constraint {
    fn axes(&self) -> (&str, &str) {
        match self {
            Constraint::LessThan(a, b) | Constraint::LessOrEqual(a, b) => (a.as_str(), b.as_str()),
        }
    }

    pub fn holds(&self, point: &ParameterPoint) -> bool {
        let (a, b) = self.axes();
        let (Some(left), Some(right)) = (point.get(a), point.get(b)) else {
            return false;
        };
        match self {
            Constraint::LessThan(..) => left.as_f64() < right.as_f64(),
            Constraint::LessOrEqual(..) => left.as_f64() <= right.as_f64(),
        }
    }
}

impl FromStr for Constraint {
    type Err = String;

    /// Parses `fast < slow` or `fast <= slow`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (left, right, strict) = if let Some((l, r)) = s.split_once("<=") {
            (l, r, false)
        } else if let Some((l, r)) = s.split_once('<') {
            (l, r, true)
        } else {
            return Err(format!("constraint '{}' must use < or <=", s.trim()));
        };
        let (left, right) = (left.trim(), right.trim());
        if left.is_empty() || right.is_empty() {
            return Err(format!("constraint '{}' needs an axis on both sides", s.trim()));
        }
        Ok(if strict {
            Constraint::LessThan(left.to_string(), right.to_string())
        } else {
            Constraint::LessOrEqual(left.to_string(), right.to_string())
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::LessThan(a, b) => write!(f, "{a} < {b}"),
            Constraint::LessOrEqual(a, b) => write!(f, "{a} <= {b}"),
        }
    }
}

/// One grid cell: a named tuple of parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPoint {
    names: Arc<[String]>,
    values: Vec<ParameterValue>,
}

impl ParameterPoint {
    pub fn new(pairs: Vec<(&str, ParameterValue)>) -> Self {
        let names: Arc<[String]> = pairs.iter().map(|(n, _)| n.to_string()).collect();
        let values = pairs.into_iter().map(|(_, v)| v).collect();
        Self { names, values }
    }

    pub fn get(&self, name: &str) -> Option<ParameterValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParameterValue)> + '_ {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }

    /// A positive whole-number parameter, such as an indicator period.
    pub fn period(&self, name: &str) -> Result<usize, SweepError> {
        let value = self.require(name)?;
        let as_int = match value {
            ParameterValue::Int(v) => Some(v),
            ParameterValue::Float(v) if v.fract() == 0.0 => Some(v as i64),
            ParameterValue::Float(_) => None,
        };
        match as_int {
            Some(v) if v > 0 => Ok(v as usize),
            _ => Err(SweepError::invalid_parameter(
                name,
                format!("expected a positive integer period, got {value}"),
            )),
        }
    }

    pub fn number(&self, name: &str) -> Result<f64, SweepError> {
        self.require(name).map(|v| v.as_f64())
    }

    /// The axis value if the grid has one, otherwise `default`.
    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).map_or(default, |v| v.as_f64())
    }

    fn require(&self, name: &str) -> Result<ParameterValue, SweepError> {
        self.get(name)
            .ok_or_else(|| SweepError::invalid_parameter(name, "axis missing from grid"))
    }
}

impl fmt::Display for ParameterPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl Serialize for ParameterPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone)]
pub struct ParameterGrid {
    axes: Vec<Axis>,
    constraints: Vec<Constraint>,
    names: Arc<[String]>,
    cartesian_size: usize,
}

impl ParameterGrid {
    pub fn new(axes: Vec<Axis>, constraints: Vec<Constraint>) -> Result<Self, SweepError> {
        let mut seen = HashSet::new();
        for axis in &axes {
            if !seen.insert(axis.name()) {
                return Err(SweepError::invalid_parameter(axis.name(), "duplicate axis"));
            }
        }
        for constraint in &constraints {
            let (a, b) = constraint.axes();
            for name in [a, b] {
                if !seen.contains(name) {
                    return Err(SweepError::invalid_parameter(
                        name,
                        format!("constraint '{constraint}' references an unknown axis"),
                    ));
                }
            }
        }

        let cartesian_size = axes.iter().try_fold(1usize, |size, axis| {
            size.checked_mul(axis.len())
                .filter(|&size| size <= MAX_GRID_SIZE)
                .ok_or_else(|| {
                    SweepError::invalid_parameter(
                        axis.name(),
                        format!("grid grows past {MAX_GRID_SIZE} combinations"),
                    )
                })
        })?;

        let names = axes.iter().map(|a| a.name().to_string()).collect();
        Ok(Self {
            axes,
            constraints,
            names,
            cartesian_size,
        })
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Size of the full cartesian product, before pruning.
    pub fn cartesian_size(&self) -> usize {
        self.cartesian_size
    }

    pub fn iter(&self) -> GridIter<'_> {
        GridIter {
            grid: self,
            cursor: vec![0; self.axes.len()],
            done: false,
            pruned: 0,
        }
    }

    /// Number of cells that survive the constraints.
    pub fn count_valid(&self) -> usize {
        self.iter().count()
    }

    fn point_at(&self, cursor: &[usize]) -> ParameterPoint {
        ParameterPoint {
            names: Arc::clone(&self.names),
            values: cursor
                .iter()
                .zip(&self.axes)
                .map(|(&i, axis)| axis.values[i])
                .collect(),
        }
    }
}

/// Odometer over the grid's cursor positions; the last axis turns fastest.
pub struct GridIter<'a> {
    grid: &'a ParameterGrid,
    cursor: Vec<usize>,
    done: bool,
    pruned: usize,
}

impl GridIter<'_> {
    /// Cells skipped so far because a constraint failed.
    pub fn pruned(&self) -> usize {
        self.pruned
    }

    fn advance(&mut self) {
        for (pos, axis) in self.cursor.iter_mut().zip(&self.grid.axes).rev() {
            *pos += 1;
            if *pos < axis.len() {
                return;
            }
            *pos = 0;
        }
        self.done = true;
    }
}

impl Iterator for GridIter<'_> {
    type Item = ParameterPoint;

    fn next(&mut self) -> Option<ParameterPoint> {
        while !self.done {
            let point = self.grid.point_at(&self.cursor);
            self.advance();
            if self.grid.constraints.iter().all(|c| c.holds(&point)) {
                return Some(point);
            }
            self.pruned += 1;
        }
        None
    }
}
