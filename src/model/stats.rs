//! Running statistics over pause durations and heap sizes.

use serde::{Deserialize, Serialize};

/// Count, sum, min and max of a series of values
///
/// **Public** - the unit every model aggregate is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    n: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value to the series
    pub fn add(&mut self, value: f64) {
        if self.n == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.n += 1;
        self.sum += value;
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Smallest value, 0 when empty
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value, 0 when empty
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Mean value, 0 when empty
    pub fn average(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum / self.n as f64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "n: {} | sum: {:.6} | avg: {:.6} | min: {:.6} | max: {:.6}",
            self.n,
            self.sum,
            self.average(),
            self.min,
            self.max
        )
    }
}
