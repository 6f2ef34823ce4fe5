//! Numeric ranges with step snapping
//!
//! Shared by the slider and number field: values are snapped to the step
//! grid anchored at `min`, then clamped into `[min, max]`. An off-grid `max`
//! stays reachable because anything snapping past it clamps onto it.
//! Values near `max` that round down still land on the grid point below.

use crate::error::{PrimitiveError, Result};

/// Upper bound on decimal places kept after snapping
const MAX_PRECISION: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumericRange {
    min: f64,
    max: f64,
    step: f64,
}

impl Default for NumericRange {
    /// `0..=100` in steps of 1
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
        }
    }
}

impl NumericRange {
    /// Bounds may be infinite; the step must be finite and positive
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(PrimitiveError::InvalidRange { min, max });
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(PrimitiveError::InvalidStep(step));
        }
        Ok(Self { min, max, step })
    }

    /// Unbounded in both directions
    pub fn unbounded(step: f64) -> Result<Self> {
        Self::new(f64::NEG_INFINITY, f64::INFINITY, step)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Origin of the step grid: `min` when finite, else zero
    fn grid_origin(&self) -> f64 {
        if self.min.is_finite() {
            self.min
        } else {
            0.0
        }
    }

    /// Snap to `origin + k * step`, then clamp
    ///
    /// The result is rounded to the decimal precision of the step and origin
    /// so that `0.1 + 0.2` lands on `0.3`.
    pub fn snap(&self, value: f64) -> f64 {
        let origin = self.grid_origin();
        let steps = ((value - origin) / self.step).round();
        let precision = decimal_places(self.step).max(decimal_places(origin));
        self.clamp(round_to(steps * self.step + origin, precision))
    }

    /// Move by `count` steps (negative moves down), then snap
    pub fn step_by(&self, value: f64, count: i32) -> f64 {
        self.snap(value + self.step * f64::from(count))
    }

    pub fn at_min(&self, value: f64) -> bool {
        value <= self.min
    }

    pub fn at_max(&self, value: f64) -> bool {
        value >= self.max
    }

    /// Position of `value` in the range as `0.0..=100.0`
    ///
    /// Returns 0 for ranges without finite, distinct bounds.
    pub fn percent(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if !span.is_finite() || span <= 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / span * 100.0
    }

    /// Value at a fractional position along the range
    pub fn value_at_ratio(&self, ratio: f64) -> f64 {
        self.min + ratio * (self.max - self.min)
    }
}

fn decimal_places(value: f64) -> usize {
    let text = value.to_string();
    match text.split_once('.') {
        Some((_, fraction)) => fraction.len().min(MAX_PRECISION),
        None => 0,
    }
}

fn round_to(value: f64, places: usize) -> f64 {
    if places == 0 {
        return value.round();
    }
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
