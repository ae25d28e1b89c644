//! Confidence factors.
//!
//! A confidence factor is a certainty scalar clamped to `[0, 1]`. Independent
//! pieces of evidence combine multiplicatively, so combining never increases
//! confidence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A certainty scalar in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Confidence(f32);

impl Confidence {
    /// Fully certain (`1.0`).
    pub const CERTAIN: Confidence = Confidence(1.0);
    /// No confidence at all (`0.0`).
    pub const NONE: Confidence = Confidence(0.0);

    /// Build a confidence factor, clamping `value` into `[0, 1]`.
    ///
    /// `NaN` is treated as no confidence.
    pub fn new(value: f32) -> Self {
        let mut confidence = Self::NONE;
        confidence.set(value);
        confidence
    }

    /// Replace the stored factor, clamping into `[0, 1]`.
    pub fn set(&mut self, value: f32) {
        self.0 = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Combine two factors: `a * b`.
    #[must_use]
    pub fn combine(self, other: Confidence) -> Confidence {
        Confidence::new(self.0 * other.0)
    }
}

impl From<f32> for Confidence {
    fn from(value: f32) -> Self {
        Confidence::new(value)
    }
}

impl From<Confidence> for f32 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
