//! Convergence tolerance

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CalcError, Result};

/// Tolerance used when the caller does not pick one
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Magnitude below which a denominator is treated as zero.
///
/// Shared by tan, cot, csc, sec and the explicit divisions in the
/// composite equations.
pub const SINGULARITY_GUARD: f64 = 1e-10;

/// Convergence threshold for the series approximations.
///
/// Always positive and finite; zero, negative and non-finite values are
/// rejected on construction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    pub fn new(epsilon: f64) -> Result<Self> {
        if epsilon.is_finite() && epsilon > 0.0 {
            Ok(Self(epsilon))
        } else {
            Err(CalcError::invalid_argument(format!(
                "epsilon must be a positive finite number, got {}",
                epsilon
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_EPSILON)
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = CalcError;

    fn try_from(epsilon: f64) -> Result<Self> {
        Self::new(epsilon)
    }
}

impl From<Tolerance> for f64 {
    fn from(tolerance: Tolerance) -> Self {
        tolerance.0
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e}", self.0)
    }
}
