//! Derived functions
//!
//! [`FunctionSet`] is the seam between the primitives and everything built
//! on them. Implementors supply `sin` and `ln`; the remaining functions are
//! provided methods defined in terms of those two (and of each other), so a
//! test double can pin any subset to known values and still exercise the
//! real composition for the rest.
//!
//! | Function | Definition | Fails when |
//! |----------|------------|------------|
//! | `cos` | `sin(x + π/2)` | `x` not finite |
//! | `tan` | `sin(x) / cos(x)` | `\|cos(x)\| < SINGULARITY_GUARD` |
//! | `cot` | `cos(x) / sin(x)` | `\|sin(x)\| < SINGULARITY_GUARD` |
//! | `csc` | `1 / sin(x)` | `\|sin(x)\| < SINGULARITY_GUARD` |
//! | `sec` | `1 / cos(x)` | `\|cos(x)\| < SINGULARITY_GUARD` |
//! | `log2`, `log3`, `log5` | `ln(x) / ln(base)` | `x <= 0` |

use std::f64::consts::FRAC_PI_2;

use crate::error::{CalcError, Result};
use crate::primitives;
use crate::tolerance::{Tolerance, SINGULARITY_GUARD};

/// Transcendental function family evaluated at a single point
pub trait FunctionSet {
    /// Sine of `x`
    fn sin(&self, x: f64) -> Result<f64>;

    /// Natural logarithm of `x`
    fn ln(&self, x: f64) -> Result<f64>;

    fn cos(&self, x: f64) -> Result<f64> {
        ensure_finite("cos", x)?;
        self.sin(x + FRAC_PI_2)
    }

    fn tan(&self, x: f64) -> Result<f64> {
        ensure_finite("tan", x)?;
        let cos = self.cos(x)?;
        ensure_nonzero("tan", "cos", cos, x)?;
        Ok(self.sin(x)? / cos)
    }

    fn cot(&self, x: f64) -> Result<f64> {
        ensure_finite("cot", x)?;
        let sin = self.sin(x)?;
        ensure_nonzero("cot", "sin", sin, x)?;
        Ok(self.cos(x)? / sin)
    }

    fn csc(&self, x: f64) -> Result<f64> {
        ensure_finite("csc", x)?;
        let sin = self.sin(x)?;
        ensure_nonzero("csc", "sin", sin, x)?;
        Ok(1.0 / sin)
    }

    fn sec(&self, x: f64) -> Result<f64> {
        ensure_finite("sec", x)?;
        let cos = self.cos(x)?;
        ensure_nonzero("sec", "cos", cos, x)?;
        Ok(1.0 / cos)
    }

    /// Logarithm of `x` in an arbitrary `base`
    ///
    /// `base` must be positive and different from 1.
    fn log_base(&self, x: f64, base: f64) -> Result<f64> {
        if !(base.is_finite() && base > 0.0 && base != 1.0) {
            return Err(CalcError::invalid_argument(format!(
                "logarithm base must be positive and not 1, got {}",
                base
            )));
        }
        if x.is_nan() || x <= 0.0 {
            return Err(CalcError::domain(format!(
                "log{} is undefined for x = {} (x must be greater than 0)",
                base, x
            )));
        }
        Ok(self.ln(x)? / self.ln(base)?)
    }

    fn log2(&self, x: f64) -> Result<f64> {
        self.log_base(x, 2.0)
    }

    fn log3(&self, x: f64) -> Result<f64> {
        self.log_base(x, 3.0)
    }

    fn log5(&self, x: f64) -> Result<f64> {
        self.log_base(x, 5.0)
    }
}

/// Functions backed by the series in [`primitives`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesFunctions {
    tolerance: Tolerance,
}

impl SeriesFunctions {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}

impl FunctionSet for SeriesFunctions {
    fn sin(&self, x: f64) -> Result<f64> {
        primitives::sine(x, self.tolerance)
    }

    fn ln(&self, x: f64) -> Result<f64> {
        primitives::natural_log(x, self.tolerance)
    }
}

fn ensure_finite(function: &str, x: f64) -> Result<()> {
    if x.is_finite() {
        Ok(())
    } else {
        Err(CalcError::domain(format!(
            "{} is undefined for x = {} (argument must be finite)",
            function, x
        )))
    }
}

fn ensure_nonzero(function: &str, denominator: &str, value: f64, x: f64) -> Result<()> {
    if value.abs() < SINGULARITY_GUARD {
        Err(CalcError::arithmetic(format!(
            "{} is undefined for x = {} ({}(x) = {:e})",
            function, x, denominator, value
        )))
    } else {
        Ok(())
    }
}
