//! Primitive approximations: sine and natural logarithm
//!
//! Both functions are built from power series only; nothing here calls the
//! platform math library.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use tracing::trace;

use crate::error::{CalcError, Result};
use crate::tolerance::Tolerance;

/// Sine by its Maclaurin series
///
/// Sums `(-1)^k x^(2k+1) / (2k+1)!` until the magnitude of the newly added
/// term drops below `tolerance`. The argument is first reduced into
/// `[-π/2, π/2]`, which keeps the series short and makes the result exactly
/// odd.
///
/// The reduction is carried out in `f64`, so its error grows with `|x|`.
/// Arguments with `|x| * f64::EPSILON > tolerance` cannot be reduced within
/// the tolerance and are rejected as a domain error (about `4.5e9` for the
/// default `1e-6`).
pub fn sine(x: f64, tolerance: Tolerance) -> Result<f64> {
    if !x.is_finite() {
        return Err(CalcError::domain(format!("sin is undefined for x = {}", x)));
    }

    let epsilon = tolerance.value();
    if x.abs() * f64::EPSILON > epsilon {
        return Err(CalcError::domain(format!(
            "sin argument {} is too large to reduce within tolerance {}",
            x, tolerance
        )));
    }
    let r = reduce_angle(x);
    let r2 = r * r;

    let mut term = r;
    let mut sum = term;
    let mut terms: u32 = 1;
    while term.abs() >= epsilon {
        // t_{k+1} = -t_k * r^2 / ((2k+2)(2k+3))
        let n = f64::from(2 * terms);
        term = -term * r2 / (n * (n + 1.0));
        sum += term;
        terms += 1;
    }

    trace!(x = x, reduced = r, terms = terms, "sine converged");
    Ok(sum)
}

/// Natural logarithm by the atanh series
///
/// `x` is split into `m * 2^k` with `m` in `[0.5, 2]`, then
/// `ln(m) = 2 * sum(z^(2j+1) / (2j+1))` with `z = (m - 1) / (m + 1)`.
/// `ln 2` comes from the same series, so no constant from a math library is
/// involved. Each series stops once successive partial sums differ by less
/// than `tolerance`.
pub fn natural_log(x: f64, tolerance: Tolerance) -> Result<f64> {
    if x.is_nan() || x <= 0.0 {
        return Err(CalcError::domain(format!(
            "ln is undefined for x = {} (x must be greater than 0)",
            x
        )));
    }
    if x.is_infinite() {
        return Err(CalcError::domain("ln is undefined for x = inf"));
    }

    let epsilon = tolerance.value();

    let mut mantissa = x;
    let mut exponent: i32 = 0;
    while mantissa > 2.0 {
        mantissa /= 2.0;
        exponent += 1;
    }
    while mantissa < 0.5 {
        mantissa *= 2.0;
        exponent -= 1;
    }

    let (ln_mantissa, terms) = atanh_series((mantissa - 1.0) / (mantissa + 1.0), epsilon);
    if exponent == 0 {
        trace!(x = x, terms = terms, "ln converged");
        return Ok(ln_mantissa);
    }

    // ln 2 is scaled by the exponent, so its error budget shrinks with it
    let scale = f64::from(exponent.unsigned_abs());
    let (ln2, ln2_terms) = atanh_series(1.0 / 3.0, epsilon / scale);

    trace!(
        x = x,
        exponent = exponent,
        terms = terms + ln2_terms,
        "ln converged"
    );
    Ok(f64::from(exponent) * ln2 + ln_mantissa)
}

/// `2 * atanh(z)`, returned with the number of terms summed
fn atanh_series(z: f64, epsilon: f64) -> (f64, u32) {
    let z2 = z * z;
    let mut power = z;
    let mut sum = 2.0 * z;
    let mut terms: u32 = 1;
    loop {
        power *= z2;
        let delta = 2.0 * power / f64::from(2 * terms + 1);
        sum += delta;
        terms += 1;
        if delta.abs() < epsilon {
            break;
        }
    }
    (sum, terms)
}

/// Map `x` onto `[-π/2, π/2]` without changing its sine.
///
/// First modulo 2π into `[-π, π]`, then reflected with `sin(π - r) = sin(r)`.
/// Rounding is symmetric, so `reduce_angle(-x) == -reduce_angle(x)`.
fn reduce_angle(x: f64) -> f64 {
    let r = x - TAU * (x / TAU).round();
    if r > FRAC_PI_2 {
        PI - r
    } else if r < -FRAC_PI_2 {
        -PI - r
    } else {
        r
    }
}
