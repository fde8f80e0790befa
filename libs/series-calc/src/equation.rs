//! Composite equations
//!
//! Two fixed expressions and the piecewise selector between them. Both are
//! written term for term, including the subterms that cancel to zero, so
//! every sub-function is evaluated and any of them can fail the result.

use serde::Serialize;

use crate::error::{CalcError, Result};
use crate::functions::FunctionSet;
use crate::tolerance::SINGULARITY_GUARD;

/// Which branch of the piecewise system applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Equation {
    /// Trigonometric branch, `x <= 0`
    First,
    /// Logarithmic branch, `x > 0`
    Second,
}

impl Equation {
    pub fn select(x: f64) -> Self {
        if x <= 0.0 {
            Equation::First
        } else {
            Equation::Second
        }
    }

    pub fn evaluate<F>(self, funcs: &F, x: f64) -> Result<f64>
    where
        F: FunctionSet + ?Sized,
    {
        match self {
            Equation::First => first_equation(funcs, x),
            Equation::Second => second_equation(funcs, x),
        }
    }
}

/// Piecewise system: [`first_equation`] for `x <= 0`, [`second_equation`] otherwise
pub fn system<F>(funcs: &F, x: f64) -> Result<f64>
where
    F: FunctionSet + ?Sized,
{
    Equation::select(x).evaluate(funcs, x)
}

/// `((tan/sin)^2 - sec + tan + cot*cot*csc) / (tan*cos^2 / sec)
///   - (sec - cos)^3 + sec + (cot/sec) * (sin - (cos - cos))`
pub fn first_equation<F>(funcs: &F, x: f64) -> Result<f64>
where
    F: FunctionSet + ?Sized,
{
    let numerator = ratio("tan/sin", funcs.tan(x)?, funcs.sin(x)?, x)?.powi(2) - funcs.sec(x)?
        + funcs.tan(x)?
        + funcs.cot(x)? * funcs.cot(x)? * funcs.csc(x)?;
    let denominator = ratio(
        "tan*cos^2/sec",
        funcs.tan(x)? * funcs.cos(x)?.powi(2),
        funcs.sec(x)?,
        x,
    )?;

    Ok(ratio("first equation", numerator, denominator, x)?
        - (funcs.sec(x)? - funcs.cos(x)?).powi(3)
        + funcs.sec(x)?
        + ratio("cot/sec", funcs.cot(x)?, funcs.sec(x)?, x)?
            * (funcs.sin(x)? - (funcs.cos(x)? - funcs.cos(x)?)))
}

/// `(((log2/log5) - (ln - ln)) - log2^2)^3 * log3`
pub fn second_equation<F>(funcs: &F, x: f64) -> Result<f64>
where
    F: FunctionSet + ?Sized,
{
    let inner = (ratio("log2/log5", funcs.log2(x)?, funcs.log5(x)?, x)?
        - (funcs.ln(x)? - funcs.ln(x)?))
        - funcs.log2(x)?.powi(2);

    Ok(inner.powi(3) * funcs.log3(x)?)
}

fn ratio(what: &str, numerator: f64, denominator: f64, x: f64) -> Result<f64> {
    if denominator.abs() < SINGULARITY_GUARD {
        return Err(CalcError::arithmetic(format!(
            "{} has a zero denominator at x = {}",
            what, x
        )));
    }
    Ok(numerator / denominator)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::functions::SeriesFunctions;
    use crate::tolerance::Tolerance;
    use std::cell::RefCell;

    /// Reference values taken from the platform math library
    struct Reference;

    impl FunctionSet for Reference {
        fn sin(&self, x: f64) -> Result<f64> {
            Ok(x.sin())
        }

        fn ln(&self, x: f64) -> Result<f64> {
            Ok(x.ln())
        }

        fn cos(&self, x: f64) -> Result<f64> {
            Ok(x.cos())
        }

        fn tan(&self, x: f64) -> Result<f64> {
            Ok(x.tan())
        }
    }

    /// Fixed trig values; logarithms fail so any log call is detected
    #[derive(Default)]
    struct TrigStub {
        calls: RefCell<Vec<&'static str>>,
    }

    impl TrigStub {
        fn record(&self, name: &'static str, value: f64) -> Result<f64> {
            self.calls.borrow_mut().push(name);
            Ok(value)
        }
    }

    impl FunctionSet for TrigStub {
        fn sin(&self, _x: f64) -> Result<f64> {
            self.record("sin", 0.5)
        }

        fn ln(&self, _x: f64) -> Result<f64> {
            Err(CalcError::domain("ln must not be called"))
        }

        fn cos(&self, _x: f64) -> Result<f64> {
            self.record("cos", 0.25)
        }

        fn tan(&self, _x: f64) -> Result<f64> {
            self.record("tan", 2.0)
        }

        fn cot(&self, _x: f64) -> Result<f64> {
            self.record("cot", 0.5)
        }

        fn csc(&self, _x: f64) -> Result<f64> {
            self.record("csc", 2.0)
        }

        fn sec(&self, _x: f64) -> Result<f64> {
            self.record("sec", 4.0)
        }
    }

    /// Fixed log values; trig functions fail so any trig call is detected
    struct LogStub {
        ln: f64,
        log2: f64,
        log3: f64,
        log5: f64,
    }

    impl FunctionSet for LogStub {
        fn sin(&self, _x: f64) -> Result<f64> {
            Err(CalcError::domain("sin must not be called"))
        }

        fn ln(&self, _x: f64) -> Result<f64> {
            Ok(self.ln)
        }

        fn log2(&self, _x: f64) -> Result<f64> {
            Ok(self.log2)
        }

        fn log3(&self, _x: f64) -> Result<f64> {
            Ok(self.log3)
        }

        fn log5(&self, _x: f64) -> Result<f64> {
            Ok(self.log5)
        }
    }

    fn series(epsilon: f64) -> SeriesFunctions {
        SeriesFunctions::new(Tolerance::new(epsilon).unwrap())
    }

    #[test]
    fn test_select_by_sign() {
        assert_eq!(Equation::select(-1.0), Equation::First);
        assert_eq!(Equation::select(0.0), Equation::First);
        assert_eq!(Equation::select(-0.0), Equation::First);
        assert_eq!(Equation::select(1.0), Equation::Second);
        assert_eq!(Equation::select(1e-12), Equation::Second);
    }

    #[test]
    fn test_first_equation_with_stubbed_functions() {
        // (16 - 4 + 2 + 0.5) / 0.03125 - 3.75^3 + 4 + 0.125 * 0.5
        let stub = TrigStub::default();
        let result = first_equation(&stub, -1.0).unwrap();
        assert!((result - 415.328125).abs() < 1e-3);

        let calls = stub.calls.borrow();
        for name in ["sin", "cos", "tan", "cot", "csc", "sec"] {
            assert!(calls.contains(&name), "{} was not evaluated", name);
        }
    }

    #[test]
    fn test_second_equation_with_stubbed_functions() {
        // ((3 / 1.5 - 0) - 9)^3 * 2
        let stub = LogStub {
            ln: 0.7,
            log2: 3.0,
            log3: 2.0,
            log5: 1.5,
        };
        let result = second_equation(&stub, 2.0).unwrap();
        assert!((result + 686.0).abs() < 1e-3);
    }

    #[test]
    fn test_system_routes_negative_input_to_first() {
        // The log stub would fail on any trig call, the trig stub on any log call
        let trig = TrigStub::default();
        assert!((system(&trig, -1.0).unwrap() - 415.328125).abs() < 1e-3);
        assert!(trig.calls.borrow().contains(&"sec"));
    }

    #[test]
    fn test_system_routes_positive_input_to_second() {
        let stub = LogStub {
            ln: 0.0,
            log2: 1.0,
            log3: 2.0,
            log5: 0.5,
        };
        assert!((system(&stub, 1.0).unwrap() - 2.0).abs() < 1e-3);
        assert!(system(&TrigStub::default(), 1.0).is_err());
    }

    #[test]
    fn test_reference_values() {
        assert!((first_equation(&Reference, -1.0).unwrap() - 1.8161428984982597).abs() < 1e-9);
        assert!((first_equation(&Reference, -0.5).unwrap() - 21.869215920154364).abs() < 1e-9);
        assert!((second_equation(&Reference, 2.0).unwrap() - 1.457486385456764).abs() < 1e-9);
        assert!((second_equation(&Reference, 10.0).unwrap() + 1386.4875483186975).abs() < 1e-6);
    }

    #[test]
    fn test_series_agree_with_reference() {
        let funcs = series(1e-10);
        for x in [-2.5, -1.0, -0.5] {
            let expected = first_equation(&Reference, x).unwrap();
            assert!((system(&funcs, x).unwrap() - expected).abs() < 1e-3, "x = {}", x);
        }
        for x in [0.5, 2.0, 3.0, 10.0] {
            let expected = second_equation(&Reference, x).unwrap();
            assert!((system(&funcs, x).unwrap() - expected).abs() < 1e-3, "x = {}", x);
        }
    }

    #[test]
    fn test_errors_propagate() {
        let funcs = series(1e-6);
        // cot(0) is singular
        assert!(matches!(system(&funcs, 0.0), Err(CalcError::Arithmetic(_))));
        // log5(1) = 0 makes log2/log5 undefined
        assert!(matches!(system(&funcs, 1.0), Err(CalcError::Arithmetic(_))));
        assert!(matches!(
            second_equation(&funcs, -3.0),
            Err(CalcError::Domain(_))
        ));
        assert!(matches!(
            system(&funcs, f64::NAN),
            Err(CalcError::Domain(_))
        ));
    }
}
