//! Sweep driver
//!
//! Walks an input variable across an interval at a fixed step, evaluates one
//! registered function at every sample and hands the formatted pair to a
//! [`SampleSink`].
//!
//! The default [`FailurePolicy::FailFast`] stops at the first domain or
//! arithmetic error: samples already written stay in the sink, nothing after
//! the failing point is produced, and the error is returned to the caller.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{CalcError, Result};
use crate::functions::{FunctionSet, SeriesFunctions};
use crate::registry::{lookup, FunctionKind};
use crate::sink::{ascii_byte, CsvSink, SampleSink};
use crate::tolerance::Tolerance;

/// Field separator used when none is configured
pub const DEFAULT_SEPARATOR: char = ';';

/// Decimal places used when none are configured
pub const DEFAULT_DECIMAL_PLACES: usize = 3;

/// Largest precision a record may carry; an f64 has no more significant digits
pub const MAX_DECIMAL_PLACES: usize = 17;

/// What the driver does with a sample that fails to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the sweep and return the error
    #[default]
    FailFast,
    /// Log the failure, skip the sample and keep going
    SkipErrors,
}

/// Parameters of one sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSpec {
    pub function: FunctionKind,
    pub start: f64,
    pub end: f64,
    pub step: f64,
    pub tolerance: Tolerance,
    pub separator: char,
    pub decimal_places: usize,
    pub policy: FailurePolicy,
}

impl SweepSpec {
    pub fn new(function: FunctionKind, start: f64, end: f64, step: f64) -> Self {
        Self {
            function,
            start,
            end,
            step,
            tolerance: Tolerance::default(),
            separator: DEFAULT_SEPARATOR,
            decimal_places: DEFAULT_DECIMAL_PLACES,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_decimal_places(mut self, decimal_places: usize) -> Self {
        self.decimal_places = decimal_places;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Check bounds, step, precision and separator
    ///
    /// A step whose sign disagrees with `end - start` is valid; the sweep
    /// simply produces no samples. A step too small to change `start` is not.
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(CalcError::invalid_argument(format!(
                "sweep bounds must be finite, got [{}, {}]",
                self.start, self.end
            )));
        }
        if !self.step.is_finite() || self.step == 0.0 {
            return Err(CalcError::invalid_argument(format!(
                "sweep step must be finite and non-zero, got {}",
                self.step
            )));
        }
        if self.start + self.step == self.start {
            return Err(stalled_step(self.start, self.step));
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(CalcError::invalid_argument(format!(
                "decimal places must be at most {}, got {}",
                MAX_DECIMAL_PLACES, self.decimal_places
            )));
        }
        validate_separator(self.separator)
    }

    /// Whether `x` is still inside the swept interval
    fn contains(&self, x: f64) -> bool {
        if self.step > 0.0 {
            x <= self.end
        } else {
            x >= self.end
        }
    }
}

/// Outcome of a completed sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub function: FunctionKind,
    /// Samples written to the sink
    pub emitted: usize,
    /// Samples dropped under [`FailurePolicy::SkipErrors`]
    pub skipped: usize,
}

/// Separators are written verbatim between two numbers, so they must not
/// be a character a formatted number can contain.
pub fn validate_separator(separator: char) -> Result<()> {
    let byte = ascii_byte(separator)?;
    if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'+' | b'\n' | b'\r') {
        return Err(CalcError::invalid_argument(format!(
            "separator {:?} would make records ambiguous",
            separator
        )));
    }
    Ok(())
}

/// Evaluate one function at one point
pub fn evaluate_point(function: FunctionKind, x: f64, tolerance: Tolerance) -> Result<f64> {
    evaluate_checked(&SeriesFunctions::new(tolerance), function, x)
}

/// Run a sweep with the series-backed functions
pub fn evaluate_sweep<S>(spec: &SweepSpec, sink: &mut S) -> Result<SweepReport>
where
    S: SampleSink + ?Sized,
{
    evaluate_sweep_with(&SeriesFunctions::new(spec.tolerance), spec, sink)
}

/// Run a sweep against an arbitrary [`FunctionSet`]
pub fn evaluate_sweep_with<F, S>(funcs: &F, spec: &SweepSpec, sink: &mut S) -> Result<SweepReport>
where
    F: FunctionSet + ?Sized,
    S: SampleSink + ?Sized,
{
    spec.validate()?;

    debug!(
        function = %spec.function,
        start = spec.start,
        end = spec.end,
        step = spec.step,
        epsilon = %spec.tolerance,
        policy = ?spec.policy,
        "sweep started"
    );

    let mut report = SweepReport {
        function: spec.function,
        emitted: 0,
        skipped: 0,
    };

    let mut x = spec.start;
    while spec.contains(x) {
        match evaluate_checked(funcs, spec.function, x) {
            Ok(result) => {
                let formatted_x = format_fixed(x, spec.decimal_places);
                let formatted_result = format_fixed(result, spec.decimal_places);
                sink.write_sample(&formatted_x, &formatted_result)?;
                report.emitted += 1;
            },
            Err(e) if e.is_numeric() && spec.policy == FailurePolicy::SkipErrors => {
                warn!(function = %spec.function, x = x, error = %e, "sample skipped");
                report.skipped += 1;
            },
            Err(e) => {
                if let Err(flush_err) = sink.finish() {
                    warn!(error = %flush_err, "failed to flush partial sweep output");
                }
                warn!(
                    function = %spec.function,
                    x = x,
                    emitted = report.emitted,
                    error = %e,
                    "sweep aborted"
                );
                return Err(e);
            },
        }

        let next = x + spec.step;
        if next == x {
            if let Err(flush_err) = sink.finish() {
                warn!(error = %flush_err, "failed to flush partial sweep output");
            }
            warn!(function = %spec.function, x = x, "sweep stalled");
            return Err(stalled_step(x, spec.step));
        }
        x = next;
    }

    sink.finish()?;
    debug!(
        function = %spec.function,
        emitted = report.emitted,
        skipped = report.skipped,
        "sweep finished"
    );
    Ok(report)
}

/// Sweep `function_name` into a delimited file at `output`
///
/// Records carry three decimal places and the sweep is fail-fast. An unknown
/// function name or invalid epsilon is reported before the file is touched.
pub fn run_to_file(
    output: impl AsRef<Path>,
    function_name: &str,
    start: f64,
    end: f64,
    step: f64,
    epsilon: f64,
    separator: char,
) -> Result<SweepReport> {
    let function = lookup(function_name)?;
    let spec = SweepSpec::new(function, start, end, step)
        .with_tolerance(Tolerance::new(epsilon)?)
        .with_separator(separator);
    run_spec_to_file(output.as_ref(), &spec)
}

/// Sweep an already-built spec into a delimited file
pub fn run_spec_to_file(output: &Path, spec: &SweepSpec) -> Result<SweepReport> {
    spec.validate()?;
    let file = File::create(output).map_err(|e| {
        CalcError::output(format!("Failed to create {}: {}", output.display(), e))
    })?;
    let mut sink = CsvSink::new(BufWriter::new(file), spec.separator)?;
    evaluate_sweep(spec, &mut sink)
}

fn evaluate_checked<F>(funcs: &F, function: FunctionKind, x: f64) -> Result<f64>
where
    F: FunctionSet + ?Sized,
{
    let result = function.evaluate(funcs, x)?;
    if result.is_finite() {
        Ok(result)
    } else {
        Err(CalcError::arithmetic(format!(
            "{} evaluated to {} at x = {}",
            function, result, x
        )))
    }
}

fn stalled_step(x: f64, step: f64) -> CalcError {
    CalcError::invalid_argument(format!(
        "sweep step {} does not advance x at {}",
        step, x
    ))
}

fn format_fixed(value: f64, decimal_places: usize) -> String {
    format!("{:.*}", decimal_places, value)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::f64::consts::PI;
    use tracing_test::traced_test;

    fn parse(line: &str, separator: char) -> (f64, f64) {
        let mut fields = line.split(separator);
        let x = fields.next().unwrap().parse().unwrap();
        let y = fields.next().unwrap().parse().unwrap();
        (x, y)
    }

    #[test]
    fn test_sine_sweep() {
        let spec = SweepSpec::new(FunctionKind::Sin, 0.0, PI, 0.5)
            .with_tolerance(Tolerance::new(1e-6).unwrap());
        let mut sink = MemorySink::new(';');

        let report = evaluate_sweep(&spec, &mut sink).unwrap();
        assert_eq!(report.emitted, 7);
        assert_eq!(report.skipped, 0);

        let lines = sink.lines();
        assert_eq!(lines[0], "0.000;0.000");
        assert_eq!(lines[1], "0.500;0.479");
        for (i, line) in lines.iter().enumerate() {
            let (x, y) = parse(line, ';');
            assert!((x - 0.5 * i as f64).abs() < 1e-9);
            assert!((y - x.sin()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_fail_fast_keeps_earlier_samples() {
        let spec = SweepSpec::new(FunctionKind::Cot, -1.0, 1.0, 0.5);
        let mut sink = MemorySink::new(';');

        let err = evaluate_sweep(&spec, &mut sink).unwrap_err();
        assert!(matches!(err, CalcError::Arithmetic(_)));
        // -1.0 and -0.5 were written, 0.0 aborted, 0.5 and 1.0 never ran
        assert_eq!(sink.lines().len(), 2);
        assert!(sink.lines()[1].starts_with("-0.500;"));
    }

    #[test]
    fn test_skip_errors_policy() {
        let spec = SweepSpec::new(FunctionKind::Cot, -1.0, 1.0, 0.5)
            .with_policy(FailurePolicy::SkipErrors);
        let mut sink = MemorySink::new(';');

        let report = evaluate_sweep(&spec, &mut sink).unwrap();
        assert_eq!(report.emitted, 4);
        assert_eq!(report.skipped, 1);
        assert!(sink.lines().iter().all(|l| !l.starts_with("0.000")));
    }

    #[test]
    fn test_domain_error_before_first_sample() {
        let spec = SweepSpec::new(FunctionKind::Ln, -1.0, 1.0, 0.5);
        let mut sink = MemorySink::new(';');
        assert!(matches!(
            evaluate_sweep(&spec, &mut sink),
            Err(CalcError::Domain(_))
        ));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_descending_sweep() {
        let spec = SweepSpec::new(FunctionKind::Sin, 1.0, 0.0, -0.5).with_decimal_places(2);
        let mut sink = MemorySink::new(',');

        evaluate_sweep(&spec, &mut sink).unwrap();
        assert_eq!(sink.lines(), ["1.00,0.84", "0.50,0.48", "0.00,0.00"]);
    }

    #[test]
    fn test_step_sign_mismatch_is_empty() {
        let spec = SweepSpec::new(FunctionKind::Sin, 0.0, 1.0, -0.1);
        let mut sink = MemorySink::new(';');
        let report = evaluate_sweep(&spec, &mut sink).unwrap();
        assert_eq!(report.emitted, 0);

        let spec = SweepSpec::new(FunctionKind::Sin, 1.0, 0.0, 0.1);
        assert_eq!(evaluate_sweep(&spec, &mut sink).unwrap().emitted, 0);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_single_point_interval() {
        let spec = SweepSpec::new(FunctionKind::Cos, 0.0, 0.0, 0.1);
        let mut sink = MemorySink::new(';');
        evaluate_sweep(&spec, &mut sink).unwrap();
        assert_eq!(sink.lines(), ["0.000;1.000"]);
    }

    #[test]
    fn test_invalid_specs() {
        let mut sink = MemorySink::new(';');
        for spec in [
            SweepSpec::new(FunctionKind::Sin, 0.0, 1.0, 0.0),
            SweepSpec::new(FunctionKind::Sin, 0.0, 1.0, f64::NAN),
            SweepSpec::new(FunctionKind::Sin, f64::NEG_INFINITY, 1.0, 0.1),
            SweepSpec::new(FunctionKind::Sin, 0.0, 1.0, 0.1).with_separator('.'),
            SweepSpec::new(FunctionKind::Sin, 0.0, 1.0, 0.1).with_separator('7'),
            SweepSpec::new(FunctionKind::Sin, 0.0, 1.0, 0.1).with_separator('→'),
        ] {
            assert!(matches!(
                evaluate_sweep(&spec, &mut sink),
                Err(CalcError::InvalidArgument(_))
            ));
        }
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_step_below_float_spacing_is_rejected() {
        let mut sink = MemorySink::new(';');
        let spec = SweepSpec::new(FunctionKind::Sin, 1e17, 1e17 + 64.0, 1.0);
        assert!(matches!(
            evaluate_sweep(&spec, &mut sink),
            Err(CalcError::InvalidArgument(_))
        ));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_step_that_stops_advancing_mid_sweep() {
        struct Identity;

        impl FunctionSet for Identity {
            fn sin(&self, x: f64) -> Result<f64> {
                Ok(x)
            }

            fn ln(&self, x: f64) -> Result<f64> {
                Ok(x)
            }
        }

        // Above 2^53 adding 1.0 rounds back to x
        let start = 2f64.powi(53) - 2.0;
        let spec = SweepSpec::new(FunctionKind::Sin, start, start + 16.0, 1.0)
            .with_decimal_places(0);
        let mut sink = MemorySink::new(';');

        let err = evaluate_sweep_with(&Identity, &spec, &mut sink).unwrap_err();
        assert!(matches!(err, CalcError::InvalidArgument(_)));
        assert_eq!(sink.lines().len(), 3);
        assert_eq!(sink.lines()[2], "9007199254740992;9007199254740992");
    }

    #[test]
    fn test_decimal_places_are_capped() {
        let mut sink = MemorySink::new(';');
        let spec = SweepSpec::new(FunctionKind::Sin, 0.0, 1.0, 0.5)
            .with_decimal_places(MAX_DECIMAL_PLACES + 1);
        assert!(matches!(
            evaluate_sweep(&spec, &mut sink),
            Err(CalcError::InvalidArgument(_))
        ));

        let spec = spec.with_decimal_places(MAX_DECIMAL_PLACES);
        assert_eq!(evaluate_sweep(&spec, &mut sink).unwrap().emitted, 3);
    }

    #[test]
    fn test_non_finite_result_is_an_error() {
        struct Overflowing;

        impl FunctionSet for Overflowing {
            fn sin(&self, _x: f64) -> Result<f64> {
                Ok(f64::INFINITY)
            }

            fn ln(&self, x: f64) -> Result<f64> {
                Ok(x)
            }
        }

        let spec = SweepSpec::new(FunctionKind::Sin, 0.0, 1.0, 0.5);
        let mut sink = MemorySink::new(';');
        assert!(matches!(
            evaluate_sweep_with(&Overflowing, &spec, &mut sink),
            Err(CalcError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_evaluate_point() {
        let tol = Tolerance::new(1e-10).unwrap();
        assert!((evaluate_point(FunctionKind::Log2, 8.0, tol).unwrap() - 3.0).abs() < 1e-9);
        assert!(matches!(
            evaluate_point(FunctionKind::Sec, PI / 2.0, tol),
            Err(CalcError::Arithmetic(_))
        ));
    }

    #[test]
    #[traced_test]
    fn test_abort_is_logged() {
        let spec = SweepSpec::new(FunctionKind::Csc, -0.5, 0.5, 0.5);
        let mut sink = MemorySink::new(';');
        assert!(evaluate_sweep(&spec, &mut sink).is_err());
        assert!(logs_contain("sweep aborted"));
    }
}
