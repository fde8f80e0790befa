//! series-calc - Transcendental functions from first principles
//!
//! Computes sine and natural logarithm by power series under a caller-chosen
//! tolerance, derives the remaining trigonometric and logarithmic functions
//! from them, and sweeps any of them (or a composite equation) across an
//! interval into delimited text records.
//!
//! # Features
//!
//! - **Primitives**: `sine()` and `natural_log()`, series only
//! - **Derived functions**: cos, tan, cot, sec, csc, log2, log3, log5 through [`FunctionSet`]
//! - **Composite equations**: a trigonometric and a logarithmic expression joined piecewise
//! - **Sweeps**: fail-fast (or explicitly skipping) batch evaluation into a [`SampleSink`]
//!
//! # Example
//!
//! ```rust
//! use series_calc::{evaluate_sweep, FunctionKind, FunctionSet, MemorySink};
//! use series_calc::{SeriesFunctions, SweepSpec, Tolerance};
//!
//! let funcs = SeriesFunctions::new(Tolerance::new(1e-10).unwrap());
//! assert!((funcs.sin(0.5).unwrap() - 0.479425538604203).abs() < 1e-9);
//! assert!((funcs.log2(8.0).unwrap() - 3.0).abs() < 1e-9);
//!
//! // Names are looked up case-insensitively
//! let function: FunctionKind = "Cos".parse().unwrap();
//! assert!((function.evaluate(&funcs, 0.0).unwrap() - 1.0).abs() < 1e-9);
//!
//! let spec = SweepSpec::new(FunctionKind::Sin, 0.0, 1.0, 0.5);
//! let mut sink = MemorySink::new(';');
//! evaluate_sweep(&spec, &mut sink).unwrap();
//! assert_eq!(sink.lines(), ["0.000;0.000", "0.500;0.479", "1.000;0.841"]);
//! ```
//!
//! # Registered Functions
//!
//! | Name | Definition | Error |
//! |------|------------|-------|
//! | `sin` | Maclaurin series | Domain: x not finite |
//! | `cos` | `sin(x + π/2)` | Domain: x not finite |
//! | `tan` | `sin / cos` | Arithmetic: cos ≈ 0 |
//! | `cot` | `cos / sin` | Arithmetic: sin ≈ 0 |
//! | `sec` | `1 / cos` | Arithmetic: cos ≈ 0 |
//! | `csc` | `1 / sin` | Arithmetic: sin ≈ 0 |
//! | `ln` | atanh series | Domain: x ≤ 0 |
//! | `log2`, `log3`, `log5` | `ln(x) / ln(base)` | Domain: x ≤ 0 |
//! | `system` | first equation for x ≤ 0, second otherwise | any of the above |

pub mod config;
pub mod equation;
pub mod error;
pub mod functions;
pub mod primitives;
pub mod registry;
pub mod sink;
pub mod sweep;
pub mod tolerance;

// Re-exports for convenience
pub use config::{run_batch, BatchConfig, BatchJob, SweepEntry};
pub use equation::{first_equation, second_equation, system, Equation};
pub use error::{CalcError, Result};
pub use functions::{FunctionSet, SeriesFunctions};
pub use primitives::{natural_log, sine};
pub use registry::{lookup, FunctionKind};
pub use sink::{CsvSink, MemorySink, SampleSink};
pub use sweep::{
    evaluate_point, evaluate_sweep, evaluate_sweep_with, run_spec_to_file, run_to_file,
    FailurePolicy, SweepReport, SweepSpec,
};
pub use tolerance::{Tolerance, DEFAULT_EPSILON, SINGULARITY_GUARD};
