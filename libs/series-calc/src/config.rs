//! Batch sweep configuration
//!
//! A batch is a list of sweeps sharing defaults for tolerance, separator,
//! precision and failure policy. Configuration is layered with figment:
//! built-in defaults, then the file (YAML, TOML or JSON by extension), then
//! `SWEEP_`-prefixed environment variables for the top-level settings.

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CalcError, Result};
use crate::registry::FunctionKind;
use crate::sweep::{
    run_spec_to_file, FailurePolicy, SweepReport, SweepSpec, DEFAULT_DECIMAL_PLACES,
    DEFAULT_SEPARATOR,
};
use crate::tolerance::Tolerance;

/// Prefix for environment overrides, e.g. `SWEEP_EPSILON=1e-4`
pub const ENV_PREFIX: &str = "SWEEP_";

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

fn default_decimal_places() -> usize {
    DEFAULT_DECIMAL_PLACES
}

/// One sweep in a batch; unset fields fall back to the batch defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub function: FunctionKind,
    pub start: f64,
    pub end: f64,
    pub step: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<Tolerance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<char>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<FailurePolicy>,

    /// Output file name, relative to `output_dir`; defaults to `<function>.csv`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl SweepEntry {
    pub fn new(function: FunctionKind, start: f64, end: f64, step: f64) -> Self {
        Self {
            function,
            start,
            end,
            step,
            epsilon: None,
            separator: None,
            decimal_places: None,
            policy: None,
            output: None,
        }
    }
}

/// A sweep resolved against the batch defaults
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    pub output: PathBuf,
    pub spec: SweepSpec,
}

/// Batch of sweeps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub epsilon: Tolerance,

    #[serde(default = "default_separator")]
    pub separator: char,

    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,

    #[serde(default)]
    pub policy: FailurePolicy,

    #[serde(default)]
    pub sweeps: Vec<SweepEntry>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            epsilon: Tolerance::default(),
            separator: default_separator(),
            decimal_places: default_decimal_places(),
            policy: FailurePolicy::default(),
            sweeps: Vec::new(),
        }
    }
}

impl BatchConfig {
    /// Load a batch from `path`, layered over defaults and the environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CalcError::config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let figment = Figment::from(Serialized::defaults(BatchConfig::default()));
        let figment = match extension.as_deref() {
            Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
            Some("toml") => figment.merge(Toml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => {
                return Err(CalcError::config(format!(
                    "unsupported configuration format: {}",
                    path.display()
                )))
            },
        };

        let config: BatchConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The ten sweeps of the reference run
    ///
    /// csc and cot end on the singularity at 0, so the batch skips failing
    /// samples instead of aborting.
    pub fn reference() -> Self {
        let sweeps = [
            (FunctionKind::Sin, -5.0, 0.0, 0.01),
            (FunctionKind::Tan, -1.5, 0.0, 0.01),
            (FunctionKind::Cos, -3.14, 0.0, 0.01),
            (FunctionKind::Csc, -4.0, 0.0, 0.1),
            (FunctionKind::Ln, 1.1, 5.0, 0.1),
            (FunctionKind::Log2, 1.1, 5.0, 0.1),
            (FunctionKind::Log3, 1.1, 5.0, 0.1),
            (FunctionKind::Log5, 1.1, 5.0, 0.1),
            (FunctionKind::Cot, -1.5, 0.0, 0.01),
            (FunctionKind::Sec, -3.14, 0.0, 0.05),
        ]
        .into_iter()
        .map(|(function, start, end, step)| SweepEntry::new(function, start, end, step))
        .collect();

        Self {
            // 1e-3 is always a valid tolerance
            epsilon: Tolerance::new(1e-3).unwrap_or_default(),
            policy: FailurePolicy::SkipErrors,
            sweeps,
            ..Self::default()
        }
    }

    /// Resolve every entry against the batch defaults
    pub fn jobs(&self) -> Vec<BatchJob> {
        self.sweeps
            .iter()
            .map(|entry| {
                let file_name = entry
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(format!("{}.csv", entry.function)));
                let spec = SweepSpec::new(entry.function, entry.start, entry.end, entry.step)
                    .with_tolerance(entry.epsilon.unwrap_or(self.epsilon))
                    .with_separator(entry.separator.unwrap_or(self.separator))
                    .with_decimal_places(entry.decimal_places.unwrap_or(self.decimal_places))
                    .with_policy(entry.policy.unwrap_or(self.policy));
                BatchJob {
                    output: self.output_dir.join(file_name),
                    spec,
                }
            })
            .collect()
    }

    /// Check every resolved sweep before anything is written
    pub fn validate(&self) -> Result<()> {
        for job in self.jobs() {
            job.spec.validate().map_err(|e| {
                CalcError::config(format!("sweep '{}': {}", job.output.display(), e))
            })?;
        }
        Ok(())
    }
}

/// Run every sweep of a batch in order
///
/// Stops at the first sweep that fails; files of earlier sweeps are kept.
pub fn run_batch(config: &BatchConfig) -> Result<Vec<(PathBuf, SweepReport)>> {
    config.validate()?;
    fs::create_dir_all(&config.output_dir).map_err(|e| {
        CalcError::output(format!(
            "Failed to create output directory {}: {}",
            config.output_dir.display(),
            e
        ))
    })?;

    let mut reports = Vec::with_capacity(config.sweeps.len());
    for job in config.jobs() {
        info!(
            function = %job.spec.function,
            output = %job.output.display(),
            "running sweep"
        );
        let report = run_spec_to_file(&job.output, &job.spec)?;
        reports.push((job.output, report));
    }
    Ok(reports)
}
