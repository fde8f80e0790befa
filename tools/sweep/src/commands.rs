//! Command implementations

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use series_calc::{
    evaluate_point, evaluate_sweep, lookup, run_batch, run_spec_to_file, BatchConfig, CsvSink,
    Equation, FailurePolicy, FunctionKind, SweepReport, SweepSpec, Tolerance,
};

/// Parameters of the `sweep` command
pub struct SweepArgs {
    pub function: String,
    pub start: f64,
    pub end: f64,
    pub step: f64,
    pub epsilon: f64,
    pub separator: char,
    pub decimals: usize,
    pub skip_errors: bool,
}

#[derive(Serialize)]
struct PointOutput {
    function: FunctionKind,
    x: f64,
    result: f64,
    epsilon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<Equation>,
}

pub fn eval(function: &str, x: f64, epsilon: f64, json: bool) -> Result<()> {
    let function = lookup(function)?;
    let tolerance = Tolerance::new(epsilon)?;
    let result = evaluate_point(function, x, tolerance)
        .with_context(|| format!("Failed to evaluate {}({})", function, x))?;

    let branch = (function == FunctionKind::System).then_some(Equation::select(x));
    if json {
        let output = PointOutput {
            function,
            x,
            result,
            epsilon,
            branch,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", result);
    }
    Ok(())
}

pub fn sweep(args: SweepArgs, output: Option<&Path>, json: bool) -> Result<()> {
    let function = lookup(&args.function)?;
    let policy = if args.skip_errors {
        FailurePolicy::SkipErrors
    } else {
        FailurePolicy::FailFast
    };
    let spec = SweepSpec::new(function, args.start, args.end, args.step)
        .with_tolerance(Tolerance::new(args.epsilon)?)
        .with_separator(args.separator)
        .with_decimal_places(args.decimals)
        .with_policy(policy);
    debug!(
        function = %function,
        start = spec.start,
        end = spec.end,
        step = spec.step,
        "Starting sweep"
    );

    let report = match output {
        Some(path) => run_spec_to_file(path, &spec)
            .with_context(|| format!("Sweep into {} failed", path.display()))?,
        None => {
            let mut sink = CsvSink::new(io::stdout().lock(), spec.separator)?;
            evaluate_sweep(&spec, &mut sink).context("Sweep failed")?
        },
    };

    // Keep stdout clean when it carries the records
    if output.is_some() {
        print_report(output, &report, json)?;
    } else if json {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

pub fn batch(config: Option<&Path>, output_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let mut batch = match config {
        Some(path) => BatchConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => BatchConfig::reference(),
    };
    if let Some(dir) = output_dir {
        batch.output_dir = dir;
    }
    debug!(
        output_dir = %batch.output_dir.display(),
        sweeps = batch.sweeps.len(),
        "Loaded batch configuration"
    );

    let reports = run_batch(&batch)?;
    if json {
        let entries: Vec<_> = reports
            .iter()
            .map(|(path, report)| serde_json::json!({ "output": path, "report": report }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (path, report) in &reports {
            print_report(Some(path.as_path()), report, false)?;
        }
        println!(
            "{} {} sweeps completed",
            "OK".bright_green(),
            reports.len()
        );
    }
    Ok(())
}

pub fn list(json: bool) {
    let names: Vec<&str> = FunctionKind::ALL.iter().map(|kind| kind.name()).collect();
    if json {
        println!("{}", serde_json::Value::from(names));
    } else {
        for name in names {
            println!("{}", name);
        }
    }
}

fn print_report(output: Option<&Path>, report: &SweepReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let target = output
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    let skipped = if report.skipped > 0 {
        format!(", {} skipped", report.skipped).yellow().to_string()
    } else {
        String::new()
    };
    println!(
        "{} {} -> {}: {} samples{}",
        "Sweep".bright_cyan(),
        report.function.name().bright_yellow(),
        target,
        report.emitted,
        skipped
    );
    Ok(())
}
