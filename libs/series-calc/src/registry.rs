//! Function registry
//!
//! Maps the user-facing function names onto a closed set of evaluators.
//! Lookup is case-insensitive and never falls back to a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::equation;
use crate::error::{CalcError, Result};
use crate::functions::FunctionSet;

/// Every function addressable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FunctionKind {
    Sin,
    Cos,
    Csc,
    Sec,
    Tan,
    Cot,
    Ln,
    Log2,
    Log3,
    Log5,
    /// Piecewise composite equation
    System,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 11] = [
        FunctionKind::Sin,
        FunctionKind::Cos,
        FunctionKind::Csc,
        FunctionKind::Sec,
        FunctionKind::Tan,
        FunctionKind::Cot,
        FunctionKind::Ln,
        FunctionKind::Log2,
        FunctionKind::Log3,
        FunctionKind::Log5,
        FunctionKind::System,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FunctionKind::Sin => "sin",
            FunctionKind::Cos => "cos",
            FunctionKind::Csc => "csc",
            FunctionKind::Sec => "sec",
            FunctionKind::Tan => "tan",
            FunctionKind::Cot => "cot",
            FunctionKind::Ln => "ln",
            FunctionKind::Log2 => "log2",
            FunctionKind::Log3 => "log3",
            FunctionKind::Log5 => "log5",
            FunctionKind::System => "system",
        }
    }

    /// Evaluate this function at `x`
    pub fn evaluate<F>(self, funcs: &F, x: f64) -> Result<f64>
    where
        F: FunctionSet + ?Sized,
    {
        match self {
            FunctionKind::Sin => funcs.sin(x),
            FunctionKind::Cos => funcs.cos(x),
            FunctionKind::Csc => funcs.csc(x),
            FunctionKind::Sec => funcs.sec(x),
            FunctionKind::Tan => funcs.tan(x),
            FunctionKind::Cot => funcs.cot(x),
            FunctionKind::Ln => funcs.ln(x),
            FunctionKind::Log2 => funcs.log2(x),
            FunctionKind::Log3 => funcs.log3(x),
            FunctionKind::Log5 => funcs.log5(x),
            FunctionKind::System => equation::system(funcs, x),
        }
    }
}

/// Look up a function by name
pub fn lookup(name: &str) -> Result<FunctionKind> {
    name.parse()
}

impl FromStr for FunctionKind {
    type Err = CalcError;

    fn from_str(name: &str) -> Result<Self> {
        let wanted = name.trim();
        FunctionKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CalcError::invalid_argument(format!("function not found: {}", name)))
    }
}

impl TryFrom<String> for FunctionKind {
    type Error = CalcError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<FunctionKind> for String {
    fn from(kind: FunctionKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
