//! Error types for series-calc

use thiserror::Error;

/// Calculation errors
#[derive(Debug, Error)]
pub enum CalcError {
    /// Input outside the function's mathematical domain
    #[error("Domain error: {0}")]
    Domain(String),

    /// Denominator at (or within the guard of) zero
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CalcError {
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn arithmetic(msg: impl Into<String>) -> Self {
        Self::Arithmetic(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for failures raised by the numeric functions themselves
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Domain(_) | Self::Arithmetic(_))
    }
}

impl From<std::io::Error> for CalcError {
    fn from(err: std::io::Error) -> Self {
        CalcError::Output(err.to_string())
    }
}

impl From<csv::Error> for CalcError {
    fn from(err: csv::Error) -> Self {
        CalcError::Output(err.to_string())
    }
}

impl From<figment::Error> for CalcError {
    fn from(err: figment::Error) -> Self {
        CalcError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
