//! Core error types for the portfolio engine.
//!
//! Only malformed input is an error. Constraint violations and consistency
//! findings are returned as data (see `validation` and `consistency`) so the
//! caller decides whether to block rendering.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Failed to serialize calculation inputs: {0}")]
    Serialization(String),
}

/// Validation errors for caller-supplied numeric input.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Length mismatch for {field}: expected {expected}, got {actual}")]
    DimensionMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("At least one asset is required for {0}")]
    EmptyPortfolio(String),
}

impl ValidationError {
    /// Creates a DimensionMismatch error.
    pub fn dimension_mismatch(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Creates an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

/// Fails with `InvalidInput` unless every value is finite.
pub(crate) fn ensure_finite(field: &str, values: &[f64]) -> Result<()> {
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(ValidationError::invalid_input(format!(
            "{field}[{index}] is not a finite number"
        ))
        .into());
    }
    Ok(())
}

/// Fails with `DimensionMismatch` unless `actual == expected`.
pub(crate) fn ensure_len(field: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ValidationError::dimension_mismatch(field, expected, actual).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err: Error = ValidationError::dimension_mismatch("risks", 3, 2).into();
        assert_eq!(
            err.to_string(),
            "Input validation failed: Length mismatch for risks: expected 3, got 2"
        );

        let err = ValidationError::InvalidGoal("target_amount must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid goal: target_amount must be positive"
        );
    }

    #[test]
    fn test_ensure_finite_reports_index() {
        let err = ensure_finite("weights", &[0.5, f64::NAN]).unwrap_err();
        assert!(err.to_string().contains("weights[1]"));
        assert!(ensure_finite("weights", &[0.5, 0.5]).is_ok());
    }
}
