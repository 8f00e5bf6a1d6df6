//! Error types for engine operations.

use thiserror::Error;

/// Error type for engine operations.
///
/// Every error is detected before pixel computation starts and is local to
/// a single call; a failed call never touches the processed image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Parameter outside its declared range, or no image to operate on.
    #[error("domain error: {0}")]
    Domain(String),

    /// Two-image operation on buffers of different sizes.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        EngineError::Domain(msg.into())
    }
}

/// Reject NaN and infinities for a named parameter.
pub(crate) fn ensure_finite(name: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::domain(format!("{name} must be finite, got {value}")))
    }
}

/// Check that `value` lies in the closed interval `[min, max]`.
pub(crate) fn ensure_range(name: &str, value: f64, min: f64, max: f64) -> EngineResult<f64> {
    ensure_finite(name, value)?;
    if value < min || value > max {
        return Err(EngineError::domain(format!(
            "{name} must be in [{min}, {max}], got {value}"
        )));
    }
    Ok(value)
}

/// Check that a filter window is odd and within `[1, max]`.
pub(crate) fn ensure_window(name: &str, window: usize, max: usize) -> EngineResult<usize> {
    if window == 0 || window > max || window % 2 == 0 {
        return Err(EngineError::domain(format!(
            "{name} must be an odd size in [1, {max}], got {window}"
        )));
    }
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_rejects_nan() {
        assert!(ensure_range("k", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_range_bounds_inclusive() {
        assert_eq!(ensure_range("k", 0.0, 0.0, 1.0), Ok(0.0));
        assert_eq!(ensure_range("k", 1.0, 0.0, 1.0), Ok(1.0));
        assert!(ensure_range("k", 1.01, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_window_must_be_odd() {
        assert!(ensure_window("w", 4, 31).is_err());
        assert!(ensure_window("w", 33, 31).is_err());
        assert_eq!(ensure_window("w", 5, 31), Ok(5));
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::domain("divide factor must be non-zero");
        assert_eq!(err.to_string(), "domain error: divide factor must be non-zero");
    }
}
