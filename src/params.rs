//! Parameter ranges for every adjustable operation.
//!
//! Each range is `{min, max, default, step}`. Pure functions validate the
//! mathematical domain of their inputs; the ranges here are the interactive
//! slider limits and are enforced by [`crate::Operation::apply`].

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, EngineError, EngineResult};

/// Closed parameter interval with a default and a step size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, default: f64, step: f64) -> Self {
        ParamRange {
            min,
            max,
            default,
            step,
        }
    }

    /// True if `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Validate `value` against the range.
    pub fn check(&self, name: &str, value: f64) -> EngineResult<f64> {
        ensure_finite(name, value)?;
        if !self.contains(value) {
            return Err(EngineError::domain(format!(
                "{name} must be in [{}, {}], got {value}",
                self.min, self.max
            )));
        }
        Ok(value)
    }
}

pub const NEGATIVE: ParamRange = ParamRange::new(0.0, 1.0, 1.0, 0.01);
pub const BOOLEAN_NOT: ParamRange = ParamRange::new(0.0, 1.0, 1.0, 0.01);
pub const ADD_SUBTRACT: ParamRange = ParamRange::new(0.0, 255.0, 50.0, 1.0);
pub const MULTIPLY_DIVIDE: ParamRange = ParamRange::new(0.1, 5.0, 1.0, 0.1);
pub const THRESHOLD: ParamRange = ParamRange::new(0.0, 255.0, 127.0, 1.0);
pub const BRIGHTNESS: ParamRange = ParamRange::new(0.1, 3.0, 1.0, 0.1);
pub const CONTRAST: ParamRange = ParamRange::new(0.1, 3.0, 1.0, 0.1);
pub const SMOOTHING_WINDOW: ParamRange = ParamRange::new(1.0, 31.0, 5.0, 2.0);
pub const CUTOFF: ParamRange = ParamRange::new(1.0, 200.0, 30.0, 1.0);
pub const HIGHPASS: ParamRange = ParamRange::new(0.0, 2.0, 1.0, 0.01);
pub const HIGHBOOST: ParamRange = ParamRange::new(1.0, 5.0, 1.5, 0.1);
pub const GAUSSIAN_NOISE: ParamRange = ParamRange::new(0.0, 50.0, 10.0, 1.0);
pub const RAYLEIGH_NOISE: ParamRange = ParamRange::new(0.0, 30.0, 10.0, 1.0);
pub const ERLANG_NOISE: ParamRange = ParamRange::new(0.0, 20.0, 5.0, 1.0);
pub const EXPONENTIAL_NOISE: ParamRange = ParamRange::new(0.0, 20.0, 5.0, 1.0);
pub const UNIFORM_NOISE: ParamRange = ParamRange::new(0.0, 50.0, 20.0, 1.0);
pub const IMPULSE_NOISE: ParamRange = ParamRange::new(0.0, 0.5, 0.05, 0.01);
pub const LOG_WINDOW: ParamRange = ParamRange::new(1.0, 15.0, 5.0, 2.0);
pub const CANNY_LOW: ParamRange = ParamRange::new(0.0, 255.0, 50.0, 1.0);
pub const ROTATION: ParamRange = ParamRange::new(-360.0, 360.0, 0.0, 1.0);
pub const ZOOM: ParamRange = ParamRange::new(0.1, 5.0, 1.0, 0.1);
pub const TRANSLATE: ParamRange = ParamRange::new(-500.0, 500.0, 0.0, 10.0);
pub const REGION_THRESHOLD: ParamRange = ParamRange::new(0.0, 50.0, 10.0, 1.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_inside_ranges() {
        let all = [
            NEGATIVE,
            BOOLEAN_NOT,
            ADD_SUBTRACT,
            MULTIPLY_DIVIDE,
            THRESHOLD,
            BRIGHTNESS,
            CONTRAST,
            SMOOTHING_WINDOW,
            CUTOFF,
            HIGHPASS,
            HIGHBOOST,
            GAUSSIAN_NOISE,
            RAYLEIGH_NOISE,
            ERLANG_NOISE,
            EXPONENTIAL_NOISE,
            UNIFORM_NOISE,
            IMPULSE_NOISE,
            LOG_WINDOW,
            CANNY_LOW,
            ROTATION,
            ZOOM,
            TRANSLATE,
            REGION_THRESHOLD,
        ];
        for range in all {
            assert!(range.contains(range.default), "{range:?}");
            assert!(range.step > 0.0);
        }
    }

    #[test]
    fn test_check_rejects_outside() {
        assert!(CUTOFF.check("cutoff", 0.0).is_err());
        assert!(CUTOFF.check("cutoff", f64::NAN).is_err());
        assert_eq!(CUTOFF.check("cutoff", 200.0), Ok(200.0));
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_string(&THRESHOLD).unwrap();
        assert_eq!(json, r#"{"min":0.0,"max":255.0,"default":127.0,"step":1.0}"#);
        let back: ParamRange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, THRESHOLD);
    }
}
