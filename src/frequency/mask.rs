//! Frequency-domain masks.
//!
//! A mask holds one real weight per bin of a centered spectrum. `d` below
//! is the Euclidean distance of a bin from `(rows / 2, cols / 2)` and `D0`
//! the cutoff radius.
//!
//! | Kind | H(d) |
//! |------|------|
//! | Ideal lowpass | 1 if d <= D0 else 0 |
//! | Ideal highpass | 0 if d <= D0 else 1 |
//! | Butterworth lowpass | 1 / (1 + (d / D0)^(2n)) |
//! | Butterworth highpass | 1 / (1 + (D0 / d)^(2n)), 0 at d = 0 |
//!
//! The Butterworth order is fixed at n = 2.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::fft::center;
use crate::error::{ensure_finite, EngineError, EngineResult};

/// Butterworth filter order.
pub const BUTTERWORTH_ORDER: i32 = 2;

/// Mask family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskKind {
    IdealLowpass,
    IdealHighpass,
    ButterworthLowpass,
    ButterworthHighpass,
}

impl MaskKind {
    /// Weight for a bin at distance `d` from the centre.
    #[inline]
    fn weight(self, d: f64, cutoff: f64) -> f64 {
        let exponent = 2 * BUTTERWORTH_ORDER;
        match self {
            MaskKind::IdealLowpass => {
                if d <= cutoff {
                    1.0
                } else {
                    0.0
                }
            }
            MaskKind::IdealHighpass => {
                if d <= cutoff {
                    0.0
                } else {
                    1.0
                }
            }
            MaskKind::ButterworthLowpass => 1.0 / (1.0 + (d / cutoff).powi(exponent)),
            MaskKind::ButterworthHighpass => {
                if d == 0.0 {
                    0.0
                } else {
                    1.0 / (1.0 + (cutoff / d).powi(exponent))
                }
            }
        }
    }

    fn is_butterworth(self) -> bool {
        matches!(
            self,
            MaskKind::ButterworthLowpass | MaskKind::ButterworthHighpass
        )
    }
}

/// Real weights over a centered spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyMask {
    weights: Array2<f64>,
}

impl FrequencyMask {
    /// Evaluate `kind` over a `rows x cols` grid.
    ///
    /// # Arguments
    /// * `kind` - Mask family
    /// * `rows`, `cols` - Spectrum size
    /// * `cutoff` - Radius `D0`; any finite value for ideal masks, `> 0`
    ///   for Butterworth masks
    pub fn build(kind: MaskKind, rows: usize, cols: usize, cutoff: f64) -> EngineResult<Self> {
        let cutoff = ensure_finite("cutoff", cutoff)?;
        if kind.is_butterworth() && cutoff <= 0.0 {
            return Err(EngineError::domain(format!(
                "Butterworth cutoff must be positive, got {cutoff}"
            )));
        }

        let (cy, cx) = center(rows, cols);
        let weights = Array2::from_shape_fn((rows, cols), |(y, x)| {
            let d = (y as f64 - cy).hypot(x as f64 - cx);
            kind.weight(d, cutoff)
        });
        Ok(FrequencyMask { weights })
    }

    /// Mask of ones; applying it leaves a spectrum unchanged.
    pub fn all_pass(rows: usize, cols: usize) -> Self {
        FrequencyMask {
            weights: Array2::ones((rows, cols)),
        }
    }

    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        self.weights.dim()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ideal_masks_are_complementary() {
        let lp = FrequencyMask::build(MaskKind::IdealLowpass, 9, 8, 2.5).unwrap();
        let hp = FrequencyMask::build(MaskKind::IdealHighpass, 9, 8, 2.5).unwrap();
        for (a, b) in lp.weights().iter().zip(hp.weights().iter()) {
            assert_eq!(a + b, 1.0);
        }
        assert_eq!(lp.weights()[[4, 4]], 1.0);
        assert_eq!(lp.weights()[[4, 7]], 0.0);
        assert_eq!(lp.weights()[[6, 4]], 1.0);
    }

    #[test]
    fn test_butterworth_half_power_at_cutoff() {
        let lp = FrequencyMask::build(MaskKind::ButterworthLowpass, 21, 21, 5.0).unwrap();
        let hp = FrequencyMask::build(MaskKind::ButterworthHighpass, 21, 21, 5.0).unwrap();
        assert_abs_diff_eq!(lp.weights()[[10, 15]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(hp.weights()[[10, 15]], 0.5, epsilon = 1e-12);
        assert_eq!(lp.weights()[[10, 10]], 1.0);
        assert_eq!(hp.weights()[[10, 10]], 0.0);
        // d = 10, (d / D0)^4 = 16
        assert_abs_diff_eq!(lp.weights()[[0, 10]], 1.0 / 17.0, epsilon = 1e-12);
    }

    #[test]
    fn test_butterworth_rejects_non_positive_cutoff() {
        assert!(FrequencyMask::build(MaskKind::ButterworthLowpass, 4, 4, 0.0).is_err());
        assert!(FrequencyMask::build(MaskKind::ButterworthHighpass, 4, 4, -1.0).is_err());
        assert!(FrequencyMask::build(MaskKind::IdealLowpass, 4, 4, f64::NAN).is_err());
        assert!(FrequencyMask::build(MaskKind::IdealHighpass, 4, 4, -1.0).is_ok());
    }

    #[test]
    fn test_all_pass() {
        let mask = FrequencyMask::all_pass(3, 5);
        assert_eq!(mask.dim(), (3, 5));
        assert!(mask.weights().iter().all(|&w| w == 1.0));
    }
}
