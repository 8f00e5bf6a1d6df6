//! Core utilities for spatial filters.
//!
//! This module provides shared functionality used by multiple filters:
//! - Convolution kernels and border handling
//! - Gaussian kernel generation
//! - Euclidean distance transform
//!
//! ## Border Handling
//!
//! Samples outside the image are mirrored about the edge pixel without
//! repeating it (`reflect-101`: `... 2 1 | 0 1 2 ... n-1 | n-2 n-3 ...`).
//! Every convolution in the crate goes through [`convolve_plane`], so the
//! border policy is the same for all filters.

use ndarray::{Array2, Array3, Axis};

use crate::error::{EngineError, EngineResult};

// ============================================================================
// Kernel
// ============================================================================

/// Odd-sized square convolution kernel of real coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f32>,
}

impl Kernel {
    /// Wrap a square array with odd side length.
    pub fn from_array(weights: Array2<f32>) -> EngineResult<Self> {
        let (rows, cols) = weights.dim();
        if rows != cols || rows % 2 == 0 {
            return Err(EngineError::domain(format!(
                "kernel must be square with odd size, got {rows}x{cols}"
            )));
        }
        Ok(Kernel { weights })
    }

    /// Build a kernel from a fixed square coefficient table.
    pub fn from_rows<const N: usize>(rows: [[f32; N]; N]) -> EngineResult<Self> {
        Self::from_array(Array2::from_shape_fn((N, N), |(j, i)| rows[j][i]))
    }

    /// Embed a 2x2 convolution kernel in a 3x3 correlation kernel.
    ///
    /// The anchor of an even kernel is its lower-right element. Flipped for
    /// correlation, the weights cover offsets `(0, 0)` to `(+1, +1)`, so
    /// they land rotated by 180 degrees in the bottom-right corner.
    pub fn from_2x2(rows: [[f32; 2]; 2]) -> Self {
        Kernel {
            weights: Array2::from_shape_fn((3, 3), |(j, i)| {
                if j >= 1 && i >= 1 {
                    rows[2 - j][2 - i]
                } else {
                    0.0
                }
            }),
        }
    }

    /// `size x size` kernel of uniform weights `1 / size²`.
    pub fn box_filter(size: usize) -> EngineResult<Self> {
        let weight = 1.0 / (size * size) as f32;
        Self::from_array(Array2::from_elem((size, size), weight))
    }

    /// Copy with every coefficient multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Kernel {
        Kernel {
            weights: self.weights.mapv(|w| w * factor),
        }
    }

    pub fn size(&self) -> usize {
        self.weights.dim().0
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }
}

// ============================================================================
// Convolution
// ============================================================================

/// Map a possibly out-of-range coordinate into `[0, n)` by reflect-101.
#[inline]
pub fn reflect_index(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = i.rem_euclid(period);
    if m >= n as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Correlate a plane with a kernel.
///
/// `out[y, x] = Σ k[j, i] · in[y + j - c, x + i - c]` with `c` the kernel
/// center and reflect-101 borders. No clipping is applied.
pub fn convolve_plane(plane: &Array2<f32>, kernel: &Kernel) -> Array2<f32> {
    let (height, width) = plane.dim();
    let size = kernel.size();
    let c = (size / 2) as isize;
    let weights = kernel.weights();
    let mut output = Array2::<f32>::zeros((height, width));

    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0f32;
            for j in 0..size {
                let sy = reflect_index(y as isize + j as isize - c, height);
                for i in 0..size {
                    let w = weights[[j, i]];
                    if w == 0.0 {
                        continue;
                    }
                    let sx = reflect_index(x as isize + i as isize - c, width);
                    sum += w * plane[[sy, sx]];
                }
            }
            output[[y, x]] = sum;
        }
    }

    output
}

/// Convolve every channel of a working array independently.
pub fn convolve_channels(working: &Array3<f32>, kernel: &Kernel) -> Array3<f32> {
    let mut output = Array3::<f32>::zeros(working.dim());
    for (c, channel) in working.axis_iter(Axis(2)).enumerate() {
        let filtered = convolve_plane(&channel.to_owned(), kernel);
        output.index_axis_mut(Axis(2), c).assign(&filtered);
    }
    output
}

// ============================================================================
// Gaussian
// ============================================================================

/// Default sigma for a Gaussian window: `0.3 * ((W - 1) / 2 - 1) + 0.8`.
pub fn gaussian_sigma(window: usize) -> f32 {
    0.3 * ((window as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D Gaussian weights for an odd window.
///
/// Windows up to 7 use the fixed binomial-like tables; larger windows
/// sample the Gaussian at [`gaussian_sigma`].
pub fn gaussian_kernel_1d(window: usize) -> Vec<f32> {
    match window {
        1 => return vec![1.0],
        3 => return vec![0.25, 0.5, 0.25],
        5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => {
            return vec![
                0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
            ]
        }
        _ => {}
    }

    let sigma = gaussian_sigma(window);
    let half = (window / 2) as f32;
    let mut kernel: Vec<f32> = (0..window)
        .map(|i| {
            let x = i as f32 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Separable 2D Gaussian kernel for an odd window.
pub fn gaussian_kernel(window: usize) -> EngineResult<Kernel> {
    if window % 2 == 0 {
        return Err(EngineError::domain(format!(
            "gaussian window must be odd, got {window}"
        )));
    }
    let k1d = gaussian_kernel_1d(window);
    Kernel::from_array(Array2::from_shape_fn((window, window), |(y, x)| {
        k1d[y] * k1d[x]
    }))
}

// ============================================================================
// Distance Transform
// ============================================================================

/// Stand-in for infinity that keeps the parabola arithmetic finite.
const FAR: f64 = 1e20;

/// Exact squared distance transform of one line.
///
/// Lower envelope of parabolas rooted at every sample (Felzenszwalb &
/// Huttenlocher). `v` and `z` are scratch buffers of length `n` and `n + 1`.
fn squared_edt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    let intersect = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for q in 0..n {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        d[q] = dq * dq + f[v[k]];
    }
}

/// Euclidean distance from every non-zero pixel to the nearest zero pixel.
///
/// Zero pixels map to 0. If the mask has no zero pixel at all, every
/// distance is `f32::INFINITY`.
pub fn distance_transform(mask: &Array2<u8>) -> Array2<f32> {
    let (height, width) = mask.dim();
    let longest = height.max(width);
    let mut grid = mask.mapv(|v| if v == 0 { 0.0 } else { FAR });

    let mut f = vec![0.0; longest];
    let mut d = vec![0.0; longest];
    let mut v = vec![0usize; longest];
    let mut z = vec![0.0; longest + 1];

    // Columns
    for x in 0..width {
        for y in 0..height {
            f[y] = grid[[y, x]];
        }
        squared_edt_1d(&f[..height], &mut d[..height], &mut v, &mut z);
        for y in 0..height {
            grid[[y, x]] = d[y];
        }
    }

    // Rows
    for y in 0..height {
        for x in 0..width {
            f[x] = grid[[y, x]];
        }
        squared_edt_1d(&f[..width], &mut d[..width], &mut v, &mut z);
        for x in 0..width {
            grid[[y, x]] = d[x];
        }
    }

    grid.mapv(|sq| {
        if sq >= FAR / 2.0 {
            f32::INFINITY
        } else {
            sq.sqrt() as f32
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 5), 1);
        assert_eq!(reflect_index(-2, 5), 2);
        assert_eq!(reflect_index(5, 5), 3);
        assert_eq!(reflect_index(6, 5), 2);
        assert_eq!(reflect_index(3, 5), 3);
        assert_eq!(reflect_index(-3, 1), 0);
        // Repeated reflection on a tiny axis
        assert_eq!(reflect_index(-3, 2), 1);
        assert_eq!(reflect_index(4, 2), 0);
    }

    #[test]
    fn test_kernel_rejects_even() {
        assert!(Kernel::from_array(Array2::zeros((2, 2))).is_err());
        assert!(Kernel::from_array(Array2::zeros((3, 5))).is_err());
        assert!(Kernel::box_filter(3).is_ok());
    }

    #[test]
    fn test_identity_kernel() {
        let plane = Array2::from_shape_fn((4, 5), |(y, x)| (y * 5 + x) as f32);
        let kernel = Kernel::from_rows([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]).unwrap();
        assert_eq!(convolve_plane(&plane, &kernel), plane);
    }

    #[test]
    fn test_convolution_is_correlation() {
        // Kernel picks the left neighbour
        let plane = Array2::from_shape_fn((1, 4), |(_, x)| x as f32);
        let kernel = Kernel::from_rows([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]]).unwrap();
        let out = convolve_plane(&plane, &kernel);
        assert_eq!(out[[0, 0]], 1.0); // reflected
        assert_eq!(out[[0, 1]], 0.0);
        assert_eq!(out[[0, 3]], 2.0);
    }

    #[test]
    fn test_box_filter_preserves_constant() {
        let plane = Array2::from_elem((6, 6), 80.0f32);
        let out = convolve_plane(&plane, &Kernel::box_filter(5).unwrap());
        for &v in out.iter() {
            assert_abs_diff_eq!(v, 80.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_roberts_embedding() {
        let k = Kernel::from_2x2([[1.0, 0.0], [0.0, -1.0]]);
        assert_eq!(k.size(), 3);
        assert_eq!(k.weights()[[0, 0]], 0.0);
        assert_eq!(k.weights()[[1, 1]], -1.0);
        assert_eq!(k.weights()[[2, 2]], 1.0);

        // Forward difference: in[y + 1, x + 1] - in[y, x]
        let plane = Array2::from_shape_fn((3, 3), |(y, x)| (y * 10 + x) as f32);
        let out = convolve_plane(&plane, &k);
        assert_eq!(out[[0, 0]], 11.0);
        assert_eq!(out[[1, 1]], 11.0);
    }

    #[test]
    fn test_gaussian_kernels_normalized() {
        for window in [1, 3, 5, 7, 9, 15, 31] {
            let k = gaussian_kernel(window).unwrap();
            let sum: f32 = k.weights().iter().sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-4);
        }
        assert!(gaussian_kernel(4).is_err());
    }

    #[test]
    fn test_gaussian_sigma() {
        assert_abs_diff_eq!(gaussian_sigma(5), 1.1, epsilon = 1e-6);
        assert_abs_diff_eq!(gaussian_sigma(3), 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_distance_transform_single_hole() {
        let mut mask = Array2::from_elem((5, 5), 255u8);
        mask[[2, 2]] = 0;
        let dist = distance_transform(&mask);
        assert_eq!(dist[[2, 2]], 0.0);
        assert_abs_diff_eq!(dist[[2, 4]], 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(dist[[0, 0]], 8.0f32.sqrt(), epsilon = 1e-5);
        assert_abs_diff_eq!(dist[[1, 3]], 2.0f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_distance_transform_no_background() {
        let mask = Array2::from_elem((3, 3), 1u8);
        assert!(distance_transform(&mask).iter().all(|d| d.is_infinite()));
    }
}
