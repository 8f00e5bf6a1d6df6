//! The shared image buffer.
//!
//! `ImageMatrix` is a dense `(height, width, channels)` array of 8-bit
//! samples with 1 (grayscale) or 3 (RGB) channels. Arithmetic runs on a
//! floating-point working copy (`Array3<f32>`, values on the 0-255 scale)
//! so intermediate results are never clipped early; converting back always
//! clips to [0, 255] and truncates.
//!
//! Width and height never change for a given buffer. Operations that
//! resize, crop or rotate return a new `ImageMatrix`.

use ndarray::{s, Array2, Array3, ArrayView3};

use crate::error::{EngineError, EngineResult};
use crate::filters::grayscale;

/// Clip a working-representation sample to the 8-bit range.
#[inline]
pub fn clip_to_u8(v: f32) -> u8 {
    // NaN casts to 0
    v.clamp(0.0, 255.0) as u8
}

/// 8-bit image buffer with 1 or 3 channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMatrix {
    data: Array3<u8>,
}

impl ImageMatrix {
    /// Create a black image.
    pub fn new(height: usize, width: usize, channels: usize) -> EngineResult<Self> {
        Self::filled(height, width, channels, 0)
    }

    /// Create an image with every sample set to `value`.
    pub fn filled(height: usize, width: usize, channels: usize, value: u8) -> EngineResult<Self> {
        check_shape(height, width, channels)?;
        Ok(ImageMatrix {
            data: Array3::from_elem((height, width, channels), value),
        })
    }

    /// Wrap an existing array.
    ///
    /// A 4-channel (RGBA) array is accepted and its alpha channel dropped.
    pub fn from_array(data: Array3<u8>) -> EngineResult<Self> {
        let (height, width, channels) = data.dim();
        if channels == 4 {
            check_shape(height, width, 3)?;
            return Ok(ImageMatrix {
                data: data.slice(s![.., .., 0..3]).to_owned(),
            });
        }
        check_shape(height, width, channels)?;
        Ok(ImageMatrix { data })
    }

    /// Build an image from a flat, row-major, channel-interleaved buffer.
    pub fn from_raw(height: usize, width: usize, channels: usize, raw: Vec<u8>) -> EngineResult<Self> {
        let data = Array3::from_shape_vec((height, width, channels), raw).map_err(|e| {
            EngineError::domain(format!(
                "buffer does not match {height}x{width}x{channels}: {e}"
            ))
        })?;
        Self::from_array(data)
    }

    /// Build a single-channel image from a 2D plane.
    pub fn from_gray(plane: Array2<u8>) -> EngineResult<Self> {
        let (height, width) = plane.dim();
        check_shape(height, width, 1)?;
        Ok(ImageMatrix {
            data: plane.insert_axis(ndarray::Axis(2)),
        })
    }

    /// Build a single-channel image by evaluating `f(y, x)` for every pixel.
    pub fn from_gray_fn<F>(height: usize, width: usize, f: F) -> EngineResult<Self>
    where
        F: Fn(usize, usize) -> u8,
    {
        check_shape(height, width, 1)?;
        Ok(ImageMatrix {
            data: Array3::from_shape_fn((height, width, 1), |(y, x, _)| f(y, x)),
        })
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// `(height, width, channels)`
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn is_gray(&self) -> bool {
        self.channels() == 1
    }

    /// True when both images share width and height (channels may differ).
    pub fn same_size(&self, other: &ImageMatrix) -> bool {
        self.height() == other.height() && self.width() == other.width()
    }

    /// Sample at `(y, x, c)`.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn get(&self, y: usize, x: usize, c: usize) -> u8 {
        self.data[[y, x, c]]
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// Luminance as a 2D plane (BT.601 for color input).
    pub fn gray_plane(&self) -> Array2<u8> {
        if self.is_gray() {
            return self.data.slice(s![.., .., 0]).to_owned();
        }
        grayscale::luminance_plane(self.data.view())
    }

    /// Convert to single-channel grayscale. Grayscale input is copied.
    pub fn to_gray(&self) -> ImageMatrix {
        ImageMatrix {
            data: self.gray_plane().insert_axis(ndarray::Axis(2)),
        }
    }

    /// Convert to 3-channel RGB. RGB input is copied.
    pub fn to_rgb(&self) -> ImageMatrix {
        if !self.is_gray() {
            return self.clone();
        }
        let (height, width, _) = self.dim();
        ImageMatrix {
            data: Array3::from_shape_fn((height, width, 3), |(y, x, _)| self.data[[y, x, 0]]),
        }
    }

    /// Floating-point working copy on the 0-255 scale.
    pub fn to_working(&self) -> Array3<f32> {
        self.data.mapv(f32::from)
    }

    /// Grayscale working plane on the 0-255 scale.
    pub fn gray_working(&self) -> Array2<f32> {
        self.gray_plane().mapv(f32::from)
    }

    /// Clip and truncate a working array back to 8 bits.
    pub(crate) fn from_working(working: &Array3<f32>) -> ImageMatrix {
        debug_assert!(matches!(working.dim().2, 1 | 3));
        ImageMatrix {
            data: working.mapv(clip_to_u8),
        }
    }

    /// Clip and truncate a working plane into a single-channel image.
    pub(crate) fn from_gray_working(plane: &Array2<f32>) -> ImageMatrix {
        ImageMatrix {
            data: plane.mapv(clip_to_u8).insert_axis(ndarray::Axis(2)),
        }
    }

    /// Wrap an array whose shape is already known to be valid.
    pub(crate) fn from_array_unchecked(data: Array3<u8>) -> ImageMatrix {
        debug_assert!(matches!(data.dim().2, 1 | 3));
        ImageMatrix { data }
    }
}

fn check_shape(height: usize, width: usize, channels: usize) -> EngineResult<()> {
    if height == 0 || width == 0 {
        return Err(EngineError::domain(format!(
            "image must be at least 1x1, got {height}x{width}"
        )));
    }
    if channels != 1 && channels != 3 {
        return Err(EngineError::domain(format!(
            "image must have 1 or 3 channels, got {channels}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_bad_channels() {
        assert!(ImageMatrix::new(0, 4, 1).is_err());
        assert!(ImageMatrix::new(4, 4, 2).is_err());
        assert!(ImageMatrix::new(4, 4, 3).is_ok());
    }

    #[test]
    fn test_from_array_drops_alpha() {
        let mut data = Array3::<u8>::zeros((2, 2, 4));
        data[[0, 0, 0]] = 10;
        data[[0, 0, 3]] = 200;
        let img = ImageMatrix::from_array(data).unwrap();
        assert_eq!(img.channels(), 3);
        assert_eq!(img.get(0, 0, 0), 10);
    }

    #[test]
    fn test_from_raw_size_mismatch() {
        assert!(ImageMatrix::from_raw(2, 2, 1, vec![0; 3]).is_err());
        let img = ImageMatrix::from_raw(1, 2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.get(0, 1, 2), 6);
    }

    #[test]
    fn test_working_round_trip_clips() {
        let img = ImageMatrix::filled(2, 2, 1, 100).unwrap();
        let mut working = img.to_working();
        working[[0, 0, 0]] = 300.0;
        working[[0, 1, 0]] = -20.0;
        working[[1, 0, 0]] = 12.9;
        let back = ImageMatrix::from_working(&working);
        assert_eq!(back.get(0, 0, 0), 255);
        assert_eq!(back.get(0, 1, 0), 0);
        assert_eq!(back.get(1, 0, 0), 12);
        assert_eq!(back.get(1, 1, 0), 100);
    }

    #[test]
    fn test_gray_rgb_conversion() {
        let gray = ImageMatrix::from_gray_fn(2, 3, |y, x| (y * 3 + x) as u8).unwrap();
        let rgb = gray.to_rgb();
        assert_eq!(rgb.dim(), (2, 3, 3));
        assert_eq!(rgb.get(1, 2, 1), 5);
        assert_eq!(rgb.to_gray(), gray);
    }
}
