//! Color-space conversions: HSV, CMY, YUV, YIQ, Pseudocolor.
//!
//! Every conversion writes the three target components into the three
//! channels of an 8-bit image so it can be displayed directly.
//!
//! ## Supported Formats
//!
//! - **Grayscale (1 channel)**: replicated to RGB first (pseudocolor
//!   uses the luminance plane directly)
//! - **RGB (3 channels)**: converted as-is
//!
//! All outputs are (height, width, 3).

use ndarray::Array3;

use crate::image::{clip_to_u8, ImageMatrix};

// ============================================================================
// Pixel Conversion Utilities
// ============================================================================

/// RGB to 8-bit HSV: H in [0, 180), S and V in [0, 255].
#[inline]
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    // 360 degrees wraps back to 0 after halving
    let h = (h / 2.0).round() as u32 % 180;
    (h as u8, s.round() as u8, max as u8)
}

/// RGB to YUV with chroma offset to 128.
#[inline]
fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let y = 0.299 * rf + 0.587 * gf + 0.114 * bf;
    let u = (bf - y) * 0.492 + 128.0;
    let v = (rf - y) * 0.877 + 128.0;
    (
        y.round().clamp(0.0, 255.0) as u8,
        u.round().clamp(0.0, 255.0) as u8,
        v.round().clamp(0.0, 255.0) as u8,
    )
}

/// NTSC RGB to YIQ transform.
const YIQ: [[f32; 3]; 3] = [
    [0.299, 0.587, 0.114],
    [0.596, -0.275, -0.321],
    [0.212, -0.523, 0.311],
];

/// Jet ramp (blue, cyan, green, yellow, red) for `t` in [0, 1].
#[inline]
fn jet(t: f32) -> (u8, u8, u8) {
    let ramp = |offset: f32| (1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0) * 255.0;
    (
        ramp(3.0).round() as u8,
        ramp(2.0).round() as u8,
        ramp(1.0).round() as u8,
    )
}

/// Apply a per-pixel RGB mapping to a color copy of `image`.
fn map_rgb<F>(image: &ImageMatrix, f: F) -> ImageMatrix
where
    F: Fn(u8, u8, u8) -> (u8, u8, u8),
{
    let rgb = image.to_rgb();
    let input = rgb.view();
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 3));

    for y in 0..height {
        for x in 0..width {
            let (a, b, c) = f(input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]);
            output[[y, x, 0]] = a;
            output[[y, x, 1]] = b;
            output[[y, x, 2]] = c;
        }
    }

    ImageMatrix::from_array_unchecked(output)
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert to HSV (8-bit convention, hue halved to fit [0, 180)).
pub fn to_hsv(image: &ImageMatrix) -> ImageMatrix {
    map_rgb(image, rgb_to_hsv)
}

/// Convert to CMY: each component is `255 - v`.
pub fn to_cmy(image: &ImageMatrix) -> ImageMatrix {
    map_rgb(image, |r, g, b| (255 - r, 255 - g, 255 - b))
}

/// Convert to YUV (luma plus chroma centered at 128).
pub fn to_yuv(image: &ImageMatrix) -> ImageMatrix {
    map_rgb(image, rgb_to_yuv)
}

/// Convert to YIQ.
///
/// Components are computed on normalized RGB, rescaled to 0-255 and
/// clipped, so negative I/Q values saturate at 0.
pub fn to_yiq(image: &ImageMatrix) -> ImageMatrix {
    map_rgb(image, |r, g, b| {
        let rgb = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
        let component = |row: &[f32; 3]| {
            clip_to_u8((row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]) * 255.0)
        };
        (component(&YIQ[0]), component(&YIQ[1]), component(&YIQ[2]))
    })
}

/// Map luminance through the jet ramp.
///
/// # Returns
/// RGB image: dark input is blue, bright input is red
pub fn pseudocolor(image: &ImageMatrix) -> ImageMatrix {
    let gray = image.gray_plane();
    let (height, width) = gray.dim();
    let mut output = Array3::<u8>::zeros((height, width, 3));

    for y in 0..height {
        for x in 0..width {
            let (r, g, b) = jet(gray[[y, x]] as f32 / 255.0);
            output[[y, x, 0]] = r;
            output[[y, x, 1]] = g;
            output[[y, x, 2]] = b;
        }
    }

    ImageMatrix::from_array_unchecked(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: u8, g: u8, b: u8) -> ImageMatrix {
        ImageMatrix::from_raw(1, 1, 3, vec![r, g, b]).unwrap()
    }

    fn rgb_at(img: &ImageMatrix) -> (u8, u8, u8) {
        (img.get(0, 0, 0), img.get(0, 0, 1), img.get(0, 0, 2))
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), (0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), (60, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), (120, 255, 255));
    }

    #[test]
    fn test_hsv_gray_has_no_saturation() {
        assert_eq!(rgb_to_hsv(128, 128, 128), (0, 0, 128));
        assert_eq!(rgb_to_hsv(0, 0, 0), (0, 0, 0));
    }

    #[test]
    fn test_hsv_hue_stays_below_180() {
        // Hue just under 360 degrees rounds up and must wrap
        let (h, _, _) = rgb_to_hsv(255, 0, 1);
        assert!(h < 180);
    }

    #[test]
    fn test_cmy_inverts() {
        let result = to_cmy(&pixel(255, 100, 0));
        assert_eq!(rgb_at(&result), (0, 155, 255));
    }

    #[test]
    fn test_yuv_gray_has_neutral_chroma() {
        let result = to_yuv(&pixel(90, 90, 90));
        assert_eq!(rgb_at(&result), (90, 128, 128));
    }

    #[test]
    fn test_yiq_white() {
        let result = to_yiq(&pixel(255, 255, 255));
        // I and Q rows sum to 0, Y row sums to 1
        let (y, i, q) = rgb_at(&result);
        assert!(y >= 254);
        assert!(i <= 1);
        assert!(q <= 1);
    }

    #[test]
    fn test_gray_input_becomes_rgb() {
        let gray = ImageMatrix::filled(2, 2, 1, 50).unwrap();
        assert_eq!(to_hsv(&gray).channels(), 3);
        assert_eq!(to_cmy(&gray).get(1, 1, 2), 205);
    }

    #[test]
    fn test_pseudocolor_ends() {
        let img = ImageMatrix::from_gray_fn(1, 2, |_, x| if x == 0 { 0 } else { 255 }).unwrap();
        let result = pseudocolor(&img);
        // black maps to dark blue, white to dark red
        assert_eq!(result.get(0, 0, 0), 0);
        assert!(result.get(0, 0, 2) >= 127);
        assert!(result.get(0, 1, 0) >= 127);
        assert_eq!(result.get(0, 1, 2), 0);
    }
}
