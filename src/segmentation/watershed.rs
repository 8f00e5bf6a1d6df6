//! Marker-controlled watershed.
//!
//! Markers come from the image itself:
//! 1. Otsu split, inverted (dark pixels are foreground)
//! 2. Opening (2 passes) removes specks
//! 3. Dilating the opened mask (3 passes) gives the sure background
//! 4. Distance to background above 70% of its maximum gives the sure
//!    foreground
//! 5. Sure background minus sure foreground is the unknown band
//! 6. Foreground components become labels 2, 3, ...; the rest of the image
//!    is label 1 and the unknown band is 0
//!
//! Then the unknown band is flooded from the markers in ascending gray
//! order. A pixel whose labelled neighbours disagree becomes a boundary
//! (-1).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ndarray::{Array2, Zip};
use tracing::debug;

use super::label::connected_components;
use crate::filters::core::distance_transform;
use crate::filters::levels_curves::otsu_threshold;
use crate::filters::morphology::{dilate, open};
use crate::image::ImageMatrix;

/// Label of pixels where two floods meet.
pub const BOUNDARY: i32 = -1;

/// Color painted on boundary pixels.
pub const BOUNDARY_COLOR: [u8; 3] = [255, 0, 0];

const IN_QUEUE: i32 = -2;
const OPEN_ITERATIONS: usize = 2;
const BACKGROUND_ITERATIONS: usize = 3;
const FOREGROUND_FRACTION: f32 = 0.7;

const NEIGHBORS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[inline]
fn neighbors(y: usize, x: usize, rows: usize, cols: usize) -> impl Iterator<Item = (usize, usize)> {
    NEIGHBORS_4.into_iter().filter_map(move |(dy, dx)| {
        let ny = y as isize + dy;
        let nx = x as isize + dx;
        if ny < 0 || nx < 0 || ny >= rows as isize || nx >= cols as isize {
            None
        } else {
            Some((ny as usize, nx as usize))
        }
    })
}

// ============================================================================
// Markers
// ============================================================================

/// Initial marker map: 1 = background, 2.. = objects, 0 = unknown.
fn initial_markers(gray: &Array2<u8>) -> Array2<i32> {
    let t = otsu_threshold(gray);
    let binary = gray.mapv(|v| if v > t { 0 } else { 255 });
    let opening = open(&binary, OPEN_ITERATIONS);
    let sure_bg = dilate(&opening, BACKGROUND_ITERATIONS);

    let dist = distance_transform(&opening);
    let max = dist.iter().copied().fold(0.0f32, f32::max);
    let sure_fg = if max.is_infinite() {
        // No background anywhere: all of the opened mask is certain
        opening.clone()
    } else {
        let cut = FOREGROUND_FRACTION * max;
        dist.mapv(|d| if d > cut { 255u8 } else { 0 })
    };

    let (labels, count) = connected_components(&sure_fg);
    debug!(otsu = t, components = count, "watershed markers");

    let mut markers = labels.mapv(|l| l + 1);
    Zip::from(&mut markers)
        .and(&sure_bg)
        .and(&sure_fg)
        .for_each(|m, &bg, &fg| {
            if bg.saturating_sub(fg) == 255 {
                *m = 0;
            }
        });
    markers
}

// ============================================================================
// Flooding
// ============================================================================

/// Flood unlabelled (0) pixels from their labelled neighbours.
///
/// Pixels are processed lowest gray value first, first in first out
/// within a level. Each pixel takes the label shared by its labelled
/// 4-neighbours, or [`BOUNDARY`] when they disagree; boundaries do not
/// spread further.
fn flood(gray: &Array2<u8>, markers: &mut Array2<i32>) {
    let (rows, cols) = markers.dim();
    let mut queue = BinaryHeap::new();
    let mut seq = 0u64;

    for y in 0..rows {
        for x in 0..cols {
            if markers[[y, x]] != 0 {
                continue;
            }
            if neighbors(y, x, rows, cols).any(|(ny, nx)| markers[[ny, nx]] > 0) {
                markers[[y, x]] = IN_QUEUE;
                queue.push(Reverse((gray[[y, x]], seq, y, x)));
                seq += 1;
            }
        }
    }

    while let Some(Reverse((_, _, y, x))) = queue.pop() {
        let mut label = 0;
        for (ny, nx) in neighbors(y, x, rows, cols) {
            let n = markers[[ny, nx]];
            if n <= 0 {
                continue;
            }
            if label == 0 {
                label = n;
            } else if label != n {
                label = BOUNDARY;
            }
        }
        markers[[y, x]] = label;
        if label == BOUNDARY {
            continue;
        }

        for (ny, nx) in neighbors(y, x, rows, cols) {
            if markers[[ny, nx]] == 0 {
                markers[[ny, nx]] = IN_QUEUE;
                queue.push(Reverse((gray[[ny, nx]], seq, ny, nx)));
                seq += 1;
            }
        }
    }
}

/// Watershed label map of the image.
///
/// # Returns
/// One label per pixel: 1 for the background basin, 2 and up for object
/// basins, [`BOUNDARY`] where basins meet. Pixels no flood reaches keep 0.
pub fn watershed_markers(image: &ImageMatrix) -> Array2<i32> {
    let gray = image.gray_plane();
    let mut markers = initial_markers(&gray);
    flood(&gray, &mut markers);
    markers
}

/// Watershed boundaries painted red over an RGB copy of the image.
pub fn watershed(image: &ImageMatrix) -> ImageMatrix {
    let markers = watershed_markers(image);
    let mut data = image.to_rgb().into_array();
    let mut painted = 0usize;
    for ((y, x), &label) in markers.indexed_iter() {
        if label == BOUNDARY {
            for (c, &v) in BOUNDARY_COLOR.iter().enumerate() {
                data[[y, x, c]] = v;
            }
            painted += 1;
        }
    }
    debug!(boundary_pixels = painted, "watershed");
    ImageMatrix::from_array_unchecked(data)
}
