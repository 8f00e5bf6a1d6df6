//! Connected-component labeling of binary planes.

use ndarray::Array2;

const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Label the 8-connected non-zero components of `plane`.
///
/// Components are numbered 1, 2, ... in raster order of their first
/// pixel; zero pixels get label 0.
///
/// # Returns
/// `(labels, component_count)`
pub fn connected_components(plane: &Array2<u8>) -> (Array2<i32>, i32) {
    let (rows, cols) = plane.dim();
    let mut labels = Array2::<i32>::zeros((rows, cols));
    let mut count = 0;

    for i in 0..rows {
        for j in 0..cols {
            if plane[[i, j]] == 0 || labels[[i, j]] != 0 {
                continue;
            }
            count += 1;
            labels[[i, j]] = count;
            let mut stack = vec![(i, j)];

            while let Some((y, x)) = stack.pop() {
                for (dy, dx) in NEIGHBORS_8 {
                    let ny = y as isize + dy;
                    let nx = x as isize + dx;
                    if ny < 0 || nx < 0 || ny >= rows as isize || nx >= cols as isize {
                        continue;
                    }
                    let (ny, nx) = (ny as usize, nx as usize);
                    if plane[[ny, nx]] != 0 && labels[[ny, nx]] == 0 {
                        labels[[ny, nx]] = count;
                        stack.push((ny, nx));
                    }
                }
            }
        }
    }

    (labels, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_two_components() {
        let plane = array![
            [255u8, 255, 0, 0],
            [255, 0, 0, 255],
            [0, 0, 0, 255],
        ];
        let (labels, count) = connected_components(&plane);
        assert_eq!(count, 2);
        assert_eq!(labels[[0, 0]], 1);
        assert_eq!(labels[[1, 0]], 1);
        assert_eq!(labels[[1, 3]], 2);
        assert_eq!(labels[[2, 3]], 2);
        assert_eq!(labels[[0, 2]], 0);
    }

    #[test]
    fn test_diagonal_is_connected() {
        let plane = array![[1u8, 0], [0, 1]];
        let (labels, count) = connected_components(&plane);
        assert_eq!(count, 1);
        assert_eq!(labels[[1, 1]], 1);
    }

    #[test]
    fn test_empty_plane() {
        let (labels, count) = connected_components(&Array2::zeros((3, 3)));
        assert_eq!(count, 0);
        assert!(labels.iter().all(|&l| l == 0));
    }
}
