//! Distance from grid cells to a sub-pixel center.
//!
//! Both the sky annulus and the aperture masks go through [`cell_distance`],
//! so a pixel is always classified against the same geometry.

use nalgebra::Point2;

use crate::grid::PixelGridView;

/// Euclidean distance between local cell `(col, row)`, translated into
/// absolute image coordinates, and `center`.
#[inline]
pub fn cell_distance(grid: &PixelGridView<'_>, col: usize, row: usize, center: Point2<f64>) -> f64 {
    nalgebra::distance(&grid.cell_position(col, row), &center)
}

/// Visit every cell with its raw value and distance to `center`.
pub(crate) fn for_each_cell_distance(
    grid: &PixelGridView<'_>,
    center: Point2<f64>,
    mut f: impl FnMut(f64, f64),
) {
    for (col, row, value) in grid.cells() {
        f(value, cell_distance(grid, col, row, center));
    }
}
