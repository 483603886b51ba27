//! Threshold centroiding.
//!
//! The grid is binarised with a strict `value > threshold` test and the
//! center is taken from the row and column marginals of that mask. Pixel
//! intensities above the threshold do not weight the result.

use nalgebra::Point2;

use crate::error::PhotometryError;
use crate::grid::PixelGridView;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Binary mask marginals of a thresholded grid.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskMarginals {
    /// Set pixels per column.
    pub col_counts: Vec<usize>,
    /// Set pixels per row.
    pub row_counts: Vec<usize>,
    pub total: usize,
}

impl MaskMarginals {
    pub fn from_grid(grid: &PixelGridView<'_>, threshold: f64) -> Self {
        let n = grid.boxdims();
        let mut col_counts = vec![0usize; n];
        let mut row_counts = vec![0usize; n];
        let mut total = 0usize;
        for (col, row, value) in grid.cells() {
            if value > threshold {
                col_counts[col] += 1;
                row_counts[row] += 1;
                total += 1;
            }
        }
        Self {
            col_counts,
            row_counts,
            total,
        }
    }

    /// Local (grid-relative) centroid, `None` for an empty mask.
    pub fn local_centroid(&self) -> Option<Point2<f64>> {
        if self.total == 0 {
            return None;
        }
        let bx = weighted_index_sum(&self.col_counts);
        let by = weighted_index_sum(&self.row_counts);
        let n = self.total as f64;
        Some(Point2::new(bx / n, by / n))
    }
}

fn weighted_index_sum(counts: &[usize]) -> f64 {
    counts
        .iter()
        .enumerate()
        .map(|(idx, &c)| (idx * c) as f64)
        .sum()
}

/// Centroid of all pixels strictly above `threshold`, in absolute image
/// coordinates.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(grid), fields(boxdims = grid.boxdims()))
)]
pub fn threshold_centroid(
    grid: &PixelGridView<'_>,
    threshold: f64,
) -> Result<Point2<f64>, PhotometryError> {
    let marginals = MaskMarginals::from_grid(grid, threshold);
    let local = marginals
        .local_centroid()
        .ok_or(PhotometryError::NoSourceDetected { threshold })?;

    let half = grid.half_box() as f64;
    let center = Point2::new(
        local.x + grid.anchor().xpos as f64 - half,
        local.y + grid.anchor().ypos as f64 - half,
    );
    log::debug!(
        "centroid ({:.4}, {:.4}) from {} mask pixels",
        center.x,
        center.y,
        marginals.total
    );
    Ok(center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridAnchor, PixelGrid};
    use approx::assert_relative_eq;

    fn block_grid(
        boxdims: usize,
        anchor: GridAnchor,
        cols: std::ops::Range<usize>,
        rows: std::ops::Range<usize>,
    ) -> PixelGrid {
        PixelGrid::from_fn(boxdims, anchor, |c, r| {
            if cols.contains(&c) && rows.contains(&r) {
                1000.0
            } else {
                0.0
            }
        })
        .expect("grid")
    }

    #[test]
    fn symmetric_block_maps_to_anchor() {
        let grid = block_grid(50, GridAnchor::new(100, 100), 23..28, 23..28);
        let c = threshold_centroid(&grid.view(), 660.0).expect("centroid");
        assert_eq!((c.x, c.y), (100.0, 100.0));
    }

    #[test]
    fn columns_drive_x_and_rows_drive_y() {
        // 2 columns wide, 6 rows tall, off-center in opposite directions
        let grid = block_grid(20, GridAnchor::new(0, 0), 3..5, 12..18);
        let c = threshold_centroid(&grid.view(), 0.5).expect("centroid");
        assert_relative_eq!(c.x, 3.5 - 10.0);
        assert_relative_eq!(c.y, 14.5 - 10.0);

        let marginals = MaskMarginals::from_grid(&grid.view(), 0.5);
        assert_eq!(marginals.total, 12);
        assert_eq!(marginals.col_counts[3], 6);
        assert_eq!(marginals.row_counts[12], 2);
    }

    #[test]
    fn threshold_is_strict() {
        let grid = PixelGrid::from_fn(8, GridAnchor::new(4, 4), |c, r| {
            if (c, r) == (1, 2) {
                660.0
            } else if (c, r) == (6, 5) {
                660.5
            } else {
                0.0
            }
        })
        .expect("grid");
        let c = threshold_centroid(&grid.view(), 660.0).expect("centroid");
        assert_eq!((c.x, c.y), (6.0, 5.0));
    }

    #[test]
    fn empty_mask_is_no_source() {
        let grid = PixelGrid::zeros(16, GridAnchor::new(8, 8)).expect("grid");
        assert_eq!(
            threshold_centroid(&grid.view(), 660.0),
            Err(PhotometryError::NoSourceDetected { threshold: 660.0 })
        );
    }
}
