use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Errors raised while building a pixel grid.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid grid size (boxdims={boxdims})")]
    InvalidDimensions { boxdims: usize },
    #[error("invalid grid buffer length (expected {expected} pixels, got {got})")]
    BufferLength { expected: usize, got: usize },
}

/// Absolute image position of the grid center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridAnchor {
    pub xpos: i64,
    pub ypos: i64,
}

impl GridAnchor {
    pub fn new(xpos: i64, ypos: i64) -> Self {
        Self { xpos, ypos }
    }
}

/// Borrowed square cutout of intensities.
///
/// Only built through [`PixelGridView::new`] or [`PixelGrid::view`], so the
/// buffer always holds `boxdims * boxdims` pixels.
#[derive(Clone, Copy, Debug)]
pub struct PixelGridView<'a> {
    boxdims: usize,
    anchor: GridAnchor,
    data: &'a [f64], // row-major
}

/// Owned square cutout of intensities.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelGrid {
    boxdims: usize,
    anchor: GridAnchor,
    data: Vec<f64>,
}

fn check_shape(boxdims: usize, len: usize) -> Result<(), GridError> {
    if boxdims == 0 {
        return Err(GridError::InvalidDimensions { boxdims });
    }
    let Some(expected) = boxdims.checked_mul(boxdims) else {
        return Err(GridError::InvalidDimensions { boxdims });
    };
    if len != expected {
        return Err(GridError::BufferLength { expected, got: len });
    }
    Ok(())
}

impl PixelGrid {
    /// Build a grid from a row-major buffer of `boxdims * boxdims` pixels.
    pub fn new(boxdims: usize, anchor: GridAnchor, data: Vec<f64>) -> Result<Self, GridError> {
        check_shape(boxdims, data.len())?;
        Ok(Self {
            boxdims,
            anchor,
            data,
        })
    }

    /// Grid of zeros; mostly useful for synthetic data.
    pub fn zeros(boxdims: usize, anchor: GridAnchor) -> Result<Self, GridError> {
        let len = boxdims
            .checked_mul(boxdims)
            .ok_or(GridError::InvalidDimensions { boxdims })?;
        Self::new(boxdims, anchor, vec![0.0; len])
    }

    /// Build a grid by evaluating `f(col, row)` for every cell.
    pub fn from_fn(
        boxdims: usize,
        anchor: GridAnchor,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self, GridError> {
        let mut grid = Self::zeros(boxdims, anchor)?;
        for row in 0..boxdims {
            for col in 0..boxdims {
                grid.data[row * boxdims + col] = f(col, row);
            }
        }
        Ok(grid)
    }

    pub fn boxdims(&self) -> usize {
        self.boxdims
    }

    pub fn anchor(&self) -> GridAnchor {
        self.anchor
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable pixel access; `None` outside the grid.
    pub fn get_mut(&mut self, col: usize, row: usize) -> Option<&mut f64> {
        if col >= self.boxdims || row >= self.boxdims {
            return None;
        }
        self.data.get_mut(row * self.boxdims + col)
    }

    pub fn view(&self) -> PixelGridView<'_> {
        PixelGridView {
            boxdims: self.boxdims,
            anchor: self.anchor,
            data: &self.data,
        }
    }
}

impl<'a> PixelGridView<'a> {
    /// Wrap a borrowed row-major buffer, validating its shape.
    pub fn new(boxdims: usize, anchor: GridAnchor, data: &'a [f64]) -> Result<Self, GridError> {
        check_shape(boxdims, data.len())?;
        Ok(Self {
            boxdims,
            anchor,
            data,
        })
    }

    pub fn boxdims(&self) -> usize {
        self.boxdims
    }

    pub fn anchor(&self) -> GridAnchor {
        self.anchor
    }

    pub fn data(&self) -> &'a [f64] {
        self.data
    }

    /// Pixel value at local `(col, row)`; `None` outside the grid.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.boxdims || row >= self.boxdims {
            return None;
        }
        self.data.get(row * self.boxdims + col).copied()
    }

    /// Integer half-size used to translate local cells into image coordinates.
    #[inline]
    pub fn half_box(&self) -> usize {
        self.boxdims / 2
    }

    /// Absolute image coordinate of the local cell `(col, row)`.
    #[inline]
    pub fn cell_position(&self, col: usize, row: usize) -> Point2<f64> {
        let half = self.half_box() as f64;
        Point2::new(
            col as f64 + self.anchor.xpos as f64 - half,
            row as f64 + self.anchor.ypos as f64 - half,
        )
    }

    /// Iterate `(col, row, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + 'a {
        let boxdims = self.boxdims;
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, &v)| (idx % boxdims, idx / boxdims, v))
    }
}
