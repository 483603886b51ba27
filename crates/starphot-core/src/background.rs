//! Local sky level from a ring around the source.
//!
//! Only pixels whose centers lie at least half a pixel inside both ring edges
//! are sampled; straddling pixels are skipped rather than partially weighted.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::distance::for_each_cell_distance;
use crate::error::PhotometryError;
use crate::grid::PixelGridView;
use crate::median::median;
use crate::params::{check_box_fits, SkyAnnulus};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Median sky level measured in an annulus.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkyBackground {
    pub level: f64,
    pub annulus: SkyAnnulus,
    /// Number of pixels that entered the median.
    pub samples: usize,
}

/// Fail with `BoxTooSmall` unless the whole ring fits in the grid.
pub fn check_annulus_fits(
    grid: &PixelGridView<'_>,
    annulus: SkyAnnulus,
) -> Result<(), PhotometryError> {
    check_box_fits(grid.boxdims(), annulus.outer)
}

/// Raw values of the pixels fully enclosed by `annulus`.
pub fn annulus_samples(
    grid: &PixelGridView<'_>,
    center: Point2<f64>,
    annulus: SkyAnnulus,
) -> Vec<f64> {
    let lo = annulus.inner + 0.5;
    let hi = annulus.outer - 0.5;
    let mut samples = Vec::new();
    for_each_cell_distance(grid, center, |value, d| {
        if d > lo && d < hi {
            samples.push(value);
        }
    });
    samples
}

/// Median of the pixels inside `annulus` around `center`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(grid), fields(boxdims = grid.boxdims()))
)]
pub fn estimate_sky_background(
    grid: &PixelGridView<'_>,
    center: Point2<f64>,
    annulus: SkyAnnulus,
) -> Result<SkyBackground, PhotometryError> {
    check_annulus_fits(grid, annulus)?;

    let mut samples = annulus_samples(grid, center, annulus);
    if samples.is_empty() {
        return Err(PhotometryError::EmptyAnnulus {
            inner: annulus.inner,
            outer: annulus.outer,
        });
    }
    let level = median(&mut samples)?;
    log::debug!(
        "sky {:.2} from {} pixels in annulus [{}, {}]",
        level,
        samples.len(),
        annulus.inner,
        annulus.outer
    );

    Ok(SkyBackground {
        level,
        annulus,
        samples: samples.len(),
    })
}
