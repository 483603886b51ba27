//! Point-source photometry on square image cutouts.
//!
//! The crate works on a [`PixelGrid`] that some image reader has already cut
//! out around a star. It has no knowledge of file formats.
//!
//! Pipeline for one grid:
//! 1. Threshold centroid from the row/column marginals of a binary mask.
//! 2. Sky level as the median of pixels fully inside an annulus.
//! 3. For every aperture radius, a coverage-weighted flux sum, sky
//!    subtraction and conversion to an instrumental magnitude.
//!
//! ```
//! use starphot_core::{AperturePhotometer, GridAnchor, PhotometryParams, PixelGrid};
//!
//! let grid = PixelGrid::from_fn(50, GridAnchor::new(100, 100), |c, r| {
//!     if (23..28).contains(&c) && (23..28).contains(&r) { 1000.0 } else { 0.0 }
//! })?;
//! let photometer = AperturePhotometer::new(PhotometryParams::default())?;
//! let curve = photometer.measure(&grid.view())?;
//! assert_eq!((curve.centroid.x, curve.centroid.y), (100.0, 100.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod aperture;
mod background;
mod centroid;
mod distance;
mod error;
mod grid;
mod logger;
mod median;
mod params;
mod pipeline;

pub use aperture::{coverage_weight, instrumental_magnitude, measure_aperture, PhotometryRecord};
pub use background::{annulus_samples, check_annulus_fits, estimate_sky_background, SkyBackground};
pub use centroid::{threshold_centroid, MaskMarginals};
pub use distance::cell_distance;
pub use error::{ErrorCategory, PhotometryError};
pub use grid::{GridAnchor, GridError, PixelGrid, PixelGridView};
pub use median::{median, MedianError};
pub use params::{check_box_fits, AnnulusMode, AnnulusParams, PhotometryParams, SkyAnnulus};
pub use pipeline::{AperturePhotometer, GrowthCurve};

pub use nalgebra::Point2;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init, init_from_env, LogFilter, LogFilterError, LOG_ENV};
