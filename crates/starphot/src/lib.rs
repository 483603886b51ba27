//! Facade crate for the `starphot` workspace.
//!
//! This crate provides:
//! - re-exports of the photometry engine in [`core`]
//! - a batch driver that keeps going when a file or slice fails
//! - JSON configuration and report types
//! - the fixed-column text table used by downstream tools
//! - (feature `image`) cutouts from decoded raster images
//!
//! ## Quickstart
//!
//! ```no_run
//! use starphot::{cutout, format, AperturePhotometer, GridAnchor, PhotometryParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grid = cutout::load_cutout("frame.png", GridAnchor::new(100, 101), 50)?;
//! let photometer = AperturePhotometer::new(PhotometryParams::default())?;
//! let curve = photometer.measure(&grid.view())?;
//! format::write_growth_curve(&mut std::io::stdout(), &curve)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `starphot::core`: grids, centroiding, sky background, aperture photometry.
//! - `starphot::batch`: multi-file, multi-slice driver with scoped failures.
//! - `starphot::io`: JSON config and report.
//! - `starphot::format`: text table output.
//! - `starphot::cutout` (feature `image`): grids from `image` buffers.

pub use starphot_core as core;

pub use starphot_core::{
    AperturePhotometer, ErrorCategory, GridAnchor, GrowthCurve, PhotometryError,
    PhotometryParams, PhotometryRecord, PixelGrid, PixelGridView,
};

pub mod batch;
pub mod format;
pub mod io;

#[cfg(feature = "image")]
pub mod cutout;
