//! Run the photometer over many files and slices.
//!
//! A failure is scoped to the smallest unit it affects: a file that cannot be
//! read is skipped as a whole, a slice whose geometry or numbers do not work
//! out is skipped on its own. Processing always continues with the next unit.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use starphot_core::{AperturePhotometer, ErrorCategory, GrowthCurve, PhotometryError, PixelGrid};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors recorded by the batch driver, tagged with where they happened.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("{file}: failed to read image data: {message}")]
    Load { file: String, message: String },
    #[error("{file} slice {slice}: {error}")]
    Slice {
        file: String,
        slice: usize,
        #[source]
        error: PhotometryError,
    },
}

impl BatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BatchError::Load { .. } => ErrorCategory::Io,
            BatchError::Slice { error, .. } => error.category(),
        }
    }

    pub fn file(&self) -> &str {
        match self {
            BatchError::Load { file, .. } | BatchError::Slice { file, .. } => file,
        }
    }

    /// Slice index, if the error is tied to one slice.
    pub fn slice(&self) -> Option<usize> {
        match self {
            BatchError::Load { .. } => None,
            BatchError::Slice { slice, .. } => Some(*slice),
        }
    }
}

/// Growth curve of one slice of one file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliceCurve {
    pub file: String,
    pub slice: usize,
    pub curve: GrowthCurve,
}

/// Results of a batch run in processing order.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<Result<SliceCurve, BatchError>>,
}

impl BatchReport {
    pub fn curves(&self) -> impl Iterator<Item = &SliceCurve> {
        self.entries.iter().filter_map(|e| e.as_ref().ok())
    }

    pub fn errors(&self) -> impl Iterator<Item = &BatchError> {
        self.entries.iter().filter_map(|e| e.as_ref().err())
    }

    pub fn num_failed(&self) -> usize {
        self.errors().count()
    }
}

/// Measure every slice of one file.
pub fn measure_slices(
    photometer: &AperturePhotometer,
    file: &str,
    slices: &[PixelGrid],
) -> Vec<Result<SliceCurve, BatchError>> {
    slices
        .iter()
        .enumerate()
        .map(|(slice, grid)| {
            log::debug!("{file}: measuring slice {slice}");
            photometer
                .measure(&grid.view())
                .map(|curve| SliceCurve {
                    file: file.to_string(),
                    slice,
                    curve,
                })
                .map_err(|error| {
                    log::warn!("{file} slice {slice}: {error}");
                    slice_error(file, slice, error)
                })
        })
        .collect()
}

/// Load each file with `load` and measure all of its slices.
///
/// `load` stands in for whatever reader turns a file into cutouts; it returns
/// one grid per slice.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(photometer, files, load), fields(files = files.len()))
)]
pub fn run_batch<S, F, E>(photometer: &AperturePhotometer, files: &[S], mut load: F) -> BatchReport
where
    S: AsRef<str>,
    F: FnMut(&str) -> Result<Vec<PixelGrid>, E>,
    E: Display,
{
    let mut report = BatchReport::default();
    for file in files {
        let file = file.as_ref();
        log::info!("processing {file}");
        match load(file) {
            Ok(slices) => report
                .entries
                .extend(measure_slices(photometer, file, &slices)),
            Err(err) => {
                log::warn!("{file}: {err}");
                report.entries.push(Err(BatchError::Load {
                    file: file.to_string(),
                    message: err.to_string(),
                }));
            }
        }
    }
    log::info!(
        "measured {} slices, {} failures",
        report.entries.len() - report.num_failed(),
        report.num_failed()
    );
    report
}

/// Wrap a core error with its file and slice.
pub fn slice_error(file: &str, slice: usize, error: PhotometryError) -> BatchError {
    BatchError::Slice {
        file: file.to_string(),
        slice,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starphot_core::{GridAnchor, PhotometryParams};

    fn block(value: f64) -> PixelGrid {
        PixelGrid::from_fn(50, GridAnchor::new(100, 100), |c, r| {
            if (23..28).contains(&c) && (23..28).contains(&r) {
                value
            } else {
                0.0
            }
        })
        .expect("grid")
    }

    #[test]
    fn failing_slice_does_not_stop_the_file() {
        let photometer = AperturePhotometer::new(PhotometryParams::default()).expect("params");
        let slices = vec![block(1000.0), block(10.0), block(2000.0)];
        let out = measure_slices(&photometer, "cube.fits", &slices);
        assert_eq!(out.len(), 3);
        assert!(out[0].is_ok());
        let err = out[1].as_ref().unwrap_err();
        assert_eq!(err.slice(), Some(1));
        assert_eq!(err.category(), ErrorCategory::Numeric);
        assert!(err.to_string().starts_with("cube.fits slice 1:"));
        assert_eq!(out[2].as_ref().expect("slice 2").slice, 2);
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let photometer = AperturePhotometer::new(PhotometryParams::default()).expect("params");
        let files = ["a.png", "missing.png", "b.png"];
        let report = run_batch(&photometer, &files, |f| {
            if f == "missing.png" {
                Err(format!("no such file: {f}"))
            } else {
                Ok(vec![block(1000.0)])
            }
        });
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.curves().count(), 2);
        let err = report.errors().next().expect("one error");
        assert_eq!(err.file(), "missing.png");
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.slice(), None);
    }
}
