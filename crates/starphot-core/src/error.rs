use serde::{Deserialize, Serialize};

use crate::grid::GridError;
use crate::median::MedianError;

/// Coarse grouping of failures, used by batch drivers to decide what to skip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Invalid configuration or input shape.
    Input,
    /// Image data could not be read.
    Io,
    /// Requested geometry does not fit the supplied grid.
    Geometry,
    /// Measurement is numerically undefined.
    Numeric,
}

/// Errors returned by the photometry pipeline for a single grid.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PhotometryError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("invalid photometry parameters: {0}")]
    InvalidParams(String),
    #[error("invalid aperture radius {radius}")]
    InvalidRadius { radius: f64 },
    #[error("box too small (needs radius {required}, boxdims/2={half_box})")]
    BoxTooSmall { required: f64, half_box: usize },
    #[error("no pixels fully inside sky annulus (inner={inner}, outer={outer})")]
    EmptyAnnulus { inner: f64, outer: f64 },
    #[error("no pixel above threshold {threshold}")]
    NoSourceDetected { threshold: f64 },
    #[error("non-positive net flux {net_flux} at radius {radius}")]
    NonPositiveFlux { radius: f64, net_flux: f64 },
    #[error("sky background: {0}")]
    Median(#[from] MedianError),
}

impl PhotometryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PhotometryError::Grid(_)
            | PhotometryError::InvalidParams(_)
            | PhotometryError::InvalidRadius { .. } => ErrorCategory::Input,
            PhotometryError::BoxTooSmall { .. } | PhotometryError::EmptyAnnulus { .. } => {
                ErrorCategory::Geometry
            }
            PhotometryError::NoSourceDetected { .. }
            | PhotometryError::NonPositiveFlux { .. }
            | PhotometryError::Median(_) => ErrorCategory::Numeric,
        }
    }
}
