use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::aperture::{measure_aperture, PhotometryRecord};
use crate::background::{estimate_sky_background, SkyBackground};
use crate::centroid::threshold_centroid;
use crate::error::PhotometryError;
use crate::grid::PixelGridView;
use crate::params::{AnnulusMode, PhotometryParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Growth curve of one source in one grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowthCurve {
    pub centroid: Point2<f64>,
    /// Sky level of the first aperture. With a fixed annulus every record
    /// shares it.
    pub sky: SkyBackground,
    pub records: Vec<PhotometryRecord>,
}

/// Centroid, sky and multi-aperture photometry for a single point source.
#[derive(Clone, Debug)]
pub struct AperturePhotometer {
    params: PhotometryParams,
}

impl AperturePhotometer {
    pub fn new(params: PhotometryParams) -> Result<Self, PhotometryError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &PhotometryParams {
        &self.params
    }

    /// Measure the full growth curve.
    ///
    /// The widest annulus and the widest aperture are checked against the
    /// grid before any pixel is read, so a box that is too small fails
    /// without partial output.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, grid),
            fields(
                boxdims = grid.boxdims(),
                xpos = grid.anchor().xpos,
                ypos = grid.anchor().ypos
            )
        )
    )]
    pub fn measure(&self, grid: &PixelGridView<'_>) -> Result<GrowthCurve, PhotometryError> {
        let params = &self.params;
        params.check_box(grid.boxdims())?;

        let centroid = threshold_centroid(grid, params.threshold)?;

        let mut records = Vec::with_capacity(params.radii.len());
        let mut first_sky = None;
        let fixed_sky = match params.annulus.mode {
            AnnulusMode::Fixed { base_radius } => Some(estimate_sky_background(
                grid,
                centroid,
                params.annulus.around(base_radius),
            )?),
            AnnulusMode::PerAperture => None,
        };

        for &radius in &params.radii {
            let sky = match fixed_sky {
                Some(sky) => sky,
                None => estimate_sky_background(
                    grid,
                    centroid,
                    params.annulus.around(params.annulus.base_radius_for(radius)),
                )?,
            };
            first_sky.get_or_insert(sky);
            records.push(measure_aperture(
                grid,
                centroid,
                radius,
                sky.level,
                params.zero_point,
            )?);
        }

        let sky = first_sky.ok_or_else(|| {
            PhotometryError::InvalidParams("radius list is empty".to_string())
        })?;
        log::debug!(
            "growth curve with {} apertures at ({:.4}, {:.4})",
            records.len(),
            centroid.x,
            centroid.y
        );

        Ok(GrowthCurve {
            centroid,
            sky,
            records,
        })
    }
}
