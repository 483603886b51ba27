use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::distance::for_each_cell_distance;
use crate::error::PhotometryError;
use crate::grid::PixelGridView;
use crate::params::check_box_fits;

/// One point of a growth curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotometryRecord {
    pub radius: f64,
    pub centroid_x: f64,
    pub centroid_y: f64,
    /// Coverage-weighted sum of pixel values (S).
    pub raw_sum: f64,
    /// Effective number of pixels in the aperture (sum of weights).
    pub aperture_area: f64,
    /// Sky-subtracted flux (I).
    pub net_flux: f64,
    pub sky_background: f64,
    pub magnitude: f64,
}

/// Fraction of a pixel at distance `d` counted by an aperture of `radius`.
///
/// Pixels more than half a pixel inside the edge count fully, pixels more
/// than half a pixel outside are dropped, and the band in between ramps
/// linearly. A pixel exactly on the edge counts half.
#[inline]
pub fn coverage_weight(d: f64, radius: f64) -> f64 {
    if d == radius {
        0.5
    } else if d < radius - 0.5 {
        1.0
    } else if d > radius + 0.5 {
        0.0
    } else {
        radius + 0.5 - d
    }
}

/// Instrumental magnitude of a positive flux.
pub fn instrumental_magnitude(flux: f64, zero_point: f64) -> Option<f64> {
    (flux.is_finite() && flux > 0.0).then(|| -2.5 * flux.log10() + zero_point)
}

/// Integrate the aperture of `radius` around `center` and convert the
/// sky-subtracted flux to a magnitude.
pub fn measure_aperture(
    grid: &PixelGridView<'_>,
    center: Point2<f64>,
    radius: f64,
    sky: f64,
    zero_point: f64,
) -> Result<PhotometryRecord, PhotometryError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(PhotometryError::InvalidRadius { radius });
    }
    check_box_fits(grid.boxdims(), radius + 0.5)?;

    let mut area = 0.0;
    let mut raw_sum = 0.0;
    for_each_cell_distance(grid, center, |value, d| {
        let w = coverage_weight(d, radius);
        if w > 0.0 {
            area += w;
            raw_sum += w * value;
        }
    });

    let net_flux = raw_sum - sky * area;
    let magnitude = instrumental_magnitude(net_flux, zero_point)
        .ok_or(PhotometryError::NonPositiveFlux { radius, net_flux })?;

    Ok(PhotometryRecord {
        radius,
        centroid_x: center.x,
        centroid_y: center.y,
        raw_sum,
        aperture_area: area,
        net_flux,
        sky_background: sky,
        magnitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridAnchor, PixelGrid};
    use approx::assert_relative_eq;

    #[test]
    fn weight_boundaries() {
        let r = 3.0;
        assert_eq!(coverage_weight(r, r), 0.5);
        assert_eq!(coverage_weight(r - 0.5, r), 1.0);
        assert_eq!(coverage_weight(r + 0.5, r), 0.0);
        assert_eq!(coverage_weight(0.0, r), 1.0);
        assert_eq!(coverage_weight(10.0, r), 0.0);
    }

    #[test]
    fn weight_decreases_across_the_band() {
        let r = 4.0;
        let mut prev = coverage_weight(r - 0.5, r);
        for step in 1..=20 {
            let d = r - 0.5 + step as f64 * 0.05;
            if d == r {
                continue;
            }
            let w = coverage_weight(d, r);
            assert!(w < prev, "w({d}) = {w} not below {prev}");
            assert!((0.0..=1.0).contains(&w));
            prev = w;
        }
    }

    #[test]
    fn single_bright_pixel_on_center() {
        let grid = PixelGrid::from_fn(10, GridAnchor::new(5, 5), |c, r| {
            if (c, r) == (5, 5) {
                1000.0
            } else {
                0.0
            }
        })
        .expect("grid");
        let rec = measure_aperture(&grid.view(), Point2::new(5.0, 5.0), 1.0, 0.0, 24.0)
            .expect("record");
        // edge neighbours count half, diagonals fall in the partial band
        assert_eq!(rec.raw_sum, 1000.0);
        let diagonal = 1.5 - 2.0_f64.sqrt();
        assert_relative_eq!(rec.aperture_area, 1.0 + 4.0 * 0.5 + 4.0 * diagonal);
        assert_relative_eq!(rec.magnitude, 24.0 - 2.5 * 3.0);
    }

    #[test]
    fn sky_is_subtracted_per_effective_pixel() {
        let grid = PixelGrid::from_fn(10, GridAnchor::new(5, 5), |c, r| {
            if (c, r) == (5, 5) {
                110.0
            } else {
                10.0
            }
        })
        .expect("grid");
        let rec = measure_aperture(&grid.view(), Point2::new(5.0, 5.0), 1.0, 10.0, 24.0)
            .expect("record");
        assert_relative_eq!(rec.net_flux, 100.0, epsilon = 1e-9);
        assert_relative_eq!(rec.magnitude, 19.0, epsilon = 1e-9);
    }

    #[test]
    fn non_positive_flux_is_an_error() {
        let grid = PixelGrid::zeros(10, GridAnchor::new(5, 5)).expect("grid");
        let err = measure_aperture(&grid.view(), Point2::new(5.0, 5.0), 2.0, 0.0, 24.0)
            .unwrap_err();
        assert_eq!(
            err,
            PhotometryError::NonPositiveFlux {
                radius: 2.0,
                net_flux: 0.0
            }
        );
        let err = measure_aperture(&grid.view(), Point2::new(5.0, 5.0), 2.0, 1.0, 24.0)
            .unwrap_err();
        assert!(matches!(err, PhotometryError::NonPositiveFlux { .. }));
    }

    #[test]
    fn aperture_larger_than_the_box_is_rejected() {
        let grid = PixelGrid::from_fn(50, GridAnchor::new(100, 100), |_, _| 5.0).expect("grid");
        assert_eq!(
            measure_aperture(&grid.view(), Point2::new(100.0, 100.0), 40.0, 0.0, 24.0),
            Err(PhotometryError::BoxTooSmall {
                required: 40.5,
                half_box: 25
            })
        );
        assert!(
            measure_aperture(&grid.view(), Point2::new(100.0, 100.0), 24.5, 0.0, 24.0).is_ok()
        );
    }

    #[test]
    fn rejects_non_positive_radius() {
        let grid = PixelGrid::zeros(10, GridAnchor::new(5, 5)).expect("grid");
        assert_eq!(
            measure_aperture(&grid.view(), Point2::new(5.0, 5.0), -1.0, 0.0, 24.0),
            Err(PhotometryError::InvalidRadius { radius: -1.0 })
        );
    }
}
