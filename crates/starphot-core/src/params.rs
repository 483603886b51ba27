use serde::{Deserialize, Serialize};

use crate::error::PhotometryError;

/// Fail with `BoxTooSmall` unless a circle of radius `required` around the
/// grid center fits in a `boxdims` square.
pub fn check_box_fits(boxdims: usize, required: f64) -> Result<(), PhotometryError> {
    let half_box = boxdims / 2;
    if required > half_box as f64 {
        return Err(PhotometryError::BoxTooSmall { required, half_box });
    }
    Ok(())
}

/// How the sky annulus base radius is chosen for each aperture.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnulusMode {
    /// One annulus, built around `base_radius`, shared by the whole curve.
    Fixed { base_radius: f64 },
    /// The annulus is rebuilt around each aperture radius.
    PerAperture,
}

impl Default for AnnulusMode {
    fn default() -> Self {
        AnnulusMode::Fixed { base_radius: 0.0 }
    }
}

/// Sky annulus geometry relative to a base radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnulusParams {
    /// Gap between the base radius and the inner edge.
    pub inner_offset: f64,
    /// Radial width of the ring.
    pub width: f64,
    pub mode: AnnulusMode,
}

impl Default for AnnulusParams {
    fn default() -> Self {
        Self {
            inner_offset: 10.0,
            width: 15.0,
            mode: AnnulusMode::default(),
        }
    }
}

/// Inner and outer radius of a sky-sampling ring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkyAnnulus {
    pub inner: f64,
    pub outer: f64,
}

impl AnnulusParams {
    /// Ring built around an explicit base radius.
    pub fn around(&self, base_radius: f64) -> SkyAnnulus {
        let inner = base_radius + self.inner_offset;
        SkyAnnulus {
            inner,
            outer: inner + self.width,
        }
    }

    /// Base radius used when measuring the aperture of `radius`.
    pub fn base_radius_for(&self, radius: f64) -> f64 {
        match self.mode {
            AnnulusMode::Fixed { base_radius } => base_radius,
            AnnulusMode::PerAperture => radius,
        }
    }
}

/// Configuration for one growth-curve measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotometryParams {
    /// Pixels strictly above this value form the centroid mask.
    pub threshold: f64,
    /// Photometric zero point added to `-2.5 log10(flux)`.
    pub zero_point: f64,
    /// Aperture radii, measured in this order.
    pub radii: Vec<f64>,
    pub annulus: AnnulusParams,
}

impl Default for PhotometryParams {
    fn default() -> Self {
        Self {
            threshold: 660.0,
            zero_point: 24.0,
            radii: (1..=17).map(f64::from).collect(),
            annulus: AnnulusParams::default(),
        }
    }
}

impl PhotometryParams {
    /// Check the parameters independently of any grid.
    pub fn validate(&self) -> Result<(), PhotometryError> {
        if !self.threshold.is_finite() {
            return Err(PhotometryError::InvalidParams(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if !self.zero_point.is_finite() {
            return Err(PhotometryError::InvalidParams(format!(
                "zero point must be finite, got {}",
                self.zero_point
            )));
        }
        if self.radii.is_empty() {
            return Err(PhotometryError::InvalidParams(
                "radius list is empty".to_string(),
            ));
        }
        if let Some(&radius) = self.radii.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
            return Err(PhotometryError::InvalidRadius { radius });
        }
        let a = &self.annulus;
        if !(a.inner_offset.is_finite() && a.inner_offset >= 0.0) {
            return Err(PhotometryError::InvalidParams(format!(
                "annulus inner offset must be finite and non-negative, got {}",
                a.inner_offset
            )));
        }
        if !(a.width.is_finite() && a.width > 0.0) {
            return Err(PhotometryError::InvalidParams(format!(
                "annulus width must be finite and positive, got {}",
                a.width
            )));
        }
        if let AnnulusMode::Fixed { base_radius } = a.mode {
            if !(base_radius.is_finite() && base_radius >= 0.0) {
                return Err(PhotometryError::InvalidParams(format!(
                    "annulus base radius must be finite and non-negative, got {base_radius}"
                )));
            }
        }
        Ok(())
    }

    /// Outer edge of the largest aperture, including its half-pixel band.
    pub fn widest_aperture(&self) -> f64 {
        self.radii.iter().copied().fold(0.0, f64::max) + 0.5
    }

    /// Radius around the grid center that must lie inside the box: the
    /// widest annulus or the widest aperture, whichever reaches further.
    pub fn required_half_box(&self) -> f64 {
        self.widest_annulus().outer.max(self.widest_aperture())
    }

    /// Check that a `boxdims` grid holds every aperture and annulus.
    pub fn check_box(&self, boxdims: usize) -> Result<(), PhotometryError> {
        check_box_fits(boxdims, self.required_half_box())
    }

    /// Largest annulus the measurement will sample.
    pub fn widest_annulus(&self) -> SkyAnnulus {
        let base = match self.annulus.mode {
            AnnulusMode::Fixed { base_radius } => base_radius,
            AnnulusMode::PerAperture => self.radii.iter().copied().fold(0.0, f64::max),
        };
        self.annulus.around(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_fixed_zero_base_annulus() {
        let p = PhotometryParams::default();
        assert_eq!(p.radii.len(), 17);
        assert_eq!(p.radii[0], 1.0);
        assert_eq!(p.radii[16], 17.0);
        assert_eq!(
            p.widest_annulus(),
            SkyAnnulus {
                inner: 10.0,
                outer: 25.0
            }
        );
        assert_eq!(p.annulus.base_radius_for(9.0), 0.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn per_aperture_mode_tracks_the_largest_radius() {
        let p = PhotometryParams {
            radii: vec![2.0, 5.0, 3.0],
            annulus: AnnulusParams {
                mode: AnnulusMode::PerAperture,
                ..AnnulusParams::default()
            },
            ..PhotometryParams::default()
        };
        assert_eq!(p.annulus.base_radius_for(3.0), 3.0);
        assert_eq!(p.widest_annulus().outer, 30.0);
    }

    #[test]
    fn box_must_hold_the_widest_aperture_too() {
        let p = PhotometryParams {
            radii: vec![2.0, 40.0],
            ..PhotometryParams::default()
        };
        assert_eq!(p.widest_aperture(), 40.5);
        assert_eq!(p.required_half_box(), 40.5);
        assert_eq!(
            p.check_box(50),
            Err(PhotometryError::BoxTooSmall {
                required: 40.5,
                half_box: 25
            })
        );
        assert!(p.check_box(82).is_ok());
        assert!(PhotometryParams::default().check_box(50).is_ok());
        assert!(PhotometryParams::default().check_box(49).is_err());
    }

    #[test]
    fn rejects_bad_radii() {
        let mut p = PhotometryParams {
            radii: vec![1.0, 0.0],
            ..PhotometryParams::default()
        };
        assert_eq!(
            p.validate(),
            Err(PhotometryError::InvalidRadius { radius: 0.0 })
        );
        p.radii.clear();
        assert!(matches!(
            p.validate(),
            Err(PhotometryError::InvalidParams(_))
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let p: PhotometryParams =
            serde_json::from_str(r#"{"zero_point": 25.5, "annulus": {"mode": {"kind": "per_aperture"}}}"#)
                .expect("parse");
        assert_eq!(p.zero_point, 25.5);
        assert_eq!(p.threshold, 660.0);
        assert_eq!(p.annulus.mode, AnnulusMode::PerAperture);
        assert_eq!(p.annulus.width, 15.0);
    }
}
