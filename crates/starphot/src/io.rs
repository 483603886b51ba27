//! JSON configuration and report helpers for growth-curve runs.

use serde::{Deserialize, Serialize};
use starphot_core::{
    AnnulusParams, AperturePhotometer, ErrorCategory, GridAnchor, GrowthCurve, PhotometryError,
    PhotometryParams,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::batch::BatchReport;

#[derive(thiserror::Error, Debug)]
pub enum PhotometryIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for a batch of growth-curve measurements.
///
/// Every input file is cut out around the same `(xpos, ypos)` with the same
/// `boxsize`. Measurement settings left out of the file keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotometryConfig {
    /// Image files, processed in this order.
    pub inputs: Vec<String>,
    pub xpos: i64,
    pub ypos: i64,
    pub boxsize: usize,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub zero_point: Option<f64>,
    #[serde(default)]
    pub radii: Option<Vec<f64>>,
    #[serde(default)]
    pub annulus: Option<AnnulusParams>,
}

impl PhotometryConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PhotometryIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PhotometryIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("growth_curve_report.json"))
    }

    pub fn anchor(&self) -> GridAnchor {
        GridAnchor::new(self.xpos, self.ypos)
    }

    /// Measurement parameters, applying overrides from the config.
    pub fn build_params(&self) -> PhotometryParams {
        let mut params = PhotometryParams::default();
        if let Some(threshold) = self.threshold {
            params.threshold = threshold;
        }
        if let Some(zero_point) = self.zero_point {
            params.zero_point = zero_point;
        }
        if let Some(radii) = self.radii.clone() {
            params.radii = radii;
        }
        if let Some(annulus) = self.annulus {
            params.annulus = annulus;
        }
        params
    }

    /// Build the photometer, rejecting a box that cannot hold the widest
    /// aperture or annulus.
    pub fn build_photometer(&self) -> Result<AperturePhotometer, PhotometryError> {
        let params = self.build_params();
        params.check_box(self.boxsize)?;
        AperturePhotometer::new(params)
    }
}

/// Outcome of one slice as written to the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceReport {
    pub file: String,
    #[serde(default)]
    pub slice: Option<usize>,
    #[serde(default)]
    pub curve: Option<GrowthCurve>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub category: Option<ErrorCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotometryReport {
    pub config_path: String,
    pub params: PhotometryParams,
    pub slices: Vec<SliceReport>,
}

impl PhotometryReport {
    /// Build a report from a finished batch.
    pub fn new(config_path: &Path, params: &PhotometryParams, batch: &BatchReport) -> Self {
        let slices = batch
            .entries
            .iter()
            .map(|entry| match entry {
                Ok(sc) => SliceReport {
                    file: sc.file.clone(),
                    slice: Some(sc.slice),
                    curve: Some(sc.curve.clone()),
                    error: None,
                    category: None,
                },
                Err(err) => SliceReport {
                    file: err.file().to_string(),
                    slice: err.slice(),
                    curve: None,
                    error: Some(err.to_string()),
                    category: Some(err.category()),
                },
            })
            .collect();
        Self {
            config_path: config_path.to_string_lossy().into_owned(),
            params: params.clone(),
            slices,
        }
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PhotometryIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PhotometryIoError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starphot_core::AnnulusMode;

    const MINIMAL: &str = r#"{
        "inputs": ["frames/a.png", "frames/b.png"],
        "xpos": 100,
        "ypos": 101,
        "boxsize": 50
    }"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: PhotometryConfig = serde_json::from_str(MINIMAL).expect("parse");
        assert_eq!(cfg.anchor(), GridAnchor::new(100, 101));
        assert_eq!(cfg.build_params(), PhotometryParams::default());
        assert_eq!(cfg.output_path(), PathBuf::from("growth_curve_report.json"));
        assert!(cfg.build_photometer().is_ok());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg: PhotometryConfig = serde_json::from_str(
            r#"{
                "inputs": [], "xpos": 0, "ypos": 0, "boxsize": 100,
                "zero_point": 25.0, "radii": [2.0, 4.0],
                "annulus": {"mode": {"kind": "per_aperture"}}
            }"#,
        )
        .expect("parse");
        let params = cfg.build_params();
        assert_eq!(params.zero_point, 25.0);
        assert_eq!(params.radii, vec![2.0, 4.0]);
        assert_eq!(params.annulus.mode, AnnulusMode::PerAperture);
        assert_eq!(params.threshold, 660.0);
    }

    #[test]
    fn small_box_is_rejected_when_building() {
        let mut cfg: PhotometryConfig = serde_json::from_str(MINIMAL).expect("parse");
        cfg.boxsize = 40;
        assert!(matches!(
            cfg.build_photometer(),
            Err(PhotometryError::BoxTooSmall { half_box: 20, .. })
        ));
    }

    #[test]
    fn aperture_wider_than_the_box_is_rejected_when_building() {
        let mut cfg: PhotometryConfig = serde_json::from_str(MINIMAL).expect("parse");
        cfg.radii = Some(vec![1.0, 40.0]);
        assert_eq!(
            cfg.build_photometer().map(|_| ()),
            Err(PhotometryError::BoxTooSmall {
                required: 40.5,
                half_box: 25
            })
        );
    }

    #[test]
    fn config_file_loads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, MINIMAL).expect("write");
        let cfg = PhotometryConfig::load_json(&path).expect("load");
        assert_eq!(cfg.inputs.len(), 2);
        assert!(matches!(
            PhotometryConfig::load_json(dir.path().join("absent.json")),
            Err(PhotometryIoError::Io(_))
        ));
    }
}
