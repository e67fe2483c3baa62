//! Tunable parameters for the preprocessing steps.
//!
//! Every struct deserialises with defaults for missing fields, so a JSON
//! file only needs to name the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rotation-axis search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotationSearchConfig {
    /// Trial values evaluated per subscale level
    pub candidates: usize,
    /// Fixed vertical subsampling used by every trial reconstruction
    pub vertical_subsample: usize,
    /// Calibration factor applied to the centre-of-mass initial guess
    pub centre_of_mass_scale: f64,
}

impl Default for RotationSearchConfig {
    fn default() -> Self {
        Self {
            candidates: 5,
            vertical_subsample: 20,
            centre_of_mass_scale: 1.0,
        }
    }
}

/// Tile shift estimation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShiftEstimatorConfig {
    /// Distance between sampled slices along the sampling axis
    pub slice_stride: usize,
    /// Subpixel resolution of the registration (1/upsample_factor px)
    pub upsample_factor: usize,
    /// Required ratio of |mean shift| to its standard deviation
    pub reliability_factor: f64,
}

impl Default for ShiftEstimatorConfig {
    fn default() -> Self {
        Self {
            slice_stride: 100,
            upsample_factor: 10,
            reliability_factor: 2.0,
        }
    }
}

/// Air intensity estimation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AirConfig {
    /// Width of the image border sampled for air, in pixels
    pub border: usize,
    /// Histogram bins
    pub bins: usize,
    /// Histogram range
    pub range: (f64, f64),
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            border: 10,
            bins: 1024,
            range: (-0.1, 0.1),
        }
    }
}

/// All preprocessing parameters, as stored in a JSON settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessConfig {
    pub rotation: RotationSearchConfig,
    pub shift: ShiftEstimatorConfig,
    pub air: AirConfig,
}

impl PreprocessConfig {
    /// Load from JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PreprocessConfig::default();
        assert_eq!(config.rotation.candidates, 5);
        assert_eq!(config.rotation.vertical_subsample, 20);
        assert_eq!(config.shift.slice_stride, 100);
        assert_eq!(config.shift.upsample_factor, 10);
        assert_eq!(config.air.border, 10);
        assert_eq!(config.air.bins, 1024);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PreprocessConfig =
            serde_json::from_str(r#"{ "shift": { "slice_stride": 25 } }"#).unwrap();
        assert_eq!(config.shift.slice_stride, 25);
        assert_eq!(config.shift.upsample_factor, 10);
        assert_eq!(config.rotation, RotationSearchConfig::default());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<PreprocessConfig, _> =
            serde_json::from_str(r#"{ "rotation": { "candidatez": 7 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prepro.json");
        let mut config = PreprocessConfig::default();
        config.air.border = 4;

        config.save_to_file(&path).unwrap();
        assert_eq!(PreprocessConfig::load_from_file(&path).unwrap(), config);
    }
}
