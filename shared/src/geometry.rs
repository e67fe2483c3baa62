//! Acquisition geometry for cone-beam projection data.
//!
//! Stores the distances and detector placement that describe a scan, along
//! with the rotation-axis offset that the axis search refines. All lengths are
//! in millimetres, angles in degrees.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors from constructing, modifying or persisting a [`Geometry`].
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("{parameter} must be positive and finite, got {value}")]
    NonPositive {
        parameter: GeometryParameter,
        value: f64,
    },
    #[error("{parameter} must be finite, got {value}")]
    NonFinite {
        parameter: GeometryParameter,
        value: f64,
    },
    #[error("unknown geometry parameter '{0}'")]
    UnknownParameter(String),
    #[error("geometry file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("geometry file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Scalar geometry parameters that may be varied one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryParameter {
    /// Horizontal offset of the rotation axis (`axs_hrz`)
    AxisHorizontal,
    /// Detector pixel pitch (`det_pixel`)
    DetectorPixel,
    /// Source to object distance (`src2obj`)
    SourceToObject,
    /// Object to detector distance (`det2obj`)
    ObjectToDetector,
    /// Horizontal detector offset (`det_hrz`)
    DetectorHorizontal,
    /// Vertical detector offset (`det_vrt`)
    DetectorVertical,
}

impl GeometryParameter {
    pub const ALL: [GeometryParameter; 6] = [
        GeometryParameter::AxisHorizontal,
        GeometryParameter::DetectorPixel,
        GeometryParameter::SourceToObject,
        GeometryParameter::ObjectToDetector,
        GeometryParameter::DetectorHorizontal,
        GeometryParameter::DetectorVertical,
    ];

    /// Short name used in geometry files and log output.
    pub fn name(&self) -> &'static str {
        match self {
            GeometryParameter::AxisHorizontal => "axs_hrz",
            GeometryParameter::DetectorPixel => "det_pixel",
            GeometryParameter::SourceToObject => "src2obj",
            GeometryParameter::ObjectToDetector => "det2obj",
            GeometryParameter::DetectorHorizontal => "det_hrz",
            GeometryParameter::DetectorVertical => "det_vrt",
        }
    }

    /// Whether the parameter is a length that must stay strictly positive.
    pub fn must_be_positive(&self) -> bool {
        matches!(
            self,
            GeometryParameter::DetectorPixel
                | GeometryParameter::SourceToObject
                | GeometryParameter::ObjectToDetector
        )
    }
}

impl fmt::Display for GeometryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryParameter {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeometryParameter::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| GeometryError::UnknownParameter(s.to_string()))
    }
}

/// On-disk form of a geometry; validated into [`Geometry`] on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeometryRecord {
    det_pixel: f64,
    src2obj: f64,
    det2obj: f64,
    #[serde(default)]
    det_hrz: f64,
    #[serde(default)]
    det_vrt: f64,
    #[serde(default)]
    axs_hrz: f64,
    #[serde(default)]
    thetas: Vec<f64>,
}

/// Scan geometry.
///
/// Immutable in use: trial values are applied with [`Geometry::with_parameter`],
/// which returns a validated copy and leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeometryRecord", into = "GeometryRecord")]
pub struct Geometry {
    det_pixel: f64,
    src2obj: f64,
    det2obj: f64,
    det_hrz: f64,
    det_vrt: f64,
    axs_hrz: f64,
    thetas: Vec<f64>,
}

impl TryFrom<GeometryRecord> for Geometry {
    type Error = GeometryError;

    fn try_from(record: GeometryRecord) -> Result<Self, Self::Error> {
        Geometry::new(record.det_pixel, record.src2obj, record.det2obj)?
            .with_parameter(GeometryParameter::DetectorHorizontal, record.det_hrz)?
            .with_parameter(GeometryParameter::DetectorVertical, record.det_vrt)?
            .with_parameter(GeometryParameter::AxisHorizontal, record.axs_hrz)
            .map(|g| g.with_thetas(record.thetas))
    }
}

impl From<Geometry> for GeometryRecord {
    fn from(g: Geometry) -> Self {
        Self {
            det_pixel: g.det_pixel,
            src2obj: g.src2obj,
            det2obj: g.det2obj,
            det_hrz: g.det_hrz,
            det_vrt: g.det_vrt,
            axs_hrz: g.axs_hrz,
            thetas: g.thetas,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pixel {} mm, src2obj {} mm, det2obj {} mm, axis {} mm, detector ({}, {}) mm, {} angles",
            self.det_pixel,
            self.src2obj,
            self.det2obj,
            self.axs_hrz,
            self.det_hrz,
            self.det_vrt,
            self.thetas.len()
        )
    }
}

fn validate(parameter: GeometryParameter, value: f64) -> Result<f64, GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::NonFinite { parameter, value });
    }
    if parameter.must_be_positive() && value <= 0.0 {
        return Err(GeometryError::NonPositive { parameter, value });
    }
    Ok(value)
}

impl Geometry {
    /// Create a geometry with a centred detector and rotation axis.
    ///
    /// # Arguments
    /// * `det_pixel` - Detector pixel pitch in mm
    /// * `src2obj` - Source to rotation-axis distance in mm
    /// * `det2obj` - Rotation-axis to detector distance in mm
    pub fn new(det_pixel: f64, src2obj: f64, det2obj: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            det_pixel: validate(GeometryParameter::DetectorPixel, det_pixel)?,
            src2obj: validate(GeometryParameter::SourceToObject, src2obj)?,
            det2obj: validate(GeometryParameter::ObjectToDetector, det2obj)?,
            det_hrz: 0.0,
            det_vrt: 0.0,
            axs_hrz: 0.0,
            thetas: Vec::new(),
        })
    }

    /// Read a scalar parameter.
    pub fn parameter(&self, parameter: GeometryParameter) -> f64 {
        match parameter {
            GeometryParameter::AxisHorizontal => self.axs_hrz,
            GeometryParameter::DetectorPixel => self.det_pixel,
            GeometryParameter::SourceToObject => self.src2obj,
            GeometryParameter::ObjectToDetector => self.det2obj,
            GeometryParameter::DetectorHorizontal => self.det_hrz,
            GeometryParameter::DetectorVertical => self.det_vrt,
        }
    }

    /// Set a scalar parameter in place after validating it.
    pub fn set_parameter(
        &mut self,
        parameter: GeometryParameter,
        value: f64,
    ) -> Result<(), GeometryError> {
        let value = validate(parameter, value)?;
        let slot = match parameter {
            GeometryParameter::AxisHorizontal => &mut self.axs_hrz,
            GeometryParameter::DetectorPixel => &mut self.det_pixel,
            GeometryParameter::SourceToObject => &mut self.src2obj,
            GeometryParameter::ObjectToDetector => &mut self.det2obj,
            GeometryParameter::DetectorHorizontal => &mut self.det_hrz,
            GeometryParameter::DetectorVertical => &mut self.det_vrt,
        };
        *slot = value;
        Ok(())
    }

    /// Copy of this geometry with one parameter replaced.
    pub fn with_parameter(
        &self,
        parameter: GeometryParameter,
        value: f64,
    ) -> Result<Self, GeometryError> {
        let mut copy = self.clone();
        copy.set_parameter(parameter, value)?;
        Ok(copy)
    }

    /// Replace the projection angles (degrees).
    pub fn with_thetas(mut self, thetas: Vec<f64>) -> Self {
        self.thetas = thetas;
        self
    }

    pub fn det_pixel(&self) -> f64 {
        self.det_pixel
    }

    pub fn src2obj(&self) -> f64 {
        self.src2obj
    }

    pub fn det2obj(&self) -> f64 {
        self.det2obj
    }

    pub fn det_hrz(&self) -> f64 {
        self.det_hrz
    }

    pub fn det_vrt(&self) -> f64 {
        self.det_vrt
    }

    pub fn axs_hrz(&self) -> f64 {
        self.axs_hrz
    }

    pub fn thetas(&self) -> &[f64] {
        &self.thetas
    }

    /// Geometric magnification `(src2obj + det2obj) / src2obj`.
    pub fn magnification(&self) -> f64 {
        (self.src2obj + self.det2obj) / self.src2obj
    }

    /// Size of one detector pixel projected back onto the rotation axis.
    pub fn pixel_footprint(&self) -> f64 {
        self.det_pixel / self.magnification()
    }

    /// Physical detector extent `(height, width)` in mm for a `rows x cols` frame.
    pub fn detector_size(&self, rows: usize, cols: usize) -> (f64, f64) {
        (rows as f64 * self.det_pixel, cols as f64 * self.det_pixel)
    }

    /// Convert a detector-pixel distance to an object-plane length in mm.
    pub fn pixels_to_mm(&self, pixels: f64) -> f64 {
        pixels * self.pixel_footprint()
    }

    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), GeometryError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, GeometryError> {
        let json = std::fs::read_to_string(path)?;
        let geometry: Self = serde_json::from_str(&json)?;
        log::debug!("Loaded geometry from {}: {geometry}", path.display());
        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn geometry() -> Geometry {
        Geometry::new(0.1, 100.0, 300.0).unwrap()
    }

    #[test]
    fn test_magnification_and_footprint() {
        let g = geometry();
        assert_relative_eq!(g.magnification(), 4.0);
        assert_relative_eq!(g.pixel_footprint(), 0.025);
        assert_relative_eq!(g.pixels_to_mm(8.0), 0.2);
        assert_eq!(g.detector_size(10, 20), (1.0, 2.0));
    }

    #[test]
    fn test_with_parameter_is_copy_on_write() {
        let g = geometry();
        let shifted = g
            .with_parameter(GeometryParameter::AxisHorizontal, 1.5)
            .unwrap();

        assert_eq!(g.axs_hrz(), 0.0);
        assert_eq!(shifted.axs_hrz(), 1.5);
        assert_eq!(shifted.det_pixel(), g.det_pixel());
    }

    #[test]
    fn test_rejects_non_positive_lengths() {
        assert!(matches!(
            Geometry::new(0.0, 100.0, 100.0),
            Err(GeometryError::NonPositive { .. })
        ));
        assert!(geometry()
            .with_parameter(GeometryParameter::SourceToObject, -1.0)
            .is_err());
        assert!(geometry()
            .with_parameter(GeometryParameter::AxisHorizontal, f64::NAN)
            .is_err());
        // Offsets may be negative
        assert!(geometry()
            .with_parameter(GeometryParameter::DetectorHorizontal, -3.0)
            .is_ok());
    }

    #[test]
    fn test_parameter_names() {
        for p in GeometryParameter::ALL {
            assert_eq!(p.name().parse::<GeometryParameter>().unwrap(), p);
        }
        assert!(matches!(
            "det_rot".parse::<GeometryParameter>(),
            Err(GeometryError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geometry.json");
        let g = geometry()
            .with_parameter(GeometryParameter::AxisHorizontal, 0.25)
            .unwrap()
            .with_thetas(vec![0.0, 90.0, 180.0]);

        g.save_to_file(&path).unwrap();
        let loaded = Geometry::load_from_file(&path).unwrap();
        assert_eq!(loaded, g);
    }

    #[test]
    fn test_json_rejects_unknown_and_invalid_fields() {
        let unknown = r#"{"det_pixel": 0.1, "src2obj": 10.0, "det2obj": 5.0, "vol_tra": 1.0}"#;
        assert!(serde_json::from_str::<Geometry>(unknown).is_err());

        let negative = r#"{"det_pixel": -0.1, "src2obj": 10.0, "det2obj": 5.0}"#;
        assert!(serde_json::from_str::<Geometry>(negative).is_err());

        let minimal = r#"{"det_pixel": 0.1, "src2obj": 10.0, "det2obj": 5.0}"#;
        let g: Geometry = serde_json::from_str(minimal).unwrap();
        assert_eq!(g.axs_hrz(), 0.0);
        assert!(g.thetas().is_empty());
    }
}
