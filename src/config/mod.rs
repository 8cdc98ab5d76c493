//! Scene configuration
//!
//! A scene bundles everything needed to simulate or interpret a capture:
//! the camera hardware, its pose, where on Earth it stood, and when.
//! Scenes round-trip through JSON parameter files.

pub mod cli;

use crate::camera::{CameraParams, Pose, Position};
use crate::types::SkypolError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters of a capture scene.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct SceneParams {
    /// The physical camera.
    pub camera: CameraParams,

    /// The camera's pose in the local east-north-up frame.
    pub pose: Pose,

    /// Observer position on the WGS-84 ellipsoid.
    pub position: Position,

    /// Capture time in UTC.
    pub time: DateTime<Utc>,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            camera: CameraParams::default(),
            pose: Pose::zeros(),
            position: Position::kingston(),
            time: Utc::now(),
        }
    }
}

impl SceneParams {
    /// Load scene parameters from a JSON file and validate them.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, `Json` if it does not
    /// parse, or `Config` if the parameters are inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SkypolError> {
        let serialized = fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&serialized)?;
        params.validate()?;

        Ok(params)
    }

    /// Serialize the scene to pretty-printed JSON.
    ///
    /// # Errors
    /// Returns `Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, SkypolError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the scene parameters.
    ///
    /// # Errors
    /// Returns `Config` naming the first inconsistent parameter.
    pub fn validate(&self) -> Result<(), SkypolError> {
        if self.camera.pixel_size_um.0 <= 0.0 || self.camera.pixel_size_um.1 <= 0.0 {
            return Err(SkypolError::Config(format!(
                "pixel size must be positive: {:?}",
                self.camera.pixel_size_um
            )));
        }

        if self.camera.sensor_size_px.0 == 0 || self.camera.sensor_size_px.1 == 0 {
            return Err(SkypolError::Config(format!(
                "sensor must have pixels: {:?}",
                self.camera.sensor_size_px
            )));
        }

        // The polarizer mosaic decodes in 2x2 metapixels.
        if self.camera.sensor_size_px.0 % 2 != 0 || self.camera.sensor_size_px.1 % 2 != 0 {
            return Err(SkypolError::Config(format!(
                "sensor dimensions must be even: {:?}",
                self.camera.sensor_size_px
            )));
        }

        if self.camera.focal_length_mm <= 0.0 {
            return Err(SkypolError::Config(format!(
                "focal length must be positive: {}",
                self.camera.focal_length_mm
            )));
        }

        if !(-90.0..=90.0).contains(&self.position.lat) {
            return Err(SkypolError::Config(format!(
                "latitude out of range [-90, 90]: {}",
                self.position.lat
            )));
        }

        if !(-180.0..=180.0).contains(&self.position.lon) {
            return Err(SkypolError::Config(format!(
                "longitude out of range [-180, 180]: {}",
                self.position.lon
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midday_scene() -> SceneParams {
        SceneParams {
            time: "2025-06-13T16:26:47+00:00"
                .parse::<DateTime<Utc>>()
                .expect("valid datetime"),
            ..SceneParams::default()
        }
    }

    #[test]
    fn default_scene_validates() {
        assert!(SceneParams::default().validate().is_ok());
    }

    #[test]
    fn json_roundtrip_preserves_the_scene() {
        let scene = midday_scene();
        let json = scene.to_json().unwrap();
        let reloaded: SceneParams = serde_json::from_str(&json).unwrap();

        assert_eq!(scene, reloaded);
    }

    #[test]
    fn load_reads_and_validates() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("scene.json");
        std::fs::write(&path, midday_scene().to_json().unwrap()).expect("write scene");

        let loaded = SceneParams::load(&path).unwrap();
        assert_eq!(loaded, midday_scene());
    }

    #[test]
    fn load_rejects_missing_file() {
        assert!(matches!(
            SceneParams::load("/no/such/scene.json"),
            Err(SkypolError::Io(_))
        ));
    }

    #[test]
    fn validate_rejects_odd_sensor() {
        let mut scene = midday_scene();
        scene.camera.sensor_size_px = (2447, 2048);
        assert!(matches!(scene.validate(), Err(SkypolError::Config(_))));
    }

    #[test]
    fn validate_rejects_bad_position() {
        let mut scene = midday_scene();
        scene.position.lat = 91.0;
        assert!(matches!(scene.validate(), Err(SkypolError::Config(_))));
    }

    #[test]
    fn validate_rejects_nonpositive_optics() {
        let mut scene = midday_scene();
        scene.camera.focal_length_mm = 0.0;
        assert!(matches!(scene.validate(), Err(SkypolError::Config(_))));
    }
}
