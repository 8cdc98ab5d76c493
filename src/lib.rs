//! # skypol - skylight polarization toolkit
//!
//! The clear sky carries a polarization pattern fixed by the sun's
//! position. A division-of-focal-plane polarization camera can image that
//! pattern, and matching the image against a Rayleigh single-scattering
//! model recovers the camera's orientation without a magnetometer.
//!
//! The library covers the full pipeline: simulating the pattern a posed
//! camera would see, decoding raw polarizer-mosaic captures into Stokes
//! vectors, and estimating orientation from the decoded measurements.

// Module declarations
pub mod camera;
pub mod commands;
pub mod config;
pub mod estimate;
pub mod image;
pub mod light;
pub mod plot;
pub mod render;
pub mod sky;
pub mod types;

// Re-export commonly used types
pub use camera::{Camera, CameraParams, Pose, Position};
pub use config::SceneParams;
pub use image::{IntensityImage, Measurement, StokesImage};
pub use sky::SkyModel;
pub use types::SkypolError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
