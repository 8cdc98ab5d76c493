//! Heading and pose estimation from polarization measurements
//!
//! Two estimators are provided. [`HoughEstimator`] recovers the camera's
//! yaw from the solar meridian line visible in the angle-of-polarization
//! pattern. [`PatternMatch`] searches candidate poses for the one whose
//! simulated sky best explains the measurements.

pub mod hough;
pub mod pattern;

pub use hough::{Accumulator, HoughEstimator};
pub use pattern::{Estimate, PatternMatch, PoseSearch, RandomSearch, VecSearch};

use crate::image::Measurement;
use crate::types::SkypolError;

/// Turns a set of per-pixel polarization measurements into an estimate.
pub trait Estimator {
    type Output;

    /// Run the estimator over `measurements`.
    ///
    /// # Errors
    /// Returns `EmptySearch` if the measurements leave the estimator
    /// nothing to choose from.
    fn estimate(&self, measurements: &[Measurement]) -> Result<Self::Output, SkypolError>;
}
