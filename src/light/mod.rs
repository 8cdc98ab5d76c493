//! Polarization primitives
//!
//! A ray of partially linearly polarized skylight is described by its angle
//! of polarization ([`Aop`]) and degree of polarization ([`Dop`]), or
//! equivalently by a linear Stokes vector ([`StokesVec`]).

pub mod aop;
pub mod dop;
pub mod stokes;

pub use aop::Aop;
pub use dop::Dop;
pub use stokes::StokesVec;

/// Marker trait for the reference frame an angle of polarization is
/// expressed in.
pub trait RayFrame: Copy + Clone {}

/// Angles measured against the 0-degree polarizer axis of the image sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorFrame;
impl RayFrame for SensorFrame {}

/// Angles measured against the local meridian plane of the ray, the plane
/// containing the ray and the zenith direction. The Rayleigh sky model
/// produces angles in this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeridianFrame;
impl RayFrame for MeridianFrame {}
