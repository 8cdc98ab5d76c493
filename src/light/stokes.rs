use crate::light::{Aop, Dop, RayFrame};
use crate::types::SkypolError;
use std::marker::PhantomData;

/// Describes the linear polarization of a ray as a Stokes vector.
///
/// Only the linear components [s0, s1, s2] are carried. Circular
/// polarization is not measurable with a linear polarizer mosaic.
#[derive(Debug, PartialEq)]
pub struct StokesVec<Frame: RayFrame> {
    inner: [f64; 3],
    _phan: PhantomData<Frame>,
}

impl<Frame: RayFrame> StokesVec<Frame> {
    #[must_use]
    pub fn new(s0: f64, s1: f64, s2: f64) -> Self {
        Self {
            inner: [s0, s1, s2],
            _phan: PhantomData,
        }
    }

    pub fn s0(&self) -> f64 {
        self.inner[0]
    }

    /// Compute the angle of polarization encoded by the vector.
    ///
    /// `atan2(s2, s1) / 2` is always on [-90, 90] so the conversion is
    /// total.
    pub fn aop(&self) -> Aop<Frame> {
        Aop::from_radians_wrapped(self.inner[2].atan2(self.inner[1]) / 2.0)
    }

    /// Compute the degree of polarization encoded by the vector.
    ///
    /// # Errors
    /// Returns `DegreeOutOfRange` if the vector encodes a degree outside
    /// [0, 1], which happens for physically inconsistent intensities.
    pub fn dop(&self) -> Result<Dop, SkypolError> {
        let degree =
            (self.inner[1].powi(2) + self.inner[2].powi(2)).sqrt() / self.inner[0];
        Dop::try_new(degree)
    }
}
