use crate::types::SkypolError;

/// Describes the intensity ratio of polarized light in a ray.
///
/// The degree is always between 0.0 and 1.0.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Dop {
    degree: f64,
}

impl Dop {
    /// Create a new `Dop` from `degree`.
    ///
    /// # Errors
    /// Returns `DegreeOutOfRange` if `degree` is not between 0.0 and 1.0.
    pub fn try_new(degree: f64) -> Result<Self, SkypolError> {
        if !(0.0..=1.0).contains(&degree) {
            return Err(SkypolError::DegreeOutOfRange { degree });
        }

        Ok(Self { degree })
    }

    /// Create a new `Dop` of zero.
    pub fn zero() -> Self {
        Self { degree: 0.0 }
    }

    /// Returns a new `Dop` clamped between 0.0 and `max`.
    pub fn clamp_max(self, max: f64) -> Self {
        Self {
            degree: self.degree.clamp(0.0, max.clamp(0.0, 1.0)),
        }
    }

    pub fn into_inner(self) -> f64 {
        self.degree
    }
}
