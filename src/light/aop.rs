use crate::light::{MeridianFrame, RayFrame, SensorFrame};
use crate::types::SkypolError;
use std::marker::PhantomData;

/// Describes the e-vector orientation of a ray in degrees.
///
/// The angle is always between -90.0 and 90.0. An e-vector has no sign, so
/// -90 and +90 describe the same orientation.
#[derive(Clone, Copy, Debug, PartialOrd)]
pub struct Aop<Frame: RayFrame> {
    angle_deg: f64,
    _phan: PhantomData<Frame>,
}

impl<Frame: RayFrame> Aop<Frame> {
    /// Creates a new `Aop` from an angle in degrees.
    ///
    /// # Errors
    /// Returns `AngleOutOfRange` if `angle_deg` is not between -90 and 90.
    pub fn from_degrees(angle_deg: f64) -> Result<Self, SkypolError> {
        if !(-90.0..=90.0).contains(&angle_deg) {
            return Err(SkypolError::AngleOutOfRange { angle_deg });
        }

        Ok(Self {
            angle_deg,
            _phan: PhantomData,
        })
    }

    /// Creates a new `Aop` from an angle in degrees, wrapping into [-90, 90].
    pub fn from_degrees_wrapped(mut angle_deg: f64) -> Self {
        while angle_deg > 90.0 {
            angle_deg -= 180.0;
        }

        while angle_deg < -90.0 {
            angle_deg += 180.0;
        }

        Self {
            angle_deg,
            _phan: PhantomData,
        }
    }

    /// Creates a new `Aop` from an angle in radians, wrapping into [-90, 90].
    pub fn from_radians_wrapped(angle_rad: f64) -> Self {
        Self::from_degrees_wrapped(angle_rad.to_degrees())
    }

    /// Returns the angle in degrees on [-90, 90].
    pub fn degrees(&self) -> f64 {
        self.angle_deg
    }

    /// Returns the smallest absolute difference to `other` in degrees,
    /// accounting for the 180-degree wrap.
    pub fn distance(&self, other: &Aop<Frame>) -> f64 {
        (*self - *other).angle_deg.abs()
    }

    /// Returns true if `other` is within `threshold_deg` of `self`,
    /// inclusive and handling wrapping.
    pub fn in_threshold(&self, other: &Aop<Frame>, threshold_deg: f64) -> bool {
        self.distance(other) <= threshold_deg
    }
}

impl Aop<MeridianFrame> {
    /// Rotate the angle from the meridian frame into the sensor frame.
    ///
    /// `shift_deg` is the angle of the pixel's meridian plane against the
    /// sensor's 0-degree polarizer axis.
    pub fn into_sensor_frame(self, shift_deg: f64) -> Aop<SensorFrame> {
        Aop::from_degrees_wrapped(self.angle_deg + shift_deg)
    }
}

impl Aop<SensorFrame> {
    /// Rotate the angle from the sensor frame into the meridian frame.
    pub fn into_meridian_frame(self, shift_deg: f64) -> Aop<MeridianFrame> {
        Aop::from_degrees_wrapped(self.angle_deg - shift_deg)
    }
}

impl<Frame: RayFrame> std::ops::Add for Aop<Frame> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::from_degrees_wrapped(self.angle_deg + other.angle_deg)
    }
}

impl<Frame: RayFrame> std::ops::Sub for Aop<Frame> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::from_degrees_wrapped(self.angle_deg - other.angle_deg)
    }
}

impl<Frame: RayFrame> PartialEq for Aop<Frame> {
    fn eq(&self, other: &Aop<Frame>) -> bool {
        // -90 describes the same e-vector as +90.
        if self.angle_deg.abs() == 90.0 && other.angle_deg.abs() == 90.0 {
            return true;
        }

        self.angle_deg == other.angle_deg
    }
}
