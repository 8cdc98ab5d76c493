//! Rayleigh sky model
//!
//! Single-scattering model of the skylight polarization pattern. The model
//! is fully determined by the position of the sun, which is computed from a
//! WGS-84 position and a UTC time via the `spa` crate.

use crate::camera::Position;
use crate::light::{Aop, Dop, MeridianFrame};
use crate::types::SkypolError;
use chrono::{DateTime, Utc};
use spa::{SolarPos, StdFloatOps};

/// Describes the skylight polarization pattern for a fixed solar position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyModel {
    /// Solar azimuth in radians, measured clockwise from north.
    solar_azimuth_rad: f64,

    /// Solar zenith angle in radians, measured from straight up.
    solar_zenith_rad: f64,

    /// Maximum degree of polarization at 90 degrees scattering angle.
    /// Atmospheric turbidity keeps real skies well below 1.0.
    max_dop: f64,
}

impl SkyModel {
    /// Create a `SkyModel` from explicit solar angles in degrees.
    pub fn from_solar_angles_deg(azimuth_deg: f64, zenith_deg: f64) -> Self {
        Self {
            solar_azimuth_rad: azimuth_deg.to_radians(),
            solar_zenith_rad: zenith_deg.to_radians(),
            max_dop: 1.0,
        }
    }

    /// Create a `SkyModel` for an observer at `position` at `time`.
    ///
    /// # Errors
    /// Returns `Config` if the solar position algorithm rejects the
    /// latitude or longitude.
    pub fn from_position_and_time(
        position: &Position,
        time: DateTime<Utc>,
    ) -> Result<Self, SkypolError> {
        let solar_pos: SolarPos =
            spa::solar_position::<StdFloatOps>(time, position.lat, position.lon)
                .map_err(|e| SkypolError::Config(format!("solar position: {e}")))?;

        Ok(Self {
            // Measured CW from north.
            solar_azimuth_rad: solar_pos.azimuth.to_radians(),
            // Measured between zenith and the sun's center.
            solar_zenith_rad: solar_pos.zenith_angle.to_radians(),
            max_dop: 1.0,
        })
    }

    /// Cap the model's degree of polarization. Values outside [0, 1] are
    /// clamped.
    pub fn with_max_dop(mut self, max_dop: f64) -> Self {
        self.max_dop = max_dop.clamp(0.0, 1.0);
        self
    }

    /// Solar azimuth in degrees, clockwise from north.
    pub fn solar_azimuth_deg(&self) -> f64 {
        self.solar_azimuth_rad.to_degrees()
    }

    /// Solar zenith angle in degrees.
    pub fn solar_zenith_deg(&self) -> f64 {
        self.solar_zenith_rad.to_degrees()
    }

    /// Angle of polarization seen along a ray, in the meridian frame.
    ///
    /// `ray_azimuth_rad` is clockwise from north, `ray_zenith_rad` from
    /// straight up. Returns `None` for rays below the horizon.
    pub fn aop(&self, ray_azimuth_rad: f64, ray_zenith_rad: f64) -> Option<Aop<MeridianFrame>> {
        if !self.above_horizon(ray_zenith_rad) {
            return None;
        }

        let daz = ray_azimuth_rad - self.solar_azimuth_rad;
        let angle_rad = (ray_zenith_rad.sin() * self.solar_zenith_rad.cos()
            - ray_zenith_rad.cos() * daz.cos() * self.solar_zenith_rad.sin())
        .atan2(daz.sin() * self.solar_zenith_rad.sin());

        Some(Aop::from_radians_wrapped(angle_rad))
    }

    /// Degree of polarization seen along a ray.
    ///
    /// Returns `None` for rays below the horizon.
    pub fn dop(&self, ray_azimuth_rad: f64, ray_zenith_rad: f64) -> Option<Dop> {
        if !self.above_horizon(ray_zenith_rad) {
            return None;
        }

        let daz = ray_azimuth_rad - self.solar_azimuth_rad;
        // Clamp against rounding before acos: the cosine can leave [-1, 1]
        // by a few ulps when the ray points at the sun.
        let scattering_rad = (ray_zenith_rad.cos() * self.solar_zenith_rad.cos()
            + ray_zenith_rad.sin() * self.solar_zenith_rad.sin() * daz.cos())
        .clamp(-1.0, 1.0)
        .acos();
        let degree = self.max_dop * scattering_rad.sin().powi(2)
            / (1.0 + scattering_rad.cos().powi(2));

        // sin^2/(1 + cos^2) is on [0, 1] and max_dop is clamped, so the
        // degree cannot leave [0, 1].
        Some(Dop::try_new(degree).expect("scattering degree is on [0, max_dop]"))
    }

    fn above_horizon(&self, ray_zenith_rad: f64) -> bool {
        ray_zenith_rad.to_degrees() <= 90.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    /// Every point on the solar meridian sees an e-vector orthogonal to
    /// the meridian plane, i.e. an AoP of +/-90 degrees.
    #[rstest]
    #[case(0.0, 20.0)]
    #[case(0.0, 80.0)]
    #[case(180.0, 45.0)]
    #[case(180.0, 10.0)]
    fn solar_meridian_aop_is_orthogonal(#[case] ray_az_deg: f64, #[case] ray_zen_deg: f64) {
        let model = SkyModel::from_solar_angles_deg(0.0, 45.0);
        let aop = model
            .aop(ray_az_deg.to_radians(), ray_zen_deg.to_radians())
            .expect("ray is above the horizon");

        assert_relative_eq!(aop.degrees().abs(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn dop_maximal_at_right_angle_scattering() {
        // Sun on the horizon towards north, ray straight up: 90 degrees
        // scattering angle.
        let model = SkyModel::from_solar_angles_deg(0.0, 90.0);
        let dop = model.dop(0.0, 0.0).expect("zenith ray is above the horizon");

        assert_relative_eq!(dop.into_inner(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn dop_zero_towards_the_sun() {
        let model = SkyModel::from_solar_angles_deg(90.0, 45.0);
        let dop = model
            .dop(90.0_f64.to_radians(), 45.0_f64.to_radians())
            .expect("solar disc is above the horizon");

        assert_relative_eq!(dop.into_inner(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn max_dop_caps_the_pattern() {
        let model = SkyModel::from_solar_angles_deg(0.0, 90.0).with_max_dop(0.6);
        let dop = model.dop(0.0, 0.0).expect("zenith ray is above the horizon");

        assert_relative_eq!(dop.into_inner(), 0.6, epsilon = 1e-9);
    }

    #[test]
    fn below_horizon_is_none() {
        let model = SkyModel::from_solar_angles_deg(0.0, 45.0);
        assert!(model.aop(0.0, 91.0_f64.to_radians()).is_none());
        assert!(model.dop(0.0, 91.0_f64.to_radians()).is_none());
    }

    #[test]
    fn solar_position_for_kingston() {
        let position = Position::kingston();
        let time = "2025-06-13T16:26:47+00:00"
            .parse::<DateTime<Utc>>()
            .expect("valid datetime string");

        let model = SkyModel::from_position_and_time(&position, time)
            .expect("valid position and time");

        // Midday in June: the sun is well above the horizon.
        assert!(model.solar_zenith_deg() < 90.0);
    }
}
