//! Camera geometry and pose
//!
//! A simulated polarization camera is a pinhole optic over a rectangular
//! sensor with a pose in the local east-north-up (ENU) frame. Pixels are
//! back-projected through the focal point into sky directions, which the
//! [`SkyModel`](crate::sky::SkyModel) maps to polarization states.

use crate::image::Measurement;
use crate::sky::SkyModel;
use nalgebra::{Rotation3, Vector3};
use rand::{
    distr::uniform::{Error as UniformError, SampleBorrow, SampleUniform, UniformFloat, UniformSampler},
    Rng,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A serializable description of the physical image sensor and optic.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct CameraParams {
    /// Size of a pixel on the sensor in micrometers.
    pub pixel_size_um: (f64, f64),

    /// The dimensions of the sensor in number of pixels.
    pub sensor_size_px: (u32, u32),

    /// The distance between the sensor and the focal point along the +Z
    /// axis.
    pub focal_length_mm: f64,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            pixel_size_um: (3.45, 3.45),
            sensor_size_px: (2448, 2048),
            focal_length_mm: 8.0,
        }
    }
}

impl CameraParams {
    pub fn num_pixels(&self) -> usize {
        self.sensor_size_px.0 as usize * self.sensor_size_px.1 as usize
    }

    /// All pixel locations in row-major order.
    pub fn pixels(&self) -> Vec<(u32, u32)> {
        let (width, height) = self.sensor_size_px;
        (0..height)
            .flat_map(|row| (0..width).map(move |col| (col, row)))
            .collect()
    }
}

/// Roll, pitch, and yaw of the camera body in the ENU frame, in degrees.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Pose {
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
}

impl Pose {
    pub fn new(roll_deg: f64, pitch_deg: f64, yaw_deg: f64) -> Self {
        Self {
            roll_deg,
            pitch_deg,
            yaw_deg,
        }
    }

    pub fn zeros() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl From<(f64, f64, f64)> for Pose {
    fn from((roll_deg, pitch_deg, yaw_deg): (f64, f64, f64)) -> Self {
        Self {
            roll_deg,
            pitch_deg,
            yaw_deg,
        }
    }
}

impl From<Pose> for (f64, f64, f64) {
    fn from(pose: Pose) -> Self {
        (pose.roll_deg, pose.pitch_deg, pose.yaw_deg)
    }
}

impl From<Pose> for Rotation3<f64> {
    /// Rotation taking ENU-frame vectors into the body frame.
    fn from(pose: Pose) -> Self {
        Rotation3::from_euler_angles(
            pose.roll_deg.to_radians(),
            pose.pitch_deg.to_radians(),
            pose.yaw_deg.to_radians(),
        )
    }
}

/// Sample random poses on a range.
///
/// Implemented following the `rand::distr::uniform` documentation so that
/// `Uniform::new(low, high)` works directly on [`Pose`].
#[derive(Clone)]
pub struct UniformPose {
    roll: UniformFloat<f64>,
    pitch: UniformFloat<f64>,
    yaw: UniformFloat<f64>,
}

impl UniformSampler for UniformPose {
    type X = Pose;

    fn new<B1, B2>(low: B1, high: B2) -> Result<Self, UniformError>
    where
        B1: SampleBorrow<Self::X> + Sized,
        B2: SampleBorrow<Self::X> + Sized,
    {
        let (lr, lp, ly) = (*low.borrow()).into();
        let (hr, hp, hy) = (*high.borrow()).into();

        Ok(UniformPose {
            roll: UniformFloat::<f64>::new(lr, hr)?,
            pitch: UniformFloat::<f64>::new(lp, hp)?,
            yaw: UniformFloat::<f64>::new(ly, hy)?,
        })
    }

    fn new_inclusive<B1, B2>(low: B1, high: B2) -> Result<Self, UniformError>
    where
        B1: SampleBorrow<Self::X> + Sized,
        B2: SampleBorrow<Self::X> + Sized,
    {
        let (lr, lp, ly) = (*low.borrow()).into();
        let (hr, hp, hy) = (*high.borrow()).into();

        Ok(UniformPose {
            roll: UniformFloat::<f64>::new_inclusive(lr, hr)?,
            pitch: UniformFloat::<f64>::new_inclusive(lp, hp)?,
            yaw: UniformFloat::<f64>::new_inclusive(ly, hy)?,
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::X {
        Pose::new(
            self.roll.sample(rng),
            self.pitch.sample(rng),
            self.yaw.sample(rng),
        )
    }
}

impl SampleUniform for Pose {
    type Sampler = UniformPose;
}

/// Latitude and longitude of the observer in degrees.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn kingston() -> Self {
        Self {
            lat: 44.2187,
            lon: -76.4747,
        }
    }
}

/// A posed camera viewing a [`SkyModel`].
pub struct Camera {
    pixel_size_mm: Vector3<f64>,
    sensor_size_px: Vector3<f64>,
    focal_point_mm: Vector3<f64>,
    body_to_enu: Rotation3<f64>,
    model: SkyModel,
}

impl Camera {
    pub fn new(params: &CameraParams, pose: Pose, model: SkyModel) -> Self {
        let pixel_size_mm = Vector3::new(
            params.pixel_size_um.0 / 1000.0,
            params.pixel_size_um.1 / 1000.0,
            0.0,
        );

        let sensor_size_px = Vector3::new(
            f64::from(params.sensor_size_px.0),
            f64::from(params.sensor_size_px.1),
            0.0,
        );

        // Focal point is in the +Z direction (optical axis).
        let focal_point_mm = Vector3::new(0.0, 0.0, params.focal_length_mm);

        // Given a vector U in the ENU frame, U in the body frame is
        // enu_to_body * U. The transpose maps the other way.
        let enu_to_body: Rotation3<f64> = pose.into();
        let body_to_enu = enu_to_body.transpose();

        Self {
            pixel_size_mm,
            sensor_size_px,
            focal_point_mm,
            body_to_enu,
            model,
        }
    }

    /// Back-project a pixel into sky angles: azimuth clockwise from north
    /// and zenith from straight up, both in radians.
    pub fn ray_angles(&self, pixel: &(u32, u32)) -> (f64, f64) {
        // Physical pixel location on the image sensor, origin at the
        // optical center.
        let pixel = Vector3::new(f64::from(pixel.0), f64::from(pixel.1), 0.0);
        let pixel = pixel - self.sensor_size_px * 0.5;
        let phys_loc = self.pixel_size_mm.component_mul(&pixel);

        // Trace a ray from the physical pixel location through the focal
        // point (pinhole model), then into the ENU frame.
        let body_ray = phys_loc + self.focal_point_mm;
        let enu_ray = (self.body_to_enu * body_ray).normalize();

        // Azimuth is CW from +Y (north); zenith is from +Z (up).
        let azimuth_rad = enu_ray.x.atan2(enu_ray.y);
        let zenith_rad = enu_ray.z.clamp(-1.0, 1.0).acos();

        (azimuth_rad, zenith_rad)
    }

    /// Simulate the polarization state measured by a pixel.
    ///
    /// Returns `None` if the pixel sees below the horizon.
    pub fn simulate_pixel(&self, pixel: &(u32, u32)) -> Option<Measurement> {
        let (azimuth_rad, zenith_rad) = self.ray_angles(pixel);

        let aop = self.model.aop(azimuth_rad, zenith_rad)?;
        let dop = self.model.dop(azimuth_rad, zenith_rad)?;

        Some(Measurement::new(
            *pixel,
            aop.degrees(),
            dop.into_inner(),
        ))
    }

    /// Simulates the specified pixels in parallel.
    ///
    /// Returns measurements in the same order the pixels were provided;
    /// below-horizon pixels yield `None`.
    pub fn par_simulate_pixels(&self, pixels: &[(u32, u32)]) -> Vec<Option<Measurement>> {
        pixels
            .par_iter()
            .map(|pixel| self.simulate_pixel(pixel))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::distr::{Distribution, Uniform};
    use rstest::rstest;

    fn level_camera(model: SkyModel) -> Camera {
        Camera::new(&CameraParams::default(), Pose::zeros(), model)
    }

    #[test]
    fn center_pixel_looks_at_zenith() {
        let model = SkyModel::from_solar_angles_deg(0.0, 45.0);
        let camera = level_camera(model);
        let center = (1224, 1024);

        let (_azimuth, zenith) = camera.ray_angles(&center);
        assert_relative_eq!(zenith, 0.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case((0, 0))]
    #[case((2448, 0))]
    #[case((0, 2048))]
    #[case((2448, 2048))]
    fn corner_pixels_are_above_horizon(#[case] pixel: (u32, u32)) {
        let model = SkyModel::from_solar_angles_deg(0.0, 45.0);
        let camera = level_camera(model);

        let (_azimuth, zenith) = camera.ray_angles(&pixel);
        assert!(zenith > 0.0);
        assert!(zenith.to_degrees() < 90.0);
    }

    #[test]
    fn simulated_frame_is_dense_for_level_camera() {
        let params = CameraParams {
            sensor_size_px: (24, 20),
            ..CameraParams::default()
        };
        let model = SkyModel::from_solar_angles_deg(0.0, 45.0);
        let camera = Camera::new(&params, Pose::zeros(), model);

        let measurements = camera.par_simulate_pixels(&params.pixels());
        assert_eq!(measurements.len(), params.num_pixels());
        assert!(measurements.iter().all(Option::is_some));
    }

    #[test]
    fn uniform_pose_sampling_respects_bounds() {
        let (low, high) = (Pose::new(-1.0, -1.0, 0.0), Pose::new(1.0, 1.0, 360.0));
        let uniform = Uniform::new(low, high).expect("valid bounds");
        let mut rng = rand::rng();

        for _ in 0..100 {
            let pose = uniform.sample(&mut rng);
            assert!((-1.0..1.0).contains(&pose.roll_deg));
            assert!((-1.0..1.0).contains(&pose.pitch_deg));
            assert!((0.0..360.0).contains(&pose.yaw_deg));
        }
    }
}
