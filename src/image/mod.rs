//! Division-of-focal-plane image decoding
//!
//! A DoFP polarization camera has a micro-polarizer array between the lens
//! and the sensor, imaging intensity through two sets of orthogonal linear
//! polarizing filters. This module turns such raw intensity frames into
//! Stokes vectors and per-pixel polarization measurements.

use crate::light::{MeridianFrame, RayFrame, SensorFrame, StokesVec};
use crate::types::SkypolError;
use rayon::prelude::*;
use std::marker::PhantomData;

/// A polarized intensity image.
///
/// Each pixel measures light intensity through one linear polarizing
/// filter. Pixels are grouped into metapixels of four filters.
pub struct IntensityImage {
    /// The dimensions of the metaimage, half the raw dimensions.
    dims: (u32, u32),

    /// Buffer of metapixels, each storing intensities in 0, 45, 90, 135
    /// degree order.
    metapixels: Vec<[f64; 4]>,
}

impl IntensityImage {
    /// Create an intensity image from a raw row-major byte buffer.
    ///
    /// The micro-polarizer array repeats this 2x2 pattern:
    ///
    /// ```text
    /// +-----+-----+
    /// | 090 | 135 |
    /// +-----+-----+
    /// | 045 | 000 |
    /// +-----+-----+
    /// ```
    ///
    /// # Errors
    /// Returns `InvalidImage` if either dimension is odd or if `bytes`
    /// does not hold exactly `width * height` samples.
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, SkypolError> {
        if width % 2 != 0 || height % 2 != 0 {
            return Err(SkypolError::InvalidImage(format!(
                "odd mosaic dimensions: {width}x{height}"
            )));
        }

        let expected = width as usize * height as usize;
        if bytes.len() != expected {
            return Err(SkypolError::InvalidImage(format!(
                "buffer holds {} bytes but {width}x{height} needs {expected}",
                bytes.len()
            )));
        }

        let dims = (width / 2, height / 2);
        let coords: Vec<(u32, u32)> = (0..dims.1)
            .flat_map(|y| (0..dims.0).map(move |x| (x, y)))
            .collect();

        let metapixels: Vec<[f64; 4]> = coords
            .par_iter()
            .map(|(x, y)| {
                let i000 = ((x * 2 + 1) + (y * 2 + 1) * width) as usize;
                let i045 = ((x * 2) + (y * 2 + 1) * width) as usize;
                let i090 = ((x * 2) + (y * 2) * width) as usize;
                let i135 = ((x * 2 + 1) + (y * 2) * width) as usize;

                [
                    f64::from(bytes[i000]),
                    f64::from(bytes[i045]),
                    f64::from(bytes[i090]),
                    f64::from(bytes[i135]),
                ]
            })
            .collect();

        Ok(Self { dims, metapixels })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dims
    }

    /// Convert the intensity image into a Stokes image in the sensor
    /// frame.
    ///
    /// ```text
    /// s0 = (I0 + I45 + I90 + I135) / 2
    /// s1 = I0 - I90
    /// s2 = I45 - I135
    /// ```
    pub fn into_stokes_image(self) -> StokesImage<SensorFrame> {
        let pixels: Vec<[f64; 3]> = self
            .metapixels
            .par_iter()
            .map(|mp| {
                [
                    (mp[0] + mp[1] + mp[2] + mp[3]) / 2.0,
                    mp[0] - mp[2],
                    mp[1] - mp[3],
                ]
            })
            .collect();

        StokesImage {
            dims: self.dims,
            pixels,
            _phan: PhantomData,
        }
    }
}

/// A dense image of linear Stokes vectors in reference frame `Frame`.
///
/// Fresh decodes are in the [`SensorFrame`]; estimators and the sky model
/// work in the [`MeridianFrame`]. The frame rotations are explicit
/// conversions so the two cannot be mixed up.
pub struct StokesImage<Frame: RayFrame> {
    dims: (u32, u32),
    pixels: Vec<[f64; 3]>,
    _phan: PhantomData<Frame>,
}

impl<Frame: RayFrame> StokesImage<Frame> {
    pub fn dimensions(&self) -> (u32, u32) {
        self.dims
    }

    fn get_pixel(&self, pixel: (u32, u32)) -> Option<&[f64; 3]> {
        if pixel.0 >= self.dims.0 || pixel.1 >= self.dims.1 {
            return None;
        }

        self.pixels.get((pixel.1 * self.dims.0 + pixel.0) as usize)
    }

    /// The Stokes vector at `pixel`, or `None` outside the image.
    pub fn stokes_at(&self, pixel: (u32, u32)) -> Option<StokesVec<Frame>> {
        self.get_pixel(pixel).map(|sv| StokesVec::new(sv[0], sv[1], sv[2]))
    }

    /// Angle of polarization in degrees at `pixel`, or `None` outside the
    /// image.
    pub fn aop_at(&self, pixel: (u32, u32)) -> Option<f64> {
        self.stokes_at(pixel).map(|sv| sv.aop().degrees())
    }

    /// Degree of polarization at `pixel`, or `None` outside the image.
    ///
    /// Noise can push the raw ratio past 1; callers clamp through
    /// [`Measurement::with_dop_max`].
    pub fn dop_at(&self, pixel: (u32, u32)) -> Option<f64> {
        self.get_pixel(pixel).map(sv_to_dop)
    }

    /// Angle of polarization for every pixel, row-major, in parallel.
    pub fn par_aop_values(&self) -> Vec<f64> {
        self.pixels
            .par_iter()
            .map(|sv| StokesVec::<Frame>::new(sv[0], sv[1], sv[2]).aop().degrees())
            .collect()
    }

    /// Degree of polarization for every pixel, row-major, in parallel.
    pub fn par_dop_values(&self) -> Vec<f64> {
        self.pixels.par_iter().map(sv_to_dop).collect()
    }

    /// Rotate every Stokes vector by twice the pixel's angle against the
    /// optical center. Stokes parameters rotate at twice the e-vector
    /// angle.
    fn par_rotate(mut self, direction: f64) -> Vec<[f64; 3]> {
        let origin = (f64::from(self.dims.0) / 2.0, f64::from(self.dims.1) / 2.0);
        let coords: Vec<(f64, f64)> = (0..self.dims.1)
            .flat_map(|y| (0..self.dims.0).map(move |x| (x, y)))
            .map(|(x, y)| (f64::from(x) - origin.0, f64::from(y) - origin.1))
            .collect();

        coords
            .par_iter()
            .zip(self.pixels.par_iter_mut())
            .for_each(|((x, y), pixel)| {
                let beta = y.atan2(*x) * 2.0 * direction;
                let s1 = pixel[1] * beta.cos() + pixel[2] * beta.sin();
                let s2 = pixel[2] * beta.cos() - pixel[1] * beta.sin();
                pixel[1] = s1;
                pixel[2] = s2;
            });

        self.pixels
    }
}

impl StokesImage<SensorFrame> {
    /// Rotate every Stokes vector into the meridian frame, in parallel.
    pub fn par_into_meridian_frame(self) -> StokesImage<MeridianFrame> {
        let dims = self.dims;
        StokesImage {
            dims,
            pixels: self.par_rotate(1.0),
            _phan: PhantomData,
        }
    }
}

impl StokesImage<MeridianFrame> {
    /// Rotate every Stokes vector back into the sensor frame, in
    /// parallel.
    pub fn par_into_sensor_frame(self) -> StokesImage<SensorFrame> {
        let dims = self.dims;
        StokesImage {
            dims,
            pixels: self.par_rotate(-1.0),
            _phan: PhantomData,
        }
    }

    /// Flatten the image into per-pixel measurements in row-major order.
    ///
    /// Estimators compare measurements against the sky model, so the
    /// conversion is only offered in the meridian frame.
    pub fn into_measurements(self) -> Vec<Measurement> {
        let width = self.dims.0;
        self.pixels
            .par_iter()
            .enumerate()
            .map(|(i, sv)| {
                let col = i as u32 % width;
                let row = i as u32 / width;
                let aop_deg = StokesVec::<MeridianFrame>::new(sv[0], sv[1], sv[2])
                    .aop()
                    .degrees();
                Measurement::new((col, row), aop_deg, sv_to_dop(sv))
            })
            .collect()
    }
}

fn sv_to_dop(sv: &[f64; 3]) -> f64 {
    if sv[0] == 0.0 {
        return 0.0;
    }

    (sv[1].powi(2) + sv[2].powi(2)).sqrt() / sv[0]
}

/// The polarization state measured (or simulated) at one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Column and row of the metapixel that measured the ray.
    pub pixel_location: (u32, u32),

    /// Angle of polarization in degrees on [-90, 90], meridian frame.
    pub aop_deg: f64,

    /// Degree of polarization. Measured values can exceed 1 under noise;
    /// clamp through [`Measurement::with_dop_max`].
    pub dop: f64,
}

impl Measurement {
    pub fn new(pixel_location: (u32, u32), aop_deg: f64, dop: f64) -> Self {
        Self {
            pixel_location,
            aop_deg,
            dop,
        }
    }

    /// Returns the measurement with its degree of polarization clamped to
    /// `max`.
    pub fn with_dop_max(mut self, max: f64) -> Self {
        self.dop = self.dop.clamp(0.0, max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// One metapixel: 90 and 135 on the top row, 45 and 0 below.
    fn mosaic(i000: u8, i045: u8, i090: u8, i135: u8) -> Vec<u8> {
        vec![i090, i135, i045, i000]
    }

    #[test]
    fn rejects_odd_dimensions() {
        let result = IntensityImage::from_bytes(3, 2, &[0; 6]);
        assert!(matches!(result, Err(SkypolError::InvalidImage(_))));
    }

    #[test]
    fn rejects_short_buffer() {
        let result = IntensityImage::from_bytes(4, 4, &[0; 15]);
        assert!(matches!(result, Err(SkypolError::InvalidImage(_))));
    }

    #[test]
    fn decodes_single_metapixel() {
        let bytes = mosaic(200, 100, 0, 100);
        let image = IntensityImage::from_bytes(2, 2, &bytes).unwrap();
        assert_eq!(image.dimensions(), (1, 1));

        let stokes = image.into_stokes_image();
        // s0 = 200, s1 = 200, s2 = 0: fully polarized at 0 degrees.
        assert_relative_eq!(stokes.aop_at((0, 0)).unwrap(), 0.0);
        assert_relative_eq!(stokes.dop_at((0, 0)).unwrap(), 1.0);
    }

    #[test]
    fn decodes_diagonal_polarization() {
        let bytes = mosaic(100, 200, 100, 0);
        let stokes = IntensityImage::from_bytes(2, 2, &bytes)
            .unwrap()
            .into_stokes_image();

        // s1 = 0, s2 = 200: e-vector at 45 degrees.
        assert_relative_eq!(stokes.aop_at((0, 0)).unwrap(), 45.0);
        assert_relative_eq!(stokes.dop_at((0, 0)).unwrap(), 1.0);
    }

    #[test]
    fn out_of_bounds_pixel_is_none() {
        let stokes = IntensityImage::from_bytes(2, 2, &mosaic(1, 1, 1, 1))
            .unwrap()
            .into_stokes_image();

        assert!(stokes.aop_at((1, 0)).is_none());
        assert!(stokes.dop_at((0, 1)).is_none());
    }

    #[test]
    fn frame_transform_roundtrips() {
        // 4x4 raw mosaic, 2x2 metapixels with varied intensities.
        let bytes: Vec<u8> = vec![
            10, 60, 20, 80, //
            30, 90, 40, 70, //
            50, 20, 60, 10, //
            70, 40, 80, 30,
        ];
        let reference: Vec<f64> = IntensityImage::from_bytes(4, 4, &bytes)
            .unwrap()
            .into_stokes_image()
            .par_aop_values();

        let roundtrip: Vec<f64> = IntensityImage::from_bytes(4, 4, &bytes)
            .unwrap()
            .into_stokes_image()
            .par_into_meridian_frame()
            .par_into_sensor_frame()
            .par_aop_values();

        for (a, b) in reference.iter().zip(roundtrip.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn measurements_preserve_order_and_location() {
        let bytes: Vec<u8> = (0..16).collect();
        let measurements = IntensityImage::from_bytes(4, 4, &bytes)
            .unwrap()
            .into_stokes_image()
            .par_into_meridian_frame()
            .into_measurements();

        assert_eq!(measurements.len(), 4);
        assert_eq!(measurements[0].pixel_location, (0, 0));
        assert_eq!(measurements[1].pixel_location, (1, 0));
        assert_eq!(measurements[2].pixel_location, (0, 1));
        assert_eq!(measurements[3].pixel_location, (1, 1));
    }

    #[test]
    fn dop_max_clamps() {
        let mm = Measurement::new((0, 0), 10.0, 0.9).with_dop_max(0.5);
        assert_relative_eq!(mm.dop, 0.5);
    }
}
