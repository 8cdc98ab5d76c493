//! Hough-transform heading estimation
//!
//! Along the solar meridian the angle of polarization is orthogonal to the
//! meridian plane, so pixels measuring close to +/-90 degrees trace a line
//! through the zenith pixel. Each such pixel votes for the line angle it
//! lies on; the most-voted bin gives the sun's direction in the image and
//! therefore the camera's yaw.

use crate::estimate::Estimator;
use crate::image::Measurement;
use crate::light::{Aop, MeridianFrame};
use crate::types::SkypolError;
use std::ops::RangeInclusive;

/// Accumulates line-angle votes into bins over [-90, 90] degrees.
pub struct Accumulator {
    resolution_deg: f64,
    range: RangeInclusive<f64>,
    bins: Vec<u32>,
}

impl Accumulator {
    /// Create an accumulator with `resolution_deg` degrees per bin.
    ///
    /// # Errors
    /// Returns `Config` if the resolution is not on (0, 180].
    pub fn new(resolution_deg: f64) -> Result<Self, SkypolError> {
        if !(resolution_deg > 0.0 && resolution_deg <= 180.0) {
            return Err(SkypolError::Config(format!(
                "accumulator resolution must be on (0, 180]: {resolution_deg}"
            )));
        }

        let num_bins = (180.0 / resolution_deg).ceil() as usize;
        Ok(Self {
            resolution_deg,
            range: -90.0..=90.0,
            bins: vec![0; num_bins],
        })
    }

    /// Record a vote for `angle_deg`. Votes outside [-90, 90], including
    /// NaN, are discarded.
    pub fn vote(&mut self, angle_deg: f64) {
        if !self.range.contains(&angle_deg) {
            return;
        }

        let index = ((angle_deg - self.range.start()) / self.resolution_deg) as usize;
        // The top of the range falls exactly on the upper edge of the last
        // bin.
        let index = index.min(self.bins.len() - 1);
        self.bins[index] += 1;
    }

    /// Bin centers in degrees with their vote counts, ascending.
    pub fn bins(&self) -> impl Iterator<Item = (f64, u32)> + '_ {
        self.bins.iter().enumerate().map(|(i, &count)| {
            (
                self.range.start() + (i as f64 + 0.5) * self.resolution_deg,
                count,
            )
        })
    }

    /// The center of the most-voted bin in degrees.
    ///
    /// # Errors
    /// Returns `EmptySearch` if no votes were recorded.
    pub fn winner(&self) -> Result<f64, SkypolError> {
        let (center, count) = self
            .bins()
            .max_by(|(_, a), (_, b)| a.cmp(b))
            .ok_or_else(|| SkypolError::EmptySearch("accumulator has no bins".to_string()))?;

        if count == 0 {
            return Err(SkypolError::EmptySearch(
                "no measurements voted in the accumulator".to_string(),
            ));
        }

        Ok(center)
    }
}

/// Estimates the camera's yaw from the solar meridian line.
pub struct HoughEstimator {
    image_dims: (u32, u32),
    aop_threshold_deg: f64,
    dop_min: f64,
    resolution_deg: f64,
}

impl HoughEstimator {
    /// Create an estimator for measurements from an image of `image_dims`
    /// metapixels. The zenith pixel is assumed at the image center, which
    /// holds for a level camera.
    pub fn new(image_dims: (u32, u32)) -> Self {
        Self {
            image_dims,
            aop_threshold_deg: 1.0,
            dop_min: 0.3,
            resolution_deg: 1.0,
        }
    }

    /// Only count pixels whose angle of polarization is within
    /// `threshold_deg` of +/-90 degrees.
    pub fn with_aop_threshold_deg(mut self, threshold_deg: f64) -> Self {
        self.aop_threshold_deg = threshold_deg;
        self
    }

    /// Only count pixels with at least `dop_min` degree of polarization.
    pub fn with_dop_min(mut self, dop_min: f64) -> Self {
        self.dop_min = dop_min;
        self
    }

    /// Bin width of the vote accumulator in degrees.
    pub fn with_resolution_deg(mut self, resolution_deg: f64) -> Self {
        self.resolution_deg = resolution_deg;
        self
    }

    /// Collect line-angle votes from `measurements` without picking a
    /// winner. Useful for exporting the vote histogram.
    ///
    /// # Errors
    /// Returns `Config` if the accumulator resolution is invalid.
    pub fn accumulate(&self, measurements: &[Measurement]) -> Result<Accumulator, SkypolError> {
        let mut accumulator = Accumulator::new(self.resolution_deg)?;
        let orthogonal = Aop::<MeridianFrame>::from_degrees_wrapped(90.0);
        let center = (
            f64::from(self.image_dims.0) / 2.0,
            f64::from(self.image_dims.1) / 2.0,
        );

        let votes = measurements
            .iter()
            .filter(|mm| mm.dop >= self.dop_min)
            .filter(|mm| {
                Aop::<MeridianFrame>::from_degrees_wrapped(mm.aop_deg)
                    .in_threshold(&orthogonal, self.aop_threshold_deg)
            })
            .map(|mm| {
                let x = f64::from(mm.pixel_location.0) - center.0;
                // Rows grow downward; flip into a y-up line angle.
                let y = (f64::from(mm.pixel_location.1) - center.1) * -1.0;
                (y / x).atan().to_degrees()
            });

        for angle_deg in votes {
            accumulator.vote(angle_deg);
        }

        Ok(accumulator)
    }
}

impl Estimator for HoughEstimator {
    /// Yaw of the camera in degrees on [-90, 90], relative to the solar
    /// azimuth.
    type Output = f64;

    fn estimate(&self, measurements: &[Measurement]) -> Result<Self::Output, SkypolError> {
        self.accumulate(measurements)?.winner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pixels along an exact integer direction `(dx, dy)` through the
    /// center of a 100x100 image, measuring an orthogonal e-vector with a
    /// strong degree. `dy` counts upward, rows count downward.
    fn meridian_line_measurements(dx: u32, dy: u32) -> Vec<Measurement> {
        (1..20)
            .flat_map(|t| {
                [
                    (50 + t * dx, 50 - t * dy),
                    (50 - t * dx, 50 + t * dy),
                ]
            })
            .map(|pixel| Measurement::new(pixel, 90.0, 0.8))
            .collect()
    }

    #[test]
    fn accumulator_rejects_bad_resolution() {
        assert!(Accumulator::new(0.0).is_err());
        assert!(Accumulator::new(-1.0).is_err());
        assert!(Accumulator::new(181.0).is_err());
    }

    #[test]
    fn accumulator_discards_out_of_range_votes() {
        let mut accumulator = Accumulator::new(1.0).unwrap();
        accumulator.vote(95.0);
        accumulator.vote(-90.5);
        accumulator.vote(f64::NAN);

        assert!(matches!(
            accumulator.winner(),
            Err(SkypolError::EmptySearch(_))
        ));
    }

    #[test]
    fn accumulator_picks_the_heaviest_bin() {
        let mut accumulator = Accumulator::new(1.0).unwrap();
        accumulator.vote(45.2);
        accumulator.vote(45.4);
        accumulator.vote(-10.0);

        assert_eq!(accumulator.winner().unwrap(), 45.5);
    }

    #[test]
    fn recovers_line_angle_from_clean_measurements() {
        let estimator = HoughEstimator::new((100, 100));
        let yaw = estimator
            .estimate(&meridian_line_measurements(1, 1))
            .unwrap();

        assert!((yaw - 45.0).abs() <= 1.0);
    }

    #[test]
    fn filters_weak_and_off_angle_measurements() {
        // atan(1/2) = 26.57 degrees.
        let mut measurements = meridian_line_measurements(2, 1);
        // Off-angle AoP and weak DoP votes along other lines must not
        // steal the election.
        for t in 1..45 {
            measurements.push(Measurement::new((50 + t, 50), 40.0, 0.9));
            measurements.push(Measurement::new((50, 50 + t), 90.0, 0.1));
        }

        let yaw = HoughEstimator::new((100, 100))
            .with_dop_min(0.5)
            .estimate(&measurements)
            .unwrap();

        assert!((yaw - 26.57).abs() <= 1.0);
    }

    #[test]
    fn empty_measurements_are_an_error() {
        let estimator = HoughEstimator::new((100, 100));
        assert!(matches!(
            estimator.estimate(&[]),
            Err(SkypolError::EmptySearch(_))
        ));
    }
}
