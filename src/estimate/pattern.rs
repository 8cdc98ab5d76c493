//! Pattern-match pose estimation
//!
//! Simulates the sky a camera would see at a candidate pose and scores the
//! candidate by how far the simulated angle-of-polarization pattern lies
//! from the measured one. The search strategy over candidates is pluggable
//! through [`PoseSearch`].

use crate::camera::{Camera, CameraParams, Pose};
use crate::estimate::Estimator;
use crate::image::Measurement;
use crate::light::{Aop, MeridianFrame};
use crate::sky::SkyModel;
use crate::types::SkypolError;
use rand::distr::{Distribution, Uniform};
use rayon::prelude::*;

/// A scored candidate pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate {
    pub pose: Pose,

    /// Mean weighted squared angle-of-polarization error in square
    /// degrees. Lower is better.
    pub loss: f64,
}

impl Estimate {
    pub fn new(pose: Pose, loss: f64) -> Self {
        Self { pose, loss }
    }

    /// The estimate with the lower loss, preferring `self` on ties.
    pub fn min(self, other: Self) -> Self {
        if other.loss < self.loss {
            other
        } else {
            self
        }
    }
}

/// A strategy for picking candidate poses to score.
///
/// `loss` returns `None` when a pose cannot be scored, e.g. when every
/// measured pixel would look below the horizon.
pub trait PoseSearch {
    fn run<F>(&self, loss: F) -> Result<Estimate, SkypolError>
    where
        F: Fn(&Pose) -> Option<f64> + Sync;
}

/// Scores an explicit list of candidate poses.
pub struct VecSearch {
    candidates: Vec<Pose>,
}

impl VecSearch {
    pub fn new(candidates: Vec<Pose>) -> Self {
        Self { candidates }
    }

    /// Candidates with yaw stepped over [0, 360) degrees and level roll
    /// and pitch.
    pub fn yaw_sweep(step_deg: f64) -> Self {
        let mut candidates = Vec::new();
        let mut yaw_deg = 0.0;
        while yaw_deg < 360.0 {
            candidates.push(Pose::new(0.0, 0.0, yaw_deg));
            yaw_deg += step_deg;
        }

        Self { candidates }
    }
}

impl PoseSearch for VecSearch {
    fn run<F>(&self, loss: F) -> Result<Estimate, SkypolError>
    where
        F: Fn(&Pose) -> Option<f64> + Sync,
    {
        self.candidates
            .par_iter()
            .filter_map(|pose| loss(pose).map(|loss| Estimate::new(*pose, loss)))
            .reduce_with(Estimate::min)
            .ok_or_else(|| {
                SkypolError::EmptySearch("no scorable candidate poses".to_string())
            })
    }
}

/// Random search that halves its sampling window around the best pose
/// found after each epoch.
pub struct RandomSearch {
    center: Pose,
    span: Pose,
    samples_per_epoch: usize,
    epochs: usize,
}

impl RandomSearch {
    /// Search `epochs` rounds of `samples_per_epoch` poses drawn uniformly
    /// from `center +/- span`.
    ///
    /// # Errors
    /// Returns `Config` if any span component is not positive or no
    /// samples were requested.
    pub fn new(
        center: Pose,
        span: Pose,
        samples_per_epoch: usize,
        epochs: usize,
    ) -> Result<Self, SkypolError> {
        if span.roll_deg <= 0.0 || span.pitch_deg <= 0.0 || span.yaw_deg <= 0.0 {
            return Err(SkypolError::Config(format!(
                "search spans must be positive: {span:?}"
            )));
        }

        if samples_per_epoch == 0 || epochs == 0 {
            return Err(SkypolError::Config(
                "random search needs at least one sample and one epoch".to_string(),
            ));
        }

        Ok(Self {
            center,
            span,
            samples_per_epoch,
            epochs,
        })
    }
}

impl PoseSearch for RandomSearch {
    fn run<F>(&self, loss: F) -> Result<Estimate, SkypolError>
    where
        F: Fn(&Pose) -> Option<f64> + Sync,
    {
        let mut rng = rand::rng();
        let mut best = loss(&self.center).map(|loss| Estimate::new(self.center, loss));
        let mut span: (f64, f64, f64) = self.span.into();

        for _ in 0..self.epochs {
            let center = best.map_or(self.center, |estimate| estimate.pose);
            let low = Pose::new(
                center.roll_deg - span.0,
                center.pitch_deg - span.1,
                center.yaw_deg - span.2,
            );
            let high = Pose::new(
                center.roll_deg + span.0,
                center.pitch_deg + span.1,
                center.yaw_deg + span.2,
            );
            let uniform = Uniform::new(low, high)
                .map_err(|e| SkypolError::Config(format!("sampling bounds: {e}")))?;

            let samples: Vec<Pose> = (0..self.samples_per_epoch)
                .map(|_| uniform.sample(&mut rng))
                .collect();

            let epoch_best = samples
                .par_iter()
                .filter_map(|pose| loss(pose).map(|loss| Estimate::new(*pose, loss)))
                .reduce_with(Estimate::min);

            best = match (best, epoch_best) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };

            span = (span.0 / 2.0, span.1 / 2.0, span.2 / 2.0);
        }

        best.ok_or_else(|| {
            SkypolError::EmptySearch("no scorable pose in any epoch".to_string())
        })
    }
}

/// Estimates the full camera pose by matching measurements against
/// simulated skies.
pub struct PatternMatch<S: PoseSearch> {
    params: CameraParams,
    model: SkyModel,
    search: S,
    dop_min: f64,
}

impl<S: PoseSearch> PatternMatch<S> {
    pub fn new(params: CameraParams, model: SkyModel, search: S) -> Self {
        Self {
            params,
            model,
            search,
            dop_min: 0.1,
        }
    }

    /// Ignore measurements below `dop_min`. Weakly polarized pixels carry
    /// noisy angles and their weights diverge.
    pub fn with_dop_min(mut self, dop_min: f64) -> Self {
        self.dop_min = dop_min;
        self
    }

    /// Mean weighted squared angle difference between `measurements` and
    /// the sky simulated at `pose`.
    ///
    /// Each pixel's squared difference is divided by the measured degree
    /// of polarization. Returns `None` if no measurement can be compared,
    /// e.g. when the pose turns every pixel below the horizon.
    fn loss(&self, pose: &Pose, measurements: &[Measurement]) -> Option<f64> {
        let camera = Camera::new(&self.params, *pose, self.model);

        let (sum, count) = measurements
            .iter()
            .filter_map(|mm| {
                let simulated = camera.simulate_pixel(&mm.pixel_location)?;
                let measured = Aop::<MeridianFrame>::from_degrees_wrapped(mm.aop_deg);
                let modeled = Aop::<MeridianFrame>::from_degrees_wrapped(simulated.aop_deg);
                let diff = measured.distance(&modeled);

                Some(diff.powi(2) / mm.dop)
            })
            .fold((0.0, 0u32), |(sum, count), term| (sum + term, count + 1));

        if count == 0 {
            return None;
        }

        Some(sum / f64::from(count))
    }
}

impl<S: PoseSearch + Sync> Estimator for PatternMatch<S> {
    type Output = Estimate;

    fn estimate(&self, measurements: &[Measurement]) -> Result<Self::Output, SkypolError> {
        let usable: Vec<Measurement> = measurements
            .iter()
            .filter(|mm| mm.dop >= self.dop_min && mm.dop > 0.0)
            .copied()
            .collect();

        if usable.is_empty() {
            return Err(SkypolError::EmptySearch(
                "no measurement passes the degree-of-polarization cutoff".to_string(),
            ));
        }

        self.search.run(|pose| self.loss(pose, &usable))
    }
}
