//! Estimate camera orientation from raw captures

use crate::camera::Pose;
use crate::config::cli::{EstimateArgs, Method};
use crate::estimate::{Estimator, HoughEstimator, PatternMatch, VecSearch};
use crate::image::IntensityImage;
use crate::plot::{write_histogram_dat, HistogramScript};
use crate::sky::SkyModel;
use crate::types::SkypolError;
use indicatif::ProgressBar;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the estimate command.
///
/// Writes one CSV row per input capture, in the order the captures were
/// given.
pub fn run(args: &EstimateArgs) -> Result<(), SkypolError> {
    let scene = super::load_scene(&args.params)?;
    let model = SkyModel::from_position_and_time(&scene.position, scene.time)?;
    info!(
        solar_azimuth_deg = model.solar_azimuth_deg(),
        solar_zenith_deg = model.solar_zenith_deg(),
        num_inputs = args.inputs.len(),
        "estimating orientations"
    );

    let mut writer: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    writeln!(
        writer,
        "image_file_stem,timestamp,sequence_number,roll,pitch,yaw,loss"
    )?;

    let progress = ProgressBar::new(args.inputs.len() as u64);
    for (sequence_number, input) in args.inputs.iter().enumerate() {
        let raw = super::read_mosaic(input)?;
        let (width, height) = raw.dimensions();
        let stokes = IntensityImage::from_bytes(width, height, raw.as_raw())?
            .into_stokes_image()
            .par_into_meridian_frame();
        let dims = stokes.dimensions();
        let measurements = stokes.into_measurements();

        let (pose, loss) = match args.method {
            Method::Hough => {
                let estimator = HoughEstimator::new(dims)
                    .with_resolution_deg(args.resolution)
                    .with_aop_threshold_deg(args.aop_threshold)
                    .with_dop_min(args.dop_min);

                if let Some(histogram) = &args.histogram {
                    let accumulator = estimator.accumulate(&measurements)?;
                    write_histogram(histogram, sequence_number, args, accumulator.bins())?;
                }

                let yaw_deg = estimator.estimate(&measurements)?;
                // The Hough estimator only recovers yaw; a level camera is
                // assumed.
                (Pose::new(0.0, 0.0, yaw_deg), 0.0)
            }
            Method::Pattern => {
                let matcher =
                    PatternMatch::new(scene.camera, model, VecSearch::yaw_sweep(args.yaw_step))
                        .with_dop_min(args.dop_min);
                let estimate = matcher.estimate(&measurements)?;
                (estimate.pose, estimate.loss)
            }
        };

        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        writeln!(
            writer,
            "{},{},{},{:010.2},{:010.2},{:010.2},{:010.2}",
            stem,
            scene.time.to_rfc3339(),
            sequence_number,
            pose.roll_deg,
            pose.pitch_deg,
            pose.yaw_deg,
            loss
        )?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(())
}

/// Write the vote histogram data file plus a matching gnuplot script.
/// With several inputs the sequence number lands in the file names.
fn write_histogram(
    base: &Path,
    sequence_number: usize,
    args: &EstimateArgs,
    bins: impl Iterator<Item = (f64, u32)>,
) -> Result<(), SkypolError> {
    let stem = base
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "votes".to_string());
    let stem = if args.inputs.len() > 1 {
        format!("{stem}-{sequence_number}")
    } else {
        stem
    };

    let dir = base.parent().unwrap_or_else(|| Path::new("."));
    let dat = dir.join(format!("{stem}.dat"));
    let script = dir.join(format!("{stem}.gp"));
    let eps: PathBuf = dir.join(format!("{stem}.eps"));

    let mut writer = fs::File::create(&dat)?;
    write_histogram_dat(&mut writer, bins)?;

    let histogram = HistogramScript::new("solar meridian votes", &dat, &eps)
        .with_box_width(args.resolution);
    fs::write(&script, histogram.render())?;

    Ok(())
}
