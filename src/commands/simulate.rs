//! Simulate the sky a configured camera would capture

use crate::camera::Camera;
use crate::config::cli::SimulateArgs;
use crate::plot::{write_matrix_dat, HeatmapScript};
use crate::render::{render_aop_png, render_dop_png, Jet};
use crate::sky::SkyModel;
use crate::types::SkypolError;
use indicatif::ProgressBar;
use std::fs;
use std::path::Path;
use tracing::info;

/// Run the simulate command.
pub fn run(args: &SimulateArgs) -> Result<(), SkypolError> {
    let scene = super::load_scene(&args.params)?;
    let model = SkyModel::from_position_and_time(&scene.position, scene.time)?;
    info!(
        solar_azimuth_deg = model.solar_azimuth_deg(),
        solar_zenith_deg = model.solar_zenith_deg(),
        "sky model ready"
    );

    let camera = Camera::new(&scene.camera, scene.pose, model);
    let (width, height) = scene.camera.sensor_size_px;

    let mut aop = Vec::with_capacity(scene.camera.num_pixels());
    let mut dop = Vec::with_capacity(scene.camera.num_pixels());

    // Row by row so the progress bar has something to count.
    let progress = ProgressBar::new(u64::from(height));
    for row in 0..height {
        let pixels: Vec<(u32, u32)> = (0..width).map(|col| (col, row)).collect();
        for measurement in camera.par_simulate_pixels(&pixels) {
            match measurement {
                Some(mm) => {
                    aop.push(mm.aop_deg);
                    dop.push(mm.dop);
                }
                // Below the horizon; render as neutral.
                None => {
                    aop.push(0.0);
                    dop.push(0.0);
                }
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    fs::create_dir_all(&args.out_dir)?;
    let aop_png = args.out_dir.join("aop.png");
    let dop_png = args.out_dir.join("dop.png");
    render_aop_png(&aop_png, (width, height), &aop, &Jet)?;
    render_dop_png(&dop_png, (width, height), &dop, args.dop_max, &Jet)?;
    println!("wrote {} and {}", aop_png.display(), dop_png.display());

    if args.plots {
        write_heatmap_plot(
            &args.out_dir,
            "aop",
            "simulated angle of polarization",
            (width, height),
            &aop,
            (-90.0, 90.0),
            "AoP (deg)",
        )?;
        write_heatmap_plot(
            &args.out_dir,
            "dop",
            "simulated degree of polarization",
            (width, height),
            &dop,
            (0.0, args.dop_max),
            "DoP",
        )?;
    }

    Ok(())
}

fn write_heatmap_plot(
    out_dir: &Path,
    stem: &str,
    title: &str,
    dims: (u32, u32),
    values: &[f64],
    color_range: (f64, f64),
    color_label: &str,
) -> Result<(), SkypolError> {
    let dat = out_dir.join(format!("{stem}.dat"));
    let script = out_dir.join(format!("{stem}.gp"));
    let eps = out_dir.join(format!("{stem}.eps"));

    let mut writer = fs::File::create(&dat)?;
    write_matrix_dat(&mut writer, dims, values)?;

    let heatmap = HeatmapScript::new(title, &dat, &eps)
        .with_dims(dims)
        .with_color_range(color_range.0, color_range.1, color_label);
    fs::write(&script, heatmap.render())?;

    println!("wrote {} and {}", dat.display(), script.display());
    Ok(())
}
