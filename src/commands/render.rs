//! Decode a raw capture into false-color polarization images

use crate::config::cli::RenderArgs;
use crate::image::IntensityImage;
use crate::render::{render_aop_png, render_dop_png, Jet};
use crate::types::SkypolError;
use std::fs;
use tracing::info;

/// Run the render command.
pub fn run(args: &RenderArgs) -> Result<(), SkypolError> {
    let raw = super::read_mosaic(&args.input)?;
    let (width, height) = raw.dimensions();
    info!(width, height, "decoding mosaic");

    let stokes = IntensityImage::from_bytes(width, height, raw.as_raw())?.into_stokes_image();
    let dims = stokes.dimensions();

    let (aop, dop) = if args.sensor_frame {
        (stokes.par_aop_values(), stokes.par_dop_values())
    } else {
        let meridian = stokes.par_into_meridian_frame();
        (meridian.par_aop_values(), meridian.par_dop_values())
    };

    let stem = args
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string());

    fs::create_dir_all(&args.out_dir)?;
    let aop_png = args.out_dir.join(format!("{stem}_aop.png"));
    let dop_png = args.out_dir.join(format!("{stem}_dop.png"));
    render_aop_png(&aop_png, dims, &aop, &Jet)?;
    render_dop_png(&dop_png, dims, &dop, args.dop_max, &Jet)?;

    println!("wrote {} and {}", aop_png.display(), dop_png.display());
    Ok(())
}
