//! False-color rendering of polarization images
//!
//! Maps per-pixel angle or degree of polarization onto a color ramp and
//! writes the result as a PNG.

use crate::types::SkypolError;
use image::ColorType;
use std::path::Path;

/// Maps a normalized value on [0, 1] to an RGB color.
pub trait ColorMap {
    /// Values outside [0, 1], including NaN, clamp to the nearest end of
    /// the ramp.
    fn to_rgb(&self, value: f64) -> [u8; 3];
}

/// The classic blue-cyan-yellow-red ramp.
pub struct Jet;

impl ColorMap for Jet {
    fn to_rgb(&self, value: f64) -> [u8; 3] {
        let value = clamp_unit(value);

        let channel = |center: f64| {
            let intensity = (1.5 - (4.0 * value - center).abs()).clamp(0.0, 1.0);
            (intensity * 255.0) as u8
        };

        [channel(3.0), channel(2.0), channel(1.0)]
    }
}

/// A plain black-to-white ramp.
pub struct Gray;

impl ColorMap for Gray {
    fn to_rgb(&self, value: f64) -> [u8; 3] {
        let level = (clamp_unit(value) * 255.0) as u8;
        [level, level, level]
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }

    value.clamp(0.0, 1.0)
}

/// Normalize an angle of polarization from [-90, 90] degrees onto [0, 1].
pub fn normalize_aop(aop_deg: f64) -> f64 {
    (aop_deg + 90.0) / 180.0
}

/// Normalize a degree of polarization onto [0, 1] against a `dop_max`
/// display ceiling.
pub fn normalize_dop(dop: f64, dop_max: f64) -> f64 {
    if dop_max <= 0.0 {
        return 0.0;
    }

    dop / dop_max
}

/// Render row-major angle-of-polarization values to a PNG at `path`.
///
/// # Errors
/// Returns `InvalidImage` if `values` does not match `dims`, or a codec
/// error from the PNG encoder.
pub fn render_aop_png<P: AsRef<Path>>(
    path: P,
    dims: (u32, u32),
    values: &[f64],
    map: &impl ColorMap,
) -> Result<(), SkypolError> {
    render_png(path, dims, values.iter().map(|&aop| normalize_aop(aop)), map)
}

/// Render row-major degree-of-polarization values to a PNG at `path`,
/// scaled against a `dop_max` display ceiling.
///
/// # Errors
/// Returns `InvalidImage` if `values` does not match `dims`, or a codec
/// error from the PNG encoder.
pub fn render_dop_png<P: AsRef<Path>>(
    path: P,
    dims: (u32, u32),
    values: &[f64],
    dop_max: f64,
    map: &impl ColorMap,
) -> Result<(), SkypolError> {
    render_png(
        path,
        dims,
        values.iter().map(|&dop| normalize_dop(dop, dop_max)),
        map,
    )
}

fn render_png<P: AsRef<Path>>(
    path: P,
    dims: (u32, u32),
    normalized: impl ExactSizeIterator<Item = f64>,
    map: &impl ColorMap,
) -> Result<(), SkypolError> {
    let expected = dims.0 as usize * dims.1 as usize;
    if normalized.len() != expected {
        return Err(SkypolError::InvalidImage(format!(
            "{} values cannot fill a {}x{} render",
            normalized.len(),
            dims.0,
            dims.1
        )));
    }

    let buffer: Vec<u8> = normalized.flat_map(|value| map.to_rgb(value)).collect();
    image::save_buffer(path, &buffer, dims.0, dims.1, ColorType::Rgb8)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_runs_blue_to_red() {
        let [r, _, b] = Jet.to_rgb(0.0);
        assert!(b > r);

        let [r, _, b] = Jet.to_rgb(1.0);
        assert!(r > b);

        let [_, g, _] = Jet.to_rgb(0.5);
        assert_eq!(g, 255);
    }

    #[test]
    fn jet_clamps_out_of_range_input() {
        assert_eq!(Jet.to_rgb(-2.0), Jet.to_rgb(0.0));
        assert_eq!(Jet.to_rgb(7.0), Jet.to_rgb(1.0));
        assert_eq!(Jet.to_rgb(f64::NAN), Jet.to_rgb(0.0));
    }

    #[test]
    fn gray_is_linear_in_intensity() {
        assert_eq!(Gray.to_rgb(0.0), [0, 0, 0]);
        assert_eq!(Gray.to_rgb(1.0), [255, 255, 255]);
        assert_eq!(Gray.to_rgb(0.5), [127, 127, 127]);
    }

    #[test]
    fn aop_normalization_spans_the_ramp() {
        assert_eq!(normalize_aop(-90.0), 0.0);
        assert_eq!(normalize_aop(0.0), 0.5);
        assert_eq!(normalize_aop(90.0), 1.0);
    }

    #[test]
    fn dop_normalization_respects_the_ceiling() {
        assert_eq!(normalize_dop(0.4, 0.8), 0.5);
        assert_eq!(normalize_dop(0.5, 0.0), 0.0);
    }

    #[test]
    fn renders_png_to_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("aop.png");

        let values = vec![-90.0, -45.0, 0.0, 45.0, 90.0, 30.0];
        render_aop_png(&path, (3, 2), &values, &Jet).expect("render succeeds");

        let reloaded = image::open(&path).expect("written image reopens");
        assert_eq!(reloaded.width(), 3);
        assert_eq!(reloaded.height(), 2);
    }

    #[test]
    fn rejects_mismatched_value_count() {
        let result = render_dop_png("unused.png", (4, 4), &[0.5; 3], 1.0, &Gray);
        assert!(matches!(result, Err(SkypolError::InvalidImage(_))));
    }
}
