//! CLI command implementations

pub mod estimate;
pub mod params;
pub mod render;
pub mod simulate;

use crate::config::SceneParams;
use crate::types::SkypolError;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load scene parameters from `path`, or the built-in defaults when no
/// file was given.
fn load_scene(path: &Option<PathBuf>) -> Result<SceneParams, SkypolError> {
    match path {
        Some(path) => SceneParams::load(path),
        None => Ok(SceneParams::default()),
    }
}

/// Open a raw capture as an 8-bit grayscale mosaic.
///
/// The path is checked up front so a missing or locked file is reported
/// by name instead of through the decoder.
fn read_mosaic(path: &Path) -> Result<::image::GrayImage, SkypolError> {
    if !path.exists() {
        return Err(SkypolError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    if File::open(path).is_err() {
        return Err(SkypolError::UnreadableInput {
            path: path.to_path_buf(),
        });
    }

    Ok(::image::open(path)?.to_luma8())
}
