//! Print the default scene parameters

use crate::config::SceneParams;
use crate::types::SkypolError;

/// Dump the default scene as JSON, ready to edit and feed back through
/// `--params`.
pub fn run() -> Result<(), SkypolError> {
    println!("{}", SceneParams::default().to_json()?);
    Ok(())
}
