//! EPS to PDF conversion through an external formatter
//!
//! Plots render to EPS; publishing wants PDF. The conversion is delegated
//! to an external executable, `epstopdf` by default, overridable through
//! the `SKYPOL_FORMATTER` environment variable.

use crate::types::SkypolError;
use std::fs::File;
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Environment variable naming the formatter executable to run instead of
/// the default.
pub const FORMATTER_ENV: &str = "SKYPOL_FORMATTER";

const DEFAULT_FORMATTER: &str = "epstopdf";

/// Run the external formatter as `<formatter> -o <output> <input>` and
/// report its exit status.
///
/// The input file is checked before the formatter runs so that a missing
/// or unreadable file is reported by name rather than through the
/// formatter's own diagnostics.
///
/// # Errors
/// Returns `MissingInput` or `UnreadableInput` for a bad input path, or
/// `Io` if the formatter cannot be spawned.
pub fn format_to_pdf(input: &Path, output: &Path) -> Result<ExitStatus, SkypolError> {
    if !input.exists() {
        return Err(SkypolError::MissingInput {
            path: input.to_path_buf(),
        });
    }

    if File::open(input).is_err() {
        return Err(SkypolError::UnreadableInput {
            path: input.to_path_buf(),
        });
    }

    let formatter =
        std::env::var(FORMATTER_ENV).unwrap_or_else(|_| DEFAULT_FORMATTER.to_string());

    let status = Command::new(formatter)
        .arg("-o")
        .arg(output)
        .arg(input)
        .status()?;

    Ok(status)
}

/// Like [`format_to_pdf`], but treats a failing formatter as an error.
///
/// # Errors
/// Additionally returns `Formatter` if the formatter exits non-zero.
pub fn format_to_pdf_checked(input: &Path, output: &Path) -> Result<(), SkypolError> {
    let status = format_to_pdf(input, output)?;
    if !status.success() {
        return Err(SkypolError::Formatter { status });
    }

    Ok(())
}
