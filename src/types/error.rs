//! Error types for skypol

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Error types for skypol operations
#[derive(Debug, Error)]
pub enum SkypolError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or parameter file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Raw image does not describe a valid polarizer mosaic
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Angle of polarization outside [-90, 90] degrees
    #[error("angle of polarization out of range [-90, 90]: {angle_deg}")]
    AngleOutOfRange { angle_deg: f64 },

    /// Degree of polarization outside [0, 1]
    #[error("degree of polarization out of range [0, 1]: {degree}")]
    DegreeOutOfRange { degree: f64 },

    /// An estimator was given nothing to choose from
    #[error("estimator search space is empty: {0}")]
    EmptySearch(String),

    /// Input file does not exist
    #[error("input file not found: {path}")]
    MissingInput { path: PathBuf },

    /// Input file exists but cannot be opened for reading
    #[error("input file not readable: {path}")]
    UnreadableInput { path: PathBuf },

    /// The external plot formatter exited with a failure status
    #[error("plot formatter failed: {status}")]
    Formatter { status: ExitStatus },

    /// PNG encode/decode failure
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    /// Parameter file parse failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SkypolError {
    /// Check if this error was caused by bad user input rather than IO
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            SkypolError::Config(_)
                | SkypolError::InvalidImage(_)
                | SkypolError::AngleOutOfRange { .. }
                | SkypolError::DegreeOutOfRange { .. }
        )
    }

    /// Check if this error concerns a missing or unreadable input file
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SkypolError::MissingInput { .. } | SkypolError::UnreadableInput { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_automatic_conversion() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let error: SkypolError = io_error.into();

        assert!(matches!(error, SkypolError::Io(_)));
        assert!(error.to_string().contains("IO error"));
    }

    #[test]
    fn test_config_error() {
        let error = SkypolError::Config("pixel size must be positive".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.is_validation_error());
    }

    #[test]
    fn test_angle_out_of_range() {
        let error = SkypolError::AngleOutOfRange { angle_deg: 137.2 };
        assert!(error.to_string().contains("137.2"));
        assert!(error.is_validation_error());
    }

    #[test]
    fn test_missing_input() {
        let error = SkypolError::MissingInput {
            path: PathBuf::from("/no/such/file.eps"),
        };
        assert!(error.to_string().contains("not found"));
        assert!(error.to_string().contains("/no/such/file.eps"));
        assert!(error.is_input_error());
        assert!(!error.is_validation_error());
    }

    #[test]
    fn test_unreadable_input() {
        let error = SkypolError::UnreadableInput {
            path: PathBuf::from("locked.eps"),
        };
        assert!(error.to_string().contains("not readable"));
        assert!(error.is_input_error());
    }

    #[test]
    fn test_result_propagation() {
        fn inner() -> Result<(), SkypolError> {
            Err(SkypolError::EmptySearch("no poses".to_string()))
        }

        fn outer() -> Result<(), SkypolError> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer().unwrap_err(), SkypolError::EmptySearch(_)));
    }
}
