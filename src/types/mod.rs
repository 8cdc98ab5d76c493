//! Shared types for skypol

pub mod error;

pub use error::SkypolError;
