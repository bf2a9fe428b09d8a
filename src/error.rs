//! Error handling for the goniovis-rs engine
//!
//! This module defines custom error types and a Result alias for use
//! throughout the crate.

use thiserror::Error;

/// Main error type for goniovis-rs operations
#[derive(Error, Debug)]
pub enum GonioError {
    /// An unknown landmark identity crossed a string boundary
    /// (export keys, config fields). Inside the crate the `LandmarkId`
    /// enum makes this unrepresentable.
    #[error("Invalid landmark id: {0}")]
    InvalidLandmarkId(String),

    /// Patient/examination code failed validation (1 to 10 ASCII digits)
    #[error("Invalid patient code: {0}")]
    PatientCode(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to export serialization or delivery
    #[error("Export error: {0}")]
    Export(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for goniovis-rs operations
pub type Result<T> = std::result::Result<T, GonioError>;
