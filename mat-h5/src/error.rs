//! Error types for MAT reading and HDF5 conversion.
//!
//! This module provides the [`Error`] enum covering every fatal failure mode
//! of a conversion, along with a convenient [`Result`] type alias.
//! Per-entry flattening failures are not represented here: they are handled
//! inside the transcoder (see [`crate::FlattenError`]).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating, reading or converting MAT files.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source path does not exist.
    #[error("File or path does not exist: {}", path.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The source path exists but holds no convertible files.
    #[error("No valid .mat files found in the specified source: {}", path.display())]
    NoInput {
        /// The path that was scanned.
        path: PathBuf,
    },

    /// The file is not a well-formed MAT file.
    #[error("Invalid MAT file format: {reason}")]
    InvalidFormat {
        /// Description of the format error.
        reason: String,
    },

    /// The file is a MAT file of a flavour this reader does not handle.
    #[error("Unsupported MAT file: {reason}")]
    UnsupportedFormat {
        /// Description of the unsupported feature.
        reason: String,
    },

    /// Array data did not fit the declared dimensions.
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Two source entries map to the same destination dataset name.
    #[error("Dataset '{key}' already exists (second source entry: '{source_key}')")]
    DuplicateDataset {
        /// The mapped destination name.
        key: String,
        /// The source entry that collided.
        source_key: String,
    },

    /// Error reported by the HDF5 library.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}

impl Error {
    /// Create a NotFound error for the given path.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a NoInput error for the given path.
    pub fn no_input(path: impl Into<PathBuf>) -> Self {
        Self::NoInput { path: path.into() }
    }

    /// Create an InvalidFormat error with the given reason.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedFormat error with the given reason.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            reason: reason.into(),
        }
    }

    /// Create a DuplicateDataset error.
    pub fn duplicate_dataset(key: impl Into<String>, source_key: impl Into<String>) -> Self {
        Self::DuplicateDataset {
            key: key.into(),
            source_key: source_key.into(),
        }
    }

    /// Whether this error means no valid input could be located.
    ///
    /// These are reported to the user as a single line and end the run
    /// without a failure status.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoInput { .. })
    }
}
