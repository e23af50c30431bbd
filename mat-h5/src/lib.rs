//! # mat-h5
//!
//! Convert MATLAB Level 5 `.mat` files into HDF5 files.
//!
//! Every variable of a MAT file becomes a dataset at the root of an HDF5
//! file. Dataset names are the variable names with any trailing digits
//! removed (`songVoltage12` → `songVoltage`). Numeric arrays keep their
//! shape and type, text becomes fixed-width byte strings, and cell arrays
//! of strings become one-dimensional byte-string arrays.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "hdf5")]
//! use mat_h5::{convert_file, select_sources, Result, Transcoder};
//!
//! # #[cfg(feature = "hdf5")]
//! fn convert_recordings() -> Result<()> {
//!     let transcoder = Transcoder::default();
//!
//!     for source in select_sources("recordings")? {
//!         let output = format!("hdf5/{}", source.output_file_name());
//!         let report = convert_file(&source.container, &output, &transcoder)?;
//!         println!("{}: {} datasets", source.name, report.written());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Conversion Rules
//!
//! | Source value | Destination dataset |
//! |--------------|---------------------|
//! | numeric array | same shape, same element type |
//! | complex array | compound `{r, i}` |
//! | single-line char array | scalar fixed-width string |
//! | `Nx1` cell of single-line strings | `N` fixed-width strings |
//! | anything else | skipped |
//!
//! The reserved entries `__header__`, `__version__` and `__globals__` are
//! never converted. A cell array that does not hold one string per row is
//! dropped with a warning; the rest of the file is still converted.
//!
//! ## Feature Flags
//!
//! - `hdf5` (default): HDF5 output through the `hdf5` crate
//! - `static-hdf5`: Build libhdf5 from source
//! - `test-fixtures`: [`mat::fixture::MatBuilder`] for writing MAT test files

#![deny(missing_docs)]

// Modules
mod container;
mod dataset;
mod error;
pub mod mat;
pub mod select;
pub mod transcode;
#[cfg(feature = "hdf5")]
mod writer;

// Public exports
pub use container::{Container, GLOBALS_KEY, HEADER_KEY, RESERVED_KEYS, VERSION_KEY};
pub use dataset::{DatasetKind, DatasetSink, DatasetValue, FixedBytes, MemorySink, StoredDataset};
pub use error::{Error, Result};
pub use mat::{MatFile, MatValue};
pub use select::{select_sources, SourceFile};
pub use transcode::{
    classify, flatten_text_cells, strip_digit_suffix, EntryKind, EntryOutcome, EntryReport,
    FlattenError, TranscodeConfig, TranscodeReport, Transcoder,
};

#[cfg(feature = "hdf5")]
pub use writer::{convert_file, Hdf5Writer};
