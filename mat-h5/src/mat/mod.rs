//! MATLAB Level 5 MAT file reading.
//!
//! This module decodes `.mat` files into [`MatValue`]s. It is the source
//! side of the conversion: [`MatFile::into_container`] turns a file into the
//! [`Container`](crate::Container) handed to the transcoder.
//!
//! # Overview
//!
//! - [`MatFile`] - Loads a file and lists its variables
//! - [`MatValue`] - One decoded variable
//! - [`NumericArray`], [`CharArray`], [`CellArray`] - The decoded variants
//!
//! # Example
//!
//! ```no_run
//! use mat_h5::MatFile;
//!
//! let mat = MatFile::open("song01_Imputed.mat")?;
//! println!("{}", mat.describe());
//!
//! let container = mat.into_container();
//! println!("{} entries", container.len());
//! # Ok::<(), mat_h5::Error>(())
//! ```
//!
//! # Not Supported
//!
//! - HDF5-based v7.3 files
//! - Level 4 files
//! - Decoding of structs, sparse matrices, objects and function handles

mod file;
mod parse;
mod value;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixture;

pub use file::{MatFile, HEADER_LEN};
pub use parse::{Endian, Variable};
pub use value::{CellArray, CharArray, MatClass, MatValue, NumericArray, NumericData};

pub(crate) use value::with_numeric;
