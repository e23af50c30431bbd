//! MAT file loading and variable listing.
//!
//! This module provides [`MatFile`], a reader for Level 5 MAT files
//! (MATLAB v5 through v7, compressed or not).

use std::fs;
use std::path::Path;

use super::parse::{read_variables, Endian, Variable};
use super::value::{CellArray, MatValue};
use crate::container::{Container, GLOBALS_KEY, HEADER_KEY, VERSION_KEY};
use crate::error::{Error, Result};

/// Length of the fixed Level 5 header.
pub const HEADER_LEN: usize = 128;

const HEADER_TEXT_LEN: usize = 116;
const HDF5_SIGNATURE: &[u8] = b"\x89HDF\r\n\x1a\n";

/// A loaded MAT file.
///
/// Variables keep the order in which they appear in the file.
///
/// # Supported Formats
///
/// - Level 5 MAT files (MATLAB v5, v6, v7)
/// - v7 compressed variables (zlib)
/// - Numeric arrays of every class, complex and logical
/// - Character arrays
/// - Cell arrays (recursively)
///
/// # Unsupported
///
/// - Level 4 MAT files (legacy format)
/// - HDF5-based v7.3 files
/// - Structs, sparse matrices, objects and function handles are read past
///   and reported as [`MatValue::Unsupported`]
///
/// # Example
///
/// ```no_run
/// use mat_h5::MatFile;
///
/// let mat = MatFile::open("song01_Imputed.mat")?;
///
/// for name in mat.variable_names() {
///     println!("Variable: {}", name);
/// }
/// # Ok::<(), mat_h5::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MatFile {
    header_text: String,
    version: u16,
    endian: Endian,
    variables: Vec<Variable>,
    path: String,
}

impl MatFile {
    /// Open and parse a MAT file.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::InvalidFormat`] if the file is not a valid MAT file
    /// - [`Error::UnsupportedFormat`] for Level 4 and v7.3 files
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let bytes = fs::read(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open MAT file '{}': {}", path_str, e),
            ))
        })?;

        let mut mat = Self::parse(&bytes).map_err(|e| match e {
            Error::InvalidFormat { reason } => {
                Error::invalid_format(format!("'{}': {}", path_str, reason))
            }
            Error::UnsupportedFormat { reason } => {
                Error::unsupported(format!("'{}': {}", path_str, reason))
            }
            other => other,
        })?;
        mat.path = path_str;

        tracing::debug!(path = %mat.path, variables = mat.len(), "loaded MAT file");
        Ok(mat)
    }

    /// Parse MAT file contents held in memory.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() >= HEADER_TEXT_LEN && bytes.starts_with(b"MATLAB 7.3") {
            return Err(Error::unsupported(
                "v7.3 (HDF5-based) MAT files are not supported",
            ));
        }
        if bytes.len() >= 512 + HDF5_SIGNATURE.len() && &bytes[512..520] == HDF5_SIGNATURE {
            return Err(Error::unsupported(
                "v7.3 (HDF5-based) MAT files are not supported",
            ));
        }
        if bytes.len() < HEADER_LEN {
            return Err(Error::invalid_format(format!(
                "file too small for a MAT header ({} bytes)",
                bytes.len()
            )));
        }

        let endian = match &bytes[126..128] {
            b"IM" => Endian::Little,
            b"MI" => Endian::Big,
            _ => {
                return Err(Error::unsupported(
                    "missing Level 5 endian indicator (Level 4 files are not supported)",
                ));
            }
        };

        let version = endian.u16([bytes[124], bytes[125]]);
        if version == 0x0200 {
            return Err(Error::unsupported(
                "v7.3 (HDF5-based) MAT files are not supported",
            ));
        }

        let header_text = String::from_utf8_lossy(&bytes[..HEADER_TEXT_LEN])
            .trim_end_matches(|c| c == ' ' || c == '\0')
            .to_string();

        let variables = read_variables(&bytes[HEADER_LEN..], endian)?;

        Ok(MatFile {
            header_text,
            version,
            endian,
            variables,
            path: "<memory>".to_string(),
        })
    }

    /// Descriptive text at the start of the header.
    pub fn header_text(&self) -> &str {
        &self.header_text
    }

    /// Header version as `major.minor` (`"1.0"` for every Level 5 file).
    pub fn version(&self) -> String {
        format!("{}.{}", self.version >> 8, self.version & 0xFF)
    }

    /// Byte order of the file.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Get the file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the names of all variables, in file order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    /// Get a variable by name.
    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| &v.value)
    }

    /// Names of variables saved as `global`.
    pub fn globals(&self) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|v| v.global)
            .map(|v| v.name.as_str())
            .collect()
    }

    /// Get the number of variables in the file.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if the file contains no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterate over all variables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatValue)> {
        self.variables.iter().map(|v| (v.name.as_str(), &v.value))
    }

    /// Convert into a [`Container`].
    ///
    /// The reserved metadata entries (`__header__`, `__version__`,
    /// `__globals__`) come first, followed by the variables in file order.
    pub fn into_container(self) -> Container {
        let globals = self
            .globals()
            .into_iter()
            .map(MatValue::text)
            .collect::<Vec<_>>();

        let mut container = Container::new();
        container.insert(HEADER_KEY, MatValue::text(&self.header_text));
        container.insert(VERSION_KEY, MatValue::text(&self.version()));
        container.insert(GLOBALS_KEY, MatValue::Cell(CellArray::column(globals)));

        for variable in self.variables {
            container.insert(variable.name, variable.value);
        }

        container
    }

    /// Get detailed information about all variables.
    ///
    /// Returns a formatted table, one line per variable.
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Variables in '{}':", self.path));
        lines.push(String::new());

        let max_name_len = self
            .variable_names()
            .map(str::len)
            .max()
            .unwrap_or(4)
            .max(4);

        lines.push(format!(
            "  {:<width$}  {:>14}  {:>10}",
            "Name",
            "Shape",
            "Class",
            width = max_name_len
        ));
        lines.push(format!(
            "  {:-<width$}  {:->14}  {:->10}",
            "",
            "",
            "",
            width = max_name_len
        ));

        for (name, value) in self.iter() {
            let shape = value
                .dims()
                .map(|d| format!("{:?}", d))
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!(
                "  {:<width$}  {:>14}  {:>10}",
                name,
                shape,
                value.class().name(),
                width = max_name_len
            ));
        }

        lines.join("\n")
    }
}
