//! Entry classification and text flattening.

use thiserror::Error;

use crate::mat::{CellArray, MatValue, NumericArray};

/// How an entry's value will be encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind<'a> {
    /// Numeric array, copied verbatim.
    NumericArray(&'a NumericArray),
    /// Single line of text, stored as a scalar byte string.
    ScalarText(String),
    /// Cell array expected to hold one string per row.
    NestedTextArray(&'a CellArray),
    /// Anything else; skipped without a diagnostic.
    Unrecognized,
}

/// Classify a value.
///
/// Cell arrays are always treated as nested text; whether they really hold
/// text is only checked when they are flattened. Char arrays qualify as
/// scalar text when they hold a single line (or nothing).
pub fn classify(value: &MatValue) -> EntryKind<'_> {
    match value {
        MatValue::Cell(cells) => EntryKind::NestedTextArray(cells),
        MatValue::Numeric(array) => EntryKind::NumericArray(array),
        MatValue::Char(chars) => match chars.single_line() {
            Some(text) => EntryKind::ScalarText(text),
            None => EntryKind::Unrecognized,
        },
        MatValue::Unsupported { .. } => EntryKind::Unrecognized,
    }
}

/// Why a cell array could not be flattened into strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlattenError {
    /// The cell array is not two-dimensional.
    #[error("cell array has {ndim} dimensions, expected 2")]
    NotTwoDimensional {
        /// Number of dimensions found.
        ndim: usize,
    },

    /// A row does not hold exactly one cell.
    #[error("row {row} holds {len} cells, expected a single-element wrapper")]
    WrapperLength {
        /// Zero-based row index.
        row: usize,
        /// Number of cells in the row.
        len: usize,
    },

    /// A row's cell is not a char array.
    #[error("row {row} holds a {kind} value, expected text")]
    NotText {
        /// Zero-based row index.
        row: usize,
        /// Kind of value found.
        kind: &'static str,
    },

    /// A row's char array has more than one line.
    #[error("row {row} holds a character array of shape {dims:?}, expected a single line")]
    MultiLineText {
        /// Zero-based row index.
        row: usize,
        /// Dimensions of the char array.
        dims: Vec<usize>,
    },
}

/// Flatten an `Nx1` cell array of strings into its `N` texts, in row order.
///
/// Each row is a wrapper around exactly one cell, and that cell must be a
/// single-line char array.
pub fn flatten_text_cells(cells: &CellArray) -> Result<Vec<String>, FlattenError> {
    let [rows, cols] = cells.dims()[..] else {
        return Err(FlattenError::NotTwoDimensional {
            ndim: cells.dims().len(),
        });
    };

    (0..rows)
        .map(|row| {
            if cols != 1 {
                return Err(FlattenError::WrapperLength { row, len: cols });
            }
            match cells.get(row, 0) {
                Some(MatValue::Char(chars)) => {
                    chars
                        .single_line()
                        .ok_or_else(|| FlattenError::MultiLineText {
                            row,
                            dims: chars.dims().to_vec(),
                        })
                }
                Some(other) => Err(FlattenError::NotText {
                    row,
                    kind: other.kind(),
                }),
                None => Err(FlattenError::WrapperLength { row, len: 0 }),
            }
        })
        .collect()
}
