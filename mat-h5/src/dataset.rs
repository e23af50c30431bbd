//! Destination datasets and the sinks that store them.
//!
//! The transcoder never talks to HDF5 directly. It hands each finished
//! [`DatasetValue`] to a [`DatasetSink`]: [`Hdf5Writer`](crate::Hdf5Writer)
//! for real conversions, [`MemorySink`] for tests and dry runs.

use crate::error::{Error, Result};
use crate::mat::NumericArray;

/// Fixed-width byte strings, NUL-padded to a common width.
///
/// This is the layout of NumPy `S` arrays and of HDF5 fixed-length string
/// datasets. Text is encoded as UTF-8; the width is the longest encoded
/// value, and never less than one byte. Values that are all ASCII are
/// labelled as ASCII strings in HDF5, anything else as UTF-8.
///
/// # Example
///
/// ```
/// use mat_h5::FixedBytes;
///
/// let names = FixedBytes::array(&["alpha", "beta"]);
/// assert_eq!(names.width(), 5);
/// assert_eq!(names.as_bytes(), b"alphabeta\0");
/// assert_eq!(names.get(1), Some(&b"beta"[..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedBytes {
    width: usize,
    count: usize,
    scalar: bool,
    buffer: Vec<u8>,
}

impl FixedBytes {
    /// A single value, stored as a scalar (0-D) dataset.
    pub fn scalar(text: &str) -> Self {
        Self::encode(&[text], true)
    }

    /// A one-dimensional array of values.
    pub fn array<S: AsRef<str>>(texts: &[S]) -> Self {
        Self::encode(texts, false)
    }

    fn encode<S: AsRef<str>>(texts: &[S], scalar: bool) -> Self {
        let width = texts
            .iter()
            .map(|t| t.as_ref().len())
            .max()
            .unwrap_or(0)
            .max(1);

        let mut buffer = Vec::with_capacity(width * texts.len());
        for text in texts {
            let bytes = text.as_ref().as_bytes();
            buffer.extend_from_slice(bytes);
            buffer.resize(buffer.len() + width - bytes.len(), 0);
        }

        FixedBytes {
            width,
            count: texts.len(),
            scalar,
            buffer,
        }
    }

    /// Width of each value in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if there are no values.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether every value is plain ASCII.
    pub fn is_ascii(&self) -> bool {
        self.buffer.is_ascii()
    }

    /// Whether this is a scalar (0-D) value.
    pub fn is_scalar(&self) -> bool {
        self.scalar
    }

    /// Dataset shape: `[]` for a scalar, `[n]` otherwise.
    pub fn shape(&self) -> Vec<usize> {
        if self.scalar {
            Vec::new()
        } else {
            vec![self.count]
        }
    }

    /// The padded buffer, `len() * width()` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Value at `index` with its trailing NUL padding removed.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index >= self.count {
            return None;
        }
        let raw = &self.buffer[index * self.width..(index + 1) * self.width];
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        Some(&raw[..end])
    }

    /// Iterate over values with padding removed.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.count).filter_map(move |i| self.get(i))
    }
}

/// What kind of dataset an entry became.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    /// Numeric array, shape and dtype preserved.
    Numeric,
    /// Scalar byte string.
    ScalarText,
    /// One-dimensional byte-string array.
    TextArray,
}

/// A finished dataset ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetValue<'a> {
    /// Numeric data copied verbatim from the source.
    Numeric(&'a NumericArray),
    /// Re-encoded text.
    Bytes(FixedBytes),
}

impl DatasetValue<'_> {
    /// Kind of dataset.
    pub fn kind(&self) -> DatasetKind {
        match self {
            DatasetValue::Numeric(_) => DatasetKind::Numeric,
            DatasetValue::Bytes(bytes) if bytes.is_scalar() => DatasetKind::ScalarText,
            DatasetValue::Bytes(_) => DatasetKind::TextArray,
        }
    }
}

/// Destination of transcoded datasets.
///
/// Implementations create one dataset per call. Creating a name twice is an
/// error.
pub trait DatasetSink {
    /// Create a dataset called `name` holding `value`.
    fn create_dataset(&mut self, name: &str, value: &DatasetValue<'_>) -> Result<()>;
}

/// A dataset held by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoredDataset {
    /// Numeric data.
    Numeric(NumericArray),
    /// Fixed-width byte strings.
    Bytes(FixedBytes),
}

/// In-memory sink, keeping datasets in creation order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    datasets: Vec<(String, StoredDataset)>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a dataset by name.
    pub fn get(&self, name: &str) -> Option<&StoredDataset> {
        self.datasets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    /// Dataset names in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|(n, _)| n.as_str())
    }

    /// Number of datasets.
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Check if no dataset has been created.
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl DatasetSink for MemorySink {
    fn create_dataset(&mut self, name: &str, value: &DatasetValue<'_>) -> Result<()> {
        if self.get(name).is_some() {
            return Err(Error::duplicate_dataset(name, name));
        }

        let stored = match value {
            DatasetValue::Numeric(array) => StoredDataset::Numeric((*array).clone()),
            DatasetValue::Bytes(bytes) => StoredDataset::Bytes(bytes.clone()),
        };
        self.datasets.push((name.to_string(), stored));
        Ok(())
    }
}
