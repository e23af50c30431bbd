//! Level 5 writer for test fixtures.
//!
//! Produces small MAT files holding numeric, char and cell variables so
//! tests can exercise the reader and the converter without binary files
//! checked into the repository.
//!
//! ```
//! use mat_h5::mat::fixture::MatBuilder;
//! use mat_h5::MatFile;
//! use ndarray::array;
//!
//! let bytes = MatBuilder::new()
//!     .numeric("song01", array![[1.0, 2.0], [3.0, 4.0]].into_dyn())
//!     .text("title", "alpha")
//!     .to_bytes();
//!
//! let mat = MatFile::parse(&bytes)?;
//! assert_eq!(mat.len(), 2);
//! # Ok::<(), mat_h5::Error>(())
//! ```

use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::parse::{
    Endian, FLAG_COMPLEX, FLAG_GLOBAL, FLAG_LOGICAL, MI_COMPRESSED, MI_DOUBLE, MI_INT16, MI_INT32,
    MI_INT64, MI_INT8, MI_MATRIX, MI_SINGLE, MI_UINT16, MI_UINT32, MI_UINT64, MI_UINT8,
};
use super::value::{CellArray, CharArray, MatClass, MatValue, NumericArray, NumericData};

const DEFAULT_HEADER: &str =
    "MATLAB 5.0 MAT-file, Platform: GLNXA64, Created on: Mon Jan  1 00:00:00 2024";

/// Builder for Level 5 MAT file bytes.
#[derive(Debug, Clone)]
pub struct MatBuilder {
    header_text: String,
    endian: Endian,
    compress: bool,
    body: Vec<u8>,
}

impl Default for MatBuilder {
    fn default() -> Self {
        MatBuilder {
            header_text: DEFAULT_HEADER.to_string(),
            endian: Endian::Little,
            compress: false,
            body: Vec::new(),
        }
    }
}

impl MatBuilder {
    /// Create a little-endian, uncompressed builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write big-endian data. Must be set before adding variables.
    pub fn big_endian(mut self) -> Self {
        self.endian = Endian::Big;
        self
    }

    /// Wrap each following variable in a zlib `miCOMPRESSED` element.
    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Set the descriptive header text.
    pub fn header_text(mut self, text: impl Into<String>) -> Self {
        self.header_text = text.into();
        self
    }

    /// Add a real numeric variable.
    pub fn numeric(self, name: &str, data: impl Into<NumericData>) -> Self {
        self.value(name, &MatValue::Numeric(NumericArray::new(data)))
    }

    /// Add a single-line char variable.
    pub fn text(self, name: &str, text: &str) -> Self {
        self.value(name, &MatValue::text(text))
    }

    /// Add an `Nx1` cell array of strings.
    pub fn text_cells(self, name: &str, texts: &[&str]) -> Self {
        let cells = texts.iter().map(|t| MatValue::text(t)).collect();
        self.value(name, &MatValue::Cell(CellArray::column(cells)))
    }

    /// Add any variable.
    pub fn value(mut self, name: &str, value: &MatValue) -> Self {
        let element = self.matrix_element(name, value, 0);
        self.push_variable(element);
        self
    }

    /// Add a variable flagged as `global`.
    pub fn global(mut self, name: &str, value: &MatValue) -> Self {
        let element = self.matrix_element(name, value, FLAG_GLOBAL);
        self.push_variable(element);
        self
    }

    /// Append raw bytes to the body, for malformed-file tests.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Assemble header and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(128 + self.body.len());

        let mut text = self.header_text.clone().into_bytes();
        text.resize(116, b' ');
        bytes.extend_from_slice(&text);
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&self.u16_bytes(0x0100));
        bytes.extend_from_slice(&self.u16_bytes(u16::from_be_bytes(*b"MI")));

        bytes.extend_from_slice(&self.body);
        bytes
    }

    /// Write the file to disk.
    pub fn write(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    fn push_variable(&mut self, element: Vec<u8>) {
        if self.compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            // Writing into a Vec cannot fail.
            let _ = encoder.write_all(&element);
            let compressed = encoder.finish().unwrap_or_default();
            self.body.extend(self.u32_bytes(MI_COMPRESSED));
            self.body.extend(self.u32_bytes(compressed.len() as u32));
            self.body.extend(compressed);
        } else {
            self.body.extend(element);
        }
    }

    fn u16_bytes(&self, value: u16) -> [u8; 2] {
        match self.endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }

    fn u32_bytes(&self, value: u32) -> [u8; 4] {
        match self.endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }

    /// Tagged, padded element. Payloads of up to four bytes use the small
    /// element format.
    fn element(&self, data_type: u32, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + data.len() + 7);

        if !data.is_empty() && data.len() <= 4 {
            out.extend(self.u32_bytes(((data.len() as u32) << 16) | data_type));
            out.extend_from_slice(data);
            out.resize(8, 0);
            return out;
        }

        out.extend(self.u32_bytes(data_type));
        out.extend(self.u32_bytes(data.len() as u32));
        out.extend_from_slice(data);
        let padding = (8 - data.len() % 8) % 8;
        out.extend(std::iter::repeat(0).take(padding));
        out
    }

    fn matrix_element(&self, name: &str, value: &MatValue, extra_flags: u32) -> Vec<u8> {
        let mut flags = u32::from(value.class().code()) | extra_flags;
        if let MatValue::Numeric(array) = value {
            if array.is_complex() {
                flags |= FLAG_COMPLEX;
            }
            if array.is_logical() {
                flags |= FLAG_LOGICAL;
            }
        }

        let mut payload = Vec::new();
        let mut flag_bytes = self.u32_bytes(flags).to_vec();
        flag_bytes.extend(self.u32_bytes(0));
        payload.extend(self.element(MI_UINT32, &flag_bytes));

        if value.class() != MatClass::Opaque {
            let dims = value.dims().map(<[usize]>::to_vec).unwrap_or_else(|| vec![0, 0]);
            let dim_bytes: Vec<u8> = dims
                .iter()
                .flat_map(|&d| self.u32_bytes(d as u32))
                .collect();
            payload.extend(self.element(MI_INT32, &dim_bytes));
        }
        payload.extend(self.element(MI_INT8, name.as_bytes()));

        match value {
            MatValue::Numeric(array) => {
                payload.extend(self.numeric_part(array.real()));
                if let Some(imag) = array.imag() {
                    payload.extend(self.numeric_part(imag));
                }
            }
            MatValue::Char(chars) => payload.extend(self.char_part(chars)),
            MatValue::Cell(cells) => {
                for cell in cells.cells() {
                    payload.extend(self.matrix_element("", cell, 0));
                }
            }
            MatValue::Unsupported { .. } => {}
        }

        self.element(MI_MATRIX, &payload)
    }

    fn numeric_part(&self, data: &NumericData) -> Vec<u8> {
        macro_rules! column_major_bytes {
            ($array:expr) => {{
                let mut bytes = Vec::new();
                // Iterating the reversed-axes view walks the original in
                // column-major order.
                for value in $array.t().iter() {
                    match self.endian {
                        Endian::Little => bytes.extend_from_slice(&value.to_le_bytes()),
                        Endian::Big => bytes.extend_from_slice(&value.to_be_bytes()),
                    }
                }
                bytes
            }};
        }

        let (data_type, bytes) = match data {
            NumericData::Double(a) => (MI_DOUBLE, column_major_bytes!(a)),
            NumericData::Single(a) => (MI_SINGLE, column_major_bytes!(a)),
            NumericData::Int8(a) => (MI_INT8, column_major_bytes!(a)),
            NumericData::UInt8(a) => (MI_UINT8, column_major_bytes!(a)),
            NumericData::Int16(a) => (MI_INT16, column_major_bytes!(a)),
            NumericData::UInt16(a) => (MI_UINT16, column_major_bytes!(a)),
            NumericData::Int32(a) => (MI_INT32, column_major_bytes!(a)),
            NumericData::UInt32(a) => (MI_UINT32, column_major_bytes!(a)),
            NumericData::Int64(a) => (MI_INT64, column_major_bytes!(a)),
            NumericData::UInt64(a) => (MI_UINT64, column_major_bytes!(a)),
        };

        self.element(data_type, &bytes)
    }

    fn char_part(&self, chars: &CharArray) -> Vec<u8> {
        let bytes: Vec<u8> = chars
            .chars()
            .iter()
            .flat_map(|&c| self.u16_bytes(c as u32 as u16))
            .collect();
        self.element(MI_UINT16, &bytes)
    }
}
