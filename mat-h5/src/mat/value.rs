//! In-memory representation of MAT variables.
//!
//! [`MatValue`] is what a variable decodes to: a numeric array, a character
//! array, a cell array, or a marker for classes that are read past but not
//! decoded (structs, sparse matrices, objects, function handles).
//!
//! # Data Layout
//!
//! MATLAB stores arrays in column-major (Fortran) order. Numeric arrays are
//! converted to row-major (C) order on load, so `array[[i, j]]` is the
//! element MATLAB calls `A(i+1, j+1)`. Character and cell arrays keep the
//! column-major order of the file and expose row-oriented accessors instead.

use ndarray::{ArrayD, IxDyn, ShapeBuilder};

use crate::error::{Error, Result};

/// Number of elements described by `dims`.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the product overflows `usize`.
pub(crate) fn element_count(dims: &[usize]) -> Result<usize> {
    dims.iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| Error::invalid_format(format!("dimensions {:?} are too large", dims)))
}

/// MATLAB array class, as stored in the array flags of a matrix element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatClass {
    /// Cell array (`mxCELL_CLASS`).
    Cell,
    /// Structure (`mxSTRUCT_CLASS`).
    Struct,
    /// Object (`mxOBJECT_CLASS`).
    Object,
    /// Character array (`mxCHAR_CLASS`).
    Char,
    /// Sparse array (`mxSPARSE_CLASS`).
    Sparse,
    /// Double precision (`mxDOUBLE_CLASS`).
    Double,
    /// Single precision (`mxSINGLE_CLASS`).
    Single,
    /// Signed 8-bit integer.
    Int8,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Function handle.
    Function,
    /// Opaque class (MCOS objects, `__function_workspace__`).
    Opaque,
}

impl MatClass {
    /// Decode the class byte of an array flags word.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Cell,
            2 => Self::Struct,
            3 => Self::Object,
            4 => Self::Char,
            5 => Self::Sparse,
            6 => Self::Double,
            7 => Self::Single,
            8 => Self::Int8,
            9 => Self::UInt8,
            10 => Self::Int16,
            11 => Self::UInt16,
            12 => Self::Int32,
            13 => Self::UInt32,
            14 => Self::Int64,
            15 => Self::UInt64,
            16 => Self::Function,
            17 => Self::Opaque,
            _ => return None,
        })
    }

    /// The class byte written to array flags.
    pub fn code(self) -> u8 {
        match self {
            Self::Cell => 1,
            Self::Struct => 2,
            Self::Object => 3,
            Self::Char => 4,
            Self::Sparse => 5,
            Self::Double => 6,
            Self::Single => 7,
            Self::Int8 => 8,
            Self::UInt8 => 9,
            Self::Int16 => 10,
            Self::UInt16 => 11,
            Self::Int32 => 12,
            Self::UInt32 => 13,
            Self::Int64 => 14,
            Self::UInt64 => 15,
            Self::Function => 16,
            Self::Opaque => 17,
        }
    }

    /// MATLAB's name for the class.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Struct => "struct",
            Self::Object => "object",
            Self::Char => "char",
            Self::Sparse => "sparse",
            Self::Double => "double",
            Self::Single => "single",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Function => "function_handle",
            Self::Opaque => "opaque",
        }
    }

    /// Whether arrays of this class hold plain numeric data.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Double
                | Self::Single
                | Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }
}

/// Typed numeric array data in row-major layout.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericData {
    /// `double`
    Double(ArrayD<f64>),
    /// `single`
    Single(ArrayD<f32>),
    /// `int8`
    Int8(ArrayD<i8>),
    /// `uint8`
    UInt8(ArrayD<u8>),
    /// `int16`
    Int16(ArrayD<i16>),
    /// `uint16`
    UInt16(ArrayD<u16>),
    /// `int32`
    Int32(ArrayD<i32>),
    /// `uint32`
    UInt32(ArrayD<u32>),
    /// `int64`
    Int64(ArrayD<i64>),
    /// `uint64`
    UInt64(ArrayD<u64>),
}

/// Run `$body` with `$array` bound to the inner `ArrayD` of any variant.
macro_rules! with_numeric {
    ($data:expr, $array:ident => $body:expr) => {
        match $data {
            NumericData::Double($array) => $body,
            NumericData::Single($array) => $body,
            NumericData::Int8($array) => $body,
            NumericData::UInt8($array) => $body,
            NumericData::Int16($array) => $body,
            NumericData::UInt16($array) => $body,
            NumericData::Int32($array) => $body,
            NumericData::UInt32($array) => $body,
            NumericData::Int64($array) => $body,
            NumericData::UInt64($array) => $body,
        }
    };
}

pub(crate) use with_numeric;

macro_rules! impl_from_array {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<ArrayD<$t>> for NumericData {
                fn from(array: ArrayD<$t>) -> Self {
                    NumericData::$variant(array)
                }
            }
        )*
    };
}

impl_from_array!(
    f64 => Double,
    f32 => Single,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
);

impl NumericData {
    /// Array class of this data.
    pub fn class(&self) -> MatClass {
        match self {
            Self::Double(_) => MatClass::Double,
            Self::Single(_) => MatClass::Single,
            Self::Int8(_) => MatClass::Int8,
            Self::UInt8(_) => MatClass::UInt8,
            Self::Int16(_) => MatClass::Int16,
            Self::UInt16(_) => MatClass::UInt16,
            Self::Int32(_) => MatClass::Int32,
            Self::UInt32(_) => MatClass::UInt32,
            Self::Int64(_) => MatClass::Int64,
            Self::UInt64(_) => MatClass::UInt64,
        }
    }

    /// NumPy-style dtype name.
    pub fn dtype(&self) -> &'static str {
        match self {
            Self::Double(_) => "float64",
            Self::Single(_) => "float32",
            Self::Int8(_) => "int8",
            Self::UInt8(_) => "uint8",
            Self::Int16(_) => "int16",
            Self::UInt16(_) => "uint16",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Int64(_) => "int64",
            Self::UInt64(_) => "uint64",
        }
    }

    /// Shape of the array.
    pub fn shape(&self) -> &[usize] {
        with_numeric!(self, array => array.shape())
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        with_numeric!(self, array => array.len())
    }

    /// Check if the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values widened to `f64`.
    pub fn to_f64(&self) -> ArrayD<f64> {
        with_numeric!(self, array => array.mapv(|x| x as f64))
    }
}

/// A numeric MAT variable.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    real: NumericData,
    imag: Option<NumericData>,
    logical: bool,
}

impl NumericArray {
    /// Create a real-valued array.
    pub fn new(real: impl Into<NumericData>) -> Self {
        NumericArray {
            real: real.into(),
            imag: None,
            logical: false,
        }
    }

    /// Create a complex array from real and imaginary parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the parts differ in class or shape.
    pub fn complex(real: impl Into<NumericData>, imag: impl Into<NumericData>) -> Result<Self> {
        let real = real.into();
        let imag = imag.into();

        if real.class() != imag.class() || real.shape() != imag.shape() {
            return Err(Error::invalid_format(format!(
                "complex parts disagree: real {} {:?}, imaginary {} {:?}",
                real.dtype(),
                real.shape(),
                imag.dtype(),
                imag.shape()
            )));
        }

        Ok(NumericArray {
            real,
            imag: Some(imag),
            logical: false,
        })
    }

    /// Mark the array as MATLAB `logical`.
    pub fn with_logical(mut self, logical: bool) -> Self {
        self.logical = logical;
        self
    }

    /// Build an array from column-major values, as stored in MAT files.
    pub(crate) fn from_column_major<T: Clone>(dims: &[usize], values: Vec<T>) -> Result<ArrayD<T>> {
        let array = ArrayD::from_shape_vec(IxDyn(dims).f(), values)?;
        Ok(array.as_standard_layout().into_owned())
    }

    /// Array class.
    pub fn class(&self) -> MatClass {
        self.real.class()
    }

    /// Shape of the array.
    pub fn shape(&self) -> &[usize] {
        self.real.shape()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.real.len()
    }

    /// Check if the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    /// Real part.
    pub fn real(&self) -> &NumericData {
        &self.real
    }

    /// Imaginary part (complex arrays only).
    pub fn imag(&self) -> Option<&NumericData> {
        self.imag.as_ref()
    }

    /// Check if the array is complex.
    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }

    /// Check if the array was saved as `logical`.
    pub fn is_logical(&self) -> bool {
        self.logical
    }
}

/// A MATLAB character array.
///
/// Characters are kept in the file's column-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharArray {
    dims: Vec<usize>,
    chars: Vec<char>,
}

impl CharArray {
    /// Create a character array from dimensions and column-major characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the character count does not match
    /// the dimensions.
    pub fn new(dims: Vec<usize>, chars: Vec<char>) -> Result<Self> {
        let expected = element_count(&dims)?;
        if expected != chars.len() {
            return Err(Error::invalid_format(format!(
                "char array of shape {:?} holds {} characters",
                dims,
                chars.len()
            )));
        }
        Ok(CharArray { dims, chars })
    }

    /// A single-row character array, or `0x0` for the empty string.
    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let dims = if chars.is_empty() {
            vec![0, 0]
        } else {
            vec![1, chars.len()]
        };
        CharArray { dims, chars }
    }

    /// Character array with one row per string, padded with spaces.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let padded: Vec<Vec<char>> = rows
            .iter()
            .map(|r| {
                let mut chars: Vec<char> = r.chars().collect();
                chars.resize(width, ' ');
                chars
            })
            .collect();

        let mut chars = Vec::with_capacity(rows.len() * width);
        for col in 0..width {
            for row in &padded {
                chars.push(row[col]);
            }
        }

        CharArray {
            dims: vec![rows.len(), width],
            chars,
        }
    }

    /// Dimensions as stored in the file.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Check if the array holds no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Characters in column-major order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Rows as strings, for 2-D arrays.
    pub fn rows(&self) -> Option<Vec<String>> {
        let [rows, cols] = self.dims[..] else {
            return None;
        };

        Some(
            (0..rows)
                .map(|r| (0..cols).map(|c| self.chars[r + c * rows]).collect())
                .collect(),
        )
    }

    /// The text of a single-line array.
    ///
    /// Returns `Some("")` for an array with no characters, the row for a
    /// `1xN` array, and `None` for anything with several rows or more than
    /// two dimensions.
    pub fn single_line(&self) -> Option<String> {
        if self.chars.is_empty() {
            return Some(String::new());
        }
        match self.rows() {
            Some(rows) if rows.len() == 1 => rows.into_iter().next(),
            _ => None,
        }
    }
}

/// A MATLAB cell array.
///
/// Cells are kept in the file's column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct CellArray {
    dims: Vec<usize>,
    cells: Vec<MatValue>,
}

impl CellArray {
    /// Create a cell array from dimensions and column-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the cell count does not match
    /// the dimensions.
    pub fn new(dims: Vec<usize>, cells: Vec<MatValue>) -> Result<Self> {
        let expected = element_count(&dims)?;
        if expected != cells.len() {
            return Err(Error::invalid_format(format!(
                "cell array of shape {:?} holds {} cells",
                dims,
                cells.len()
            )));
        }
        Ok(CellArray { dims, cells })
    }

    /// An `Nx1` cell array, the layout MATLAB uses for a list of strings.
    pub fn column(cells: Vec<MatValue>) -> Self {
        CellArray {
            dims: vec![cells.len(), 1],
            cells,
        }
    }

    /// Dimensions as stored in the file.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the array holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `(row, col)` of a 2-D array.
    pub fn get(&self, row: usize, col: usize) -> Option<&MatValue> {
        let [rows, cols] = self.dims[..] else {
            return None;
        };
        if row >= rows || col >= cols {
            return None;
        }
        self.cells.get(row + col * rows)
    }

    /// Cells in column-major order.
    pub fn cells(&self) -> &[MatValue] {
        &self.cells
    }
}

/// A decoded MAT variable.
#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    /// Numeric array of any class.
    Numeric(NumericArray),
    /// Character array.
    Char(CharArray),
    /// Cell array.
    Cell(CellArray),
    /// A class that is read past but not decoded.
    Unsupported {
        /// The array class found in the file.
        class: MatClass,
    },
}

impl MatValue {
    /// A single-line character value.
    pub fn text(text: &str) -> Self {
        MatValue::Char(CharArray::from_text(text))
    }

    /// The text of a single-line character value.
    pub fn as_text(&self) -> Option<String> {
        match self {
            MatValue::Char(chars) => chars.single_line(),
            _ => None,
        }
    }

    /// Short description of the value's kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            MatValue::Numeric(_) => "numeric",
            MatValue::Char(_) => "char",
            MatValue::Cell(_) => "cell",
            MatValue::Unsupported { class } => class.name(),
        }
    }

    /// MATLAB class of the value.
    pub fn class(&self) -> MatClass {
        match self {
            MatValue::Numeric(array) => array.class(),
            MatValue::Char(_) => MatClass::Char,
            MatValue::Cell(_) => MatClass::Cell,
            MatValue::Unsupported { class } => *class,
        }
    }

    /// Dimensions, when known.
    pub fn dims(&self) -> Option<&[usize]> {
        match self {
            MatValue::Numeric(array) => Some(array.shape()),
            MatValue::Char(chars) => Some(chars.dims()),
            MatValue::Cell(cells) => Some(cells.dims()),
            MatValue::Unsupported { .. } => None,
        }
    }
}

impl From<NumericArray> for MatValue {
    fn from(array: NumericArray) -> Self {
        MatValue::Numeric(array)
    }
}

impl From<CharArray> for MatValue {
    fn from(chars: CharArray) -> Self {
        MatValue::Char(chars)
    }
}

impl From<CellArray> for MatValue {
    fn from(cells: CellArray) -> Self {
        MatValue::Cell(cells)
    }
}
