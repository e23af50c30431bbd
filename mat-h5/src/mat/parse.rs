//! Level 5 data element decoding.
//!
//! A MAT file body is a sequence of tagged data elements. Each variable is a
//! `miMATRIX` element (optionally wrapped in a zlib-compressed
//! `miCOMPRESSED` element) whose payload is itself a sequence of elements:
//! array flags, dimensions, name, then class-specific data.

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::value::{
    element_count, CellArray, CharArray, MatClass, MatValue, NumericArray, NumericData,
};
use crate::error::{Error, Result};

pub(crate) const MI_INT8: u32 = 1;
pub(crate) const MI_UINT8: u32 = 2;
pub(crate) const MI_INT16: u32 = 3;
pub(crate) const MI_UINT16: u32 = 4;
pub(crate) const MI_INT32: u32 = 5;
pub(crate) const MI_UINT32: u32 = 6;
pub(crate) const MI_SINGLE: u32 = 7;
pub(crate) const MI_DOUBLE: u32 = 9;
pub(crate) const MI_INT64: u32 = 12;
pub(crate) const MI_UINT64: u32 = 13;
pub(crate) const MI_MATRIX: u32 = 14;
pub(crate) const MI_COMPRESSED: u32 = 15;
pub(crate) const MI_UTF8: u32 = 16;
pub(crate) const MI_UTF16: u32 = 17;
pub(crate) const MI_UTF32: u32 = 18;

pub(crate) const FLAG_COMPLEX: u32 = 0x0800;
pub(crate) const FLAG_GLOBAL: u32 = 0x0400;
pub(crate) const FLAG_LOGICAL: u32 = 0x0200;

/// Byte order declared by the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Written on a little-endian machine (`IM` indicator).
    Little,
    /// Written on a big-endian machine (`MI` indicator).
    Big,
}

impl Endian {
    pub(crate) fn u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        }
    }

    pub(crate) fn u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        }
    }
}

/// One tagged data element.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Element<'a> {
    pub data_type: u32,
    pub data: &'a [u8],
}

/// Sequential reader over a run of data elements.
pub(crate) struct ElementReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ElementReader<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        ElementReader {
            data,
            pos: 0,
            endian,
        }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::invalid_format(format!(
                    "data element of {} bytes at offset {} runs past the end ({} bytes left)",
                    len,
                    self.pos,
                    self.remaining()
                ))
            })?;

        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(self.endian.u32([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read the next element, consuming its padding.
    pub fn next_element(&mut self) -> Result<Element<'a>> {
        let word = self.take_u32()?;

        // Small data element: byte count in the upper half, payload in the
        // following four bytes.
        let small_len = (word >> 16) as usize;
        if small_len != 0 {
            if small_len > 4 {
                return Err(Error::invalid_format(format!(
                    "small data element claims {} bytes",
                    small_len
                )));
            }
            let payload = self.take(4)?;
            return Ok(Element {
                data_type: word & 0xFFFF,
                data: &payload[..small_len],
            });
        }

        let len = self.take_u32()? as usize;
        let data = self.take(len)?;

        if word != MI_COMPRESSED {
            let padding = (8 - len % 8) % 8;
            self.pos += padding.min(self.remaining());
        }

        Ok(Element {
            data_type: word,
            data,
        })
    }
}

/// A top-level variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Decoded value.
    pub value: MatValue,
    /// Whether the variable was saved as `global`.
    pub global: bool,
}

/// Decode every variable in a file body (everything after the header).
pub(crate) fn read_variables(body: &[u8], endian: Endian) -> Result<Vec<Variable>> {
    let mut reader = ElementReader::new(body, endian);
    let mut variables = Vec::new();

    // Anything shorter than a tag is trailing padding.
    while reader.remaining() >= 8 {
        let element = reader.next_element()?;

        match element.data_type {
            MI_COMPRESSED => {
                let inflated = inflate(element.data)?;
                let mut inner = ElementReader::new(&inflated, endian);
                let matrix = inner.next_element()?;
                variables.push(read_matrix(matrix, endian)?);
            }
            MI_MATRIX => variables.push(read_matrix(element, endian)?),
            other => {
                return Err(Error::invalid_format(format!(
                    "unexpected top-level data element type {}",
                    other
                )));
            }
        }
    }

    Ok(variables)
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| Error::invalid_format(format!("failed to decompress data element: {}", e)))?;
    Ok(inflated)
}

/// Decode a `miMATRIX` element.
pub(crate) fn read_matrix(element: Element<'_>, endian: Endian) -> Result<Variable> {
    if element.data_type != MI_MATRIX {
        return Err(Error::invalid_format(format!(
            "expected a matrix element, found type {}",
            element.data_type
        )));
    }

    // MATLAB writes empty cells as matrix elements with no payload.
    if element.data.is_empty() {
        return Ok(Variable {
            name: String::new(),
            value: empty_double(),
            global: false,
        });
    }

    let mut reader = ElementReader::new(element.data, endian);

    let flags_element = reader.next_element()?;
    if flags_element.data_type != MI_UINT32 || flags_element.data.len() < 8 {
        return Err(Error::invalid_format("malformed array flags"));
    }
    let d = flags_element.data;
    let flags = endian.u32([d[0], d[1], d[2], d[3]]);
    let class_code = (flags & 0xFF) as u8;
    let class = MatClass::from_code(class_code)
        .ok_or_else(|| Error::invalid_format(format!("unknown array class {}", class_code)))?;
    let global = flags & FLAG_GLOBAL != 0;

    // Opaque arrays carry no dimensions element.
    if class == MatClass::Opaque {
        let name = read_name(reader.next_element()?)?;
        return Ok(Variable {
            name,
            value: MatValue::Unsupported { class },
            global,
        });
    }

    let dims = read_dims(reader.next_element()?, endian)?;
    let name = read_name(reader.next_element()?)?;

    let value = match class {
        MatClass::Char => {
            let chars = if reader.is_at_end() {
                Vec::new()
            } else {
                decode_chars(reader.next_element()?, endian)?
            };
            MatValue::Char(CharArray::new(dims, chars)?)
        }
        MatClass::Cell => {
            let count = element_count(&dims)?;
            // Every cell is at least one 8-byte element tag.
            if count > reader.remaining() / 8 {
                return Err(Error::invalid_format(format!(
                    "cell array of shape {:?} does not fit in {} bytes",
                    dims,
                    reader.remaining()
                )));
            }
            let mut cells = Vec::new();
            for _ in 0..count {
                cells.push(read_matrix(reader.next_element()?, endian)?.value);
            }
            MatValue::Cell(CellArray::new(dims, cells)?)
        }
        class if class.is_numeric() => {
            let real = read_numeric_part(&mut reader, class, &dims, endian)?;
            let array = if flags & FLAG_COMPLEX != 0 {
                let imag = read_numeric_part(&mut reader, class, &dims, endian)?;
                NumericArray::complex(real, imag)?
            } else {
                NumericArray::new(real)
            };
            MatValue::Numeric(array.with_logical(flags & FLAG_LOGICAL != 0))
        }
        class => MatValue::Unsupported { class },
    };

    Ok(Variable {
        name,
        value,
        global,
    })
}

fn empty_double() -> MatValue {
    MatValue::Numeric(NumericArray::new(ndarray::ArrayD::<f64>::zeros(vec![0, 0])))
}

fn read_dims(element: Element<'_>, endian: Endian) -> Result<Vec<usize>> {
    if element.data_type != MI_INT32 || element.data.len() % 4 != 0 {
        return Err(Error::invalid_format("malformed dimensions element"));
    }

    element
        .data
        .chunks_exact(4)
        .map(|c| {
            let dim = endian.u32([c[0], c[1], c[2], c[3]]) as i32;
            usize::try_from(dim)
                .map_err(|_| Error::invalid_format(format!("negative dimension {}", dim)))
        })
        .collect()
}

fn read_name(element: Element<'_>) -> Result<String> {
    if element.data_type != MI_INT8 && element.data_type != MI_UINT8 {
        return Err(Error::invalid_format(format!(
            "array name stored as type {}",
            element.data_type
        )));
    }
    Ok(String::from_utf8_lossy(element.data)
        .trim_end_matches('\0')
        .to_string())
}

/// Raw values in their on-disk storage type.
#[derive(Debug, Clone, PartialEq)]
enum Storage {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Single(Vec<f32>),
    Double(Vec<f64>),
}

macro_rules! decode_values {
    ($data:expr, $endian:expr, $t:ty) => {{
        const SIZE: usize = std::mem::size_of::<$t>();
        if $data.len() % SIZE != 0 {
            return Err(Error::invalid_format(format!(
                "{} bytes is not a whole number of {}-byte values",
                $data.len(),
                SIZE
            )));
        }
        $data
            .chunks_exact(SIZE)
            .map(|chunk| {
                let mut buf = [0u8; SIZE];
                buf.copy_from_slice(chunk);
                match $endian {
                    Endian::Little => <$t>::from_le_bytes(buf),
                    Endian::Big => <$t>::from_be_bytes(buf),
                }
            })
            .collect::<Vec<$t>>()
    }};
}

fn decode_storage(element: Element<'_>, endian: Endian) -> Result<Storage> {
    let data = element.data;
    Ok(match element.data_type {
        MI_INT8 => Storage::Int8(decode_values!(data, endian, i8)),
        MI_UINT8 => Storage::UInt8(data.to_vec()),
        MI_INT16 => Storage::Int16(decode_values!(data, endian, i16)),
        MI_UINT16 => Storage::UInt16(decode_values!(data, endian, u16)),
        MI_INT32 => Storage::Int32(decode_values!(data, endian, i32)),
        MI_UINT32 => Storage::UInt32(decode_values!(data, endian, u32)),
        MI_INT64 => Storage::Int64(decode_values!(data, endian, i64)),
        MI_UINT64 => Storage::UInt64(decode_values!(data, endian, u64)),
        MI_SINGLE => Storage::Single(decode_values!(data, endian, f32)),
        MI_DOUBLE => Storage::Double(decode_values!(data, endian, f64)),
        other => {
            return Err(Error::invalid_format(format!(
                "numeric data stored as unsupported type {}",
                other
            )));
        }
    })
}

macro_rules! cast_storage {
    ($storage:expr, $t:ty) => {
        match $storage {
            Storage::Int8(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
            Storage::UInt8(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
            Storage::Int16(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
            Storage::UInt16(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
            Storage::Int32(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
            Storage::UInt32(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
            Storage::Int64(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
            Storage::UInt64(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
            Storage::Single(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
            Storage::Double(v) => v.into_iter().map(|x| x as $t).collect::<Vec<$t>>(),
        }
    };
}

/// Read one real or imaginary part and convert it to the array class.
///
/// MATLAB may store values in a narrower type than the class when they fit
/// (doubles holding small integers are often written as `miUINT8`).
fn read_numeric_part(
    reader: &mut ElementReader<'_>,
    class: MatClass,
    dims: &[usize],
    endian: Endian,
) -> Result<NumericData> {
    let storage = if reader.is_at_end() {
        Storage::Double(Vec::new())
    } else {
        decode_storage(reader.next_element()?, endian)?
    };

    Ok(match class {
        MatClass::Double => NumericArray::from_column_major(dims, cast_storage!(storage, f64))?.into(),
        MatClass::Single => NumericArray::from_column_major(dims, cast_storage!(storage, f32))?.into(),
        MatClass::Int8 => NumericArray::from_column_major(dims, cast_storage!(storage, i8))?.into(),
        MatClass::UInt8 => NumericArray::from_column_major(dims, cast_storage!(storage, u8))?.into(),
        MatClass::Int16 => NumericArray::from_column_major(dims, cast_storage!(storage, i16))?.into(),
        MatClass::UInt16 => NumericArray::from_column_major(dims, cast_storage!(storage, u16))?.into(),
        MatClass::Int32 => NumericArray::from_column_major(dims, cast_storage!(storage, i32))?.into(),
        MatClass::UInt32 => NumericArray::from_column_major(dims, cast_storage!(storage, u32))?.into(),
        MatClass::Int64 => NumericArray::from_column_major(dims, cast_storage!(storage, i64))?.into(),
        MatClass::UInt64 => NumericArray::from_column_major(dims, cast_storage!(storage, u64))?.into(),
        other => {
            return Err(Error::invalid_format(format!(
                "{} is not a numeric class",
                other.name()
            )));
        }
    })
}

fn decode_chars(element: Element<'_>, endian: Endian) -> Result<Vec<char>> {
    let data = element.data;
    Ok(match element.data_type {
        MI_UTF8 => std::str::from_utf8(data)
            .map_err(|e| Error::invalid_format(format!("invalid UTF-8 in char array: {}", e)))?
            .chars()
            .collect(),
        // MATLAB characters are UCS-2 code units, one per array element.
        MI_UINT16 | MI_UTF16 => decode_values!(data, endian, u16)
            .into_iter()
            .map(|unit| char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
        MI_UINT32 | MI_UTF32 => decode_values!(data, endian, u32)
            .into_iter()
            .map(|unit| char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
        MI_UINT8 | MI_INT8 => data.iter().map(|&b| char::from(b)).collect(),
        other => {
            return Err(Error::invalid_format(format!(
                "char data stored as unsupported type {}",
                other
            )));
        }
    })
}
