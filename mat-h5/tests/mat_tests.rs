//! Tests for MAT file reading.
//!
//! Files are produced with the fixture writer, so no binary fixtures are
//! needed.

use mat_h5::mat::fixture::MatBuilder;
use mat_h5::mat::{CellArray, CharArray, Endian, MatClass, NumericArray, NumericData};
use mat_h5::{Error, MatFile, MatValue, GLOBALS_KEY, HEADER_KEY, VERSION_KEY};
use ndarray::{array, ArrayD, IxDyn};
use tempfile::TempDir;

// ============================================================================
// Numeric arrays
// ============================================================================

#[test]
fn test_double_matrix_keeps_row_major_values() {
    let bytes = MatBuilder::new()
        .numeric("song01", array![[1.0, 2.0], [3.0, 4.0]].into_dyn())
        .to_bytes();

    let mat = MatFile::parse(&bytes).unwrap();
    let Some(MatValue::Numeric(array)) = mat.get("song01") else {
        panic!("expected a numeric variable");
    };

    assert_eq!(array.shape(), &[2, 2]);
    assert_eq!(
        array.real(),
        &NumericData::Double(array![[1.0, 2.0], [3.0, 4.0]].into_dyn())
    );
}

#[test]
fn test_integer_classes_survive() {
    let bytes = MatBuilder::new()
        .numeric("a", array![[1u8, 2, 3]].into_dyn())
        .numeric("b", array![[-7i32], [9]].into_dyn())
        .numeric("c", array![[u64::MAX]].into_dyn())
        .to_bytes();

    let mat = MatFile::parse(&bytes).unwrap();
    assert_eq!(mat.get("a").unwrap().class(), MatClass::UInt8);
    assert_eq!(mat.get("b").unwrap().class(), MatClass::Int32);
    assert_eq!(mat.get("c").unwrap().class(), MatClass::UInt64);
    assert_eq!(mat.get("b").unwrap().dims(), Some(&[2, 1][..]));
}

#[test]
fn test_three_dimensional_array() {
    let values: Vec<f32> = (0..24).map(|v| v as f32).collect();
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 3, 4]), values).unwrap();

    let bytes = MatBuilder::new().numeric("cube", data.clone()).to_bytes();
    let mat = MatFile::parse(&bytes).unwrap();

    let Some(MatValue::Numeric(array)) = mat.get("cube") else {
        panic!("expected a numeric variable");
    };
    assert_eq!(array.real(), &NumericData::Single(data));
}

#[test]
fn test_complex_and_logical_flags() {
    let complex = NumericArray::complex(
        array![[1.0, 2.0]].into_dyn(),
        array![[3.0, 4.0]].into_dyn(),
    )
    .unwrap();
    let logical = NumericArray::new(array![[1u8, 0, 1]].into_dyn()).with_logical(true);

    let bytes = MatBuilder::new()
        .value("z", &MatValue::Numeric(complex.clone()))
        .value("mask", &MatValue::Numeric(logical.clone()))
        .to_bytes();

    let mat = MatFile::parse(&bytes).unwrap();
    assert_eq!(mat.get("z"), Some(&MatValue::Numeric(complex)));
    assert_eq!(mat.get("mask"), Some(&MatValue::Numeric(logical)));
}

// ============================================================================
// Text and cells
// ============================================================================

#[test]
fn test_char_and_cell_variables() {
    let bytes = MatBuilder::new()
        .text("title", "alpha")
        .text_cells("names", &["alpha", "beta"])
        .to_bytes();

    let mat = MatFile::parse(&bytes).unwrap();
    assert_eq!(mat.get("title").unwrap().as_text(), Some("alpha".to_string()));

    let Some(MatValue::Cell(cells)) = mat.get("names") else {
        panic!("expected a cell variable");
    };
    assert_eq!(cells.dims(), &[2, 1]);
    assert_eq!(cells.get(1, 0), Some(&MatValue::text("beta")));
}

#[test]
fn test_multi_row_char_array() {
    let chars = CharArray::from_rows(&["ab", "cd"]);
    let bytes = MatBuilder::new()
        .value("grid", &MatValue::Char(chars.clone()))
        .to_bytes();

    let mat = MatFile::parse(&bytes).unwrap();
    let Some(MatValue::Char(read)) = mat.get("grid") else {
        panic!("expected a char variable");
    };
    assert_eq!(read, &chars);
    assert_eq!(read.rows(), Some(vec!["ab".to_string(), "cd".to_string()]));
}

#[test]
fn test_non_ascii_text() {
    let bytes = MatBuilder::new().text("name", "café").to_bytes();
    let mat = MatFile::parse(&bytes).unwrap();
    assert_eq!(mat.get("name").unwrap().as_text(), Some("café".to_string()));
}

#[test]
fn test_nested_cells() {
    let inner = MatValue::Cell(CellArray::column(vec![MatValue::text("x")]));
    let outer = MatValue::Cell(CellArray::column(vec![inner.clone(), MatValue::text("y")]));

    let bytes = MatBuilder::new().value("nested", &outer).to_bytes();
    let mat = MatFile::parse(&bytes).unwrap();
    assert_eq!(mat.get("nested"), Some(&outer));
}

// ============================================================================
// File-level behaviour
// ============================================================================

#[test]
fn test_compressed_and_plain_agree() {
    let build = |compress: bool| {
        MatBuilder::new()
            .compressed(compress)
            .numeric("song01", array![[1.0, 2.0], [3.0, 4.0]].into_dyn())
            .text_cells("song01Name1", &["alpha", "beta"])
            .to_bytes()
    };

    let plain = MatFile::parse(&build(false)).unwrap();
    let compressed = MatFile::parse(&build(true)).unwrap();

    assert_eq!(plain.get("song01"), compressed.get("song01"));
    assert_eq!(plain.get("song01Name1"), compressed.get("song01Name1"));
}

#[test]
fn test_big_endian_file() {
    let bytes = MatBuilder::new()
        .big_endian()
        .numeric("x", array![[1.5, -2.5]].into_dyn())
        .text("t", "hi")
        .to_bytes();

    let mat = MatFile::parse(&bytes).unwrap();
    assert_eq!(mat.endian(), Endian::Big);
    assert_eq!(
        mat.get("x"),
        Some(&MatValue::Numeric(NumericArray::new(
            array![[1.5, -2.5]].into_dyn()
        )))
    );
    assert_eq!(mat.get("t").unwrap().as_text(), Some("hi".to_string()));
}

#[test]
fn test_into_container_prepends_metadata() {
    let bytes = MatBuilder::new()
        .header_text("MATLAB 5.0 MAT-file, test")
        .numeric("b", array![[1.0]].into_dyn())
        .global("g", &MatValue::text("shared"))
        .numeric("a", array![[2.0]].into_dyn())
        .to_bytes();

    let container = MatFile::parse(&bytes).unwrap().into_container();
    let keys: Vec<_> = container.keys().collect();
    assert_eq!(keys, [HEADER_KEY, VERSION_KEY, GLOBALS_KEY, "b", "g", "a"]);

    assert_eq!(
        container.get(HEADER_KEY).unwrap().as_text(),
        Some("MATLAB 5.0 MAT-file, test".to_string())
    );
    assert_eq!(
        container.get(VERSION_KEY).unwrap().as_text(),
        Some("1.0".to_string())
    );
    assert_eq!(
        container.get(GLOBALS_KEY),
        Some(&MatValue::Cell(CellArray::column(vec![MatValue::text("g")])))
    );
}

#[test]
fn test_open_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("song01_Imputed.mat");
    MatBuilder::new()
        .compressed(true)
        .text("title", "alpha")
        .write(&path)
        .unwrap();

    let mat = MatFile::open(&path).unwrap();
    assert_eq!(mat.variable_names().collect::<Vec<_>>(), ["title"]);
    assert!(mat.path().ends_with("song01_Imputed.mat"));
    assert!(mat.describe().contains("title"));
}

#[test]
fn test_truncated_body_is_invalid() {
    let mut bytes = MatBuilder::new()
        .numeric("x", array![[1.0, 2.0, 3.0]].into_dyn())
        .to_bytes();
    bytes.truncate(bytes.len() - 12);

    let err = MatFile::parse(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat { .. }), "got {:?}", err);
}

#[test]
fn test_garbage_element_is_invalid() {
    let bytes = MatBuilder::new()
        .raw(&[99, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
        .to_bytes();

    let err = MatFile::parse(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat { .. }));
}

#[test]
fn test_unsupported_class_is_kept_as_marker() {
    let bytes = MatBuilder::new()
        .value(
            "s",
            &MatValue::Unsupported {
                class: MatClass::Struct,
            },
        )
        .numeric("x", array![[1.0]].into_dyn())
        .to_bytes();

    let mat = MatFile::parse(&bytes).unwrap();
    assert_eq!(
        mat.get("s"),
        Some(&MatValue::Unsupported {
            class: MatClass::Struct
        })
    );
    assert!(mat.get("x").is_some());
}
