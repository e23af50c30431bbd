//! HDF5 output tests: converted files are read back with the hdf5 crate.

#![cfg(feature = "hdf5")]

use hdf5::types::FixedAscii;
use mat_h5::mat::fixture::MatBuilder;
use mat_h5::{convert_file, select_sources, Container, MatFile, Transcoder};
use ndarray::array;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn song_source() -> Container {
    let bytes = MatBuilder::new()
        .numeric("song01", array![[1.0, 2.0], [3.0, 4.0]].into_dyn())
        .text_cells("song01Name1", &["alpha", "beta"])
        .text("songTitle7", "gamma")
        .numeric("songCounts3", array![[1u16, 2, 3]].into_dyn())
        .to_bytes();
    MatFile::parse(&bytes).unwrap().into_container()
}

fn convert(source: &Container, path: &Path) {
    convert_file(source, path, &Transcoder::default()).unwrap();
}

#[test]
fn test_song_file_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("song01_Imputed.hdf5");
    convert(&song_source(), &path);

    let file = hdf5::File::open(&path).unwrap();

    let mut names = file.member_names().unwrap();
    names.sort();
    assert_eq!(names, ["song", "song01Name", "songCounts", "songTitle"]);

    let song = file.dataset("song").unwrap().read_dyn::<f64>().unwrap();
    assert_eq!(song, array![[1.0, 2.0], [3.0, 4.0]].into_dyn());

    let counts = file.dataset("songCounts").unwrap();
    assert_eq!(counts.shape(), vec![1, 3]);
    assert_eq!(counts.read_raw::<u16>().unwrap(), vec![1, 2, 3]);

    let song_names = file
        .dataset("song01Name")
        .unwrap()
        .read_1d::<FixedAscii<5>>()
        .unwrap();
    let song_names: Vec<&str> = song_names.iter().map(|s| s.as_str()).collect();
    assert_eq!(song_names, ["alpha", "beta"]);

    let title = file.dataset("songTitle").unwrap();
    assert!(title.is_scalar());
    assert_eq!(
        title.read_scalar::<FixedAscii<5>>().unwrap().as_str(),
        "gamma"
    );
}

#[test]
fn test_repeated_conversion_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.hdf5");
    let second = dir.path().join("second.hdf5");

    let source = song_source();
    convert(&source, &first);
    convert(&source, &second);

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_existing_output_is_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.hdf5");
    fs::write(&path, b"stale contents").unwrap();

    convert(&song_source(), &path);

    let file = hdf5::File::open(&path).unwrap();
    assert!(file.link_exists("song"));
}

#[test]
fn test_directory_to_files() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    for name in ["song01_Imputed.mat", "song02_Imputed.mat"] {
        MatBuilder::new()
            .compressed(true)
            .numeric("song01", array![[1.0]].into_dyn())
            .write(src.path().join(name))
            .unwrap();
    }

    let transcoder = Transcoder::default();
    for source in select_sources(src.path()).unwrap() {
        let output = dst.path().join(source.output_file_name());
        convert_file(&source.container, &output, &transcoder).unwrap();
    }

    let mut outputs: Vec<_> = fs::read_dir(dst.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    outputs.sort();
    assert_eq!(outputs, ["song01_Imputed.hdf5", "song02_Imputed.hdf5"]);
}
