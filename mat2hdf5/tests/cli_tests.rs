//! Integration tests for mat2hdf5 CLI.

use assert_cmd::Command;
use mat_h5::mat::fixture::MatBuilder;
use ndarray::array;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get the mat2hdf5 command.
fn mat2hdf5() -> Command {
    Command::cargo_bin("mat2hdf5").unwrap()
}

/// Write a song recording fixture.
fn write_song(path: &Path) {
    MatBuilder::new()
        .compressed(true)
        .numeric("song01", array![[1.0, 2.0], [3.0, 4.0]].into_dyn())
        .text_cells("song01Name1", &["alpha", "beta"])
        .write(path)
        .unwrap();
}

fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    mat2hdf5()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Converts .mat data files"))
        .stdout(predicate::str::contains("--source"))
        .stdout(predicate::str::contains("--destination"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_version() {
    mat2hdf5()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mat2hdf5"));
}

#[test]
fn test_quiet_and_verbose_conflict() {
    mat2hdf5()
        .args(["--quiet", "--verbose"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ============================================================================
// Setup Errors
// ============================================================================

#[test]
fn test_missing_source_reports_and_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("out");

    mat2hdf5()
        .arg("--source")
        .arg(temp.path().join("does-not-exist"))
        .arg("--destination")
        .arg(&destination)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Error: File or path does not exist"))
        .stdout(predicate::str::contains("Conversion completed").not());

    assert!(!destination.exists());
}

#[test]
fn test_directory_without_songs() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("notes.txt"), "hello").unwrap();
    let destination = temp.path().join("out");

    mat2hdf5()
        .arg("-s")
        .arg(temp.path())
        .arg("-d")
        .arg(&destination)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Error: No valid .mat files found in the specified source",
        ));

    assert!(!destination.exists());
}

#[test]
fn test_defaults_to_current_directory() {
    let temp = TempDir::new().unwrap();
    write_song(&temp.path().join("song05_Imputed.mat"));

    mat2hdf5()
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversion completed successfully."));

    assert_eq!(sorted_file_names(&temp.path().join("hdf5")), ["song05_Imputed.hdf5"]);
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_directory_conversion() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let destination = dst.path().join("converted");

    write_song(&src.path().join("song01_Imputed.mat"));
    write_song(&src.path().join("song02_Imputed.mat"));
    fs::write(src.path().join("notes.txt"), "not a recording").unwrap();

    mat2hdf5()
        .arg("--source")
        .arg(src.path())
        .arg("--destination")
        .arg(&destination)
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversion completed successfully."));

    assert_eq!(
        sorted_file_names(&destination),
        ["song01_Imputed.hdf5", "song02_Imputed.hdf5"]
    );

    let file = hdf5::File::open(destination.join("song01_Imputed.hdf5")).unwrap();
    let mut names = file.member_names().unwrap();
    names.sort();
    assert_eq!(names, ["song", "song01Name"]);
}

#[test]
fn test_single_file_conversion() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("session.mat");
    write_song(&input);

    mat2hdf5()
        .arg("-s")
        .arg(&input)
        .arg("-d")
        .arg(temp.path().join("out"))
        .assert()
        .success();

    assert_eq!(sorted_file_names(&temp.path().join("out")), ["session.hdf5"]);
}

#[test]
fn test_repeated_runs_are_identical() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("song01_Imputed.mat");
    write_song(&input);

    for out in ["first", "second"] {
        mat2hdf5()
            .arg("-s")
            .arg(&input)
            .arg("-d")
            .arg(temp.path().join(out))
            .assert()
            .success();
    }

    let first = fs::read(temp.path().join("first/song01_Imputed.hdf5")).unwrap();
    let second = fs::read(temp.path().join("second/song01_Imputed.hdf5")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_quiet_suppresses_success_message() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("song01_Imputed.mat");
    write_song(&input);

    mat2hdf5()
        .arg("-q")
        .arg("-s")
        .arg(&input)
        .arg("-d")
        .arg(temp.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_verbose_prints_summary() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("song01_Imputed.mat");
    write_song(&input);

    mat2hdf5()
        .arg("-v")
        .arg("-s")
        .arg(&input)
        .arg("-d")
        .arg(temp.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Datasets written"))
        .stdout(predicate::str::contains("song01Name1"))
        .stdout(predicate::str::contains("Class"));
}

#[test]
fn test_malformed_entry_is_skipped_with_warning() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("song01_Imputed.mat");
    MatBuilder::new()
        .numeric("song01", array![[1.0]].into_dyn())
        .value(
            "songName1",
            &mat_h5::MatValue::Cell(mat_h5::mat::CellArray::column(vec![
                mat_h5::MatValue::Numeric(mat_h5::mat::NumericArray::new(
                    array![[1.0]].into_dyn(),
                )),
            ])),
        )
        .write(&input)
        .unwrap();

    mat2hdf5()
        .arg("-s")
        .arg(&input)
        .arg("-d")
        .arg(temp.path().join("out"))
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("songName1"))
        .stdout(predicate::str::contains("Conversion completed successfully."));

    let file = hdf5::File::open(temp.path().join("out/song01_Imputed.hdf5")).unwrap();
    assert_eq!(file.member_names().unwrap(), ["song"]);
}

#[test]
fn test_corrupt_source_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("song01_Imputed.mat"), b"garbage").unwrap();

    mat2hdf5()
        .arg("-s")
        .arg(temp.path())
        .arg("-d")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
