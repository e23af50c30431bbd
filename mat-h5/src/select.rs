//! Source discovery.
//!
//! A conversion source is either a single `.mat` file or a directory of
//! imputed song recordings named `songNN_Imputed.mat`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::container::Container;
use crate::error::{Error, Result};
use crate::mat::MatFile;

/// Extension of source files.
pub const SOURCE_EXTENSION: &str = "mat";

/// Extension of destination files.
pub const OUTPUT_EXTENSION: &str = "hdf5";

const SONG_PREFIX: &str = "song";
const SONG_SUFFIX: &str = "_Imputed.mat";

/// A loaded source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Base name used for the destination file (`songNN_Imputed`).
    pub name: String,
    /// Where the file was read from.
    pub path: PathBuf,
    /// Decoded entries, reserved metadata first.
    pub container: Container,
    /// Variable table from [`MatFile::describe`].
    pub description: String,
}

impl SourceFile {
    /// Load a source file.
    pub fn load(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mat = MatFile::open(&path)?;
        let description = mat.describe();
        Ok(SourceFile {
            name: name.into(),
            path,
            container: mat.into_container(),
            description,
        })
    }

    /// Destination file name (`<name>.hdf5`).
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.name, OUTPUT_EXTENSION)
    }
}

/// Check a directory entry's file name against `songNN_Imputed.mat`.
///
/// Returns the name without its extension when it matches.
///
/// # Example
///
/// ```
/// use mat_h5::select::matches_source_pattern;
///
/// assert_eq!(matches_source_pattern("song07_Imputed.mat"), Some("song07_Imputed"));
/// assert_eq!(matches_source_pattern("song7_Imputed.mat"), None);
/// assert_eq!(matches_source_pattern("notes.txt"), None);
/// ```
pub fn matches_source_pattern(file_name: &str) -> Option<&str> {
    let digits = file_name
        .strip_prefix(SONG_PREFIX)?
        .strip_suffix(SONG_SUFFIX)?;

    if digits.len() == 2 && digits.bytes().all(|b| b.is_ascii_digit()) {
        file_name.strip_suffix(".mat")
    } else {
        None
    }
}

/// Locate and load the source files under `path`.
///
/// - A file path ending in `.mat` yields that file, named by its stem.
/// - A directory yields its `songNN_Imputed.mat` children in file-name
///   order. Other entries (and subdirectories) are ignored.
///
/// # Errors
///
/// - [`Error::NotFound`] if `path` does not exist
/// - [`Error::NoInput`] if nothing under `path` qualifies
/// - any read or parse error of a qualifying file
pub fn select_sources(path: impl AsRef<Path>) -> Result<Vec<SourceFile>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::not_found(path));
    }

    let candidates = if path.is_file() {
        single_file(path).into_iter().collect::<Vec<_>>()
    } else {
        scan_directory(path)?
    };

    if candidates.is_empty() {
        return Err(Error::no_input(path));
    }

    tracing::debug!(source = %path.display(), files = candidates.len(), "selected sources");

    candidates
        .into_iter()
        .map(|(name, file)| SourceFile::load(name, file))
        .collect()
}

fn single_file(path: &Path) -> Option<(String, PathBuf)> {
    let is_mat = path
        .extension()
        .is_some_and(|ext| ext == SOURCE_EXTENSION);
    if !is_mat {
        return None;
    }

    let stem = path.file_stem()?.to_string_lossy().into_owned();
    Some((stem, path.to_path_buf()))
}

fn scan_directory(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };

        if let Some(name) = matches_source_pattern(file_name) {
            found.push((name.to_string(), entry.path()));
        }
    }

    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat::fixture::MatBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_pattern() {
        assert_eq!(
            matches_source_pattern("song01_Imputed.mat"),
            Some("song01_Imputed")
        );
        assert_eq!(matches_source_pattern("song001_Imputed.mat"), None);
        assert_eq!(matches_source_pattern("songAB_Imputed.mat"), None);
        assert_eq!(matches_source_pattern("song01_imputed.mat"), None);
        assert_eq!(matches_source_pattern("song01_Imputed.mat.bak"), None);
        assert_eq!(matches_source_pattern("xsong01_Imputed.mat"), None);
    }

    #[test]
    fn test_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = select_sources(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(err.is_setup_error());
    }

    #[test]
    fn test_directory_without_matches() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        MatBuilder::new()
            .text("a", "b")
            .write(dir.path().join("other.mat"))
            .unwrap();

        let err = select_sources(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NoInput { .. }));
    }

    #[test]
    fn test_non_mat_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let err = select_sources(&path).unwrap_err();
        assert!(matches!(err, Error::NoInput { .. }));
    }

    #[test]
    fn test_directory_order_and_filter() {
        let dir = TempDir::new().unwrap();
        for name in ["song02_Imputed.mat", "song01_Imputed.mat", "song10_Imputed.mat"] {
            MatBuilder::new()
                .numeric("x1", ndarray::array![[1.0]].into_dyn())
                .write(dir.path().join(name))
                .unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::create_dir(dir.path().join("song03_Imputed.mat")).unwrap();

        let sources = select_sources(dir.path()).unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["song01_Imputed", "song02_Imputed", "song10_Imputed"]);
        assert_eq!(sources[0].output_file_name(), "song01_Imputed.hdf5");
    }

    #[test]
    fn test_single_file_uses_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recording.mat");
        MatBuilder::new().text("title", "alpha").write(&path).unwrap();

        let sources = select_sources(&path).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "recording");
        assert_eq!(sources[0].container.get("title"), Some(&crate::MatValue::text("alpha")));
        assert!(sources[0].description.contains("title"));
    }

    #[test]
    fn test_corrupt_match_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("song01_Imputed.mat"), b"not a mat file").unwrap();

        let err = select_sources(dir.path()).unwrap_err();
        assert!(!err.is_setup_error());
    }
}
