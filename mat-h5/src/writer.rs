//! HDF5 destination files.
//!
//! [`Hdf5Writer`] is the [`DatasetSink`] used for real conversions: every
//! dataset lands at the root of a newly created HDF5 file.

use std::path::{Path, PathBuf};

use hdf5::types::TypeDescriptor;
use hdf5::{Extents, H5Type};
use hdf5_sys::h5d::H5Dwrite;
use hdf5_sys::h5p::H5P_DEFAULT;
use hdf5_sys::h5s::H5S_ALL;
use ndarray::{ArrayD, Zip};

use crate::container::Container;
use crate::dataset::{DatasetSink, DatasetValue, FixedBytes};
use crate::error::{Error, Result};
use crate::mat::{with_numeric, NumericArray, NumericData};
use crate::transcode::{TranscodeReport, Transcoder};

/// Complex `single` element, stored as an `{r, i}` compound.
#[derive(H5Type, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
struct Complex32 {
    r: f32,
    i: f32,
}

/// Complex element of any other class, widened to `f64`.
#[derive(H5Type, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
struct Complex64 {
    r: f64,
    i: f64,
}

/// Writer for one destination HDF5 file.
///
/// Created with [`Hdf5Writer::create`], which truncates any existing file.
/// Datasets are written without creation or modification timestamps, so
/// converting the same source twice yields identical bytes.
///
/// # Example
///
/// ```no_run
/// use mat_h5::{DatasetSink, DatasetValue, FixedBytes, Hdf5Writer};
///
/// let mut writer = Hdf5Writer::create("song01_Imputed.hdf5")?;
/// writer.create_dataset("title", &DatasetValue::Bytes(FixedBytes::scalar("alpha")))?;
/// writer.close()?;
/// # Ok::<(), mat_h5::Error>(())
/// ```
#[derive(Debug)]
pub struct Hdf5Writer {
    /// Open file handle, `None` once closed.
    file: Option<hdf5::File>,

    /// Path to the file (for error messages).
    path: PathBuf,

    /// Count of datasets written.
    dataset_count: usize,
}

impl Hdf5Writer {
    /// Create (or truncate) an HDF5 file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hdf5`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = hdf5::File::with_options()
            .with_fcpl(|p| p.obj_track_times(false))
            .create(&path)?;

        tracing::debug!(path = %path.display(), "created HDF5 file");

        Ok(Hdf5Writer {
            file: Some(file),
            path,
            dataset_count: 0,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of datasets written so far.
    pub fn dataset_count(&self) -> usize {
        self.dataset_count
    }

    /// Flush and close the file.
    ///
    /// The file is also closed when the writer is dropped, but calling
    /// `close()` explicitly reports any error.
    pub fn close(mut self) -> Result<()> {
        self.do_close()
    }

    fn do_close(&mut self) -> Result<()> {
        match self.file.take() {
            Some(file) => {
                file.flush()?;
                file.close()?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Get the open file, failing once it has been closed.
    fn file(&self) -> Result<&hdf5::File> {
        self.file.as_ref().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HDF5 file '{}' has been closed", self.path.display()),
            ))
        })
    }

    fn write_array<T: H5Type>(&self, name: &str, data: &ArrayD<T>) -> Result<()> {
        self.file()?
            .new_dataset_builder()
            .with_dcpl(|p| p.obj_track_times(false))
            .with_data(data)
            .create(name)?;
        Ok(())
    }

    fn write_numeric(&self, name: &str, array: &NumericArray) -> Result<()> {
        match (array.real(), array.imag()) {
            (real, None) => with_numeric!(real, data => self.write_array(name, data)),
            (NumericData::Single(re), Some(NumericData::Single(im))) => {
                let data = Zip::from(re)
                    .and(im)
                    .map_collect(|&r, &i| Complex32 { r, i });
                self.write_array(name, &data)
            }
            (real, Some(imag)) => {
                let (re, im) = (real.to_f64(), imag.to_f64());
                let data = Zip::from(&re)
                    .and(&im)
                    .map_collect(|&r, &i| Complex64 { r, i });
                self.write_array(name, &data)
            }
        }
    }

    fn write_bytes(&self, name: &str, bytes: &FixedBytes) -> Result<()> {
        let extents = if bytes.is_scalar() {
            Extents::Scalar
        } else {
            Extents::from(bytes.len())
        };

        let dataset = self
            .file()?
            .new_dataset_builder()
            .with_dcpl(|p| p.obj_track_times(false))
            .empty_as(&string_type(bytes))
            .shape(extents)
            .create(name)?;

        if bytes.is_empty() {
            return Ok(());
        }

        // The string width is only known at run time, so the buffer goes
        // through H5Dwrite with the dataset's own type as memory type.
        let dtype = dataset.dtype()?;
        let status = hdf5::sync::sync(|| unsafe {
            H5Dwrite(
                dataset.id(),
                dtype.id(),
                H5S_ALL,
                H5S_ALL,
                H5P_DEFAULT,
                bytes.as_bytes().as_ptr().cast(),
            )
        });

        if status < 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!(
                    "Failed to write dataset '{}' to '{}'",
                    name,
                    self.path.display()
                ),
            )));
        }
        Ok(())
    }
}

/// Fixed-length string type carrying the character set of `bytes`.
fn string_type(bytes: &FixedBytes) -> TypeDescriptor {
    if bytes.is_ascii() {
        TypeDescriptor::FixedAscii(bytes.width())
    } else {
        TypeDescriptor::FixedUnicode(bytes.width())
    }
}

impl DatasetSink for Hdf5Writer {
    fn create_dataset(&mut self, name: &str, value: &DatasetValue<'_>) -> Result<()> {
        if self.file()?.link_exists(name) {
            return Err(Error::duplicate_dataset(name, name));
        }

        match value {
            DatasetValue::Numeric(array) => self.write_numeric(name, array)?,
            DatasetValue::Bytes(bytes) => self.write_bytes(name, bytes)?,
        }

        self.dataset_count += 1;
        Ok(())
    }
}

impl Drop for Hdf5Writer {
    fn drop(&mut self) {
        // Best-effort close, ignore errors
        let _ = self.do_close();
    }
}

/// Transcode `source` into a new HDF5 file at `path`.
///
/// The file is created (or truncated) first and closed before returning.
/// On error it is released without being completed.
///
/// # Errors
///
/// Propagates file creation, transcoding and write errors.
pub fn convert_file(
    source: &Container,
    path: impl AsRef<Path>,
    transcoder: &Transcoder,
) -> Result<TranscodeReport> {
    let mut writer = Hdf5Writer::create(path)?;
    let report = transcoder.transcode(source, &mut writer)?;

    tracing::info!(
        path = %writer.path().display(),
        datasets = writer.dataset_count(),
        dropped = report.dropped().count(),
        "converted file"
    );

    writer.close()?;
    Ok(report)
}
