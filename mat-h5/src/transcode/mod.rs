//! Entry transcoding: the decision of what each source entry becomes.
//!
//! For every entry of a [`Container`], in order, the [`Transcoder`]:
//!
//! 1. skips reserved metadata keys,
//! 2. maps the name with [`strip_digit_suffix`],
//! 3. classifies the value ([`classify`]),
//! 4. encodes it and hands it to a [`DatasetSink`].
//!
//! Cell arrays that fail to flatten into strings are dropped with a warning
//! and the loop moves on. Every other failure propagates.
//!
//! # Example
//!
//! ```
//! use mat_h5::{Container, MatValue, MemorySink, Transcoder};
//!
//! let mut source = Container::new();
//! source.insert("__header__", MatValue::text("MATLAB 5.0 MAT-file"));
//! source.insert("songTitle1", MatValue::text("alpha"));
//!
//! let mut sink = MemorySink::new();
//! let report = Transcoder::default().transcode(&source, &mut sink)?;
//!
//! assert_eq!(sink.keys().collect::<Vec<_>>(), ["songTitle"]);
//! assert_eq!(report.written(), 1);
//! # Ok::<(), mat_h5::Error>(())
//! ```

mod classify;
mod key;

use std::collections::HashSet;

pub use classify::{classify, flatten_text_cells, EntryKind, FlattenError};
pub use key::strip_digit_suffix;

use crate::container::{Container, RESERVED_KEYS};
use crate::dataset::{DatasetKind, DatasetSink, DatasetValue, FixedBytes};
use crate::error::{Error, Result};

/// Configuration for a [`Transcoder`].
///
/// # Example
///
/// ```
/// use mat_h5::TranscodeConfig;
///
/// let config = TranscodeConfig::new().reserved_key("__function_workspace__");
/// assert_eq!(config.reserved_keys.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeConfig {
    /// Entry names that are never converted.
    pub reserved_keys: Vec<String>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        TranscodeConfig {
            reserved_keys: RESERVED_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl TranscodeConfig {
    /// Create a configuration with the standard reserved keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the reserved keys.
    pub fn reserved_keys(mut self, keys: &[&str]) -> Self {
        self.reserved_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Add one reserved key.
    pub fn reserved_key(mut self, key: impl Into<String>) -> Self {
        self.reserved_keys.push(key.into());
        self
    }
}

/// What happened to one source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// A dataset was created.
    Written {
        /// Destination dataset name.
        dataset: String,
        /// Kind of dataset.
        kind: DatasetKind,
    },
    /// The key is reserved metadata.
    SkippedReserved,
    /// The value has a shape that is not converted.
    SkippedUnrecognized,
    /// A cell array could not be flattened into strings.
    Dropped {
        /// Destination dataset name the entry would have had.
        dataset: String,
        /// Why flattening failed.
        error: FlattenError,
    },
}

/// Outcome for a named source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// Source entry name.
    pub source_key: String,
    /// What happened to it.
    pub outcome: EntryOutcome,
}

/// Per-entry outcomes of one transcoding pass, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodeReport {
    entries: Vec<EntryReport>,
}

impl TranscodeReport {
    fn push(&mut self, source_key: &str, outcome: EntryOutcome) {
        self.entries.push(EntryReport {
            source_key: source_key.to_string(),
            outcome,
        });
    }

    /// All entry reports.
    pub fn entries(&self) -> &[EntryReport] {
        &self.entries
    }

    /// Outcome for a source key.
    pub fn outcome(&self, source_key: &str) -> Option<&EntryOutcome> {
        self.entries
            .iter()
            .find(|e| e.source_key == source_key)
            .map(|e| &e.outcome)
    }

    /// Number of datasets written.
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Written { .. }))
    }

    /// Number of entries skipped (reserved or unrecognized).
    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                EntryOutcome::SkippedReserved | EntryOutcome::SkippedUnrecognized
            )
        })
    }

    /// Entries dropped because they could not be flattened.
    pub fn dropped(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, EntryOutcome::Dropped { .. }))
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// Converts container entries into datasets.
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    config: TranscodeConfig,
}

impl Transcoder {
    /// Create a transcoder.
    pub fn new(config: TranscodeConfig) -> Self {
        Transcoder { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &TranscodeConfig {
        &self.config
    }

    /// Whether `key` is reserved metadata.
    pub fn is_reserved(&self, key: &str) -> bool {
        self.config.reserved_keys.iter().any(|k| k == key)
    }

    /// Populate `sink` from `source`.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateDataset`] if two entries map to the same name
    /// - any error returned by the sink
    pub fn transcode<S>(&self, source: &Container, sink: &mut S) -> Result<TranscodeReport>
    where
        S: DatasetSink + ?Sized,
    {
        let mut report = TranscodeReport::default();
        let mut created: HashSet<&str> = HashSet::new();

        for (key, value) in source.iter() {
            if self.is_reserved(key) {
                report.push(key, EntryOutcome::SkippedReserved);
                continue;
            }

            let dataset = strip_digit_suffix(key);

            let encoded = match classify(value) {
                EntryKind::NestedTextArray(cells) => match flatten_text_cells(cells) {
                    Ok(texts) => DatasetValue::Bytes(FixedBytes::array(&texts)),
                    Err(error) => {
                        tracing::warn!(
                            key,
                            %error,
                            "could not convert entry to byte strings, skipping it"
                        );
                        report.push(
                            key,
                            EntryOutcome::Dropped {
                                dataset: dataset.to_string(),
                                error,
                            },
                        );
                        continue;
                    }
                },
                EntryKind::ScalarText(text) => DatasetValue::Bytes(FixedBytes::scalar(&text)),
                EntryKind::NumericArray(array) => DatasetValue::Numeric(array),
                EntryKind::Unrecognized => {
                    tracing::trace!(key, kind = value.kind(), "skipping unrecognized entry");
                    report.push(key, EntryOutcome::SkippedUnrecognized);
                    continue;
                }
            };

            if !created.insert(dataset) {
                return Err(Error::duplicate_dataset(dataset, key));
            }

            sink.create_dataset(dataset, &encoded)?;
            tracing::debug!(key, dataset, kind = ?encoded.kind(), "created dataset");

            report.push(
                key,
                EntryOutcome::Written {
                    dataset: dataset.to_string(),
                    kind: encoded.kind(),
                },
            );
        }

        Ok(report)
    }
}
