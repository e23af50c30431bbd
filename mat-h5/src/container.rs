//! Ordered mapping from entry name to value.

use crate::mat::MatValue;

/// Key holding the MAT header text.
pub const HEADER_KEY: &str = "__header__";
/// Key holding the MAT header version.
pub const VERSION_KEY: &str = "__version__";
/// Key holding the names of global variables.
pub const GLOBALS_KEY: &str = "__globals__";

/// Metadata keys that are never converted.
pub const RESERVED_KEYS: [&str; 3] = [HEADER_KEY, VERSION_KEY, GLOBALS_KEY];

/// A flat, ordered collection of named entries.
///
/// Iteration follows insertion order. Inserting an existing name replaces
/// its value in place.
///
/// # Example
///
/// ```
/// use mat_h5::{Container, MatValue};
///
/// let mut container = Container::new();
/// container.insert("title", MatValue::text("alpha"));
/// container.insert("song01", MatValue::text("beta"));
///
/// let keys: Vec<_> = container.keys().collect();
/// assert_eq!(keys, ["title", "song01"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    entries: Vec<(String, MatValue)>,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing the value of an existing name.
    pub fn insert(&mut self, name: impl Into<String>, value: MatValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Get an entry by name.
    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the container has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, MatValue)> for Container {
    fn from_iter<I: IntoIterator<Item = (K, MatValue)>>(iter: I) -> Self {
        let mut container = Container::new();
        for (name, value) in iter {
            container.insert(name, value);
        }
        container
    }
}

impl<K: Into<String>> Extend<(K, MatValue)> for Container {
    fn extend<I: IntoIterator<Item = (K, MatValue)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}
