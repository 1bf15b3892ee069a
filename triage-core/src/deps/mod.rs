//! Textual dependency inference for test sources.
//!
//! See [`patterns`] for the rule table and [`extract_dependencies`] for the
//! entry point.

pub mod extractor;
pub mod patterns;

pub use extractor::{extract_dependencies, extract_file_dependencies};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Referenced type names, simple (`AtmLocationService`) or dotted
/// (`com.bank.service.AtmLocationService`). Duplicates collapse; iteration is
/// sorted so output built from a set is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencySet(BTreeSet<String>);

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the name was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Last dotted segment of every entry, deduplicated.
    pub fn simple_names(&self) -> BTreeSet<&str> {
        self.iter().map(simple_name).collect()
    }

    /// Entries that carry a package qualifier.
    pub fn qualified(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|name| name.contains('.'))
    }
}

impl<S: Into<String>> FromIterator<S> for DependencySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for DependencySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// `com.bank.Foo` -> `Foo`
fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
