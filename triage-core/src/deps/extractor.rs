//! Applies the pattern table to source text.

use super::patterns::rules;
use super::DependencySet;
use crate::reporter::Reporter;
use std::path::Path;

/// Union of every rule's contributions for `source_text`.
pub fn extract_dependencies(source_text: &str) -> DependencySet {
    let mut deps = DependencySet::new();
    for rule in rules() {
        deps.extend(rule.apply(source_text));
    }
    deps
}

/// Read `path` and extract its dependencies.
///
/// An unreadable file yields an empty set and a warning; it is never an error.
pub fn extract_file_dependencies(path: &Path, reporter: &dyn Reporter) -> DependencySet {
    match std::fs::read_to_string(path) {
        Ok(text) => extract_dependencies(&text),
        Err(e) => {
            reporter.warn(&format!(
                "Could not parse dependencies from {}: {}",
                path.display(),
                e
            ));
            DependencySet::new()
        }
    }
}
