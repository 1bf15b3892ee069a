//! Failure context bundle types: everything known about one failing test

use crate::annotator::{BugAnnotation, Confidence};
use crate::deps::DependencySet;
use crate::locator::SourceContext;
use crate::report::{AssertionDetails, FailureLocation, FailureRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A production file believed relevant to a failure, with its content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedSource {
    pub path: PathBuf,
    /// File content at read time; empty if it could not be read
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<BugAnnotation>,
}

impl RelatedSource {
    /// File name without directories, for display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Reconstructed context of one failing test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureContextBundle {
    pub failure: FailureRecord,
    /// Window around the test method
    pub test_source: SourceContext,
    /// Related production sources in discovery order
    pub related: Vec<RelatedSource>,
    /// Types the test was inferred to depend on
    #[serde(default)]
    pub dependencies: DependencySet,
    /// `expected: <x> but was: <y>` from the failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<AssertionDetails>,
    /// First `(File.java:N)` of the stack trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FailureLocation>,
    pub generated_at: DateTime<Utc>,
}

impl FailureContextBundle {
    /// Compact summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Bundle[{}, test_source={}, related={}, annotations={}]",
            self.failure.summary(),
            if self.test_source.found {
                "found"
            } else {
                "missing"
            },
            self.related.len(),
            self.annotation_count(),
        )
    }

    /// Every annotation paired with the file it was found in.
    pub fn annotations(&self) -> impl Iterator<Item = (&Path, &BugAnnotation)> {
        self.related
            .iter()
            .flat_map(|r| r.annotations.iter().map(move |a| (r.path.as_path(), a)))
    }

    pub fn annotation_count(&self) -> usize {
        self.related.iter().map(|r| r.annotations.len()).sum()
    }

    /// Annotations at or above `min`, highest confidence first.
    pub fn ranked_annotations(&self, min: Confidence) -> Vec<(&Path, &BugAnnotation)> {
        let mut ranked: Vec<_> = self
            .annotations()
            .filter(|(_, a)| a.confidence >= min)
            .collect();
        ranked.sort_by(|a, b| b.1.confidence.cmp(&a.1.confidence));
        ranked
    }
}
