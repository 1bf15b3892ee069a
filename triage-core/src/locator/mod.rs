//! Source Locator: finds the failing test's file and the production files
//! it exercises.
//!
//! Two lookups with different policies:
//!
//! * [`SourceLocator::locate_test_source`] stops at the first test root that
//!   holds the test file.
//! * [`SourceLocator::find_related_sources`] collects every candidate from
//!   every discovered source root, deduplicated in insertion order.

pub mod file_walker;
pub mod related;
pub mod stack_trace;
pub mod test_source;

pub use file_walker::FileWalker;
pub use stack_trace::{parse_frames, referenced_classes, StackClasses, StackFrame};

use crate::config::{LocatorConfig, WindowConfig};
use crate::reporter::Reporter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a test method lives and the lines around it.
///
/// `found` is true only when both the file and the method were located. A
/// file whose method could not be matched still reports its `path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContext {
    pub found: bool,
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_signature: Option<String>,
    /// 1-based, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_start_line: Option<usize>,
    /// 1-based, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_end_line: Option<usize>,
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub searched_paths: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl SourceContext {
    /// Not-found context carrying one diagnostic note.
    pub fn not_found(note: impl Into<String>) -> Self {
        Self {
            notes: vec![note.into()],
            ..Self::default()
        }
    }
}

/// Path lookups over a configured directory layout.
///
/// Holds only configuration and a reporter; every call works on fresh state.
#[derive(Clone)]
pub struct SourceLocator {
    config: LocatorConfig,
    window: WindowConfig,
    reporter: Arc<dyn Reporter>,
}

impl SourceLocator {
    pub fn new(config: LocatorConfig, window: WindowConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            config,
            window,
            reporter,
        }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    /// Existing source roots, in prefix × suffix order without repeats.
    pub fn source_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for prefix in &self.config.source_root_prefixes {
            for suffix in &self.config.source_root_suffixes {
                let relative = if prefix == "." || prefix.is_empty() {
                    PathBuf::from(suffix)
                } else {
                    PathBuf::from(prefix).join(suffix)
                };
                let root = self.config.resolve(relative);
                if root.is_dir() && !roots.contains(&root) {
                    roots.push(root);
                }
            }
        }
        roots
    }

    fn walker(&self, root: &std::path::Path) -> FileWalker {
        FileWalker::new(root, self.config.source_extension.clone())
    }
}

impl std::fmt::Debug for SourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceLocator")
            .field("config", &self.config)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
