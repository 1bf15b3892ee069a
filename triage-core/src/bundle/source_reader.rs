//! Source Reader: per-failure caching file reader.
//!
//! A file listed as a candidate may have vanished or may not decode as UTF-8
//! by the time it is read. Either case yields empty content and a warning.

use crate::reporter::Reporter;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads each path at most once. Create one per failure.
pub struct SourceReader<'r> {
    reporter: &'r dyn Reporter,
    cache: HashMap<PathBuf, String>,
}

impl<'r> SourceReader<'r> {
    pub fn new(reporter: &'r dyn Reporter) -> Self {
        Self {
            reporter,
            cache: HashMap::new(),
        }
    }

    /// File content, or `""` when it cannot be read.
    pub fn read(&mut self, path: &Path) -> &str {
        if !self.cache.contains_key(path) {
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    self.reporter
                        .warn(&format!("Source file {} not found", path.display()));
                    String::new()
                }
                Err(e) => {
                    self.reporter
                        .warn(&format!("Could not read {}: {}", path.display(), e));
                    String::new()
                }
            };
            self.cache.insert(path.to_path_buf(), content);
        }
        self.cache.get(path).map(String::as_str).unwrap_or_default()
    }
}
