//! File Walker: source file discovery using the `ignore` crate

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walks a source root for files with a given extension.
///
/// Hidden directories and `.gitignore`d paths are skipped and symlinks are
/// not followed, so a cyclic link cannot make the walk unbounded.
pub struct FileWalker {
    root: PathBuf,
    extension: String,
}

impl FileWalker {
    pub fn new(root: impl AsRef<Path>, extension: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: extension.into(),
        }
    }

    /// All matching files under the root at any depth, sorted.
    pub fn source_files(&self) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .follow_links(false)
            .build();

        let mut files: Vec<PathBuf> = walker
            .flatten()
            .map(|entry| entry.into_path())
            .filter(|path| self.matches(path))
            .collect();
        files.sort();
        files
    }

    /// Matching files directly inside `dir` (no recursion), sorted.
    pub fn files_in(&self, dir: &Path) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| self.matches(path))
            .collect();
        files.sort();
        files
    }

    fn matches(&self, path: &Path) -> bool {
        path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }
}
