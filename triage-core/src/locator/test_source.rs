//! Test-file lookup: first configured test root holding the class wins.

use super::{SourceContext, SourceLocator};
use crate::window::extract_method_context_in;
use std::path::PathBuf;

impl SourceLocator {
    /// Candidate locations of `test_class` under every test root, in priority order.
    pub fn test_source_candidates(&self, test_class: &str) -> Vec<PathBuf> {
        let class_path = format!(
            "{}.{}",
            test_class.replace('.', "/"),
            self.config.source_extension
        );
        self.config
            .test_roots
            .iter()
            .map(|root| self.config.resolve(root).join(&class_path))
            .collect()
    }

    /// Find the test file for `test_class` and cut a window around `test_method`.
    ///
    /// Only the first existing candidate is read. When it cannot be read or
    /// does not contain the method, the context is not-found but keeps the
    /// path and explains why in its notes.
    pub fn locate_test_source(&self, test_class: &str, test_method: &str) -> SourceContext {
        let searched = self.test_source_candidates(test_class);

        let Some(path) = searched.iter().find(|p| p.is_file()) else {
            let mut ctx = SourceContext::not_found(format!("Source file not found for {}", test_class));
            ctx.searched_paths = searched;
            return ctx;
        };

        match std::fs::read_to_string(path) {
            Ok(text) => extract_method_context_in(&text, test_method, Some(path), &self.window),
            Err(e) => {
                let note = format!("Could not read source file {}: {}", path.display(), e);
                self.reporter.warn(&note);
                let mut ctx = SourceContext::not_found(note);
                ctx.path = Some(path.clone());
                ctx
            }
        }
    }
}
