//! Related production sources: filename, package-path and sibling-package
//! matching over every discovered source root.

use super::stack_trace::{referenced_classes, StackClasses};
use super::SourceLocator;
use crate::deps::{extract_file_dependencies, DependencySet};
use crate::report::FailureRecord;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Ordered, path-deduplicated candidate list.
///
/// Paths are compared by canonical form so `./a/B.java` and `a/B.java` count
/// once; the first spelling seen is the one kept.
#[derive(Debug, Default)]
struct Candidates {
    seen: HashSet<PathBuf>,
    paths: Vec<PathBuf>,
}

impl Candidates {
    fn add(&mut self, path: PathBuf) {
        let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if self.seen.insert(key) {
            self.paths.push(path);
        }
    }
}

/// Everything the related-source search derived from one failure
#[derive(Debug, Clone, Default)]
pub struct RelatedSearch {
    pub dependencies: DependencySet,
    pub stack_classes: StackClasses,
    pub base_name: String,
    pub patterns: Vec<String>,
    pub paths: Vec<PathBuf>,
}

impl SourceLocator {
    /// Production source files related to `failure`, in discovery order.
    pub fn find_related_sources(
        &self,
        failure: &FailureRecord,
        test_file: Option<&Path>,
    ) -> Vec<PathBuf> {
        self.related_search(failure, test_file).paths
    }

    /// [`find_related_sources`](Self::find_related_sources) with the
    /// intermediate dependency set and search patterns kept.
    pub fn related_search(&self, failure: &FailureRecord, test_file: Option<&Path>) -> RelatedSearch {
        let mut dependencies = match test_file {
            Some(path) => extract_file_dependencies(path, self.reporter.as_ref()),
            None => DependencySet::new(),
        };
        let stack_classes =
            referenced_classes(&failure.stack_trace, |name| self.config.has_test_suffix(name));
        dependencies.extend(stack_classes.simple.iter().cloned());
        dependencies.extend(stack_classes.qualified.iter().cloned());

        let base_name = self
            .config
            .strip_test_suffix(failure.simple_class_name())
            .to_string();
        let patterns = self.search_patterns(&base_name, &stack_classes, &dependencies);

        let roots = self.source_roots();
        let mut candidates = Candidates::default();

        for root in &roots {
            for file in self.walker(root).source_files() {
                let matched = file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| patterns.iter().any(|p| name.contains(p.as_str())));
                if matched {
                    candidates.add(file);
                }
            }
        }

        for dependency in dependencies.qualified() {
            let relative = format!(
                "{}.{}",
                dependency.replace('.', "/"),
                self.config.source_extension
            );
            for root in &roots {
                let path = root.join(&relative);
                if path.is_file() {
                    candidates.add(path);
                }
            }
        }

        for package in production_package_variants(&failure.test_class) {
            let package_dir = package.replace('.', "/");
            for root in &roots {
                let dir = root.join(&package_dir);
                if dir.is_dir() {
                    for file in self.walker(root).files_in(&dir) {
                        candidates.add(file);
                    }
                }
            }
        }

        self.reporter.info(&format!(
            "Found {} related source files for {}",
            candidates.paths.len(),
            failure.test_class
        ));

        RelatedSearch {
            dependencies,
            stack_classes,
            base_name,
            patterns,
            paths: candidates.paths,
        }
    }

    /// Filename fragments that mark a source file as related.
    fn search_patterns(
        &self,
        base_name: &str,
        stack_classes: &StackClasses,
        dependencies: &DependencySet,
    ) -> Vec<String> {
        let mut patterns: Vec<String> = Vec::new();
        let mut push = |pattern: String| {
            if !pattern.is_empty() && !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        };

        if !base_name.is_empty() {
            push(base_name.to_string());
            for suffix in &self.config.companion_suffixes {
                push(format!("{}{}", base_name, suffix));
            }
        }
        for class in &stack_classes.simple {
            push(class.clone());
        }
        for name in dependencies.simple_names() {
            push(name.to_string());
        }
        patterns
    }
}

/// Guesses at the production package of a test class, most specific first.
///
/// `com.bank.test.junit.search.FooTest` yields `com.bank.search`,
/// `com.bank.service`, `com.bank.service.search` and `com.bank.junit.search`.
pub fn production_package_variants(test_class: &str) -> Vec<String> {
    let Some((package, _)) = test_class.rsplit_once('.') else {
        return Vec::new();
    };

    let candidates = [
        package.replace(".test.junit.", ".").replace(".test.", "."),
        package.replace(".test.junit.search", ".service"),
        package.replace(".test.junit", ".service"),
        package.replace(".test", ""),
    ];

    let mut variants: Vec<String> = Vec::new();
    for variant in candidates {
        if !variant.is_empty() && !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}
