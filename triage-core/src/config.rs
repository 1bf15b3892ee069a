//! Search and windowing configuration.
//!
//! Defaults follow the conventional Maven layout of a `bank/` module next to a
//! plain `src/` tree. Every list is ordered: the first test root that holds
//! the test file wins, and source roots are tried in prefix × suffix order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where to look for test and production sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Directory all relative roots are resolved against.
    pub base_dir: PathBuf,
    /// Candidate test-source roots, in priority order.
    pub test_roots: Vec<String>,
    /// Prefixes combined with `source_root_suffixes` to discover source roots.
    /// `"."` stands for the base directory itself.
    pub source_root_prefixes: Vec<String>,
    /// Sub-directories tried under each prefix.
    pub source_root_suffixes: Vec<String>,
    /// File extension of source files, without the dot.
    pub source_extension: String,
    /// Suffixes stripped from a test class name to get the class under test.
    /// Checked in order; only the first match is stripped.
    pub test_suffixes: Vec<String>,
    /// Suffixes appended to the base name to guess companion classes.
    pub companion_suffixes: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            test_roots: vec![
                "bank/src/test/java".to_string(),
                "src/test/java".to_string(),
                "test".to_string(),
            ],
            source_root_prefixes: vec![
                ".".to_string(),
                "bank".to_string(),
                "src".to_string(),
                "main".to_string(),
            ],
            source_root_suffixes: vec![
                "src/main/java".to_string(),
                "main/java".to_string(),
                "java".to_string(),
            ],
            source_extension: "java".to_string(),
            test_suffixes: vec![
                "Test".to_string(),
                "Tests".to_string(),
                "IT".to_string(),
                "Integration".to_string(),
            ],
            companion_suffixes: vec![
                "Service".to_string(),
                "Controller".to_string(),
                "Repository".to_string(),
                "Manager".to_string(),
            ],
        }
    }
}

impl LocatorConfig {
    /// Config rooted at `base_dir` with every other field at its default.
    pub fn rooted_at(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Resolve a relative path against the base directory.
    ///
    /// With the default base of `.` the relative path is returned as-is so
    /// reported paths stay in their familiar `bank/src/...` form.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        let relative = relative.as_ref();
        if self.base_dir.as_os_str().is_empty() || self.base_dir == Path::new(".") {
            relative.to_path_buf()
        } else {
            self.base_dir.join(relative)
        }
    }

    /// Whether `name` ends in one of the configured test suffixes.
    pub fn has_test_suffix(&self, name: &str) -> bool {
        self.test_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// `name` with the first matching test suffix removed.
    pub fn strip_test_suffix<'a>(&self, name: &'a str) -> &'a str {
        self.test_suffixes
            .iter()
            .find_map(|s| name.strip_suffix(s.as_str()))
            .unwrap_or(name)
    }
}

/// Size of the line window cut around a located method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub lines_before: usize,
    pub lines_after: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            lines_before: 5,
            lines_after: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roots_order() {
        let config = LocatorConfig::default();
        assert_eq!(config.test_roots[0], "bank/src/test/java");
        assert_eq!(config.source_root_prefixes[0], ".");
        assert_eq!(config.source_extension, "java");
    }

    #[test]
    fn test_resolve_keeps_relative_paths_for_dot_base() {
        let config = LocatorConfig::default();
        assert_eq!(config.resolve("src/test/java"), PathBuf::from("src/test/java"));

        let rooted = LocatorConfig::rooted_at("/repo");
        assert_eq!(rooted.resolve("src"), PathBuf::from("/repo/src"));
    }

    #[test]
    fn test_strip_test_suffix_first_match_only() {
        let config = LocatorConfig::default();
        assert_eq!(config.strip_test_suffix("AtmLocationSearchTest"), "AtmLocationSearch");
        assert_eq!(config.strip_test_suffix("UserTests"), "User");
        assert_eq!(config.strip_test_suffix("PaymentIT"), "Payment");
        assert_eq!(config.strip_test_suffix("LoginIntegration"), "Login");
        // "Test" is checked before "Tests", so "TestTest" loses only one suffix
        assert_eq!(config.strip_test_suffix("TestTest"), "Test");
        assert_eq!(config.strip_test_suffix("Helper"), "Helper");
    }

    #[test]
    fn test_partial_toml_style_config_uses_defaults() {
        let config: LocatorConfig =
            serde_json::from_str(r#"{"test_roots": ["module/src/test/java"]}"#).unwrap();
        assert_eq!(config.test_roots, vec!["module/src/test/java".to_string()]);
        assert_eq!(config.source_root_suffixes.len(), 3);

        let window: WindowConfig = serde_json::from_str(r#"{"lines_after": 10}"#).unwrap();
        assert_eq!(window.lines_before, 5);
        assert_eq!(window.lines_after, 10);
    }
}
