//! Surefire report ingestion
//!
//! Reads every `TEST-*.xml` in a reports directory into [`TestSuiteResult`]s
//! and keeps running totals. A report that fails to parse is skipped with a
//! warning; the remaining reports are still read.

pub mod excerpt;
pub mod surefire;
pub mod types;

pub use excerpt::{AssertionDetails, FailureLocation};
pub use types::{FailureKind, FailureRecord, TestSuiteResult};

use crate::error::{TriageError, TriageResult};
use crate::reporter::Reporter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// All suites of one reports directory plus aggregate counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSet {
    pub reports_dir: PathBuf,
    pub suites: Vec<TestSuiteResult>,
    pub total_tests: u32,
    pub total_failures: u32,
    pub total_errors: u32,
    pub total_skipped: u32,
    pub total_time_secs: f64,
}

impl ReportSet {
    /// Load every `TEST-*.xml` report found directly inside `reports_dir`.
    pub fn load(reports_dir: impl AsRef<Path>, reporter: &dyn Reporter) -> TriageResult<Self> {
        let reports_dir = reports_dir.as_ref();
        if !reports_dir.is_dir() {
            return Err(TriageError::ReportsDirNotFound {
                path: reports_dir.to_path_buf(),
            });
        }

        let files = report_files(reports_dir)?;
        if files.is_empty() {
            return Err(TriageError::NoReports {
                path: reports_dir.to_path_buf(),
            });
        }
        reporter.info(&format!("Found {} test report files", files.len()));

        let mut set = Self {
            reports_dir: reports_dir.to_path_buf(),
            ..Self::default()
        };
        for file in &files {
            match read_report(file) {
                Ok(suites) => suites.into_iter().for_each(|s| set.push_suite(s)),
                Err(e) if e.is_skippable() => reporter.warn(&e.to_string()),
                Err(e) => reporter.warn(&format!("Could not read {}: {}", file.display(), e)),
            }
        }
        Ok(set)
    }

    /// Add a suite and fold its counts into the totals.
    pub fn push_suite(&mut self, suite: TestSuiteResult) {
        self.total_tests += suite.tests;
        self.total_failures += suite.failures;
        self.total_errors += suite.errors;
        self.total_skipped += suite.skipped;
        self.total_time_secs += suite.time_secs;
        self.suites.push(suite);
    }

    /// Every failing test case across all suites, in report order.
    pub fn failures(&self) -> impl Iterator<Item = &FailureRecord> {
        self.suites.iter().flat_map(|s| s.test_failures.iter())
    }

    pub fn has_failures(&self) -> bool {
        self.total_failures > 0 || self.total_errors > 0
    }

    /// Tests that neither failed nor errored (skipped tests count as successful).
    pub fn success_count(&self) -> u32 {
        self.total_tests
            .saturating_sub(self.total_failures)
            .saturating_sub(self.total_errors)
    }

    /// Success rate in percent; 0 when no tests ran.
    pub fn success_rate(&self) -> f64 {
        if self.total_tests == 0 {
            0.0
        } else {
            self.success_count() as f64 / self.total_tests as f64 * 100.0
        }
    }
}

/// `TEST-*.xml` files directly inside `dir`, sorted by name.
fn report_files(dir: &Path) -> TriageResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("TEST-") && n.ends_with(".xml"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Parse one report file, attaching filtered properties and the suite log.
fn read_report(path: &Path) -> TriageResult<Vec<TestSuiteResult>> {
    let bytes = std::fs::read(path)?;
    let xml = String::from_utf8(bytes).map_err(|e| TriageError::malformed(path, e.to_string()))?;
    let mut suites =
        surefire::parse_report(&xml, path).map_err(|msg| TriageError::malformed(path, msg))?;

    let log_excerpt = surefire::load_suite_log_excerpt(path, surefire::SUITE_LOG_LIMIT);
    for suite in &mut suites {
        suite.properties = surefire::filter_properties(&suite.properties);
        suite.log_excerpt = log_excerpt.clone();
    }
    Ok(suites)
}
