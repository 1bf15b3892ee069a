//! Report types: failing tests and the suites they belong to

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Whether the test failed an assertion or blew up with an exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// `<failure>` element: an assertion did not hold
    Failure,
    /// `<error>` element: the test threw
    Error,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failure => write!(f, "failure"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One failing test case, as recorded in a Surefire report.
///
/// Built once by the report parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Dotted test class name (e.g. `com.example.bank.test.junit.search.AtmLocationSearchTest`)
    pub test_class: String,
    /// Test method name
    pub test_method: String,
    /// Failure or error
    pub kind: FailureKind,
    /// Exception / assertion type (e.g. `org.opentest4j.AssertionFailedError`)
    pub failure_type: String,
    /// Failure message (the `message` attribute, or the first line of the text)
    pub message: String,
    /// Stack trace (the element text minus its first line)
    pub stack_trace: String,
    /// Execution time in seconds
    pub duration_secs: f64,
    /// Captured standard output of the test case
    #[serde(default)]
    pub system_out: String,
    /// Captured standard error of the test case
    #[serde(default)]
    pub system_err: String,
    /// Untouched text content of the failure element
    #[serde(default)]
    pub raw_text: String,
}

impl FailureRecord {
    /// Simple (last dotted segment) name of the test class
    pub fn simple_class_name(&self) -> &str {
        self.test_class
            .rsplit('.')
            .next()
            .unwrap_or(self.test_class.as_str())
    }

    /// Compact one-line identifier for logging
    pub fn summary(&self) -> String {
        format!("{}#{} [{}]", self.test_class, self.test_method, self.kind)
    }
}

/// One `<testsuite>` of a report file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub name: String,
    pub tests: u32,
    pub failures: u32,
    pub errors: u32,
    pub skipped: u32,
    /// Suite duration in seconds
    pub time_secs: f64,
    /// Report file the suite was read from
    pub report_file: PathBuf,
    /// Failing test cases in document order
    pub test_failures: Vec<FailureRecord>,
    /// Environment properties worth showing (filtered)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    /// Excerpt of the `<suite>.txt` log written next to the XML report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_excerpt: Option<String>,
}

impl TestSuiteResult {
    pub fn new(name: impl Into<String>, report_file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            tests: 0,
            failures: 0,
            errors: 0,
            skipped: 0,
            time_secs: 0.0,
            report_file: report_file.into(),
            test_failures: Vec::new(),
            properties: BTreeMap::new(),
            log_excerpt: None,
        }
    }

    /// `PASSED` when the suite recorded no failures and no errors
    pub fn status(&self) -> &'static str {
        if self.failures + self.errors == 0 {
            "PASSED"
        } else {
            "FAILED"
        }
    }
}
