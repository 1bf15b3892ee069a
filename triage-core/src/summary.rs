//! Failure summary document (`error-summary.json`).
//!
//! A self-contained description of a test run for a human or a model to
//! analyse: totals, per-suite status, and for every failure its location,
//! assertion values, log excerpts and test-source window.

use crate::error::TriageResult;
use crate::locator::{SourceContext, SourceLocator};
use crate::report::excerpt::{
    extract_assertion_details, extract_failure_location, extract_relevant_log, truncate_text,
    AssertionDetails, FailureLocation,
};
use crate::report::{FailureKind, FailureRecord, ReportSet, TestSuiteResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Limit for stdout/stderr and raw failure excerpts.
pub const EXCERPT_LIMIT: usize = 400;

const GUIDANCE_PROMPT: &str = "Analyze the failing Maven Surefire tests, explain the root cause for each \
failure, recommend precise code/configuration fixes, and highlight regression risks or missing test coverage.";

const GUIDANCE_STEPS: &[&str] = &[
    "Review each failure entry, paying attention to stack traces and assertion details.",
    "Use the source context to pinpoint the code under test and propose updates.",
    "Validate whether external dependencies, data fixtures, or configuration need adjustments.",
    "Recommend additional tests or assertions to prevent future regressions.",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub metadata: SummaryMetadata,
    pub summary: SummaryTotals,
    pub suites: Vec<SuiteSummary>,
    pub analysis_guidance: AnalysisGuidance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// Local time, `%Y-%m-%d %H:%M:%S`
    pub generated_at: String,
    pub reports_directory: PathBuf,
    pub total_suites: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub total_tests: u32,
    pub total_failures: u32,
    pub total_errors: u32,
    pub total_skipped: u32,
    pub total_time_seconds: f64,
    pub successful_tests: u32,
    pub success_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub name: String,
    pub report_file: PathBuf,
    pub tests: u32,
    pub failure_count: u32,
    pub errors: u32,
    pub skipped: u32,
    pub time_seconds: f64,
    /// `PASSED` or `FAILED`
    pub status: String,
    pub failures: Vec<FailureSummary>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_log_excerpt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureSummary {
    pub test_class: String,
    pub test_method: String,
    pub failure_type: String,
    pub failure_category: FailureKind,
    pub execution_time_seconds: f64,
    pub failure_message: String,
    pub stack_trace: String,
    pub failure_location: Option<FailureLocation>,
    pub assertion_details: Option<AssertionDetails>,
    pub system_out_excerpt: String,
    pub system_err_excerpt: String,
    pub test_source: SourceContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_failure_excerpt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisGuidance {
    pub prompt: String,
    pub suggested_steps: Vec<String>,
}

impl Default for AnalysisGuidance {
    fn default() -> Self {
        Self {
            prompt: GUIDANCE_PROMPT.to_string(),
            suggested_steps: GUIDANCE_STEPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ErrorSummary {
    /// Build the summary of `reports`, locating each failing test's source.
    pub fn build(reports: &ReportSet, locator: &SourceLocator) -> Self {
        Self {
            metadata: SummaryMetadata {
                generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                reports_directory: reports.reports_dir.clone(),
                total_suites: reports.suites.len(),
            },
            summary: SummaryTotals {
                total_tests: reports.total_tests,
                total_failures: reports.total_failures,
                total_errors: reports.total_errors,
                total_skipped: reports.total_skipped,
                total_time_seconds: round_to(reports.total_time_secs, 3),
                successful_tests: reports.success_count(),
                success_rate_percent: round_to(reports.success_rate(), 2),
            },
            suites: reports
                .suites
                .iter()
                .map(|s| SuiteSummary::build(s, locator))
                .collect(),
            analysis_guidance: AnalysisGuidance::default(),
        }
    }

    /// Every failure across all suites, in report order.
    pub fn failures(&self) -> impl Iterator<Item = &FailureSummary> {
        self.suites.iter().flat_map(|s| s.failures.iter())
    }

    pub fn load(path: &Path) -> TriageResult<Self> {
        read_json(path)
    }
}

impl SuiteSummary {
    fn build(suite: &TestSuiteResult, locator: &SourceLocator) -> Self {
        Self {
            name: suite.name.clone(),
            report_file: suite.report_file.clone(),
            tests: suite.tests,
            failure_count: suite.failures,
            errors: suite.errors,
            skipped: suite.skipped,
            time_seconds: round_to(suite.time_secs, 3),
            status: suite.status().to_string(),
            failures: suite
                .test_failures
                .iter()
                .map(|f| FailureSummary::build(f, locator))
                .collect(),
            environment: suite.properties.clone(),
            suite_log_excerpt: suite.log_excerpt.clone(),
        }
    }
}

impl FailureSummary {
    fn build(failure: &FailureRecord, locator: &SourceLocator) -> Self {
        let assertion_source = if failure.message.is_empty() {
            failure.raw_text.as_str()
        } else {
            failure.message.as_str()
        };
        let raw = failure.raw_text.trim();
        let raw_failure_excerpt =
            (!raw.is_empty() && raw != failure.message).then(|| truncate_text(raw, EXCERPT_LIMIT));

        Self {
            test_class: failure.test_class.clone(),
            test_method: failure.test_method.clone(),
            failure_type: failure.failure_type.clone(),
            failure_category: failure.kind,
            execution_time_seconds: round_to(failure.duration_secs, 3),
            failure_message: failure.message.clone(),
            stack_trace: failure.stack_trace.clone(),
            failure_location: extract_failure_location(&failure.stack_trace),
            assertion_details: extract_assertion_details(assertion_source),
            system_out_excerpt: extract_relevant_log(&failure.system_out, EXCERPT_LIMIT),
            system_err_excerpt: extract_relevant_log(&failure.system_err, EXCERPT_LIMIT),
            test_source: locator.locate_test_source(&failure.test_class, &failure.test_method),
            raw_failure_excerpt,
        }
    }
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> TriageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> TriageResult<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
