//! Context Engine: assembles a [`FailureContextBundle`] per failing test.
//!
//! Locates the test file, windows the failing method, infers dependencies,
//! collects related production files and annotates them. Each failure is
//! processed with fresh state; nothing carries over between calls.

use super::source_reader::SourceReader;
use super::types::{FailureContextBundle, RelatedSource};
use crate::annotator::find_candidate_bugs;
use crate::config::{LocatorConfig, WindowConfig};
use crate::locator::SourceLocator;
use crate::report::excerpt::{extract_assertion_details, extract_failure_location};
use crate::report::{FailureRecord, ReportSet};
use crate::reporter::Reporter;
use chrono::Utc;
use std::sync::Arc;

/// Immutable configuration plus an injected reporter.
#[derive(Debug, Clone)]
pub struct ContextEngine {
    locator: SourceLocator,
}

impl ContextEngine {
    pub fn new(config: LocatorConfig, window: WindowConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            locator: SourceLocator::new(config, window, reporter),
        }
    }

    pub fn locator(&self) -> &SourceLocator {
        &self.locator
    }

    /// Reconstruct the context of one failure.
    pub fn reconstruct(&self, failure: &FailureRecord) -> FailureContextBundle {
        let reporter = self.locator.reporter();
        reporter.info(&format!("Reconstructing context for {}", failure.summary()));

        let test_source = self
            .locator
            .locate_test_source(&failure.test_class, &failure.test_method);
        let test_file = test_source.path.as_deref().filter(|p| p.is_file());
        let search = self.locator.related_search(failure, test_file);

        let assertion = extract_assertion_details(&failure.message);
        let location = extract_failure_location(&failure.stack_trace);

        let mut reader = SourceReader::new(reporter);
        let related = search
            .paths
            .into_iter()
            .map(|path| {
                let content = reader.read(&path).to_string();
                let annotations = assertion
                    .as_ref()
                    .map(|a| find_candidate_bugs(&content, &a.expected, &a.actual))
                    .unwrap_or_default();
                RelatedSource {
                    path,
                    content,
                    annotations,
                }
            })
            .collect();

        let bundle = FailureContextBundle {
            failure: failure.clone(),
            test_source,
            related,
            dependencies: search.dependencies,
            assertion,
            location,
            generated_at: Utc::now(),
        };
        reporter.info(&bundle.summary());
        bundle
    }

    /// One bundle per failing test case, in report order.
    pub fn reconstruct_all(&self, reports: &ReportSet) -> Vec<FailureContextBundle> {
        reports.failures().map(|f| self.reconstruct(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::BugKind;
    use crate::report::FailureKind;
    use crate::reporter::MemoryReporter;
    use std::fs;
    use std::path::Path;

    fn write(base: &Path, rel: &str, body: &str) {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn failure(message: &str) -> FailureRecord {
        FailureRecord {
            test_class: "com.bank.test.LoanTest".into(),
            test_method: "approvesLoans".into(),
            kind: FailureKind::Failure,
            failure_type: "org.opentest4j.AssertionFailedError".into(),
            message: message.into(),
            stack_trace: "\tat com.bank.test.LoanTest.approvesLoans(LoanTest.java:9)".into(),
            duration_secs: 0.01,
            system_out: String::new(),
            system_err: String::new(),
            raw_text: String::new(),
        }
    }

    fn engine(base: &Path, reporter: Arc<MemoryReporter>) -> ContextEngine {
        ContextEngine::new(LocatorConfig::rooted_at(base), WindowConfig::default(), reporter)
    }

    #[test]
    fn test_reconstruct_annotates_related_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "src/test/java/com/bank/test/LoanTest.java",
            "package com.bank.test;\n\nimport com.bank.LoanService;\n\nclass LoanTest {\n  @Test\n  void approvesLoans() {}\n}\n",
        );
        write(
            dir.path(),
            "src/main/java/com/bank/LoanService.java",
            "class LoanService {\n  List<Loan> approved() {\n    if (count > 5) {\n      return Collections.emptyList();\n    }\n  }\n}\n",
        );

        let reporter = Arc::new(MemoryReporter::new());
        let bundle = engine(dir.path(), reporter.clone()).reconstruct(&failure("expected: <5> but was: <0>"));

        assert!(bundle.test_source.found);
        assert_eq!(bundle.test_source.context_start_line, Some(2));
        assert!(bundle.dependencies.contains("com.bank.LoanService"));
        assert_eq!(bundle.related.len(), 1);
        assert_eq!(bundle.related[0].file_name(), "LoanService.java");

        let kinds: Vec<BugKind> = bundle.related[0].annotations.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![BugKind::OffByOne, BugKind::SizeCheck, BugKind::EmptyReturn]
        );
        assert_eq!(bundle.assertion.as_ref().unwrap().expected, "5");
        assert_eq!(bundle.location.as_ref().unwrap().line, 9);
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_reconstruct_without_assertion_has_no_annotations() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "src/main/java/com/bank/LoanService.java",
            "if (count > 5) {\n",
        );

        let reporter = Arc::new(MemoryReporter::new());
        let bundle = engine(dir.path(), reporter).reconstruct(&failure("NullPointerException"));
        assert!(!bundle.test_source.found);
        assert!(bundle.test_source.path.is_none());
        assert_eq!(bundle.related.len(), 1);
        assert!(bundle.related[0].annotations.is_empty());
        assert!(bundle.assertion.is_none());
    }

    #[test]
    fn test_reconstruct_all_follows_report_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut suite = crate::report::TestSuiteResult::new("LoanTest", "TEST-LoanTest.xml");
        suite.tests = 2;
        suite.failures = 2;
        let mut second = failure("expected: <1> but was: <0>");
        second.test_method = "rejectsLoans".into();
        suite.test_failures = vec![failure("boom"), second];

        let mut reports = ReportSet::default();
        reports.push_suite(suite);

        let bundles = engine(dir.path(), Arc::new(MemoryReporter::new())).reconstruct_all(&reports);
        let methods: Vec<&str> = bundles.iter().map(|b| b.failure.test_method.as_str()).collect();
        assert_eq!(methods, vec!["approvesLoans", "rejectsLoans"]);
    }
}
