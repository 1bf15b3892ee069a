//! Analyze and suggest stages.
//!
//! `analyze` turns a reports directory into `error-summary.json` and
//! `failure-context.json`; `suggest` reads those back, asks a
//! [`FixSuggester`] for fixes and writes `suggested-fixes.json`. The stages
//! only share state through the output directory.

use crate::config::TriageConfig;
use crate::fix_client::FixSuggester;
use crate::prompt::build_prompt;
use crate::reply_parser::{parse_reply, FixReport};
use anyhow::{Context, Result};
use std::sync::Arc;
use triage_core::summary::{read_json, write_json, ErrorSummary, FailureSummary};
use triage_core::{
    ContextEngine, FailureContextBundle, FailureRecord, ReportSet, Reporter, TriageError,
};

/// Result of the analyze stage.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub summary: ErrorSummary,
    pub bundles: Vec<FailureContextBundle>,
}

impl Analysis {
    pub fn has_failures(&self) -> bool {
        self.summary.summary.total_failures + self.summary.summary.total_errors > 0
    }
}

pub struct Pipeline {
    config: TriageConfig,
    reporter: Arc<dyn Reporter>,
}

impl Pipeline {
    pub fn new(config: TriageConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    fn engine(&self) -> ContextEngine {
        ContextEngine::new(
            self.config.locator.clone(),
            self.config.window,
            self.reporter.clone(),
        )
    }

    /// Parse the reports, reconstruct every failure and write both documents.
    pub fn analyze(&self) -> Result<Analysis> {
        let reports_dir = &self.config.reports_dir;
        self.reporter
            .info(&format!("Analyzing test reports in {}", reports_dir.display()));

        let reports = ReportSet::load(reports_dir, self.reporter.as_ref())?;
        let engine = self.engine();
        let summary = ErrorSummary::build(&reports, engine.locator());
        let bundles = engine.reconstruct_all(&reports);

        let summary_path = self.config.summary_path();
        write_json(&summary_path, &summary)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        self.reporter
            .info(&format!("Summary saved to {}", summary_path.display()));

        let context_path = self.config.context_path();
        write_json(&context_path, &bundles)
            .with_context(|| format!("Failed to write {}", context_path.display()))?;
        self.reporter.info(&format!(
            "Failure context for {} test(s) saved to {}",
            bundles.len(),
            context_path.display()
        ));

        self.reporter.info(&format!(
            "Analysis complete: {} tests, {} failures, {} errors ({:.0}% pass rate)",
            reports.total_tests,
            reports.total_failures,
            reports.total_errors,
            reports.success_rate()
        ));
        Ok(Analysis { summary, bundles })
    }

    /// Request fixes for the failures recorded in the output directory.
    ///
    /// Returns `None` without calling `suggester` when nothing failed.
    pub fn suggest(&self, suggester: &dyn FixSuggester) -> Result<Option<FixReport>> {
        let summary_path = self.config.summary_path();
        let summary = ErrorSummary::load(&summary_path)
            .with_context(|| format!("Failed to load {}", summary_path.display()))?;

        let failing = summary.summary.total_failures + summary.summary.total_errors;
        if failing == 0 {
            self.reporter.info("No test failures found to analyze");
            return Ok(None);
        }
        self.reporter.warn(&format!(
            "Failed tests detected - generating fix suggestions for {} failure(s)",
            failing
        ));

        let bundles = self.load_bundles(&summary)?;
        let prompt = build_prompt(&summary, &bundles);
        let reply = suggester
            .suggest(&prompt)
            .context("Fix suggestion request failed")?;
        let report = parse_reply(&reply, &summary, suggester.model());

        let fixes_path = self.config.fixes_path();
        write_json(&fixes_path, &report)
            .with_context(|| format!("Failed to write {}", fixes_path.display()))?;
        self.reporter
            .info(&format!("Fixes saved to {}", fixes_path.display()));
        Ok(Some(report))
    }

    /// Saved bundles if present, otherwise rebuilt from the summary's failures.
    fn load_bundles(&self, summary: &ErrorSummary) -> Result<Vec<FailureContextBundle>> {
        let context_path = self.config.context_path();
        if context_path.is_file() {
            return read_json(&context_path)
                .with_context(|| format!("Failed to load {}", context_path.display()));
        }

        self.reporter.warn(&format!(
            "{} not found, rebuilding failure context",
            context_path.display()
        ));
        let engine = self.engine();
        Ok(summary
            .failures()
            .map(|f| engine.reconstruct(&failure_record(f)))
            .collect())
    }
}

/// Recovery suggestion for the first [`TriageError`] in `err`'s chain.
pub fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<TriageError>())
        .and_then(TriageError::recovery_suggestion)
}

/// Reverse of the summary's view of a failure, lossy in the log fields.
fn failure_record(failure: &FailureSummary) -> FailureRecord {
    FailureRecord {
        test_class: failure.test_class.clone(),
        test_method: failure.test_method.clone(),
        kind: failure.failure_category,
        failure_type: failure.failure_type.clone(),
        message: failure.failure_message.clone(),
        stack_trace: failure.stack_trace.clone(),
        duration_secs: failure.execution_time_seconds,
        system_out: failure.system_out_excerpt.clone(),
        system_err: failure.system_err_excerpt.clone(),
        raw_text: failure.raw_failure_excerpt.clone().unwrap_or_default(),
    }
}
