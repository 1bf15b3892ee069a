//! Prompt assembly for the fix-suggestion request.

use std::fmt::Write as _;
use triage_core::summary::{ErrorSummary, FailureSummary, SuiteSummary};
use triage_core::{Confidence, FailureContextBundle};

const HEADER: &str = "You are a Java debugging expert. Analyze the test failure and provide EXACT CODE FIXES that can be directly applied.

IMPORTANT: Provide specific file paths, line numbers, and exact code replacements in this format:
FILE: path/to/file.java
LINE: 123
REPLACE: old code here
WITH: new code here

";

const OUTPUT_FORMAT: &str = "REQUIRED OUTPUT FORMAT:
1. **ROOT CAUSE**: Brief explanation of what's wrong
2. **EXACT FIXES**: For each file that needs changes:
   FILE: exact/path/to/file.java
   LINE: line_number
   REPLACE: exact_current_code
   WITH: exact_new_code

3. **VERIFICATION**: How to verify the fix works

Focus on providing executable, copy-paste ready code fixes.
";

/// Build the prompt for every failure in `summary`.
///
/// Related sources and bug annotations come from the bundle whose failure has
/// the same class and method; a failure without a bundle gets only the
/// summary's own fields. Annotations are listed highest confidence first.
pub fn build_prompt(summary: &ErrorSummary, bundles: &[FailureContextBundle]) -> String {
    let mut prompt = String::from(HEADER);
    let totals = &summary.summary;
    let _ = write!(
        prompt,
        "**Test Summary:**\n- Total tests: {}\n- Failures: {}\n- Success rate: {}%\n\n",
        totals.total_tests, totals.total_failures, totals.success_rate_percent
    );

    for suite in summary.suites.iter().filter(|s| !s.failures.is_empty()) {
        let _ = write!(prompt, "**Failed Test Suite: {}**\n\n", suite.name);
        for failure in &suite.failures {
            let bundle = bundles.iter().find(|b| {
                b.failure.test_class == failure.test_class
                    && b.failure.test_method == failure.test_method
            });
            write_failure(&mut prompt, failure, bundle);
            write_environment(&mut prompt, suite);
        }
    }

    prompt.push_str(OUTPUT_FORMAT);
    prompt
}

fn write_failure(out: &mut String, failure: &FailureSummary, bundle: Option<&FailureContextBundle>) {
    let _ = writeln!(out, "**Test Method:** {}", failure.test_method);
    let _ = writeln!(out, "**Failure Type:** {}", failure.failure_type);
    let _ = writeln!(out, "**Error Message:** {}", failure.failure_message);

    if let Some(location) = &failure.failure_location {
        let _ = write!(out, "**Location:** {}:{}\n\n", location.file, location.line);
    }
    if let Some(assertion) = &failure.assertion_details {
        let _ = write!(
            out,
            "**Assertion Details:**\n- Expected: {}\n- Actual: {}\n\n",
            assertion.expected, assertion.actual
        );
    }
    if let Some(context) = failure.test_source.context.as_deref().filter(|c| !c.is_empty()) {
        let _ = write!(out, "**Test Source Code:**\n```java\n{}\n```\n\n", context);
    }

    let Some(bundle) = bundle else {
        return;
    };
    for related in bundle.related.iter().filter(|r| !r.content.is_empty()) {
        let _ = write!(
            out,
            "**Related Source Code ({}):**\n```java\n{}\n```\n\n",
            related.path.display(),
            related.content
        );
    }

    let annotations = bundle.ranked_annotations(Confidence::Low);
    if !annotations.is_empty() {
        out.push_str("**POTENTIAL LOGIC BUGS DETECTED:**\n");
        for (path, bug) in annotations {
            let _ = write!(
                out,
                "- **{}** in {}:{}\n  Line: `{}`\n  Issue: {}\n  Suggested Fix: {}\n  Confidence: {}\n\n",
                bug.kind,
                path.display(),
                bug.line_number,
                bug.line_content,
                bug.description,
                bug.suggested_fix,
                bug.confidence
            );
        }
    }
}

fn write_environment(out: &mut String, suite: &SuiteSummary) {
    if suite.environment.is_empty() {
        return;
    }
    let get = |key: &str| suite.environment.get(key).map(String::as_str).unwrap_or("N/A");
    let _ = write!(
        out,
        "**Environment:**\n- Java Version: {}\n- OS: {} {}\n\n",
        get("java.version"),
        get("os.name"),
        get("os.version")
    );
}
