//! Text helpers for failure output: truncation, log filtering, assertion and
//! location extraction.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Lines of captured output worth keeping in a summary.
static RELEVANT_LOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(ERROR|WARN|Exception:|Caused by|AssertionFailedError|expected:|actual:|\bFAIL(?:URE)?!?)",
    )
    .expect("RELEVANT_LOG_LINE regex should compile")
});

/// `(File.java:42)` inside a stack frame.
static FRAME_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([^():\s]+):(\d+)\)").expect("FRAME_LOCATION regex should compile")
});

/// JUnit-style `expected: <x> but was: <y>`.
static ASSERTION_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"expected:\s*<(.*)>\s*but was:\s*<(.*)>")
        .expect("ASSERTION_VALUES regex should compile")
});

/// First source location found in a stack trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureLocation {
    /// File name as printed in the frame (e.g. `AtmLocationService.java`)
    pub file: String,
    /// 1-based line number
    pub line: u32,
    /// The whole frame line, trimmed
    pub stack_line: String,
}

/// Expected and actual values of a failed equality assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionDetails {
    pub expected: String,
    pub actual: String,
}

/// Trim `value` and cut it to `limit` characters, noting how much was dropped.
pub fn truncate_text(value: &str, limit: usize) -> String {
    let text = value.trim();
    let total = text.chars().count();
    if total <= limit {
        return text.to_string();
    }
    let truncated: String = text.chars().take(limit).collect();
    format!(
        "{}\n...[truncated {} characters]",
        truncated,
        total - limit
    )
}

/// Keep only error-ish lines of captured output, truncated to `limit`.
pub fn extract_relevant_log(text: &str, limit: usize) -> String {
    let important: Vec<&str> = text
        .trim()
        .lines()
        .map(str::trim_end)
        .filter(|line| RELEVANT_LOG_LINE.is_match(line))
        .collect();

    if important.is_empty() {
        return String::new();
    }
    truncate_text(&important.join("\n"), limit)
}

/// First line of a failure text, used when the element has no `message`.
pub fn first_line(raw_text: &str) -> String {
    raw_text
        .trim()
        .lines()
        .next()
        .map(|l| l.trim().to_string())
        .unwrap_or_default()
}

/// Failure text without its first (message) line.
pub fn stack_trace_body(raw_text: &str) -> String {
    let text = raw_text.trim();
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= 1 {
        return text.to_string();
    }
    lines[1..].join("\n").trim().to_string()
}

/// Location of the first frame carrying `(File:line)`.
pub fn extract_failure_location(stack_trace: &str) -> Option<FailureLocation> {
    stack_trace.lines().find_map(|line| {
        let caps = FRAME_LOCATION.captures(line)?;
        let line_no = caps.get(2)?.as_str().parse().ok()?;
        Some(FailureLocation {
            file: caps.get(1)?.as_str().to_string(),
            line: line_no,
            stack_line: line.trim().to_string(),
        })
    })
}

/// Parse `expected: <x> but was: <y>` out of a failure message.
pub fn extract_assertion_details(message: &str) -> Option<AssertionDetails> {
    let caps = ASSERTION_VALUES.captures(message)?;
    Some(AssertionDetails {
        expected: caps.get(1)?.as_str().to_string(),
        actual: caps.get(2)?.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_short_is_trimmed_only() {
        assert_eq!(truncate_text("  hello  ", 10), "hello");
    }

    #[test]
    fn test_truncate_text_reports_dropped_chars() {
        let out = truncate_text("abcdefghij", 4);
        assert_eq!(out, "abcd\n...[truncated 6 characters]");
    }

    #[test]
    fn test_truncate_text_counts_chars_not_bytes() {
        let out = truncate_text("ééééé", 5);
        assert_eq!(out, "ééééé");
    }

    #[test]
    fn test_extract_relevant_log_filters_lines() {
        let log = "starting app\n2024 ERROR db down\nall good\nCaused by: java.io.IOException\n";
        assert_eq!(
            extract_relevant_log(log, 400),
            "2024 ERROR db down\nCaused by: java.io.IOException"
        );
        assert_eq!(extract_relevant_log("nothing here", 400), "");
        assert_eq!(extract_relevant_log("", 400), "");
    }

    #[test]
    fn test_first_line_and_stack_body() {
        let raw = "\n  expected: <3> but was: <0>\n\tat com.x.FooTest.run(FooTest.java:10)\n";
        assert_eq!(first_line(raw), "expected: <3> but was: <0>");
        assert_eq!(
            stack_trace_body(raw),
            "at com.x.FooTest.run(FooTest.java:10)"
        );
        assert_eq!(stack_trace_body("single line"), "single line");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_extract_failure_location() {
        let trace = "at org.junit.Assert.fail(Native Method)\n\
                     \tat com.example.bank.service.AtmLocationService.search(AtmLocationService.java:42)\n";
        let loc = extract_failure_location(trace).unwrap();
        assert_eq!(loc.file, "AtmLocationService.java");
        assert_eq!(loc.line, 42);
        assert!(loc.stack_line.starts_with("at com.example"));

        assert!(extract_failure_location("no frames").is_none());
    }

    #[test]
    fn test_extract_assertion_details() {
        let details = extract_assertion_details("expected: <3> but was: <0>").unwrap();
        assert_eq!(details.expected, "3");
        assert_eq!(details.actual, "0");

        let junit4 = extract_assertion_details("expected:<[foo]> but was:<[bar]>").unwrap();
        assert_eq!(junit4.expected, "[foo]");
        assert_eq!(junit4.actual, "[bar]");

        assert!(extract_assertion_details("NullPointerException").is_none());
    }
}
