//! Heuristic Bug Annotator
//!
//! Flags lines that could explain an assertion which expected `N > 0` items
//! but got `0`. Every rule is a textual guess; results are advisory and rules
//! may fire on the same line independently.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `if (`, `else if (`, `} else if (`, `while (`
static CONDITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\}\s*)?(?:if|else\s+if|while)\b").expect("CONDITIONAL regex should compile")
});

/// `count > 3`, `COUNT>=10`, ...
static COUNT_COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)count\s*(>=|<=|>|<)\s*(\d+)").expect("COUNT_COMPARISON regex should compile")
});

const SIZE_TOKENS: &[&str] = &["size()", "length", "count", ".size", ".length()"];

const EMPTY_IDIOMS: &[&str] = &[
    "empty",
    "new arraylist()",
    "new arraylist<>()",
    "collections.emptylist()",
    "list.of()",
];

/// Kind of suspicious line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugKind {
    /// Threshold comparison that excludes the expected count
    OffByOne,
    /// Any size/length comparison
    SizeCheck,
    /// Return of an empty collection
    EmptyReturn,
}

impl std::fmt::Display for BugKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OffByOne => write!(f, "off_by_one"),
            Self::SizeCheck => write!(f, "size_check"),
            Self::EmptyReturn => write!(f, "empty_return"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// One flagged line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugAnnotation {
    /// 1-based
    pub line_number: usize,
    /// Line text, trimmed
    pub line_content: String,
    pub kind: BugKind,
    pub description: String,
    pub suggested_fix: String,
    pub confidence: Confidence,
}

/// Scan `source_text` for lines that could make a count-returning method
/// yield nothing.
///
/// Only active when `actual` is `0` and `expected` is a positive integer.
/// Annotations come out in line order, and per line in rule order
/// (off-by-one, size-check, empty-return).
pub fn find_candidate_bugs(source_text: &str, expected: &str, actual: &str) -> Vec<BugAnnotation> {
    if actual.trim() != "0" {
        return Vec::new();
    }
    let expected_count = match expected.trim().parse::<u64>() {
        Ok(n) if n > 0 => n,
        _ => return Vec::new(),
    };

    let mut annotations = Vec::new();
    for (index, raw) in source_text.lines().enumerate() {
        let line = raw.trim();
        let lower = line.to_lowercase();
        let line_number = index + 1;
        let annotate = |kind, description: String, suggested_fix: String, confidence| BugAnnotation {
            line_number,
            line_content: line.to_string(),
            kind,
            description,
            suggested_fix,
            confidence,
        };

        if CONDITIONAL.is_match(line) && lower.contains("count") {
            if let Some((op, threshold)) = excluding_threshold(line, expected_count) {
                annotations.push(annotate(
                    BugKind::OffByOne,
                    format!(
                        "Condition requires count {} {}, but test expects {} items",
                        op, threshold, expected_count
                    ),
                    format!("Change to \"count > 0\" or \"count >= {}\"", expected_count),
                    Confidence::High,
                ));
            }
        }

        if SIZE_TOKENS.iter().any(|t| lower.contains(t)) && has_comparison(line) {
            annotations.push(annotate(
                BugKind::SizeCheck,
                format!(
                    "Size check on line {} might prevent returning expected {} items",
                    line_number, expected_count
                ),
                "Review the size comparison logic".to_string(),
                Confidence::Medium,
            ));
        }

        if lower.contains("return")
            && (EMPTY_IDIOMS.iter().any(|i| lower.contains(i)) || line.contains("return [];"))
        {
            annotations.push(annotate(
                BugKind::EmptyReturn,
                "Empty return statement might be executed when data should be returned".to_string(),
                "Check if this return should be conditional".to_string(),
                Confidence::Medium,
            ));
        }
    }
    annotations
}

/// First `count > N` / `count >= N` on the line with `N >= expected`.
fn excluding_threshold(line: &str, expected: u64) -> Option<(&str, u64)> {
    COUNT_COMPARISON.captures_iter(line).find_map(|caps| {
        let op = caps.get(1)?.as_str();
        let threshold: u64 = caps.get(2)?.as_str().parse().ok()?;
        ((op == ">" || op == ">=") && threshold >= expected).then_some((op, threshold))
    })
}

fn has_comparison(line: &str) -> bool {
    line.contains('>') || line.contains('<')
}
