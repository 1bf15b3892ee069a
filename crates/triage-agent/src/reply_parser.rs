//! Reply parser: turns the model's free-text answer into structured fixes.
//!
//! The reply is expected to follow the prompt's format: `ROOT CAUSE`,
//! `EXACT FIXES` with `FILE:` / `LINE:` / `REPLACE:` / `WITH:` entries,
//! `VERIFICATION`, and optionally `ADDITIONAL NOTES`. Anything else is ignored;
//! the raw reply is always kept.

use serde::{Deserialize, Serialize};
use triage_core::summary::ErrorSummary;

const DEFAULT_ROOT_CAUSE: &str = "See AI response for details";
const DEFAULT_VERIFICATION: &str = "Run the test to verify the fix";

/// `LINE:` value: a number when it parses as one, the text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineRef {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for LineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(t) => write!(f, "{}", t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedFix {
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<LineRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_method: Option<String>,
    pub root_cause: String,
    pub verification: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

impl SuggestedFix {
    fn new(file_path: String) -> Self {
        Self {
            file_path,
            line_number: None,
            current_code: None,
            fixed_code: None,
            test_class: None,
            test_method: None,
            root_cause: String::new(),
            verification: String::new(),
            additional_notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixMetadata {
    pub generated_at: String,
    pub total_failures: u32,
    pub ai_model: String,
}

/// Contents of `suggested-fixes.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixReport {
    pub metadata: FixMetadata,
    pub fixes: Vec<SuggestedFix>,
    pub raw_ai_response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    RootCause,
    Fixes,
    Verification,
    Notes,
}

const SECTION_MARKERS: &[(&str, Section)] = &[
    ("ROOT CAUSE", Section::RootCause),
    ("EXACT FIXES", Section::Fixes),
    ("VERIFICATION", Section::Verification),
    ("ADDITIONAL NOTES", Section::Notes),
];

/// Section a header line opens, plus any text after the header on that line.
///
/// A header is `**NAME` anywhere or `NAME:` anywhere on the line.
fn section_header(line: &str) -> Option<(Section, &str)> {
    SECTION_MARKERS.iter().find_map(|(name, section)| {
        let bold = format!("**{}", name);
        let colon = format!("{}:", name);
        let start = line.find(&bold).or_else(|| line.find(&colon))?;
        let name_end = line[start..].find(name)? + start + name.len();
        let rest = line[name_end..].trim_start_matches(|c: char| c == '*' || c == ':' || c.is_whitespace());
        Some((*section, rest.trim()))
    })
}

/// Value after a `KEY:` directive, with surrounding backticks removed.
fn directive<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let value = line.strip_prefix(key)?.trim();
    Some(if value.starts_with('`') {
        value.trim_matches('`')
    } else {
        value
    })
}

/// Parse `reply` against the failures of `summary`.
///
/// Fixes are matched to failing tests by position: the first fix gets the
/// first failure, and so on. Extra fixes keep no test reference.
pub fn parse_reply(reply: &str, summary: &ErrorSummary, model: &str) -> FixReport {
    let mut fixes: Vec<SuggestedFix> = Vec::new();
    let mut current: Option<SuggestedFix> = None;
    let mut section = Section::None;
    let mut root_cause: Vec<&str> = Vec::new();
    let mut verification: Vec<&str> = Vec::new();
    let mut notes: Vec<&str> = Vec::new();

    for raw in reply.lines() {
        let line = raw.trim();

        if let Some((opened, rest)) = section_header(line) {
            section = opened;
            if !rest.is_empty() {
                match section {
                    Section::RootCause => root_cause.push(rest),
                    Section::Verification => verification.push(rest),
                    Section::Notes => notes.push(rest),
                    Section::Fixes | Section::None => {}
                }
            }
            continue;
        }

        if let Some(path) = directive(line, "FILE:") {
            fixes.extend(current.take());
            current = Some(SuggestedFix::new(path.to_string()));
            continue;
        }
        if let Some(value) = directive(line, "LINE:") {
            if let Some(fix) = current.as_mut() {
                fix.line_number = Some(match value.parse() {
                    Ok(n) => LineRef::Number(n),
                    Err(_) => LineRef::Text(value.to_string()),
                });
            }
            continue;
        }
        if let Some(value) = directive(line, "REPLACE:") {
            if let Some(fix) = current.as_mut() {
                fix.current_code = Some(value.to_string());
            }
            continue;
        }
        if let Some(value) = directive(line, "WITH:") {
            if let Some(fix) = current.as_mut() {
                fix.fixed_code = Some(value.to_string());
            }
            continue;
        }

        if line.is_empty() {
            continue;
        }
        match section {
            Section::RootCause => root_cause.push(line),
            Section::Verification => verification.push(line),
            Section::Notes => notes.push(line),
            Section::Fixes | Section::None => {}
        }
    }
    fixes.extend(current.take());

    let root_cause = joined_or(&root_cause, DEFAULT_ROOT_CAUSE);
    let verification = joined_or(&verification, DEFAULT_VERIFICATION);
    let notes = (!notes.is_empty()).then(|| notes.join(" "));

    let mut failures = summary.failures();
    for fix in &mut fixes {
        if let Some(failure) = failures.next() {
            fix.test_class = Some(failure.test_class.clone());
            fix.test_method = Some(failure.test_method.clone());
        }
        fix.root_cause = root_cause.clone();
        fix.verification = verification.clone();
        fix.additional_notes = notes.clone();
    }

    FixReport {
        metadata: FixMetadata {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            total_failures: summary.summary.total_failures,
            ai_model: model.to_string(),
        },
        fixes,
        raw_ai_response: reply.to_string(),
    }
}

fn joined_or(parts: &[&str], default: &str) -> String {
    if parts.is_empty() {
        default.to_string()
    } else {
        parts.join(" ")
    }
}

/// Console lines describing the parsed fixes.
pub fn render_fix_summary(report: &FixReport) -> String {
    if report.fixes.is_empty() {
        return "  No fixes were parsed from the AI response\n  Review the raw AI response in the output file".to_string();
    }

    let mut out = String::new();
    for (i, fix) in report.fixes.iter().enumerate() {
        let file_name = fix.file_path.rsplit('/').next().unwrap_or(&fix.file_path);
        let line = fix
            .line_number
            .as_ref()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "?".to_string());
        let issue = match &fix.current_code {
            Some(code) if !code.is_empty() => {
                let head: String = code.chars().take(50).collect();
                if code.chars().count() > 50 {
                    format!("{}...", head)
                } else {
                    head
                }
            }
            _ => "Fix available".to_string(),
        };
        match &fix.test_method {
            Some(method) => out.push_str(&format!(
                "  {}. {}:{} - {} (Test: {})\n",
                i + 1,
                file_name,
                line,
                issue,
                method
            )),
            None => out.push_str(&format!("  {}. {}:{} - {}\n", i + 1, file_name, line, issue)),
        }
    }
    out.push_str(&format!(
        "\n  Total failures analyzed: {}\n  Fixes generated: {}",
        report.metadata.total_failures,
        report.fixes.len()
    ));
    out
}
