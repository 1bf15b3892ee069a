//! Streaming parser for Surefire `TEST-*.xml` reports.

use super::excerpt::{first_line, stack_trace_body, truncate_text};
use super::types::{FailureKind, FailureRecord, TestSuiteResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Suite properties kept in summaries; everything else is JVM noise.
pub const RELEVANT_PROPERTIES: &[&str] = &[
    "java.version",
    "java.vendor",
    "os.name",
    "os.version",
    "os.arch",
    "user.dir",
    "user.language",
    "user.country",
    "basedir",
    "spring.profiles.active",
];

/// Maximum characters kept from a suite's `.txt` log.
pub const SUITE_LOG_LIMIT: usize = 2000;

/// Where character data is currently being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Nothing,
    FailureText,
    SystemOut,
    SystemErr,
}

/// A `<failure>`/`<error>` element seen inside the current test case.
#[derive(Debug)]
struct PendingFailure {
    kind: FailureKind,
    failure_type: String,
    message: Option<String>,
    text: String,
}

/// The `<testcase>` currently open.
#[derive(Debug, Default)]
struct CaseBuilder {
    class: String,
    method: String,
    time: f64,
    failures: Vec<PendingFailure>,
    system_out: String,
    system_err: String,
}

impl CaseBuilder {
    fn into_records(self) -> Vec<FailureRecord> {
        let system_out = self.system_out.trim().to_string();
        let system_err = self.system_err.trim().to_string();
        self.failures
            .into_iter()
            .map(|f| {
                let message = f
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| first_line(&f.text));
                FailureRecord {
                    test_class: self.class.clone(),
                    test_method: self.method.clone(),
                    kind: f.kind,
                    failure_type: f.failure_type,
                    message,
                    stack_trace: stack_trace_body(&f.text),
                    duration_secs: self.time,
                    system_out: system_out.clone(),
                    system_err: system_err.clone(),
                    raw_text: f.text,
                }
            })
            .collect()
    }
}

fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>, String> {
    let mut out = HashMap::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(|err| err.to_string())?;
        out.insert(key, value.to_string());
    }
    Ok(out)
}

fn attr_str(attrs: &HashMap<String, String>, key: &str, default: &str) -> String {
    attrs
        .get(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn attr_u32(attrs: &HashMap<String, String>, key: &str) -> u32 {
    attrs
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn attr_f64(attrs: &HashMap<String, String>, key: &str) -> f64 {
    attrs
        .get(key)
        .and_then(|v| v.trim().replace(',', "").parse().ok())
        .unwrap_or(0.0)
}

fn suite_from(attrs: &HashMap<String, String>, report_file: &Path) -> TestSuiteResult {
    let mut suite = TestSuiteResult::new(attr_str(attrs, "name", "Unknown"), report_file);
    suite.tests = attr_u32(attrs, "tests");
    suite.failures = attr_u32(attrs, "failures");
    suite.errors = attr_u32(attrs, "errors");
    suite.skipped = attr_u32(attrs, "skipped");
    suite.time_secs = attr_f64(attrs, "time");
    suite
}

fn pending_from(kind: FailureKind, attrs: &HashMap<String, String>) -> PendingFailure {
    PendingFailure {
        kind,
        failure_type: attr_str(attrs, "type", "Unknown"),
        message: attrs.get("message").cloned(),
        text: String::new(),
    }
}

fn failure_kind(name: &[u8]) -> Option<FailureKind> {
    match name {
        b"failure" => Some(FailureKind::Failure),
        b"error" => Some(FailureKind::Error),
        _ => None,
    }
}

/// Parse one report document into its suites.
///
/// Accepts a bare `<testsuite>` root as well as a `<testsuites>` wrapper.
/// Properties are kept unfiltered here; see [`filter_properties`].
pub fn parse_report(xml: &str, report_file: &Path) -> Result<Vec<TestSuiteResult>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut suites = Vec::new();
    let mut open_suites: Vec<TestSuiteResult> = Vec::new();
    let mut case: Option<CaseBuilder> = None;
    let mut pending: Option<PendingFailure> = None;
    let mut capture = Capture::Nothing;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"testsuite" => {
                        let attrs = attributes(e)?;
                        open_suites.push(suite_from(&attrs, report_file));
                    }
                    b"property" => record_property(e, &mut open_suites)?,
                    b"testcase" => {
                        let attrs = attributes(e)?;
                        case = Some(CaseBuilder {
                            class: attr_str(&attrs, "classname", "Unknown"),
                            method: attr_str(&attrs, "name", "Unknown"),
                            time: attr_f64(&attrs, "time"),
                            ..CaseBuilder::default()
                        });
                    }
                    b"system-out" if case.is_some() => capture = Capture::SystemOut,
                    b"system-err" if case.is_some() => capture = Capture::SystemErr,
                    other => {
                        if let (Some(kind), true) = (failure_kind(other), case.is_some()) {
                            pending = Some(pending_from(kind, &attributes(e)?));
                            capture = Capture::FailureText;
                        }
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"testsuite" => {
                        let attrs = attributes(e)?;
                        suites.push(suite_from(&attrs, report_file));
                    }
                    b"property" => record_property(e, &mut open_suites)?,
                    other => {
                        if let (Some(kind), Some(case)) = (failure_kind(other), case.as_mut()) {
                            case.failures.push(pending_from(kind, &attributes(e)?));
                        }
                    }
                }
            }
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().map_err(|err| err.to_string())?;
                append_capture(capture, &text, case.as_mut(), pending.as_mut());
            }
            Ok(Event::CData(ref c)) => {
                let text = String::from_utf8_lossy(c).to_string();
                append_capture(capture, &text, case.as_mut(), pending.as_mut());
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"testsuite" => {
                        if let Some(suite) = open_suites.pop() {
                            suites.push(suite);
                        }
                    }
                    b"testcase" => {
                        if let Some(done) = case.take() {
                            let records = done.into_records();
                            if let Some(suite) = open_suites.last_mut() {
                                suite.test_failures.extend(records);
                            }
                        }
                        capture = Capture::Nothing;
                    }
                    b"system-out" | b"system-err" => capture = Capture::Nothing,
                    other => {
                        if failure_kind(other).is_some() {
                            if let (Some(done), Some(case)) = (pending.take(), case.as_mut()) {
                                case.failures.push(done);
                            }
                            capture = Capture::Nothing;
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    if !open_suites.is_empty() {
        return Err("unexpected end of document inside <testsuite>".to_string());
    }
    Ok(suites)
}

fn record_property(
    e: &BytesStart<'_>,
    open_suites: &mut [TestSuiteResult],
) -> Result<(), String> {
    let attrs = attributes(e)?;
    if let (Some(suite), Some(name), Some(value)) =
        (open_suites.last_mut(), attrs.get("name"), attrs.get("value"))
    {
        suite.properties.insert(name.clone(), value.clone());
    }
    Ok(())
}

fn append_capture(
    capture: Capture,
    text: &str,
    case: Option<&mut CaseBuilder>,
    pending: Option<&mut PendingFailure>,
) {
    match capture {
        Capture::Nothing => {}
        Capture::FailureText => {
            if let Some(p) = pending {
                p.text.push_str(text);
            }
        }
        Capture::SystemOut => {
            if let Some(c) = case {
                c.system_out.push_str(text);
            }
        }
        Capture::SystemErr => {
            if let Some(c) = case {
                c.system_err.push_str(text);
            }
        }
    }
}

/// Keep only the properties listed in [`RELEVANT_PROPERTIES`].
pub fn filter_properties(properties: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    properties
        .iter()
        .filter(|(k, _)| RELEVANT_PROPERTIES.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Path of the plain-text log Surefire writes next to `TEST-<name>.xml`.
pub fn suite_log_path(report_file: &Path) -> Option<PathBuf> {
    let file_name = report_file.file_name()?.to_str()?;
    let txt_name = file_name.replace("TEST-", "").replace(".xml", ".txt");
    Some(report_file.with_file_name(txt_name))
}

/// Truncated contents of the suite's `.txt` log, if one exists.
///
/// Invalid UTF-8 is replaced rather than rejected; a read failure becomes a
/// short note in place of the excerpt.
pub fn load_suite_log_excerpt(report_file: &Path, max_chars: usize) -> Option<String> {
    let txt_path = suite_log_path(report_file)?;
    if !txt_path.is_file() {
        return None;
    }
    match std::fs::read(&txt_path) {
        Ok(bytes) => Some(truncate_text(&String::from_utf8_lossy(&bytes), max_chars)),
        Err(e) => Some(format!(
            "Could not read suite log {}: {}",
            txt_path.display(),
            e
        )),
    }
}
