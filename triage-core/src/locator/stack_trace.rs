//! Class references pulled out of Java stack traces.

use regex::Regex;
use std::sync::LazyLock;

/// `at [loader/][module@version/]pkg.Class.method(File.java:42)`
static FRAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*at\s+(?:[\w.$@+-]*/){0,2}([\w.$]+)\.([\w$<>]+)\(([\w$]+\.java):(\d+)\)")
        .expect("FRAME regex should compile")
});

/// One parsed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Qualifier of the method, e.g. `com.bank.service.AtmService$Cache`
    pub qualifier: String,
    pub method: String,
    pub file: String,
    pub line: u32,
}

impl StackFrame {
    /// Outer class with its package, nested-class suffix removed.
    pub fn class_name(&self) -> &str {
        self.qualifier
            .split('$')
            .next()
            .unwrap_or(self.qualifier.as_str())
    }

    /// Last segment of [`class_name`](Self::class_name).
    pub fn simple_class(&self) -> &str {
        let class = self.class_name();
        class.rsplit('.').next().unwrap_or(class)
    }
}

/// Frames with a source location, in trace order. Native and unknown-source
/// frames are skipped.
pub fn parse_frames(stack_trace: &str) -> Vec<StackFrame> {
    stack_trace
        .lines()
        .filter_map(|line| {
            let caps = FRAME.captures(line)?;
            Some(StackFrame {
                qualifier: caps.get(1)?.as_str().to_string(),
                method: caps.get(2)?.as_str().to_string(),
                file: caps.get(3)?.as_str().to_string(),
                line: caps.get(4)?.as_str().parse().ok()?,
            })
        })
        .collect()
}

/// Production classes named by a stack trace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackClasses {
    /// Simple class names, first-seen order
    pub simple: Vec<String>,
    /// Package-qualified class names, first-seen order
    pub qualified: Vec<String>,
}

/// Classes referenced by `stack_trace`, skipping those `is_test_class` accepts.
pub fn referenced_classes(stack_trace: &str, is_test_class: impl Fn(&str) -> bool) -> StackClasses {
    let mut classes = StackClasses::default();
    for frame in parse_frames(stack_trace) {
        let simple = frame.simple_class();
        if simple.is_empty() || is_test_class(simple) {
            continue;
        }
        if !classes.simple.iter().any(|s| s == simple) {
            classes.simple.push(simple.to_string());
        }
        let qualified = frame.class_name();
        if qualified.contains('.') && !classes.qualified.iter().any(|q| q == qualified) {
            classes.qualified.push(qualified.to_string());
        }
    }
    classes
}
