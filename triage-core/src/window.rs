//! Context Windower: cuts a bounded line window around a method signature.

use crate::config::WindowConfig;
use crate::locator::SourceContext;
use regex::Regex;
use std::path::Path;

/// Modifiers allowed before the return type.
const MODIFIERS: &str = "public|private|protected|static|final|synchronized|abstract|default";

fn signature_regex(method_name: &str) -> Option<Regex> {
    let pattern = format!(
        r"\b(?:(?:{MODIFIERS})[ \t]+)*(?:void|[A-Z][\w.]*(?:<[^(){{}};]*?>)?(?:\[\])*)\s+{}\s*\([^)]*\)",
        regex::escape(method_name)
    );
    Regex::new(&pattern).ok()
}

/// Window around `method_name` in `file_text` with the default 5/30 bounds.
pub fn extract_method_context(file_text: &str, method_name: &str) -> SourceContext {
    extract_method_context_in(file_text, method_name, None, &WindowConfig::default())
}

/// Window around the first signature of `method_name`.
///
/// `path`, when given, is recorded on the result and named in the miss note.
pub fn extract_method_context_in(
    file_text: &str,
    method_name: &str,
    path: Option<&Path>,
    window: &WindowConfig,
) -> SourceContext {
    let origin = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "source text".to_string());

    let found = signature_regex(method_name).and_then(|re| re.find(file_text));
    let Some(signature) = found else {
        let mut ctx = SourceContext::not_found(format!(
            "Method '{}' not found in {}",
            method_name, origin
        ));
        ctx.path = path.map(Path::to_path_buf);
        return ctx;
    };

    let lines: Vec<&str> = file_text.lines().collect();
    let index = file_text[..signature.start()].matches('\n').count();
    let start = index.saturating_sub(window.lines_before);
    let end = lines.len().min(index + window.lines_after + 1);

    SourceContext {
        found: true,
        path: path.map(Path::to_path_buf),
        method_signature: Some(lines.get(index).map(|l| l.trim()).unwrap_or_default().to_string()),
        context_start_line: Some(start + 1),
        context_end_line: Some(end),
        context: Some(lines[start..end].join("\n")),
        searched_paths: Vec::new(),
        notes: Vec::new(),
    }
}
