//! Plain-text rendering contract for message content
//!
//! Content from the backend is never interpreted as markup. Line breaks are
//! the only structure; terminal escape sequences and other control characters
//! are removed before anything reaches the screen.

use regex::Regex;
use std::sync::LazyLock;

/// CSI, OSC and two-byte ESC sequences
static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\)?|[@-Z\\-_])").unwrap()
});

const TAB_WIDTH: usize = 4;

/// Strip escape sequences and control characters, normalize line breaks to `\n`
pub fn sanitize(text: &str) -> String {
    let without_escapes = ESCAPE_SEQUENCE.replace_all(text, "");
    let normalized = without_escapes.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        match c {
            '\n' => out.push('\n'),
            '\t' => out.push_str(&" ".repeat(TAB_WIDTH)),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Sanitized content split on line breaks. Empty lines are kept.
pub fn lines(text: &str) -> Vec<String> {
    sanitize(text).split('\n').map(str::to_string).collect()
}

/// Sanitized content wrapped to `width` columns, one entry per screen row
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in lines(text) {
        if line.is_empty() {
            rows.push(String::new());
            continue;
        }
        rows.extend(
            textwrap::wrap(&line, width)
                .into_iter()
                .map(|row| row.into_owned()),
        );
    }
    rows
}

/// Collapse content onto one line, for list entries and status text
pub fn single_line(text: &str) -> String {
    lines(text)
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
