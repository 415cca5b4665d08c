use crate::models::LinePatch;
use serde::{Deserialize, Serialize};

/// Splits normalized text into lines. Empty lines are kept, including
/// trailing ones; an empty text has no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Inverse of [`split_lines`]: no trailing line break.
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

/// Canonical form of working content: `\n` separators and no trailing
/// break. Only the final line break is dropped, so blank lines at the end
/// of a file are content.
pub fn normalize(text: &str) -> String {
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);
    join_lines(&split_lines(text))
}

/// Text to write to disk for normalized `content`, such that reading it
/// back through [`normalize`] yields `content` again.
pub fn file_text(content: &str) -> String {
    if content.ends_with('\n') {
        format!("{content}\n")
    } else {
        content.to_string()
    }
}

/// Positional line comparison.
///
/// Lines are compared index by index up to the longer of the two texts, a
/// missing line comparing as empty. Every differing position is reported as
/// `(index + 1, new_line)`. When either side is empty, every line of the other
/// side is reported.
///
/// This is not an edit script: inserting a line reports every line below it.
pub fn diff_lines(old: &str, new: &str) -> Vec<LinePatch> {
    if old.is_empty() {
        return number_all(new);
    }
    if new.is_empty() {
        return number_all(old);
    }

    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let max_lines = old_lines.len().max(new_lines.len());

    (0..max_lines)
        .filter_map(|i| {
            let old_line = old_lines.get(i).map_or("", String::as_str);
            let new_line = new_lines.get(i).map_or("", String::as_str);
            (old_line != new_line).then(|| LinePatch::new(i + 1, new_line))
        })
        .collect()
}

fn number_all(text: &str) -> Vec<LinePatch> {
    split_lines(text)
        .into_iter()
        .enumerate()
        .map(|(i, line)| LinePatch::new(i + 1, line))
        .collect()
}

/// Line changes for one path, as shown by `status` and `show`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    pub changes: Vec<LinePatch>,
}

impl FileDiff {
    pub fn between(path: impl Into<String>, old: &str, new: &str) -> Self {
        Self {
            path: path.into(),
            changes: diff_lines(old, new),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn format_lines(&self) -> Vec<String> {
        self.changes
            .iter()
            .map(|c| format!("Line {} => {}", c.line, c.content))
            .collect()
    }
}
