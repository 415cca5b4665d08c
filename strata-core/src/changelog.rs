//! Text format of a save's changelog file.
//!
//! ```text
//! [src/main.rs
//! <digest>
//! <raw line>...        first appearance of the path
//! --------------------
//! [src/lib.rs
//! <digest>
//! 3:<replacement>...   later appearances
//! --------------------
//! ```
//!
//! The file itself does not say whether a body is full or a patch; that
//! follows from whether the path appeared in an earlier save.

use crate::error::{Error, Result};
use crate::models::{EntryBody, FileEntry, SaveId};

pub const PATH_MARKER: char = '[';
pub const ENTRY_TERMINATOR: &str = "--------------------";

/// An entry as read from disk, before its body is classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub path: String,
    pub content_hash: String,
    pub lines: Vec<String>,
}

pub fn render(entries: &[FileEntry]) -> String {
    let mut out = String::new();

    for entry in entries {
        out.push(PATH_MARKER);
        out.push_str(&entry.path);
        out.push('\n');
        out.push_str(&entry.content_hash);
        out.push('\n');

        match &entry.body {
            EntryBody::Full(lines) => {
                for line in lines {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            EntryBody::Patch(patches) => {
                for patch in patches {
                    out.push_str(&patch.to_string());
                    out.push('\n');
                }
            }
        }

        out.push_str(ENTRY_TERMINATOR);
        out.push('\n');
    }

    out
}

pub fn parse(save: SaveId, text: &str) -> Result<Vec<RawEntry>> {
    let mut entries = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }

        let path = line
            .strip_prefix(PATH_MARKER)
            .ok_or_else(|| Error::corrupt(save, format!("expected path marker, found {line:?}")))?;

        let content_hash = lines
            .next()
            .filter(|h| !h.is_empty() && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| Error::corrupt(save, format!("missing or invalid digest for {path}")))?;

        let mut body = Vec::new();
        let mut terminated = false;
        for line in lines.by_ref() {
            if line == ENTRY_TERMINATOR {
                terminated = true;
                break;
            }
            body.push(line.to_string());
        }

        if !terminated {
            return Err(Error::corrupt(save, format!("unterminated entry for {path}")));
        }

        entries.push(RawEntry {
            path: path.to_string(),
            content_hash: content_hash.to_string(),
            lines: body,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::digest;
    use crate::models::LinePatch;

    #[test]
    fn test_render_layout() {
        let entries = vec![
            FileEntry::full("a.txt", digest("hello"), "hello"),
            FileEntry::patch("b.txt", digest("x"), vec![LinePatch::new(2, "x")]),
        ];

        let text = render(&entries);
        let expected = format!(
            "[a.txt\n{}\nhello\n{ENTRY_TERMINATOR}\n[b.txt\n{}\n2:x\n{ENTRY_TERMINATOR}\n",
            digest("hello"),
            digest("x")
        );

        similar_asserts::assert_eq!(text, expected);
    }

    #[test]
    fn test_parse_keeps_body_lines_verbatim() {
        let entries = vec![FileEntry::full(
            "notes.md",
            digest("[not a path\n\n3:also content"),
            "[not a path\n\n3:also content",
        )];

        let parsed = parse(0, &render(&entries)).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].path, "notes.md");
        assert_eq!(
            parsed[0].lines,
            vec![
                "[not a path".to_string(),
                String::new(),
                "3:also content".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_empty_changelog() {
        assert!(parse(0, "").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_unterminated_entry() {
        let text = format!("[a.txt\n{}\nhello\n", digest("hello"));

        let err = parse(3, &text).unwrap_err();

        assert!(matches!(err, Error::CorruptHistory { save: 3, .. }));
    }

    #[test]
    fn test_parse_rejects_missing_marker() {
        let err = parse(1, "a.txt\nabc\n--------------------\n").unwrap_err();

        assert!(matches!(err, Error::CorruptHistory { save: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_bad_digest() {
        let err = parse(2, "[a.txt\nnot-a-digest\n--------------------\n").unwrap_err();

        assert!(matches!(err, Error::CorruptHistory { save: 2, .. }));
    }
}
