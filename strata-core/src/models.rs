use crate::diff::split_lines;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type SaveId = u64;

/// A single `(line_number, replacement)` record. Line numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePatch {
    pub line: usize,
    pub content: String,
}

impl LinePatch {
    pub fn new(line: usize, content: impl Into<String>) -> Self {
        Self {
            line,
            content: content.into(),
        }
    }

    /// Parses the `<line>:<content>` form used in changelog patch bodies.
    pub fn parse(s: &str) -> Option<Self> {
        let (line, content) = s.split_once(':')?;
        let line: usize = line.parse().ok()?;
        if line == 0 {
            return None;
        }
        Some(Self::new(line, content))
    }
}

impl fmt::Display for LinePatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryBody {
    /// Every line of the file. Only used the first time a path appears.
    Full(Vec<String>),
    /// Sparse line replacements against the previous reconstruction.
    Patch(Vec<LinePatch>),
}

impl EntryBody {
    pub fn is_full(&self) -> bool {
        matches!(self, EntryBody::Full(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub content_hash: String,
    pub body: EntryBody,
}

impl FileEntry {
    pub fn full(path: impl Into<String>, content_hash: String, content: &str) -> Self {
        Self {
            path: path.into(),
            content_hash,
            body: EntryBody::Full(split_lines(content)),
        }
    }

    pub fn patch(path: impl Into<String>, content_hash: String, patches: Vec<LinePatch>) -> Self {
        Self {
            path: path.into(),
            content_hash,
            body: EntryBody::Patch(patches),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMeta {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl SaveMeta {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

/// A save as loaded from disk, with its entries already classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Save {
    pub id: SaveId,
    pub meta: SaveMeta,
    pub entries: Vec<FileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveInfo {
    pub id: SaveId,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub files: Vec<String>,
}

impl From<&Save> for SaveInfo {
    fn from(save: &Save) -> Self {
        Self {
            id: save.id,
            timestamp: save.meta.timestamp,
            message: save.meta.message.clone(),
            files: save.entries.iter().map(|e| e.path.clone()).collect(),
        }
    }
}
