use crate::changelog::ENTRY_TERMINATOR;
use crate::diff::{diff_lines, normalize, split_lines, FileDiff};
use crate::error::{Error, Result};
use crate::hash::digest;
use crate::history::HistoryIndex;
use crate::models::{EntryBody, FileEntry, LinePatch, SaveId, SaveMeta};
use crate::storage::ChangelogStore;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where the current content of a tracked path comes from.
pub trait ContentSource {
    /// Normalized content of `path`. Absent paths read as empty.
    fn read(&self, path: &str) -> Result<String>;
}

/// Files on disk under a root directory.
#[derive(Debug, Clone)]
pub struct WorkingTree {
    root: PathBuf,
}

impl WorkingTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for WorkingTree {
    fn read(&self, path: &str) -> Result<String> {
        match fs::read_to_string(self.root.join(path)) {
            Ok(text) => Ok(normalize(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Uploaded or otherwise in-memory content keyed by relative path.
impl ContentSource for HashMap<String, String> {
    fn read(&self, path: &str) -> Result<String> {
        Ok(self.get(path).map(|c| normalize(c)).unwrap_or_default())
    }
}

/// Decides, per path, whether a new save records a full body, a patch, or
/// nothing, and writes the save.
pub struct SaveManager<'a, S: ContentSource> {
    store: &'a ChangelogStore,
    source: &'a S,
}

impl<'a, S: ContentSource> SaveManager<'a, S> {
    pub fn new(store: &'a ChangelogStore, source: &'a S) -> Self {
        Self { store, source }
    }

    /// Records a save over `paths`.
    ///
    /// Fails with [`Error::NoChanges`] when history is not empty and no path
    /// changed; nothing is written in that case.
    pub fn commit<'p, I>(&self, paths: I, message: &str) -> Result<SaveId>
    where
        I: IntoIterator<Item = &'p str>,
    {
        let index = HistoryIndex::load(self.store)?;
        let id = index.next_save_id();
        let paths: BTreeSet<&str> = paths.into_iter().collect();

        let mut entries = Vec::new();
        for path in paths {
            if let Some(entry) = self.entry_for(&index, id, path)? {
                entries.push(entry);
            }
        }

        if entries.is_empty() && !index.is_empty() {
            return Err(Error::NoChanges);
        }

        self.store.write_save(id, &SaveMeta::new(message), &entries)?;
        info!("Created save {} ({} files changed)", id, entries.len());

        Ok(id)
    }

    fn entry_for(&self, index: &HistoryIndex, id: SaveId, path: &str) -> Result<Option<FileEntry>> {
        let content = self.source.read(path)?;
        let current = digest(&content);

        match index.latest_digest(path) {
            None => {
                debug!("{}: first appearance, recording full body", path);
                let entry = FileEntry::full(path, current, &content);
                if let EntryBody::Full(lines) = &entry.body {
                    if lines.iter().any(|l| l == ENTRY_TERMINATOR) {
                        return Err(Error::Unrepresentable(path.to_string()));
                    }
                }
                Ok(Some(entry))
            }
            Some(previous) if previous != current => {
                let base = index.reconstruct(path, id.checked_sub(1));
                let mut patches = diff_lines(&base, &content);
                let lines = split_lines(&content);
                if lines.len() > split_lines(&base).len()
                    && patches.last().map(|p| p.line) != Some(lines.len())
                {
                    // Appended blank lines compare equal to missing ones; the
                    // last line is recorded so replay reaches the full length.
                    if let Some(last) = lines.last() {
                        patches.push(LinePatch::new(lines.len(), last.clone()));
                    }
                }
                debug!("{}: changed, {} patched lines", path, patches.len());
                Ok(Some(FileEntry::patch(path, current, patches)))
            }
            Some(_) => {
                debug!("{}: unchanged", path);
                Ok(None)
            }
        }
    }

    /// Paths whose content differs from their latest recorded digest, with
    /// the line changes against the last save.
    pub fn pending<'p, I>(&self, paths: I) -> Result<Vec<FileDiff>>
    where
        I: IntoIterator<Item = &'p str>,
    {
        let index = HistoryIndex::load(self.store)?;
        let last = index.last_save_id();
        let mut pending = Vec::new();

        for path in paths.into_iter().collect::<BTreeSet<_>>() {
            let content = self.source.read(path)?;
            if index.latest_digest(path) == Some(digest(&content).as_str()) {
                continue;
            }
            pending.push(FileDiff::between(
                path,
                &index.reconstruct(path, last),
                &content,
            ));
        }

        Ok(pending)
    }
}
