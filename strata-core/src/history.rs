//! In-memory index over every save, built by one pass at the start of a command.

use crate::diff::{join_lines, FileDiff};
use crate::error::{Error, Result};
use crate::models::{EntryBody, FileEntry, LinePatch, Save, SaveId, SaveInfo};
use crate::storage::ChangelogStore;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Default)]
pub struct HistoryIndex {
    saves: Vec<Save>,
    latest_digest: HashMap<String, String>,
}

impl HistoryIndex {
    /// Reads every save in ascending order. A path's first entry is taken as
    /// a full body and every later entry as a patch body.
    pub fn load(store: &ChangelogStore) -> Result<Self> {
        let mut index = Self::default();

        for id in store.save_ids()? {
            let meta = store.read_meta(id)?;
            let mut entries = Vec::new();

            for raw in store.read_changelog(id)? {
                let body = if index.latest_digest.contains_key(&raw.path) {
                    EntryBody::Patch(parse_patches(id, &raw.path, &raw.lines)?)
                } else {
                    EntryBody::Full(raw.lines)
                };

                index
                    .latest_digest
                    .insert(raw.path.clone(), raw.content_hash.clone());
                entries.push(FileEntry {
                    path: raw.path,
                    content_hash: raw.content_hash,
                    body,
                });
            }

            index.saves.push(Save { id, meta, entries });
        }

        debug!(
            "Loaded {} saves covering {} paths",
            index.saves.len(),
            index.latest_digest.len()
        );
        Ok(index)
    }

    pub fn is_empty(&self) -> bool {
        self.saves.is_empty()
    }

    pub fn saves(&self) -> &[Save] {
        &self.saves
    }

    pub fn save(&self, id: SaveId) -> Option<&Save> {
        self.saves.iter().find(|s| s.id == id)
    }

    pub fn last_save_id(&self) -> Option<SaveId> {
        self.saves.last().map(|s| s.id)
    }

    pub fn next_save_id(&self) -> SaveId {
        self.last_save_id().map_or(0, |id| id + 1)
    }

    /// Digest recorded by the most recent entry for `path`.
    pub fn latest_digest(&self, path: &str) -> Option<&str> {
        self.latest_digest.get(path).map(String::as_str)
    }

    pub fn has_entry(&self, path: &str) -> bool {
        self.latest_digest.contains_key(path)
    }

    /// Content of `path` as of save `target`, or empty when `target` is
    /// `None` or the path has no entry up to it.
    pub fn reconstruct(&self, path: &str, target: Option<SaveId>) -> String {
        let Some(target) = target else {
            return String::new();
        };

        let mut buffer: Vec<String> = Vec::new();

        for save in self.saves.iter().take_while(|s| s.id <= target) {
            for entry in save.entries.iter().filter(|e| e.path == path) {
                match &entry.body {
                    EntryBody::Full(lines) => buffer = lines.clone(),
                    EntryBody::Patch(patches) => apply_patches(&mut buffer, patches),
                }
            }
        }

        join_lines(&buffer)
    }

    /// Every path with an entry in a save up to and including `target`.
    pub fn paths_up_to(&self, target: SaveId) -> BTreeSet<String> {
        self.saves
            .iter()
            .take_while(|s| s.id <= target)
            .flat_map(|s| s.entries.iter().map(|e| e.path.clone()))
            .collect()
    }

    /// Line changes each path went through in save `id`.
    pub fn changes_in(&self, id: SaveId) -> Result<Vec<FileDiff>> {
        let save = self.save(id).ok_or(Error::InvalidSave(id))?;
        let before = id.checked_sub(1);

        Ok(save
            .entries
            .iter()
            .map(|entry| {
                FileDiff::between(
                    entry.path.clone(),
                    &self.reconstruct(&entry.path, before),
                    &self.reconstruct(&entry.path, Some(id)),
                )
            })
            .collect())
    }

    pub fn info(&self) -> Vec<SaveInfo> {
        self.saves.iter().map(SaveInfo::from).collect()
    }
}

fn parse_patches(save: SaveId, path: &str, lines: &[String]) -> Result<Vec<LinePatch>> {
    lines
        .iter()
        .map(|line| {
            LinePatch::parse(line).ok_or_else(|| {
                Error::corrupt(save, format!("malformed patch line {line:?} for {path}"))
            })
        })
        .collect()
}

fn apply_patches(buffer: &mut Vec<String>, patches: &[LinePatch]) {
    for patch in patches {
        if patch.line > buffer.len() {
            buffer.resize(patch.line, String::new());
        }
        buffer[patch.line - 1] = patch.content.clone();
    }
}
