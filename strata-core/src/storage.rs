use crate::changelog::{self, RawEntry};
use crate::error::{Error, Result};
use crate::models::{FileEntry, SaveId, SaveMeta};
use chrono::DateTime;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const SAVE_META_FILE: &str = "save";
pub const CHANGES_FILE: &str = "changes";

/// The `saves/` directory: one numerically named subdirectory per save,
/// each holding a metadata file and a changelog.
#[derive(Debug, Clone)]
pub struct ChangelogStore {
    saves_dir: PathBuf,
}

impl ChangelogStore {
    pub fn open<P: AsRef<Path>>(saves_dir: P) -> Self {
        Self {
            saves_dir: saves_dir.as_ref().to_path_buf(),
        }
    }

    pub fn create<P: AsRef<Path>>(saves_dir: P) -> Result<Self> {
        fs::create_dir_all(saves_dir.as_ref())?;
        Ok(Self::open(saves_dir))
    }

    pub fn saves_dir(&self) -> &Path {
        &self.saves_dir
    }

    fn save_dir(&self, id: SaveId) -> PathBuf {
        self.saves_dir.join(id.to_string())
    }

    /// Numeric save IDs in ascending order. Other directory names are skipped.
    pub fn save_ids(&self) -> Result<Vec<SaveId>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.saves_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            match name.parse::<SaveId>() {
                Ok(id) if id.to_string() == name && entry.file_type()?.is_dir() => ids.push(id),
                _ => warn!("Ignoring non-save entry {:?} in {:?}", name, self.saves_dir),
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }

    pub fn read_meta(&self, id: SaveId) -> Result<SaveMeta> {
        let text = fs::read_to_string(self.save_dir(id).join(SAVE_META_FILE))?;
        let mut lines = text.lines();

        let timestamp = lines
            .next()
            .ok_or_else(|| Error::corrupt(id, "empty save metadata"))?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp.trim())
            .map_err(|e| Error::corrupt(id, format!("invalid timestamp: {e}")))?
            .into();
        let message = lines.next().unwrap_or_default().to_string();

        Ok(SaveMeta { timestamp, message })
    }

    pub fn read_changelog(&self, id: SaveId) -> Result<Vec<RawEntry>> {
        match fs::read_to_string(self.save_dir(id).join(CHANGES_FILE)) {
            Ok(text) => changelog::parse(id, &text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::corrupt(id, "missing changelog"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn write_save(&self, id: SaveId, meta: &SaveMeta, entries: &[FileEntry]) -> Result<()> {
        let dir = self.save_dir(id);
        fs::create_dir(&dir)?;

        let message = meta.message.replace(['\r', '\n'], " ");
        fs::write(
            dir.join(SAVE_META_FILE),
            format!("{}\n{}\n", meta.timestamp.to_rfc3339(), message),
        )?;
        fs::write(dir.join(CHANGES_FILE), changelog::render(entries))?;

        debug!("Wrote save {} with {} entries", id, entries.len());
        Ok(())
    }

    /// Deletes every save with an ID greater than or equal to `from`.
    pub fn remove_from(&self, from: SaveId) -> Result<Vec<SaveId>> {
        let doomed: Vec<SaveId> = self
            .save_ids()?
            .into_iter()
            .filter(|id| *id >= from)
            .collect();

        for id in &doomed {
            info!("Obliterating save {}", id);
            fs::remove_dir_all(self.save_dir(*id))?;
        }

        Ok(doomed)
    }
}
