use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use strata_core::paths::to_relative_key;
use strata_core::{ChangelogStore, Error, HistoryIndex, SaveId, SaveManager};
use strata_sdk::UploadRequest;
use tracing::{debug, info};

pub const SAVES_DIR: &str = "saves";

/// Server-side histories, one directory per project under `root`.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create projects directory {root:?}"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn project_dir(&self, name: &str) -> Result<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => bail!("Invalid project name: {name:?}"),
        }
    }

    /// History store of a project, created on first use.
    pub fn changelog(&self, name: &str) -> Result<ChangelogStore> {
        let dir = self.project_dir(name)?;
        if !dir.exists() {
            info!("Creating project {}", name);
        }
        Ok(ChangelogStore::create(dir.join(SAVES_DIR))?)
    }

    pub fn history(&self, name: &str) -> Result<HistoryIndex> {
        Ok(HistoryIndex::load(&self.changelog(name)?)?)
    }

    /// Records the uploaded files as a new save of the project.
    ///
    /// Returns `None` when none of the files changed.
    pub fn apply_upload(&self, request: &UploadRequest) -> Result<Option<SaveId>> {
        let store = self.changelog(&request.project)?;

        let mut content = HashMap::new();
        for file in &request.files {
            let key = to_relative_key(Path::new(&file.path))?;
            debug!("{} -> {}", file.path, key);
            content.insert(key, file.content.clone());
        }

        let paths: Vec<&str> = content.keys().map(String::as_str).collect();
        match SaveManager::new(&store, &content).commit(paths, &request.message) {
            Ok(id) => Ok(Some(id)),
            Err(Error::NoChanges) => {
                info!("Upload to {} contained no changes", request.project);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
