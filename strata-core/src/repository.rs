use crate::config::Config;
use crate::diff::{file_text, FileDiff};
use crate::error::{Error, Result};
use crate::history::HistoryIndex;
use crate::models::{SaveId, SaveInfo};
use crate::paths::to_relative_key;
use crate::save::{ContentSource, SaveManager, WorkingTree};
use crate::storage::ChangelogStore;
use crate::tracking::TrackedSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const META_DIR: &str = ".strata";
pub const SAVES_DIR: &str = "saves";
pub const TRACK_FILE: &str = "track";
pub const PROJECT_FILE: &str = "project";
pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_MESSAGE: &str = "No message provided";

/// Outcome of an `add` or `ignore` request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TrackReport {
    pub changed: Vec<String>,
    pub unchanged: Vec<String>,
    pub skipped: Vec<String>,
}

/// A local repository: working files under `root`, metadata under `root/.strata`.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    store: ChangelogStore,
}

impl Repository {
    /// Creates the metadata directory in `dir`, creating `dir` if needed.
    pub fn init<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        match fs::metadata(dir) {
            Ok(meta) if !meta.is_dir() => return Err(Error::NotADirectory(dir.to_path_buf())),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Directory {:?} not found, creating it", dir);
                fs::create_dir_all(dir)?;
            }
            Err(e) => return Err(e.into()),
        }

        let root = fs::canonicalize(dir)?;
        let meta_dir = root.join(META_DIR);
        if meta_dir.exists() {
            return Err(Error::AlreadyInitialized(root));
        }

        fs::create_dir(&meta_dir)?;
        let store = ChangelogStore::create(meta_dir.join(SAVES_DIR))?;
        fs::write(meta_dir.join(TRACK_FILE), "")?;

        let project = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        fs::write(meta_dir.join(PROJECT_FILE), format!("{project}\n"))?;
        Config::default().save(meta_dir.join(CONFIG_FILE))?;

        info!("Initialized repository {:?} at {:?}", project, root);
        Ok(Self { root, store })
    }

    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        let meta_dir = root.join(META_DIR);
        if !meta_dir.is_dir() {
            return Err(Error::NotInitialized);
        }

        let store = ChangelogStore::create(meta_dir.join(SAVES_DIR))?;
        Ok(Self { root, store })
    }

    /// Opens the nearest repository at or above `start`.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = fs::canonicalize(start.as_ref())?;
        let root = start
            .ancestors()
            .find(|dir| dir.join(META_DIR).is_dir())
            .ok_or(Error::NotInitialized)?;

        debug!("Found repository at {:?}", root);
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    pub fn store(&self) -> &ChangelogStore {
        &self.store
    }

    pub fn working_tree(&self) -> WorkingTree {
        WorkingTree::new(&self.root)
    }

    pub fn project_name(&self) -> Result<String> {
        let text = fs::read_to_string(self.meta_dir().join(PROJECT_FILE))?;
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    pub fn config(&self) -> Result<Config> {
        Config::load(self.meta_dir().join(CONFIG_FILE))
    }

    pub fn tracked(&self) -> Result<TrackedSet> {
        TrackedSet::load(self.meta_dir().join(TRACK_FILE))
    }

    pub fn history_index(&self) -> Result<HistoryIndex> {
        HistoryIndex::load(&self.store)
    }

    /// Repository-relative key for `path`, which is either absolute or
    /// relative to the repository root.
    pub fn relative_key(&self, path: &Path) -> Result<String> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let absolute = canonical_or_parent(&absolute);

        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| Error::InvalidPath(format!("{} is outside the repository", path.display())))?;
        to_relative_key(relative)
    }

    fn is_metadata(key: &str) -> bool {
        key == META_DIR || key.starts_with(&format!("{META_DIR}/"))
    }

    /// Starts tracking files; directories are expanded recursively.
    pub fn track(&self, paths: &[PathBuf]) -> Result<TrackReport> {
        let mut tracked = self.tracked()?;
        let mut report = TrackReport::default();

        for path in paths {
            let absolute = if path.is_absolute() {
                path.clone()
            } else {
                self.root.join(path)
            };
            if !absolute.exists() {
                return Err(Error::PathNotFound(path.clone()));
            }

            for entry in WalkDir::new(&absolute).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_dir() {
                    continue;
                }

                let key = self.relative_key(entry.path())?;
                if Self::is_metadata(&key) {
                    debug!("Skipping metadata path {}", key);
                    report.skipped.push(key);
                } else if tracked.insert(key.clone()) {
                    report.changed.push(key);
                } else {
                    report.unchanged.push(key);
                }
            }
        }

        tracked.persist()?;
        Ok(report)
    }

    /// Stops tracking the given files or directories.
    pub fn untrack(&self, paths: &[PathBuf]) -> Result<TrackReport> {
        let mut tracked = self.tracked()?;
        let mut report = TrackReport::default();

        for path in paths {
            let key = self.relative_key(path)?;
            let removed = tracked.remove_under(&key);
            if removed.is_empty() {
                report.unchanged.push(key);
            } else {
                report.changed.extend(removed);
            }
        }

        tracked.persist()?;
        Ok(report)
    }

    /// Records a new save of every tracked path.
    pub fn commit(&self, message: Option<&str>) -> Result<SaveId> {
        let tracked = self.tracked()?;
        let source = self.working_tree();
        SaveManager::new(&self.store, &source)
            .commit(tracked.iter(), message.unwrap_or(DEFAULT_MESSAGE))
    }

    /// Tracked paths that would be recorded by the next save.
    pub fn status(&self) -> Result<Vec<FileDiff>> {
        let tracked = self.tracked()?;
        let source = self.working_tree();
        SaveManager::new(&self.store, &source).pending(tracked.iter())
    }

    pub fn history(&self) -> Result<Vec<SaveInfo>> {
        Ok(self.history_index()?.info())
    }

    pub fn view_changes(&self, id: SaveId) -> Result<Vec<FileDiff>> {
        self.history_index()?.changes_in(id)
    }

    /// Content of `path` as of save `id`.
    pub fn reconstruct(&self, path: &str, id: SaveId) -> Result<String> {
        Ok(self.history_index()?.reconstruct(path, Some(id)))
    }

    /// Overwrites working files with their content as of save `id`.
    pub fn rollback(&self, id: SaveId) -> Result<Vec<String>> {
        let index = self.history_index()?;
        match index.last_save_id() {
            Some(last) if id <= last => {}
            _ => return Err(Error::InvalidSave(id)),
        }

        let paths = index.paths_up_to(id);
        for path in &paths {
            let target = self.root.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, file_text(&index.reconstruct(path, Some(id))))?;
            debug!("Restored {}", path);
        }

        info!("Rolled back {} files to save {}", paths.len(), id);
        Ok(paths.into_iter().collect())
    }

    /// Deletes save `id` and every later save.
    pub fn obliterate(&self, id: SaveId) -> Result<Vec<SaveId>> {
        self.store.remove_from(id)
    }

    /// Reads a tracked path through the working tree, normalized.
    pub fn working_content(&self, key: &str) -> Result<String> {
        self.working_tree().read(key)
    }
}

/// Canonical form of `path`. A path that no longer exists is resolved
/// through its parent directory.
fn canonical_or_parent(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryBody, LinePatch};
    use tempfile::TempDir;

    fn repo_with(files: &[(&str, &str)]) -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        (dir, repo)
    }

    fn write(dir: &TempDir, path: &str, content: &str) {
        fs::write(dir.path().join(path), content).unwrap();
    }

    fn read(dir: &TempDir, path: &str) -> String {
        fs::read_to_string(dir.path().join(path)).unwrap()
    }

    #[test]
    fn test_init_layout() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("my-project");

        let repo = Repository::init(&root).unwrap();

        assert!(root.join(META_DIR).join(SAVES_DIR).is_dir());
        assert!(root.join(META_DIR).join(TRACK_FILE).is_file());
        assert_eq!(repo.project_name().unwrap(), "my-project");
        assert_eq!(repo.config().unwrap(), Config::default());
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();

        assert!(matches!(
            Repository::init(dir.path()),
            Err(Error::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_init_on_file_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(Repository::init(&file), Err(Error::NotADirectory(_))));
    }

    #[test]
    fn test_open_uninitialized_fails() {
        let dir = TempDir::new().unwrap();

        assert!(matches!(Repository::open(dir.path()), Err(Error::NotInitialized)));
        assert!(matches!(Repository::discover(dir.path()), Err(Error::NotInitialized)));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let (dir, _repo) = repo_with(&[("src/lib.rs", "")]);

        let found = Repository::discover(dir.path().join("src")).unwrap();

        assert_eq!(found.root(), fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_track_directory_and_skip_metadata() {
        let (_dir, repo) = repo_with(&[("src/a.rs", "a"), ("src/nested/b.rs", "b")]);

        let report = repo.track(&[PathBuf::from("src"), PathBuf::from(META_DIR)]).unwrap();

        assert_eq!(report.changed, vec!["src/a.rs", "src/nested/b.rs"]);
        assert!(report.skipped.iter().all(|p| p.starts_with(".strata/")));
        assert!(!report.skipped.is_empty());

        let again = repo.track(&[PathBuf::from("src/a.rs")]).unwrap();
        assert_eq!(again.unchanged, vec!["src/a.rs"]);
    }

    #[test]
    fn test_track_missing_path_fails() {
        let (_dir, repo) = repo_with(&[]);

        assert!(matches!(
            repo.track(&[PathBuf::from("nope.txt")]),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn test_untrack_directory() {
        let (_dir, repo) = repo_with(&[("src/a.rs", "a"), ("b.txt", "b")]);
        repo.track(&[PathBuf::from("src"), PathBuf::from("b.txt")]).unwrap();

        let report = repo.untrack(&[PathBuf::from("src")]).unwrap();

        assert_eq!(report.changed, vec!["src/a.rs"]);
        assert_eq!(repo.tracked().unwrap().iter().collect::<Vec<_>>(), vec!["b.txt"]);
    }

    // Scenario A: first save holds a full entry.
    #[test]
    fn test_first_save_round_trips() {
        let (_dir, repo) = repo_with(&[("a.txt", "hello")]);
        repo.track(&[PathBuf::from("a.txt")]).unwrap();

        let id = repo.commit(None).unwrap();

        assert_eq!(id, 0);
        let index = repo.history_index().unwrap();
        let entry = &index.save(0).unwrap().entries[0];
        assert_eq!(entry.path, "a.txt");
        assert_eq!(entry.body, EntryBody::Full(vec!["hello".to_string()]));
        assert_eq!(repo.reconstruct("a.txt", 0).unwrap(), "hello");
        assert_eq!(repo.history().unwrap()[0].message, DEFAULT_MESSAGE);
    }

    // Scenario B: a later change is stored as a patch.
    #[test]
    fn test_second_save_is_patch() {
        let (dir, repo) = repo_with(&[("a.txt", "hello")]);
        repo.track(&[PathBuf::from("a.txt")]).unwrap();
        repo.commit(Some("first")).unwrap();

        write(&dir, "a.txt", "hello world");
        let id = repo.commit(Some("second")).unwrap();

        assert_eq!(id, 1);
        let index = repo.history_index().unwrap();
        assert_eq!(
            index.save(1).unwrap().entries[0].body,
            EntryBody::Patch(vec![LinePatch::new(1, "hello world")])
        );
        assert_eq!(repo.reconstruct("a.txt", 1).unwrap(), "hello world");
        assert_eq!(repo.reconstruct("a.txt", 0).unwrap(), "hello");
    }

    // Scenario C: rollback restores the working file.
    #[test]
    fn test_rollback_restores_content() {
        let (dir, repo) = repo_with(&[("a.txt", "hello")]);
        repo.track(&[PathBuf::from("a.txt")]).unwrap();
        repo.commit(None).unwrap();
        write(&dir, "a.txt", "hello world");
        repo.commit(None).unwrap();

        let restored = repo.rollback(0).unwrap();

        assert_eq!(restored, vec!["a.txt"]);
        assert_eq!(read(&dir, "a.txt"), "hello");
    }

    #[test]
    fn test_rollback_recreates_missing_files() {
        let (dir, repo) = repo_with(&[("docs/guide.md", "# Guide\nstep one")]);
        repo.track(&[PathBuf::from("docs")]).unwrap();
        repo.commit(None).unwrap();

        fs::remove_dir_all(dir.path().join("docs")).unwrap();
        repo.rollback(0).unwrap();

        assert_eq!(read(&dir, "docs/guide.md"), "# Guide\nstep one");
    }

    #[test]
    fn test_rollback_rejects_unknown_save() {
        let (_dir, repo) = repo_with(&[("a.txt", "hello")]);

        assert!(matches!(repo.rollback(0), Err(Error::InvalidSave(0))));

        repo.track(&[PathBuf::from("a.txt")]).unwrap();
        repo.commit(None).unwrap();
        assert!(matches!(repo.rollback(3), Err(Error::InvalidSave(3))));
    }

    // Scenario D: obliterate drops the save and everything after it.
    #[test]
    fn test_obliterate_truncates_history() {
        let (dir, repo) = repo_with(&[("a.txt", "hello")]);
        repo.track(&[PathBuf::from("a.txt")]).unwrap();
        repo.commit(None).unwrap();
        write(&dir, "a.txt", "hello world");
        repo.commit(None).unwrap();

        let removed = repo.obliterate(1).unwrap();

        assert_eq!(removed, vec![1]);
        let history = repo.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, 0);
        assert_eq!(repo.reconstruct("a.txt", 0).unwrap(), "hello");

        // The next save reuses the freed ID and patches against save 0.
        assert_eq!(repo.commit(None).unwrap(), 1);
        assert_eq!(repo.reconstruct("a.txt", 1).unwrap(), "hello world");
    }

    // Scenario E: nothing changed since the last save.
    #[test]
    fn test_commit_without_changes_is_rejected() {
        let (dir, repo) = repo_with(&[("a.txt", "hello")]);
        repo.track(&[PathBuf::from("a.txt")]).unwrap();
        repo.commit(None).unwrap();

        // A trailing newline alone is not a change.
        write(&dir, "a.txt", "hello\n");

        assert!(matches!(repo.commit(None), Err(Error::NoChanges)));
        assert_eq!(repo.store().save_ids().unwrap(), vec![0]);
    }

    #[test]
    fn test_every_save_round_trips() {
        let (dir, repo) = repo_with(&[("a.txt", "one"), ("b.txt", "alpha\nbeta")]);
        repo.track(&[PathBuf::from("a.txt"), PathBuf::from("b.txt")]).unwrap();

        let versions = [
            ("one", "alpha\nbeta"),
            ("one\ntwo", "alpha\nbeta"),
            ("one\ntwo", "alpha\nBETA\ngamma"),
            ("uno\ntwo\nthree", "alpha\nBETA\ngamma\ndelta"),
        ];

        for (i, (a, b)) in versions.iter().enumerate() {
            write(&dir, "a.txt", a);
            write(&dir, "b.txt", b);
            let id = repo.commit(Some(format!("v{i}").as_str())).unwrap();
            assert_eq!(id, i as SaveId);
            assert_eq!(repo.reconstruct("a.txt", id).unwrap(), *a);
            assert_eq!(repo.reconstruct("b.txt", id).unwrap(), *b);
        }

        for (i, (a, b)) in versions.iter().enumerate() {
            assert_eq!(repo.reconstruct("a.txt", i as SaveId).unwrap(), *a);
            assert_eq!(repo.reconstruct("b.txt", i as SaveId).unwrap(), *b);
        }
    }

    #[test]
    fn test_status_and_view_changes() {
        let (dir, repo) = repo_with(&[("a.txt", "x\ny")]);
        repo.track(&[PathBuf::from("a.txt")]).unwrap();
        repo.commit(None).unwrap();

        assert!(repo.status().unwrap().is_empty());

        write(&dir, "a.txt", "x\nY");
        let status = repo.status().unwrap();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].changes, vec![LinePatch::new(2, "Y")]);

        let id = repo.commit(None).unwrap();
        let changes = repo.view_changes(id).unwrap();
        assert_eq!(changes[0].path, "a.txt");
        assert_eq!(changes[0].changes, vec![LinePatch::new(2, "Y")]);

        let first = repo.view_changes(0).unwrap();
        assert_eq!(
            first[0].changes,
            vec![LinePatch::new(1, "x"), LinePatch::new(2, "y")]
        );
    }

    #[test]
    fn test_appended_blank_lines_are_saved_and_restored() {
        let (dir, repo) = repo_with(&[("a.txt", "a")]);
        repo.track(&[PathBuf::from("a.txt")]).unwrap();
        repo.commit(None).unwrap();

        write(&dir, "a.txt", "a\n\n\n");
        assert_eq!(repo.status().unwrap().len(), 1);
        let id = repo.commit(None).unwrap();

        assert_eq!(id, 1);
        assert_eq!(repo.reconstruct("a.txt", 1).unwrap(), "a\n\n");

        repo.rollback(0).unwrap();
        assert_eq!(read(&dir, "a.txt"), "a");

        repo.rollback(1).unwrap();
        assert_eq!(read(&dir, "a.txt"), "a\n\n\n");
        assert!(repo.status().unwrap().is_empty());
    }

    #[test]
    fn test_shrinking_file_keeps_trailing_blank_lines() {
        let (dir, repo) = repo_with(&[("a.txt", "a\nb\nc")]);
        repo.track(&[PathBuf::from("a.txt")]).unwrap();
        repo.commit(None).unwrap();

        write(&dir, "a.txt", "a");
        let id = repo.commit(None).unwrap();

        // Patches only replace lines, so the buffer keeps its length.
        assert_eq!(repo.reconstruct("a.txt", id).unwrap(), "a\n\n");
        assert!(repo.status().unwrap().is_empty());
    }
}
