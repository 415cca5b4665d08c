use crate::error::Result;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Repository-relative paths opted into saves, persisted one per line.
#[derive(Debug, Clone)]
pub struct TrackedSet {
    file: PathBuf,
    paths: BTreeSet<String>,
}

impl TrackedSet {
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref().to_path_buf();
        let paths = match fs::read_to_string(&file) {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { file, paths })
    }

    pub fn persist(&self) -> Result<()> {
        let mut text = String::new();
        for path in &self.paths {
            text.push_str(path);
            text.push('\n');
        }
        fs::write(&self.file, text)?;
        Ok(())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Returns false when the path was already tracked.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    /// Removes `path` itself and every tracked path beneath it.
    pub fn remove_under(&mut self, path: &str) -> Vec<String> {
        let prefix = format!("{path}/");
        let removed: Vec<String> = self
            .paths
            .iter()
            .filter(|p| p.as_str() == path || p.starts_with(&prefix))
            .cloned()
            .collect();

        for p in &removed {
            self.paths.remove(p);
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let set = TrackedSet::load(dir.path().join("track")).unwrap();

        assert!(set.is_empty());
    }

    #[test]
    fn test_persist_sorted() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("track");

        let mut set = TrackedSet::load(&file).unwrap();
        assert!(set.insert("src/b.rs"));
        assert!(set.insert("a.txt"));
        assert!(!set.insert("a.txt"));
        set.persist().unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "a.txt\nsrc/b.rs\n");

        let reloaded = TrackedSet::load(&file).unwrap();
        assert_eq!(reloaded.iter().collect::<Vec<_>>(), vec!["a.txt", "src/b.rs"]);
    }

    #[test]
    fn test_remove_under_directory() {
        let dir = TempDir::new().unwrap();
        let mut set = TrackedSet::load(dir.path().join("track")).unwrap();
        set.insert("src/a.rs");
        set.insert("src/nested/b.rs");
        set.insert("srcfile.txt");

        let removed = set.remove_under("src");

        assert_eq!(removed, vec!["src/a.rs".to_string(), "src/nested/b.rs".to_string()]);
        assert!(set.contains("srcfile.txt"));
        assert_eq!(set.len(), 1);
    }
}
