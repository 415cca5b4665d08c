//! # strata-core
//!
//! Core library for strata - incremental, changelog-based version control.
//!
//! Each save stores only what changed: the first time a path is saved its
//! full content is recorded, and every later save records the changed lines
//! by number. Any past version is rebuilt by replaying saves in order.

pub mod changelog;
pub mod config;
pub mod diff;
pub mod error;
pub mod hash;
pub mod history;
pub mod models;
pub mod paths;
pub mod repository;
pub mod save;
pub mod storage;
pub mod tracking;

pub use config::Config;
pub use diff::FileDiff;
pub use error::{Error, Result};
pub use history::HistoryIndex;
pub use models::{EntryBody, FileEntry, LinePatch, Save, SaveId, SaveInfo, SaveMeta};
pub use repository::{Repository, TrackReport};
pub use save::{ContentSource, SaveManager, WorkingTree};
pub use storage::ChangelogStore;
pub use tracking::TrackedSet;
