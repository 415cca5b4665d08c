//! # strata-server
//!
//! One-shot sync server for strata: accepts a single connection, records
//! uploads into per-project histories and answers project listings.

pub mod project;
pub mod server;

pub use project::ProjectStore;
pub use server::SyncServer;
