//! # strata
//!
//! Umbrella crate re-exporting the strata engine, sync client and sync server.

pub use strata_core as core;
pub use strata_sdk as sdk;
pub use strata_server as server;
