pub mod add;
pub mod download;
pub mod history;
pub mod ignore;
pub mod init;
pub mod obliterate;
pub mod rollback;
pub mod save;
pub mod serve;
pub mod show;
pub mod status;
pub mod upload;

use anyhow::Result;
use std::path::PathBuf;
use strata_core::config::DEFAULT_SERVER_ADDR;
use strata_core::Repository;

pub fn open_repository() -> Result<Repository> {
    Ok(Repository::discover(std::env::current_dir()?)?)
}

/// Makes command-line paths absolute against the current directory.
pub fn absolute_paths(paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let cwd = std::env::current_dir()?;
    Ok(paths.into_iter().map(|p| cwd.join(p)).collect())
}

/// `--server` wins, then the repository config, then the default.
pub fn server_address(flag: Option<String>, repo: Option<&Repository>) -> Result<String> {
    if let Some(addr) = flag {
        return Ok(addr);
    }
    match repo {
        Some(repo) => Ok(repo.config()?.remote.address),
        None => Ok(DEFAULT_SERVER_ADDR.to_string()),
    }
}
