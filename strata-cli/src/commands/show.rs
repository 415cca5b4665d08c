use anyhow::Result;
use colored::Colorize;
use strata_core::{Error, SaveId};

use crate::display::print_file_diff;

pub fn run(save_id: SaveId) -> Result<()> {
    let repo = super::open_repository()?;
    let index = repo.history_index()?;
    let save = index.save(save_id).ok_or(Error::InvalidSave(save_id))?;
    let changes = index.changes_in(save_id)?;

    println!("{}", format!("Changes in save {save_id}").bold().cyan());
    println!("{}: {}", "Message".bold(), save.meta.message);
    println!();

    if changes.is_empty() {
        println!("{}", "No files changed in this save".yellow());
        return Ok(());
    }

    for diff in &changes {
        print_file_diff(diff);
    }

    Ok(())
}
