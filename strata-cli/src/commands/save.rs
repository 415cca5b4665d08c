use anyhow::Result;
use colored::Colorize;
use strata_core::{Error, Repository, SaveId};

pub fn run(message: Option<String>) -> Result<()> {
    let repo = super::open_repository()?;
    let id = save(&repo, message.as_deref())?;

    let index = repo.history_index()?;
    let files = index
        .save(id)
        .map(|save| save.entries.len())
        .unwrap_or_default();

    println!("{}", "✓ Saved successfully!".green().bold());
    println!("  {}: {}", "Save ID".bold(), id);
    println!("  {}: {}", "Files changed".bold(), files);

    Ok(())
}

/// Records a save; with nothing tracked, `NoChanges` carries a hint.
fn save(repo: &Repository, message: Option<&str>) -> Result<SaveId> {
    let tracked = repo.tracked()?;

    match repo.commit(message) {
        Ok(id) => Ok(id),
        Err(Error::NoChanges) if tracked.is_empty() => {
            println!("{}", "No files are tracked".yellow());
            println!("Run {} to start tracking files", "strata add <paths>".cyan());
            Err(Error::NoChanges.into())
        }
        Err(e) => Err(e.into()),
    }
}
