use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use strata_core::Repository;

pub fn run(path: PathBuf) -> Result<()> {
    let repo = Repository::init(&path)?;

    println!("{}", "✓ Initialized strata repository".green().bold());
    println!("  {}: {}", "Root".bold(), repo.root().display());
    println!("  {}: {}", "Project".bold(), repo.project_name()?);
    println!();
    println!("Run {} to start tracking files", "strata add <paths>".cyan());

    Ok(())
}
