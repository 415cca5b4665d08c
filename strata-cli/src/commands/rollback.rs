use anyhow::Result;
use colored::Colorize;
use strata_core::SaveId;

pub fn run(save_id: SaveId) -> Result<()> {
    let repo = super::open_repository()?;

    println!("{}", format!("Rolling back to save {save_id}").bold().cyan());
    println!();

    let restored = repo.rollback(save_id)?;

    if restored.is_empty() {
        println!("{}", "No files recorded up to this save".yellow());
        return Ok(());
    }

    for path in &restored {
        println!("  {} {}", "✓".green(), path);
    }
    println!();
    println!(
        "{}",
        format!("✓ Restored {} file(s)", restored.len()).green().bold()
    );

    Ok(())
}
