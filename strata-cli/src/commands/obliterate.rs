use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use strata_core::{Repository, SaveId};

pub fn run(save_id: SaveId, force: bool) -> Result<()> {
    let repo = super::open_repository()?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete save {save_id} and every later save?"
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    obliterate(&repo, save_id)
}

pub fn obliterate(repo: &Repository, save_id: SaveId) -> Result<()> {
    let removed = repo.obliterate(save_id)?;

    if removed.is_empty() {
        println!("{}", format!("No saves at or after {save_id}").yellow());
        return Ok(());
    }

    for id in &removed {
        println!("  {} save {}", "✗".red(), id);
    }
    println!();
    println!(
        "{}",
        format!("✓ Obliterated {} save(s)", removed.len()).green().bold()
    );

    Ok(())
}
