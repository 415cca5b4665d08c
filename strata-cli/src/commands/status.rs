use anyhow::Result;
use colored::Colorize;

use crate::display::print_file_diff;

pub fn run() -> Result<()> {
    let repo = super::open_repository()?;
    let tracked = repo.tracked()?;
    let history = repo.history()?;
    let pending = repo.status()?;

    println!("{}", "Repository Status".bold().cyan());
    println!("  {}: {}", "Root".bold(), repo.root().display());
    println!("  {}: {}", "Project".bold(), repo.project_name()?);
    println!("  {}: {}", "Tracked files".bold(), tracked.len());
    match history.last() {
        Some(last) => println!(
            "  {}: {} ({})",
            "Last save".bold(),
            last.id,
            last.timestamp.format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("  {}: {}", "Last save".bold(), "none".dimmed()),
    }
    println!();

    if pending.is_empty() {
        println!("{}", "No changes detected".green());
        return Ok(());
    }

    println!(
        "{} {}",
        "Modified files:".bold(),
        format!("({})", pending.len()).yellow()
    );
    println!();

    for diff in &pending {
        print_file_diff(diff);
    }

    println!("Run {} to record these changes", "strata save \"message\"".cyan());

    Ok(())
}
