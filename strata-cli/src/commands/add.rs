use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(paths: Vec<PathBuf>) -> Result<()> {
    let repo = super::open_repository()?;
    let report = repo.track(&super::absolute_paths(paths)?)?;

    for path in &report.changed {
        println!("  {} {}", "+".green(), path);
    }
    for path in &report.unchanged {
        println!("  {} {} {}", "=".dimmed(), path, "(already tracked)".dimmed());
    }
    if !report.skipped.is_empty() {
        println!(
            "  {} {} metadata file(s) skipped",
            "!".yellow(),
            report.skipped.len()
        );
    }

    println!();
    println!(
        "{}",
        format!("✓ {} file(s) added to tracking", report.changed.len())
            .green()
            .bold()
    );

    Ok(())
}
