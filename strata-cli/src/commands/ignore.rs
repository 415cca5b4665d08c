use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(paths: Vec<PathBuf>) -> Result<()> {
    let repo = super::open_repository()?;
    let report = repo.untrack(&super::absolute_paths(paths)?)?;

    for path in &report.changed {
        println!("  {} {}", "-".red(), path);
    }
    for path in &report.unchanged {
        println!("  {} {} {}", "=".dimmed(), path, "(not tracked)".dimmed());
    }

    println!();
    println!(
        "{}",
        format!("✓ {} file(s) ignored from tracking", report.changed.len())
            .green()
            .bold()
    );

    Ok(())
}
