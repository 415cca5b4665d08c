use colored::Colorize;
use strata_core::{FileDiff, SaveInfo};

pub fn print_save(info: &SaveInfo) {
    println!("{} {}", "save".yellow().bold(), info.id.to_string().yellow());
    println!(
        "{}: {}",
        "Date".bold(),
        info.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    println!();
    println!("    {}", info.message);
    println!();
    println!("    {} file(s) changed", info.files.len().to_string().cyan());

    for path in info.files.iter().take(5) {
        println!("      • {}", path.dimmed());
    }
    if info.files.len() > 5 {
        println!(
            "      {} and {} more...",
            "...".dimmed(),
            (info.files.len() - 5).to_string().dimmed()
        );
    }
    println!();
}

pub fn print_file_diff(diff: &FileDiff) {
    println!("{}", "━".repeat(80).bright_black());
    println!("{}", diff.path.white().bold());

    if diff.is_empty() {
        println!("  {}", "[no line changes]".dimmed());
    }
    for change in &diff.changes {
        println!(
            "  {} {}",
            format!("{:>4} =>", change.line).cyan(),
            change.content
        );
    }
    println!();
}
