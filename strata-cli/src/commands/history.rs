use anyhow::Result;
use colored::Colorize;
use dialoguer::Select;
use strata_core::{Repository, SaveInfo};

use crate::display::{print_file_diff, print_save};

pub fn run(limit: Option<usize>, json: bool, interactive: bool) -> Result<()> {
    let repo = super::open_repository()?;
    let saves = repo.history()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saves)?);
        return Ok(());
    }

    if saves.is_empty() {
        println!("{}", "No saves yet".yellow());
        return Ok(());
    }

    let to_show = limit.unwrap_or(saves.len()).min(saves.len());
    let shown = &saves[saves.len() - to_show..];

    println!("{}", "Save History".bold().cyan());
    println!();

    if interactive {
        return browse(&repo, shown);
    }

    for info in shown {
        print_save(info);
    }

    if saves.len() > to_show {
        println!(
            "{}",
            format!("... {} earlier saves not shown", saves.len() - to_show).dimmed()
        );
    }

    Ok(())
}

const ACTIONS: [&str; 5] = ["Next", "View changes", "Rollback", "Obliterate", "Quit"];

/// Walks saves oldest first, offering actions on each.
fn browse(repo: &Repository, saves: &[SaveInfo]) -> Result<()> {
    for info in saves {
        print_save(info);

        loop {
            let action = Select::new()
                .with_prompt(format!("Save {}", info.id))
                .items(&ACTIONS)
                .default(0)
                .interact()?;

            match ACTIONS[action] {
                "Next" => break,
                "View changes" => {
                    for diff in repo.view_changes(info.id)? {
                        print_file_diff(&diff);
                    }
                }
                "Rollback" => {
                    let restored = repo.rollback(info.id)?;
                    println!(
                        "{}",
                        format!("✓ Restored {} file(s) to save {}", restored.len(), info.id)
                            .green()
                            .bold()
                    );
                }
                "Obliterate" => {
                    super::obliterate::obliterate(repo, info.id)?;
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }

    Ok(())
}
