use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use strata_core::diff::file_text;
use strata_core::repository::DEFAULT_MESSAGE;
use strata_sdk::{SyncClient, UploadFile, UploadRequest};
use tracing::debug;

pub async fn run(args: Vec<String>, message: Option<String>, server: Option<String>) -> Result<()> {
    let repo = super::open_repository()?;
    let (paths, inline_message) = split_message(args);
    let message = message
        .or(inline_message)
        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());

    let keys = if paths.is_empty() {
        repo.tracked()?.iter().map(str::to_string).collect()
    } else {
        super::absolute_paths(paths.into_iter().map(PathBuf::from).collect())?
            .iter()
            .map(|p| repo.relative_key(p))
            .collect::<strata_core::Result<Vec<_>>>()?
    };

    if keys.is_empty() {
        println!("{}", "Nothing to upload".yellow());
        return Ok(());
    }

    let mut files = Vec::with_capacity(keys.len());
    for path in keys {
        // Sent in file form; the server normalizes on receipt.
        let content = file_text(&repo.working_content(&path)?);
        files.push(UploadFile { path, content });
    }

    let request = UploadRequest {
        project: repo.project_name()?,
        message,
        files,
    };
    let address = super::server_address(server, Some(&repo))?;
    debug!("Uploading {} files to {}", request.files.len(), address);

    println!(
        "{} {} to {}",
        "Uploading".bold(),
        request.project.cyan(),
        address
    );

    let progress = ProgressBar::new(request.files.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("  [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    SyncClient::connect(address.as_str())
        .await?
        .upload(&request, |file| {
            progress.set_message(file.path.clone());
            progress.inc(1);
        })
        .await?;

    progress.finish_and_clear();
    println!(
        "{}",
        format!("✓ Uploaded {} file(s)", request.files.len())
            .green()
            .bold()
    );

    Ok(())
}

/// Splits a trailing `@message@` argument from the file list.
fn split_message(mut args: Vec<String>) -> (Vec<String>, Option<String>) {
    let message = match args.last() {
        Some(last) if last.len() >= 2 && last.starts_with('@') && last.ends_with('@') => {
            args.pop().map(|m| m[1..m.len() - 1].to_string())
        }
        _ => None,
    };
    (args, message)
}
