use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use strata_server::SyncServer;

pub async fn run(addr: String, root: PathBuf) -> Result<()> {
    let server = SyncServer::bind(addr.as_str(), root).await?;

    println!("{}", "🚀 Starting strata server...".bold().cyan());
    println!("   {}: {}", "Listening".bold(), server.local_addr()?);
    println!("   {}: {:?}", "Projects".bold(), server.projects().root());
    println!();
    println!("{}", "Serving a single connection".dimmed());
    println!();

    server.serve_once().await?;

    println!("{}", "✓ Connection served, shutting down".green());
    Ok(())
}
