use anyhow::Result;
use colored::Colorize;
use strata_sdk::SyncClient;

pub async fn run(project: Option<String>, server: Option<String>) -> Result<()> {
    // Downloading does not need a local repository.
    let repo = super::open_repository().ok();
    let address = super::server_address(server, repo.as_ref())?;

    let Some(project) = project else {
        let names = SyncClient::connect(address.as_str())
            .await?
            .list_projects()
            .await?;

        if names.is_empty() {
            println!("{}", "No projects on server".yellow());
            return Ok(());
        }

        println!("{}", format!("Projects on {address}").bold().cyan());
        for name in names {
            println!("  • {}", name);
        }
        println!();
        println!("Run {} to request one", "strata download <project>".cyan());
        return Ok(());
    };

    SyncClient::connect(address.as_str())
        .await?
        .request_download(&project)
        .await?;

    println!(
        "{}",
        format!("Requested {project}, but the server does not send project files yet").yellow()
    );

    Ok(())
}
