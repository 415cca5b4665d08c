use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use strata_core::{Error, SaveId};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::{
    add, download, history, ignore, init, obliterate, rollback, save, serve, show, status, upload,
};

#[derive(Parser)]
#[command(name = "strata")]
#[command(version, about = "Incremental version control for text files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a repository
    Init {
        /// Directory to initialize (created if missing)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Record a new save of every tracked file
    Save {
        /// Save message
        message: Option<String>,
    },

    /// Start tracking files or directories
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Stop tracking files or directories
    Ignore {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Restore tracked files to their content at a save
    Rollback {
        /// Save ID to roll back to
        save_id: SaveId,
    },

    /// Permanently delete a save and every later save
    Obliterate {
        /// First save ID to delete
        save_id: SaveId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show save history
    History {
        /// Number of saves to show (most recent)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print history as JSON
        #[arg(long, conflicts_with = "interactive")]
        json: bool,

        /// Step through saves and act on them
        #[arg(short, long)]
        interactive: bool,
    },

    /// Show the line changes recorded by a save
    Show {
        /// Save ID
        save_id: SaveId,
    },

    /// Show tracked files changed since the last save
    Status,

    /// Upload tracked (or given) files to the server
    Upload {
        /// Files to upload; a final `@message@` argument sets the save message
        args: Vec<String>,

        /// Save message
        #[arg(short, long)]
        message: Option<String>,

        /// Server address (host:port)
        #[arg(short, long)]
        server: Option<String>,
    },

    /// List projects on the server, or request one
    Download {
        /// Project to download
        project: Option<String>,

        /// Server address (host:port)
        #[arg(short, long)]
        server: Option<String>,
    },

    /// Accept one sync connection and serve it
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:2956")]
        addr: String,

        /// Directory holding project histories
        #[arg(short, long, default_value = "projects")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(err) = run(cli.command).await {
        match err.downcast_ref::<Error>() {
            Some(Error::NoChanges) => println!("{}", "No changes detected".yellow()),
            _ => eprintln!("{} {:#}", "error:".red().bold(), err),
        }
        std::process::exit(exit_code(&err));
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init { path } => init::run(path)?,
        Commands::Save { message } => save::run(message)?,
        Commands::Add { paths } => add::run(paths)?,
        Commands::Ignore { paths } => ignore::run(paths)?,
        Commands::Rollback { save_id } => rollback::run(save_id)?,
        Commands::Obliterate { save_id, force } => obliterate::run(save_id, force)?,
        Commands::History {
            limit,
            json,
            interactive,
        } => history::run(limit, json, interactive)?,
        Commands::Show { save_id } => show::run(save_id)?,
        Commands::Status => status::run()?,
        Commands::Upload {
            args,
            message,
            server,
        } => upload::run(args, message, server).await?,
        Commands::Download { project, server } => download::run(project, server).await?,
        Commands::Serve { addr, root } => serve::run(addr, root).await?,
    }

    Ok(())
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(Error::NotInitialized) => -11,
        Some(Error::NoChanges) => -10,
        Some(Error::InvalidSave(_)) => -9,
        Some(Error::PathNotFound(_) | Error::InvalidPath(_)) => -2,
        Some(Error::NotADirectory(_)) => -5,
        Some(Error::AlreadyInitialized(_)) => -7,
        _ => -1,
    }
}
