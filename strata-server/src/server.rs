use crate::project::ProjectStore;
use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use strata_sdk::wire::{read_count, read_message, write_message};
use strata_sdk::{Command, UploadFile, UploadRequest};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{info, warn};

/// Serves exactly one connection, then returns.
pub struct SyncServer {
    listener: TcpListener,
    projects: ProjectStore,
}

impl SyncServer {
    pub async fn bind<A: ToSocketAddrs>(addr: A, projects_root: PathBuf) -> Result<Self> {
        let projects = ProjectStore::open(projects_root)?;
        let listener = TcpListener::bind(addr)
            .await
            .context("Failed to bind server socket")?;

        Ok(Self { listener, projects })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub async fn serve_once(self) -> Result<()> {
        info!("Waiting for a connection on {}", self.local_addr()?);
        info!("Projects: {:?}", self.projects.root());

        let (mut stream, peer) = self.listener.accept().await?;
        info!("Connection from {}", peer);

        handle_connection(&mut stream, &self.projects).await?;

        info!("Connection from {} closed", peer);
        Ok(())
    }
}

/// Reads one command from `stream` and serves it.
pub async fn handle_connection<S>(stream: &mut S, projects: &ProjectStore) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let token = read_message(stream).await?;
    let Some(command) = Command::parse(&token) else {
        bail!("Unknown command: {token:?}");
    };

    match command {
        Command::List => {
            let names = projects.list()?;
            info!("Listing {} projects", names.len());
            write_message(stream, &names.len().to_string()).await?;
            for name in &names {
                write_message(stream, name).await?;
            }
        }
        Command::Upload => {
            let request = read_upload(stream).await?;
            info!(
                "Upload of {} files to project {}",
                request.files.len(),
                request.project
            );
            if let Some(id) = projects.apply_upload(&request)? {
                info!("Project {} saved as {}", request.project, id);
            }
        }
        Command::Download => {
            let project = read_message(stream).await?;
            warn!("Download of project {} requested; downloads are not supported", project);
        }
    }

    Ok(())
}

async fn read_upload<S>(stream: &mut S) -> Result<UploadRequest>
where
    S: AsyncRead + Unpin,
{
    let project = read_message(stream).await?;
    let count = read_count(stream).await?;
    let message = read_message(stream).await?;

    let mut files = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let path = read_message(stream).await?;
        let content = read_message(stream).await?;
        files.push(UploadFile { path, content });
    }

    Ok(UploadRequest {
        project,
        message,
        files,
    })
}
