//! # strata-sdk
//!
//! Client side of the strata sync protocol.
//!
//! ## Example
//!
//! ```no_run
//! use strata_sdk::{SyncClient, UploadFile, UploadRequest};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let projects = SyncClient::connect("127.0.0.1:2956").await?.list_projects().await?;
//!
//! let request = UploadRequest {
//!     project: "my-project".to_string(),
//!     message: "Initial upload".to_string(),
//!     files: vec![UploadFile {
//!         path: "src/main.rs".to_string(),
//!         content: "fn main() {}".to_string(),
//!     }],
//! };
//! SyncClient::connect("127.0.0.1:2956").await?.upload(&request, |_| {}).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The server handles a single request per connection, so each method
//! consumes the client.

pub mod protocol;
pub mod wire;

pub use protocol::{Command, UploadFile, UploadRequest, DEFAULT_PORT};

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, info};
use wire::{read_count, read_message, write_message};

pub struct SyncClient<S = TcpStream> {
    stream: S,
}

impl SyncClient<TcpStream> {
    /// Connect to a strata server
    ///
    /// # Arguments
    ///
    /// * `addr` - Address of the server (e.g., "127.0.0.1:2956")
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .context("Failed to connect to server")?;
        Ok(Self { stream })
    }
}

impl<S> SyncClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already connected stream
    pub fn from_stream(stream: S) -> Self {
        Self { stream }
    }

    /// Ask the server for the names of the projects it holds
    pub async fn list_projects(mut self) -> Result<Vec<String>> {
        debug!("Requesting project names");
        write_message(&mut self.stream, Command::List.as_str()).await?;

        let count = read_count(&mut self.stream).await?;
        let mut names = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            names.push(read_message(&mut self.stream).await?);
        }

        Ok(names)
    }

    /// Upload files to a project; the server records them as a new save
    ///
    /// `on_file` is called once per file after it has been sent. The server
    /// does not reply.
    pub async fn upload<F>(mut self, request: &UploadRequest, mut on_file: F) -> Result<()>
    where
        F: FnMut(&UploadFile),
    {
        info!(
            "Uploading {} files to project {}",
            request.files.len(),
            request.project
        );

        let stream = &mut self.stream;
        write_message(stream, Command::Upload.as_str()).await?;
        write_message(stream, &request.project).await?;
        write_message(stream, &request.files.len().to_string()).await?;
        write_message(stream, &request.message).await?;

        for file in &request.files {
            write_message(stream, &file.path).await?;
            write_message(stream, &file.content).await?;
            on_file(file);
        }

        Ok(())
    }

    /// Request a project download
    ///
    /// Only the request is defined; the server does not send project
    /// content back.
    pub async fn request_download(mut self, project: &str) -> Result<()> {
        debug!("Requesting download of {}", project);
        write_message(&mut self.stream, Command::Download.as_str()).await?;
        write_message(&mut self.stream, project).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_projects() {
        let (client_end, mut server_end) = tokio::io::duplex(1024);

        let server = tokio::spawn(async move {
            assert_eq!(read_message(&mut server_end).await.unwrap(), "list");
            write_message(&mut server_end, "2").await.unwrap();
            write_message(&mut server_end, "alpha").await.unwrap();
            write_message(&mut server_end, "beta").await.unwrap();
        });

        let names = SyncClient::from_stream(client_end)
            .list_projects()
            .await
            .unwrap();

        assert_eq!(names, vec!["alpha", "beta"]);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_list_projects_with_oversized_count_fails() {
        let (client_end, mut server_end) = tokio::io::duplex(1024);

        let server = tokio::spawn(async move {
            assert_eq!(read_message(&mut server_end).await.unwrap(), "list");
            write_message(&mut server_end, "18446744073709551615")
                .await
                .unwrap();
        });

        let result = SyncClient::from_stream(client_end).list_projects().await;

        assert!(result.is_err());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_message_sequence() {
        let (client_end, mut server_end) = tokio::io::duplex(1024);
        let request = UploadRequest {
            project: "demo".to_string(),
            message: "first".to_string(),
            files: vec![
                UploadFile {
                    path: "a.txt".to_string(),
                    content: "hello".to_string(),
                },
                UploadFile {
                    path: "src/b.rs".to_string(),
                    content: String::new(),
                },
            ],
        };

        let mut sent = Vec::new();
        SyncClient::from_stream(client_end)
            .upload(&request, |f| sent.push(f.path.clone()))
            .await
            .unwrap();

        let mut received = Vec::new();
        for _ in 0..8 {
            received.push(read_message(&mut server_end).await.unwrap());
        }

        assert_eq!(
            received,
            vec!["upload", "demo", "2", "first", "a.txt", "hello", "src/b.rs", ""]
        );
        assert_eq!(sent, vec!["a.txt", "src/b.rs"]);
    }
}
