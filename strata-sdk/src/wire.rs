//! Message framing: a 4-byte big-endian length followed by that many bytes
//! of UTF-8 text.

use anyhow::{bail, Context, Result};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame either side will accept.
pub const MAX_MESSAGE_LEN: usize = 64 * 1024 * 1024;

pub async fn write_message<W>(writer: &mut W, message: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(message.len())
        .ok()
        .filter(|len| *len as usize <= MAX_MESSAGE_LEN)
        .with_context(|| format!("Message too large: {} bytes", message.len()))?;

    writer
        .write_all(&len.to_be_bytes())
        .await
        .context("Failed to write message length")?;
    writer
        .write_all(message.as_bytes())
        .await
        .context("Failed to write message data")?;
    writer.flush().await.context("Failed to flush message")?;

    Ok(())
}

pub async fn read_message<R>(reader: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => bail!("Connection closed by peer"),
        Err(e) => return Err(e).context("Failed to read message length"),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_LEN {
        bail!("Message too large: {} bytes", len);
    }

    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .context("Failed to read message data")?;

    String::from_utf8(buf).context("Message is not valid UTF-8")
}

/// Reads a message carrying a decimal count.
pub async fn read_count<R>(reader: &mut R) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let text = read_message(reader).await?;
    text.trim()
        .parse()
        .with_context(|| format!("Expected a count, got {text:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frame_layout() {
        let mut buf = Vec::new();
        write_message(&mut buf, "list").await.unwrap();

        assert_eq!(buf, [0, 0, 0, 4, b'l', b'i', b's', b't']);
    }

    #[tokio::test]
    async fn test_messages_over_duplex() {
        let (mut client, mut server) = tokio::io::duplex(64);

        let writer = tokio::spawn(async move {
            write_message(&mut client, "upload").await.unwrap();
            write_message(&mut client, "").await.unwrap();
            write_message(&mut client, &"x".repeat(1000)).await.unwrap();
            write_message(&mut client, "3").await.unwrap();
        });

        assert_eq!(read_message(&mut server).await.unwrap(), "upload");
        assert_eq!(read_message(&mut server).await.unwrap(), "");
        assert_eq!(read_message(&mut server).await.unwrap().len(), 1000);
        assert_eq!(read_count(&mut server).await.unwrap(), 3);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_connection_is_an_error() {
        let mut empty: &[u8] = &[];
        let err = read_message(&mut empty).await.unwrap_err();

        assert!(err.to_string().contains("closed"));
    }

    #[tokio::test]
    async fn test_oversized_frame_is_rejected() {
        let mut frame: &[u8] = &[0xff, 0xff, 0xff, 0xff];

        assert!(read_message(&mut frame).await.is_err());
    }
}
