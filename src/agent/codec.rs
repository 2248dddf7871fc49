//! Agent bridge wire framing
//!
//! Each message is a JSON document preceded by a length header:
//! ```text
//! Content-Length: <byte-length>\r\n
//! \r\n
//! <JSON body>
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::common::{Error, Result};

/// Upper bound for a single message body
const MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

fn eof_as_crash(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::AgentCrashed
    } else {
        Error::Io(e)
    }
}

/// Read one framed message body
pub async fn read_frame<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut content_length: Option<usize> = None;
    let mut in_header = false;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line).await.map_err(eof_as_crash)?;
        if bytes_read == 0 {
            return Err(Error::AgentCrashed);
        }

        if line == "\r\n" || line == "\n" {
            if content_length.is_some() {
                break;
            }
            if in_header {
                return Err(Error::AgentProtocol(
                    "Missing Content-Length header".to_string(),
                ));
            }
            // Stray blank line between frames
            continue;
        }

        in_header = true;

        if let Some(value) = line.trim().strip_prefix("Content-Length:") {
            content_length = Some(value.trim().parse().map_err(|_| {
                Error::AgentProtocol(format!("Invalid Content-Length: {}", value.trim()))
            })?);
        }
    }

    let len = content_length.unwrap_or_default();
    if len > MAX_MESSAGE_BYTES {
        return Err(Error::AgentProtocol(format!(
            "Content-Length too large: {} bytes",
            len
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(eof_as_crash)?;

    String::from_utf8(body).map_err(|e| Error::AgentProtocol(format!("Invalid UTF-8: {}", e)))
}

/// Write one framed message body
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> Result<()> {
    let header = format!("Content-Length: {}\r\n\r\n", json.len());

    writer.write_all(header.as_bytes()).await?;
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;

    Ok(())
}

/// Read and deserialize one message
pub async fn read_json<R, T>(reader: &mut R) -> Result<T>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let body = read_frame(reader).await?;
    tracing::trace!("bridge <<< {}", body);
    serde_json::from_str(&body).map_err(|e| Error::AgentProtocol(format!("Invalid message: {}", e)))
}

/// Serialize and write one message
pub async fn write_json<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_string(message)?;
    tracing::trace!("bridge >>> {}", body);
    write_frame(writer, &body).await
}
