use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::codec::{Line, LINE_TERMINATOR};
use crate::commands::executable::Executable;
use crate::connection::Connection;
use crate::request::Request;
use crate::status::Status;
use crate::Error;

/// Number of consecutive blank chunks that end a PUT body.
const BLANK_CHUNKS_TO_END_BODY: usize = 2;

/// Stores the body sent by the client into `filename`, replacing any previous contents.
///
/// The body has no length prefix. It ends with two consecutive blank chunks, a chunk being
/// blank when it starts with a line terminator and is at most two bytes long. A chunk that
/// continues a line split at the read-buffer capacity is never blank. Every chunk
/// before the second blank one is written to the file, so the first of the two blank lines
/// is persisted and a body cannot contain two consecutive blank lines of its own.
#[derive(Debug, PartialEq)]
pub struct Put {
    pub filename: Option<String>,
}

impl Executable for Put {
    async fn exec<S>(self, conn: &mut Connection<S>, root: &Path) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Send,
    {
        let Some(filename) = self.filename else {
            warn!("PUT request without a filename");
            return conn.write_status(Status::PutError).await;
        };

        let path = root.join(&filename);
        let mut file = match File::create(&path).await {
            Ok(file) => file,
            Err(e) => {
                warn!("Unable to open {:?} for writing: {}", path, e);
                return conn.write_status(Status::PutError).await;
            }
        };

        let mut blank_chunks = 0;
        let mut continues_line = false;
        let mut received = 0;
        let mut write_error = None;

        loop {
            let Some(chunk) = conn.read_line().await? else {
                warn!(
                    "Client closed the connection before the end of the body, {} bytes stored in {:?}",
                    received, path
                );
                if let Err(e) = file.flush().await {
                    warn!("Failed writing {:?}: {}", path, e);
                }
                return Ok(());
            };

            if !continues_line && is_blank(&chunk) {
                blank_chunks += 1;
            } else {
                blank_chunks = 0;
            }
            continues_line = chunk.truncated;

            if blank_chunks >= BLANK_CHUNKS_TO_END_BODY {
                break;
            }

            received += chunk.bytes.len();

            // Keep draining the body after a failed write so the client still gets a status.
            if write_error.is_none() {
                if let Err(e) = file.write_all(&chunk.bytes).await {
                    write_error = Some(e);
                }
            }
        }

        if write_error.is_none() {
            write_error = file.flush().await.err();
        }
        drop(file);

        debug!("Body of {} bytes received", received);

        match write_error {
            Some(e) => {
                warn!("Failed writing {:?}: {}", path, e);
                conn.write_status(Status::PutError).await
            }
            None => {
                info!("Stored {:?} ({} bytes)", path, received);
                conn.write_status(Status::Ok).await
            }
        }
    }
}

impl From<&Request> for Put {
    fn from(request: &Request) -> Self {
        Self {
            filename: request.filename().ok(),
        }
    }
}

fn is_blank(chunk: &Line) -> bool {
    chunk.bytes.first() == Some(&LINE_TERMINATOR) && chunk.bytes.len() <= 2
}
