use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{info, warn};

use crate::commands::executable::Executable;
use crate::connection::Connection;
use crate::request::Request;
use crate::status::{Status, END_OF_TRANSFER};
use crate::Error;

const CHUNK_SIZE: usize = 8 * 1024;

/// Sends the contents of `filename` to the client: `SERVER 200 OK`, a blank line, the raw
/// file bytes, then the end-of-transfer marker.
#[derive(Debug, PartialEq)]
pub struct Get {
    pub filename: Option<String>,
}

impl Executable for Get {
    async fn exec<S>(self, conn: &mut Connection<S>, root: &Path) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Send,
    {
        let Some(filename) = self.filename else {
            warn!("GET request without a filename");
            return conn.write_status(Status::GetError).await;
        };

        let path = root.join(&filename);
        let mut file = match open(&path).await {
            Ok(file) => file,
            Err(e) => {
                warn!("Unable to open {:?} for reading: {}", path, e);
                return conn.write_status(Status::NotFound).await;
            }
        };

        conn.write_status(Status::Ok).await?;

        let mut buffer = vec![0; CHUNK_SIZE];
        let mut sent = 0;
        loop {
            let n = match file.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    // The status line is already out; the client only sees a short payload.
                    warn!("Failed reading {:?} after {} bytes: {}", path, sent, e);
                    break;
                }
            };
            conn.write_all(&buffer[..n]).await?;
            sent += n;
        }

        conn.write_all(END_OF_TRANSFER).await?;
        drop(file);

        info!("Sent {:?} ({} bytes)", path, sent);
        Ok(())
    }
}

impl From<&Request> for Get {
    fn from(request: &Request) -> Self {
        Self {
            filename: request.filename().ok(),
        }
    }
}

async fn open(path: &Path) -> io::Result<File> {
    let file = File::open(path).await?;

    // Directories can be opened for reading on some platforms, but have no bytes to send.
    if file.metadata().await?.is_dir() {
        return Err(io::Error::other("is a directory"));
    }

    Ok(file)
}
