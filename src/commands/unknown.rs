use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::warn;

use crate::commands::executable::Executable;
use crate::connection::Connection;
use crate::status::Status;
use crate::Error;

/// Anything that is not a known command, including request lines that did not fit in the
/// read buffer.
#[derive(Debug, PartialEq)]
pub struct Unknown {
    pub command: String,
}

impl Executable for Unknown {
    async fn exec<S>(self, conn: &mut Connection<S>, _root: &Path) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Send,
    {
        warn!("Unknown command {:?}", self.command);
        conn.write_status(Status::CommandError).await
    }
}
