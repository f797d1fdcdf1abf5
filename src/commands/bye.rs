use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use crate::commands::executable::Executable;
use crate::connection::Connection;
use crate::Error;

/// Ends the session. Nothing is sent back; the connection is closed by the caller.
#[derive(Debug, PartialEq)]
pub struct Bye;

impl Executable for Bye {
    async fn exec<S>(self, _conn: &mut Connection<S>, _root: &Path) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Send,
    {
        info!("Client said goodbye");
        Ok(())
    }
}
