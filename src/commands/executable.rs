use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::connection::Connection;
use crate::Error;

#[allow(async_fn_in_trait)]
pub trait Executable {
    /// Runs the command against the connection it was received on. Filenames are resolved
    /// against `root`.
    ///
    /// Problems with the request itself are reported to the client as a status line; only
    /// transport failures are returned as errors.
    async fn exec<S>(self, conn: &mut Connection<S>, root: &Path) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Send;
}
