pub mod bye;
pub mod executable;
pub mod get;
pub mod put;
pub mod unknown;

use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::codec::LINE_TERMINATOR;
use crate::commands::executable::Executable;
use crate::connection::Connection;
use crate::request::{CommandKind, Request};
use crate::Error;

use bye::Bye;
use get::Get;
use put::Put;
use unknown::Unknown;

#[derive(Debug, PartialEq)]
pub enum Command {
    Get(Get),
    Put(Put),
    Bye(Bye),
    Unknown(Unknown),
}

impl Executable for Command {
    async fn exec<S>(self, conn: &mut Connection<S>, root: &Path) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Send,
    {
        match self {
            Command::Get(cmd) => cmd.exec(conn, root).await,
            Command::Put(cmd) => cmd.exec(conn, root).await,
            Command::Bye(cmd) => cmd.exec(conn, root).await,
            Command::Unknown(cmd) => cmd.exec(conn, root).await,
        }
    }
}

impl From<Request> for Command {
    fn from(request: Request) -> Self {
        match request.kind {
            CommandKind::Get => Command::Get(Get::from(&request)),
            CommandKind::Put => Command::Put(Put::from(&request)),
            CommandKind::Bye => Command::Bye(Bye),
            CommandKind::Unknown => {
                let line = request
                    .raw
                    .strip_suffix(&[LINE_TERMINATOR])
                    .unwrap_or(&request.raw[..]);
                Command::Unknown(Unknown {
                    command: String::from_utf8_lossy(line).into_owned(),
                })
            }
        }
    }
}
