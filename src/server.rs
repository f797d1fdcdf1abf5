use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};

use crate::commands::executable::Executable;
use crate::commands::unknown::Unknown;
use crate::commands::Command;
use crate::config::Config;
use crate::connection::Connection;
use crate::request::Request;
use crate::Error;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));
}

/// Binds the listening socket and serves clients until a transport error occurs.
pub async fn run(config: Config) -> Result<(), Error> {
    init_tracing();

    let listener = TcpListener::bind((config.bind, config.port)).await?;

    serve(listener, config).await
}

/// Serves clients from an already bound listener, one connection at a time: the next client is
/// accepted only once the current connection has been closed.
///
/// Any transport failure (accept, read or write) ends the loop and is returned to the caller.
pub async fn serve(listener: TcpListener, config: Config) -> Result<(), Error> {
    info!(
        "File server listening on {}, serving {:?}",
        listener.local_addr()?,
        config.root
    );

    loop {
        let (socket, client_address) = listener.accept().await?;
        info!("Accepted connection from {:?}", client_address);

        let conn = Connection::from_tcp(socket, client_address, config.max_line_length);
        handle_connection(conn, &config.root).await?;
    }
}

/// Runs one request-response cycle: greeting, a single request line, the command, and close.
/// Anything the client sends after its request is ignored.
#[instrument(
    name = "connection",
    skip(conn, root),
    fields(connection_id, client_address)
)]
pub async fn handle_connection<S>(mut conn: Connection<S>, root: &Path) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Send,
{
    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", format!("{:?}", conn.client_address));

    conn.greet().await?;

    match conn.read_line().await? {
        Some(line) => {
            info!("Received request {:?}", String::from_utf8_lossy(&line.bytes));

            let cmd = match Request::try_parse(line.clone(), conn.max_line_length()) {
                Ok(request) => Command::from(request),
                Err(e) => {
                    warn!("{}", e);
                    Command::Unknown(Unknown {
                        command: String::from_utf8_lossy(&line.bytes).into_owned(),
                    })
                }
            };

            cmd.exec(&mut conn, root).await?;
        }
        None => info!("Client closed the connection without sending a request"),
    }

    if let Err(e) = conn.shutdown().await {
        debug!("Failed to shut down the connection: {}", e);
    }

    info!("Connection closed");
    Ok(())
}
