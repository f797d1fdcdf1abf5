use futures::StreamExt;
use std::net::SocketAddr;
use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;
use uuid::Uuid;

use crate::codec::{Line, LineCodec};
use crate::status::{Status, GREETING};
use crate::Error;

/// One client connection. Incoming data is framed into lines bounded by the codec capacity;
/// outgoing data is written straight to the stream.
pub struct Connection<S = TcpStream> {
    pub id: Uuid,
    pub client_address: Option<SocketAddr>,
    reader: FramedRead<ReadHalf<S>, LineCodec>,
    pub writer: WriteHalf<S>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite,
{
    pub fn new(stream: S, client_address: Option<SocketAddr>, max_line_length: usize) -> Self {
        let (reader, writer) = io::split(stream);

        Connection {
            id: Uuid::new_v4(),
            client_address,
            reader: FramedRead::new(reader, LineCodec::new(max_line_length)),
            writer,
        }
    }

    pub fn max_line_length(&self) -> usize {
        self.reader.decoder().max_length()
    }

    /// Reads the next line. Returns `None` once the client has closed its side of the stream.
    pub async fn read_line(&mut self) -> Result<Option<Line>, Error> {
        self.reader.next().await.transpose()
    }

    pub async fn greet(&mut self) -> Result<(), Error> {
        self.write_all(GREETING).await
    }

    pub async fn write_status(&mut self, status: Status) -> Result<(), Error> {
        let bytes: Vec<u8> = status.into();
        self.write_all(&bytes).await
    }

    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writer.write_all(bytes).await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), Error> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

impl Connection<TcpStream> {
    pub fn from_tcp(stream: TcpStream, client_address: SocketAddr, max_line_length: usize) -> Self {
        Connection::new(stream, Some(client_address), max_line_length)
    }
}
