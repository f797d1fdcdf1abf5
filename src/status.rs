use std::fmt;

/// Sent to every client right after its connection is accepted.
pub static GREETING: &[u8; 6] = b"HELLO\n";

/// Marks the end of a GET payload. The payload is not length prefixed, so a file ending with
/// these exact bytes cannot be told apart from the marker by the client.
pub static END_OF_TRANSFER: &[u8; 3] = b"\n\n\n";

static PREFIX: &str = "SERVER";

/// Outcome of a request, sent to the client as a status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// `SERVER 200 OK`, followed by a blank line.
    Ok,
    NotFound,
    GetError,
    PutError,
    CommandError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotFound => 404,
            Status::GetError => 500,
            Status::PutError => 501,
            Status::CommandError => 502,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NotFound => "Not Found",
            Status::GetError => "Get Error",
            Status::PutError => "Put Error",
            Status::CommandError => "Command Error",
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = self.to_string().into_bytes();
        bytes.push(b'\n');
        // A successful response carries a blank line that ends the header.
        if let Status::Ok = self {
            bytes.push(b'\n');
        }
        bytes
    }
}

impl From<Status> for Vec<u8> {
    fn from(status: Status) -> Self {
        status.serialize()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", PREFIX, self.code(), self.reason())
    }
}
