use bytes::Bytes;
use std::str::{self, FromStr};
use strum_macros::{Display, EnumString};
use thiserror::Error as ThisError;

use crate::codec::{Line, LINE_TERMINATOR};

const SEPARATOR: u8 = b' ';

/// The command named by the first token of a request line. Matching is case-insensitive and
/// the whole token must equal the command name, so `getx` is `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum CommandKind {
    Get,
    Put,
    Bye,
    Unknown,
}

#[derive(Debug, ThisError, PartialEq)]
pub enum RequestError {
    #[error("protocol error; request has no filename argument")]
    MissingArgument,
    #[error("protocol error; request line exceeds {max} bytes")]
    LineTooLong { max: usize },
}

/// The first line a client sends after the greeting.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub kind: CommandKind,
    pub raw: Bytes,
}

impl Request {
    pub fn parse(line: Line) -> Request {
        let raw = line.bytes;

        let token_end = raw
            .iter()
            .position(|b| *b == SEPARATOR || *b == LINE_TERMINATOR)
            .unwrap_or(raw.len());

        let kind = str::from_utf8(&raw[..token_end])
            .ok()
            .and_then(|token| CommandKind::from_str(token).ok())
            .unwrap_or(CommandKind::Unknown);

        Request { kind, raw }
    }

    /// Like [`Request::parse`], but refuses lines that filled the read buffer without a
    /// terminator.
    pub fn try_parse(line: Line, max_length: usize) -> Result<Request, RequestError> {
        if line.truncated {
            return Err(RequestError::LineTooLong { max: max_length });
        }

        Ok(Request::parse(line))
    }

    /// Everything after the first space of the raw line, up to the first line terminator.
    pub fn argument(&self) -> Result<&[u8], RequestError> {
        let start = self
            .raw
            .iter()
            .position(|b| *b == SEPARATOR)
            .ok_or(RequestError::MissingArgument)?
            + 1;

        let rest = &self.raw[start..];
        let end = rest
            .iter()
            .position(|b| *b == LINE_TERMINATOR)
            .unwrap_or(rest.len());

        Ok(&rest[..end])
    }

    pub fn filename(&self) -> Result<String, RequestError> {
        self.argument()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}
