use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::Error;

pub const LINE_TERMINATOR: u8 = b'\n';

/// Read-buffer capacity used when none is configured.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 100;

/// A chunk of bytes received from the client.
///
/// A line normally ends with (and includes) the line terminator. When the client sends more
/// than the codec capacity without a terminator, the codec hands out exactly `max_length` bytes
/// and marks the line as `truncated`; the rest of the data is returned by following reads.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub bytes: Bytes,
    pub truncated: bool,
}

impl From<&'static [u8]> for Line {
    fn from(bytes: &'static [u8]) -> Self {
        Line {
            bytes: Bytes::from_static(bytes),
            truncated: false,
        }
    }
}

pub struct LineCodec {
    max_length: usize,
}

impl LineCodec {
    pub fn new(max_length: usize) -> LineCodec {
        // A zero capacity would never make progress.
        LineCodec {
            max_length: max_length.max(1),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl Decoder for LineCodec {
    type Item = Line;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let window = src.len().min(self.max_length);

        if let Some(index) = src[..window].iter().position(|b| *b == LINE_TERMINATOR) {
            let bytes = src.split_to(index + 1).freeze();
            return Ok(Some(Line {
                bytes,
                truncated: false,
            }));
        }

        if src.len() >= self.max_length {
            let bytes = src.split_to(self.max_length).freeze();
            return Ok(Some(Line {
                bytes,
                truncated: true,
            }));
        }

        // Not enough data to complete a line.
        src.reserve(self.max_length - src.len());
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        if src.is_empty() {
            return Ok(None);
        }

        // The peer closed the stream in the middle of a line; hand out what is left.
        let bytes = src.split_to(src.len()).freeze();
        Ok(Some(Line {
            bytes,
            truncated: false,
        }))
    }
}
