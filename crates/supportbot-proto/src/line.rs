//! Newline-delimited codec for tokio.

use std::borrow::Cow;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

use crate::error::{ProtocolError, Result};

/// Codec that splits a byte stream on `\n` and yields text lines.
///
/// Lines keep their terminator; the message parser strips it. Bytes that
/// are not valid UTF-8 are replaced with U+FFFD, and lines over the length
/// limit are dropped whole. Neither ends the stream.
pub struct LineCodec {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    /// Maximum line length, terminator included.
    max_len: usize,
    /// Inside an over-long line; drop bytes up to the next newline.
    discarding: bool,
}

impl LineCodec {
    /// Codec with the classic 512-byte IRC line limit.
    pub fn new() -> Self {
        Self::with_max_len(512)
    }

    /// Codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if self.discarding || src.len() > self.max_len {
                    if !self.discarding {
                        warn!(limit = self.max_len, "discarding over-long line");
                    }
                    src.clear();
                    self.next_index = 0;
                    self.discarding = true;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if line.len() > self.max_len {
                warn!(actual = line.len(), limit = self.max_len, "discarding over-long line");
                continue;
            }

            let data = match String::from_utf8_lossy(&line) {
                Cow::Borrowed(text) => text.to_owned(),
                Cow::Owned(text) => {
                    debug!("replaced invalid UTF-8 in received line");
                    text
                }
            };
            return Ok(Some(data));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(line.as_bytes());
        Ok(())
    }
}
