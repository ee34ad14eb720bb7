//! IRC message codec for tokio.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::error::{ProtocolError, Result};
use crate::line::LineCodec;
use crate::message::Message;

/// Wraps [`LineCodec`] and parses each line into a [`Message`].
///
/// Lines that do not parse are logged and skipped.
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Codec with a custom maximum inbound line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Make an outgoing line safe to put on the wire.
    ///
    /// Everything after the first line ending is dropped so a parameter can
    /// never smuggle a second command; NUL is refused outright.
    pub fn sanitize(mut data: String) -> Result<String> {
        if let Some(pos) = data.find(['\r', '\n']) {
            data.truncate(pos);
            data.push_str("\r\n");
        }
        if data.contains('\0') {
            return Err(ProtocolError::IllegalControlChar('\0'));
        }
        Ok(data)
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        loop {
            match self.inner.decode(src)? {
                None => return Ok(None),
                // Servers occasionally send bare keepalive newlines.
                Some(line) if line.trim_end_matches(['\r', '\n']).is_empty() => continue,
                Some(line) => match line.parse::<Message>() {
                    Ok(msg) => return Ok(Some(msg)),
                    Err(e) => warn!(error = %e, "skipping unparseable line"),
                },
            }
        }
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        let sanitized = Self::sanitize(msg.to_string())?;
        self.inner.encode(sanitized, dst)
    }
}
