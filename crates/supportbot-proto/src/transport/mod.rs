//! Framed IRC transport over TCP.

mod error;

pub use error::TransportReadError;

use std::io;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::Framed;
use tracing::warn;

use crate::error::ProtocolError;
use crate::irc::IrcCodec;
use crate::message::Message;

/// Maximum inbound line length (modern servers allow 8191 with tags).
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// A TCP connection speaking IRC messages.
pub struct Transport {
    framed: Framed<TcpStream, IrcCodec>,
}

impl Transport {
    /// Connect to `addr` and wrap the stream.
    pub async fn connect<A: ToSocketAddrs>(addr: A, max_line_len: usize) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::tcp(stream, max_line_len))
    }

    /// Wrap an already connected stream.
    pub fn tcp(stream: TcpStream, max_line_len: usize) -> Self {
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        Self {
            framed: Framed::new(stream, IrcCodec::with_max_len(max_line_len)),
        }
    }

    fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};

        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));
        SockRef::from(stream).set_tcp_keepalive(&keepalive)
    }

    /// Read the next message; `Ok(None)` means the peer closed the connection.
    pub async fn read_message(&mut self) -> Result<Option<Message>, TransportReadError> {
        match self.framed.next().await {
            Some(Ok(msg)) => Ok(Some(msg)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    /// Write and flush one message.
    pub async fn write_message(&mut self, msg: Message) -> Result<(), ProtocolError> {
        self.framed.send(msg).await
    }

    /// Flush and shut down the write side.
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        self.framed.close().await
    }
}
