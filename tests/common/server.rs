//! Scripted IRC server.
//!
//! Accepts the bot's connection and lets a test send raw lines and assert
//! on what the bot writes back.

use std::time::Duration;

use supportbot_proto::{Command, Message};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A listening mock server.
pub struct MockServer {
    listener: TcpListener,
}

impl MockServer {
    /// Bind to an ephemeral loopback port.
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    /// `host:port` to hand to the bot.
    pub fn address(&self) -> String {
        self.listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_default()
    }

    /// Accept the bot's connection.
    pub async fn accept(&self) -> anyhow::Result<ServerConn> {
        let (stream, _) = timeout(RECV_TIMEOUT, self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(ServerConn {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Accept and complete registration: expect NICK/USER, send 001.
    #[allow(dead_code)]
    pub async fn accept_registered(&self, nick: &str) -> anyhow::Result<ServerConn> {
        let mut conn = self.accept().await?;
        conn.expect_registration(nick).await?;
        conn.welcome(nick).await?;
        Ok(conn)
    }
}

/// The server side of one accepted connection.
pub struct ServerConn {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

#[allow(dead_code)]
impl ServerConn {
    /// Send a raw line, adding CRLF if missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send bytes exactly as given, whether or not they are valid UTF-8.
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next line from the bot, `None` once it closed the connection.
    pub async fn recv_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Next message from the bot.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        let line = self
            .recv_line()
            .await?
            .ok_or_else(|| anyhow::anyhow!("connection closed"))?;
        line.parse::<Message>()
            .map_err(|e| anyhow::anyhow!("Parse error: {}", e))
    }

    /// Assert the bot sends nothing for `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        let mut line = String::new();
        match timeout(dur, self.reader.read_line(&mut line)).await {
            Err(_) => Ok(()),
            Ok(Ok(0)) => anyhow::bail!("connection closed"),
            Ok(_) => anyhow::bail!("unexpected line: {}", line.trim_end()),
        }
    }

    /// Assert the bot closes the connection, skipping nothing.
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        match self.recv_line().await? {
            None => Ok(()),
            Some(line) => anyhow::bail!("expected close, got: {line}"),
        }
    }

    /// Expect `NICK <nick>` then `USER <nick> 0 * :<nick>`.
    pub async fn expect_registration(&mut self, nick: &str) -> anyhow::Result<()> {
        let first = self.recv().await?;
        anyhow::ensure!(
            first.command == Command::NICK(nick.to_string()),
            "expected NICK, got {first:?}"
        );
        let second = self.recv().await?;
        anyhow::ensure!(
            second.command == Command::USER(nick.to_string(), "0".to_string(), nick.to_string()),
            "expected USER, got {second:?}"
        );
        Ok(())
    }

    /// RPL_WELCOME.
    pub async fn welcome(&mut self, nick: &str) -> anyhow::Result<()> {
        self.send_raw(&format!(":mock.server 001 {nick} :Welcome to the mock network"))
            .await
    }

    /// Expect `JOIN <channel>` and confirm it the way a server does.
    pub async fn accept_join(&mut self, nick: &str, channel: &str) -> anyhow::Result<()> {
        let msg = self.recv().await?;
        anyhow::ensure!(
            msg.command == Command::JOIN(channel.to_string()),
            "expected JOIN {channel}, got {msg:?}"
        );
        self.send_raw(&format!(":{nick}!bot@mock.host JOIN {channel}"))
            .await
    }

    /// A channel message from another user.
    pub async fn say(&mut self, from: &str, channel: &str, text: &str) -> anyhow::Result<()> {
        self.send_raw(&format!(":{from}!user@mock.host PRIVMSG {channel} :{text}"))
            .await
    }

    /// Expect a PRIVMSG to `channel` and return its text.
    pub async fn expect_privmsg(&mut self, channel: &str) -> anyhow::Result<String> {
        let msg = self.recv().await?;
        match msg.command {
            Command::PRIVMSG(target, text) if target == channel => Ok(text),
            other => anyhow::bail!("expected PRIVMSG {channel}, got {other:?}"),
        }
    }
}
