//! Server connection task.
//!
//! ```text
//!   Session ──try_send──▶ [outbound queue] ──▶ ┌───────────────────────┐
//!                                              │      link task        │
//!   Session ◀──recv── [event queue] ◀───────── │  tokio::select! over  │ ◀──▶ server
//!                                              │  outbound / socket /  │
//!                                              │  cancellation         │
//!                                              └───────────────────────┘
//! ```
//!
//! The task registers (`NICK` + `USER`), answers `PING` itself and forwards
//! everything the session cares about as [`LinkEvent`]s. Each event carries
//! the generation of the link that produced it so the session can ignore a
//! retired connection.

use std::collections::HashSet;

use supportbot_proto::{
    ChannelExt, Command, Message, Response, Transport, TransportReadError, irc_eq, irc_to_lower,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use crate::telemetry::spans;

/// Port used when the address names none.
pub const DEFAULT_PORT: u16 = 6667;

/// Everything needed to open one connection.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// `host[:port]` as the operator typed it.
    pub server: String,
    pub nick: String,
    pub username: String,
    pub realname: String,
    pub send_queue: usize,
    pub max_line_len: usize,
}

/// An event from a link task, tagged with the link's generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
    pub generation: u64,
    pub kind: LinkEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEventKind {
    /// RPL_WELCOME; `nick` is the name the server accepted.
    Registered { nick: String },
    /// The bot joined `channel`.
    Joined { channel: String },
    /// The bot left `channel`.
    Parted { channel: String },
    /// The bot was kicked from `channel`.
    Kicked { channel: String },
    /// The server confirmed a nickname change for the bot.
    NickChanged { nick: String },
    /// `PRIVMSG` to a channel.
    ChannelMessage {
        channel: String,
        sender: String,
        text: String,
    },
    /// Server `ERROR`. Fatal.
    ProtocolError(String),
    /// Connect failure, socket error or the server hanging up. Fatal.
    NetworkError(String),
}

impl LinkEventKind {
    fn is_fatal(&self) -> bool {
        matches!(self, Self::ProtocolError(_) | Self::NetworkError(_))
    }
}

/// The session's handle on a live connection.
#[derive(Debug)]
pub struct Link {
    generation: u64,
    server: String,
    outbound: mpsc::Sender<Message>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    registered: bool,
    /// Channels the server reports the bot in, lowercased.
    joined: HashSet<String>,
}

impl Link {
    /// Spawn the connection task. Must be called inside a tokio runtime.
    pub fn spawn(settings: LinkSettings, generation: u64, events: mpsc::Sender<LinkEvent>) -> Self {
        let (outbound, outbound_rx) = mpsc::channel(settings.send_queue);
        let cancel = CancellationToken::new();
        let span = spans::link(&settings.server, generation);
        let server = settings.server.clone();

        let task = LinkTask {
            settings,
            generation,
            outbound: outbound_rx,
            cancel: cancel.clone(),
            events,
        };
        let handle = tokio::spawn(task.run().instrument(span));

        Self {
            generation,
            server,
            outbound,
            cancel,
            handle,
            registered: false,
            joined: HashSet::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Whether the server reported the bot in `channel`.
    pub fn is_joined(&self, channel: &str) -> bool {
        self.joined.contains(&irc_to_lower(channel))
    }

    /// Apply a membership or registration event from this link's task.
    pub(crate) fn observe(&mut self, kind: &LinkEventKind) {
        match kind {
            LinkEventKind::Registered { .. } => self.registered = true,
            LinkEventKind::Joined { channel } => {
                self.joined.insert(irc_to_lower(channel));
            }
            LinkEventKind::Parted { channel } | LinkEventKind::Kicked { channel } => {
                self.joined.remove(&irc_to_lower(channel));
            }
            _ => {}
        }
    }

    /// Queue a message without waiting. Returns false if it was dropped.
    pub fn send(&self, msg: Message) -> bool {
        match self.outbound.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(msg)) => {
                warn!(command = %msg.command.name(), "outbound queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("link task gone, dropping message");
                false
            }
        }
    }

    /// Queue a QUIT and shut the link down.
    ///
    /// The task flushes whatever is queued, stops reading and closes the
    /// socket. A link still connecting is abandoned. The returned handle
    /// completes once the socket is closed.
    pub fn release(self, reason: &str) -> JoinHandle<()> {
        self.send(Message::quit(reason));
        self.cancel.cancel();
        // Dropping the sender lets the task see the end of the queue.
        drop(self.outbound);
        self.handle
    }
}

/// Default the port of a `host[:port]` address.
pub fn server_endpoint(addr: &str) -> String {
    if addr.starts_with('[') {
        // Bracketed IPv6, with or without a port.
        return if addr.contains("]:") {
            addr.to_string()
        } else {
            format!("{addr}:{DEFAULT_PORT}")
        };
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => {
            addr.to_string()
        }
        // Bare IPv6 literal.
        Some(_) => format!("[{addr}]:{DEFAULT_PORT}"),
        None => format!("{addr}:{DEFAULT_PORT}"),
    }
}

/// What to do with one inbound message.
#[derive(Debug, PartialEq, Eq)]
enum Inbound {
    Reply(Message),
    Event(LinkEventKind),
    Ignore,
}

/// Map a server message to a reply or event. `nick` tracks the bot's
/// current nickname.
fn classify(msg: Message, nick: &mut String) -> Inbound {
    let own = msg.source_nickname().is_some_and(|src| irc_eq(src, nick.as_str()));

    match msg.command {
        Command::PING(token, _) => Inbound::Reply(Message::pong(token)),
        Command::Response(Response::RPL_WELCOME, args) => {
            if let Some(accepted) = args.into_iter().next() {
                *nick = accepted;
            }
            Inbound::Event(LinkEventKind::Registered { nick: nick.clone() })
        }
        Command::Response(resp, args) if resp.is_error() => {
            warn!(code = resp.code(), args = ?args, "server refused a request");
            Inbound::Ignore
        }
        Command::JOIN(channel) if own => Inbound::Event(LinkEventKind::Joined { channel }),
        Command::PART(channel, _) if own => Inbound::Event(LinkEventKind::Parted { channel }),
        Command::KICK(channel, target, _) if irc_eq(&target, nick.as_str()) => {
            Inbound::Event(LinkEventKind::Kicked { channel })
        }
        Command::NICK(new) if own => {
            *nick = new.clone();
            Inbound::Event(LinkEventKind::NickChanged { nick: new })
        }
        Command::PRIVMSG(target, text) if target.is_channel_name() => {
            let sender = msg
                .prefix
                .as_ref()
                .and_then(|p| p.nick())
                .unwrap_or_default()
                .to_string();
            Inbound::Event(LinkEventKind::ChannelMessage {
                channel: target,
                sender,
                text,
            })
        }
        Command::ERROR(reason) => Inbound::Event(LinkEventKind::ProtocolError(reason)),
        _ => Inbound::Ignore,
    }
}

struct LinkTask {
    settings: LinkSettings,
    generation: u64,
    outbound: mpsc::Receiver<Message>,
    cancel: CancellationToken,
    events: mpsc::Sender<LinkEvent>,
}

impl LinkTask {
    async fn emit(&self, kind: LinkEventKind) -> bool {
        let event = LinkEvent {
            generation: self.generation,
            kind,
        };
        self.events.send(event).await.is_ok()
    }

    async fn run(mut self) {
        let endpoint = server_endpoint(&self.settings.server);
        let connect = Transport::connect(endpoint.as_str(), self.settings.max_line_len);

        let mut transport = tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!("connect abandoned");
                return;
            }
            result = connect => match result {
                Ok(transport) => transport,
                Err(e) => {
                    self.emit(LinkEventKind::NetworkError(format!(
                        "could not connect to {endpoint}: {e}"
                    )))
                    .await;
                    return;
                }
            }
        };
        info!(endpoint = %endpoint, "connected");

        let registration = [
            Message::nick(self.settings.nick.as_str()),
            Command::USER(
                self.settings.username.clone(),
                "0".to_string(),
                self.settings.realname.clone(),
            )
            .into(),
        ];
        for msg in registration {
            if let Err(e) = transport.write_message(msg).await {
                self.emit(LinkEventKind::NetworkError(e.to_string())).await;
                return;
            }
        }

        let mut nick = self.settings.nick.clone();
        let mut closing = false;

        loop {
            tokio::select! {
                biased;

                queued = self.outbound.recv() => {
                    let Some(msg) = queued else { break };
                    match transport.write_message(msg).await {
                        Ok(()) => {}
                        Err(supportbot_proto::ProtocolError::Io(e)) => {
                            if !closing {
                                self.emit(LinkEventKind::NetworkError(e.to_string())).await;
                            }
                            return;
                        }
                        Err(e) => warn!(error = %e, "refusing to send message"),
                    }
                }

                read = transport.read_message(), if !closing => {
                    let kind = match read {
                        Ok(Some(msg)) => match classify(msg, &mut nick) {
                            Inbound::Reply(reply) => {
                                if let Err(e) = transport.write_message(reply).await {
                                    self.emit(LinkEventKind::NetworkError(e.to_string())).await;
                                    return;
                                }
                                continue;
                            }
                            Inbound::Event(kind) => kind,
                            Inbound::Ignore => continue,
                        },
                        Ok(None) => LinkEventKind::NetworkError("connection closed by server".to_string()),
                        Err(e @ TransportReadError::Io(_)) => LinkEventKind::NetworkError(e.to_string()),
                        Err(e) => {
                            warn!(error = %e, "skipping unreadable line");
                            continue;
                        }
                    };
                    let fatal = kind.is_fatal();
                    if !self.emit(kind).await || fatal {
                        return;
                    }
                }

                _ = self.cancel.cancelled(), if !closing => {
                    debug!("link released, draining outbound queue");
                    closing = true;
                }
            }
        }

        if let Err(e) = transport.close().await {
            debug!(error = %e, "error closing connection");
        }
        info!("disconnected");
    }
}
