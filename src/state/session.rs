//! The session state machine.
//!
//! ```text
//!                 connect()                      disconnect()
//!  ┌──────────────┐ ─────────▶ ┌─────────────┐ ─────────────▶ ┌──────────────┐
//!  │ Disconnected │            │  Connected  │                │ Disconnected │
//!  └──────────────┘ ◀───────── └─────────────┘                └──────────────┘
//!                   fatal link event (process exits)
//! ```
//!
//! `Connected` means a link exists. Whether the server has registered it and
//! which channels it is in is tracked on the [`Link`] from its own events.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use supportbot_proto::Message;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ChannelSet;
use super::SharedSession;
use crate::config::{Config, DiceConfig};
use crate::error::{ResponseError, SessionError};
use crate::handlers::{Context, Registry};
use crate::network::{Link, LinkEvent, LinkEventKind, LinkSettings};
use crate::responses::ResponseStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
}

/// Fixed settings taken from the configuration at startup.
#[derive(Debug, Clone)]
struct Settings {
    username: Option<String>,
    realname: Option<String>,
    quit_message: String,
    lines_dir: PathBuf,
    dice: DiceConfig,
    send_queue: usize,
    max_line_len: usize,
}

pub struct Session {
    nick: Option<String>,
    server: Option<String>,
    channels: ChannelSet,
    responses: ResponseStore,
    registry: Registry,
    rng: StdRng,
    link: Option<Link>,
    /// Bumped on every connect; events from older links are stale.
    generation: u64,
    events: mpsc::Sender<LinkEvent>,
    settings: Settings,
}

impl Session {
    /// Build a session from configuration. Link events are delivered to
    /// `events`; feed the other end to [`super::run_events`].
    pub fn new(config: &Config, events: mpsc::Sender<LinkEvent>) -> Self {
        let rng = match config.bot.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut channels = ChannelSet::new();
        for channel in &config.identity.channels {
            channels.insert(channel);
        }

        Self {
            nick: config.identity.nick.clone(),
            server: config.identity.server.clone(),
            channels,
            responses: ResponseStore::new(),
            registry: Registry::new(),
            rng,
            link: None,
            generation: 0,
            events,
            settings: Settings {
                username: config.identity.username.clone(),
                realname: config.identity.realname.clone(),
                quit_message: config.bot.quit_message.clone(),
                lines_dir: config.bot.lines_dir.clone(),
                dice: config.dice.clone(),
                send_queue: config.transport.send_queue,
                max_line_len: config.transport.max_line_len,
            },
        }
    }

    pub fn into_shared(self) -> SharedSession {
        std::sync::Arc::new(parking_lot::Mutex::new(self))
    }

    pub fn state(&self) -> SessionState {
        if self.link.is_some() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    pub fn nick(&self) -> Option<&str> {
        self.nick.as_deref()
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    pub fn responses(&self) -> &ResponseStore {
        &self.responses
    }

    pub fn lines_dir(&self) -> &Path {
        &self.settings.lines_dir
    }

    /// Whether the server reports the bot in `channel`.
    pub fn is_joined(&self, channel: &str) -> bool {
        self.link.as_ref().is_some_and(|link| link.is_joined(channel))
    }

    /// Open a connection with the current identity.
    pub fn connect(&mut self) -> Result<(), SessionError> {
        if self.link.is_some() {
            return Err(SessionError::AlreadyConnected);
        }
        let (Some(nick), Some(server)) = (self.nick.as_deref(), self.server.as_deref()) else {
            return Err(SessionError::InfoNotSet);
        };
        if nick.is_empty() || server.is_empty() {
            return Err(SessionError::InfoNotSet);
        }

        self.generation += 1;
        let settings = LinkSettings {
            server: server.to_string(),
            nick: nick.to_string(),
            username: self.settings.username.clone().unwrap_or_else(|| nick.to_string()),
            realname: self.settings.realname.clone().unwrap_or_else(|| nick.to_string()),
            send_queue: self.settings.send_queue,
            max_line_len: self.settings.max_line_len,
        };
        info!(server = %server, nick = %nick, generation = self.generation, "connecting");
        self.link = Some(Link::spawn(settings, self.generation, self.events.clone()));
        Ok(())
    }

    /// Change the server. A live session quits and reconnects to the new one.
    pub fn set_server(&mut self, server: &str) -> Result<(), SessionError> {
        let was_connected = match self.link.take() {
            Some(link) => {
                info!(old = %link.server(), new = %server, "switching server");
                // The old link finishes flushing on its own.
                drop(link.release(&self.settings.quit_message));
                true
            }
            None => false,
        };
        self.server = Some(server.to_string());
        if was_connected {
            self.connect()?;
        }
        Ok(())
    }

    /// Change the nickname, renaming live if connected.
    pub fn set_nick(&mut self, nick: &str) {
        self.nick = Some(nick.to_string());
        if let Some(link) = &self.link {
            link.send(Message::nick(nick));
        }
    }

    /// Track `channel` and join it if the link is registered. Returns false
    /// if the channel was already tracked.
    ///
    /// A link that has not registered yet joins every tracked channel on
    /// registration, so nothing is sent early.
    pub fn join(&mut self, channel: &str) -> bool {
        if !self.channels.insert(channel) {
            return false;
        }
        if let Some(link) = self.link.as_ref().filter(|l| l.is_registered()) {
            link.send(Message::join(channel));
        }
        true
    }

    /// Register response lines under `topic`.
    pub fn set_lines(&mut self, topic: &str, lines: Vec<String>) -> Result<usize, ResponseError> {
        let count = self.responses.load(topic, lines)?;
        info!(topic = %topic.to_lowercase(), lines = count, "responses loaded");
        Ok(count)
    }

    /// Send `text` to `channel`; the bot must currently be in it.
    pub fn speak(&mut self, channel: &str, text: &str) -> Result<(), SessionError> {
        match &self.link {
            Some(link) if link.is_joined(channel) => {
                link.send(Message::privmsg(channel, text));
                Ok(())
            }
            _ => Err(SessionError::NotInChannel),
        }
    }

    /// Quit and release the link. Returns the task handle so the caller can
    /// wait for the QUIT to flush; `None` if already disconnected.
    pub fn disconnect(&mut self) -> Option<JoinHandle<()>> {
        let link = self.link.take()?;
        info!(server = %link.server(), "disconnecting");
        Some(link.release(&self.settings.quit_message))
    }

    /// Apply one link event. Fatal events disconnect and return the error.
    pub fn handle_event(&mut self, event: LinkEvent) -> Result<(), SessionError> {
        let Some(link) = self.link.as_mut() else {
            debug!(generation = event.generation, "event with no live link");
            return Ok(());
        };
        if link.generation() != event.generation {
            debug!(
                generation = event.generation,
                current = link.generation(),
                "ignoring event from retired link"
            );
            return Ok(());
        }
        link.observe(&event.kind);

        match event.kind {
            LinkEventKind::Registered { nick } => {
                if self.channels.is_empty() {
                    info!(nick = %nick, "registered with no channels to join");
                } else {
                    info!(nick = %nick, channels = self.channels.len(), "registered");
                }
                for channel in self.channels.iter() {
                    link.send(Message::join(channel));
                }
            }
            LinkEventKind::Joined { channel } => info!(channel = %channel, "joined"),
            LinkEventKind::Parted { channel } => info!(channel = %channel, "parted"),
            LinkEventKind::Kicked { channel } => warn!(channel = %channel, "kicked"),
            LinkEventKind::NickChanged { nick } => info!(nick = %nick, "nickname changed"),
            LinkEventKind::ChannelMessage {
                channel,
                sender,
                text,
            } => {
                if !link.is_joined(&channel) {
                    debug!(channel = %channel, "message for a channel we are not in");
                    return Ok(());
                }
                let Some(nick) = self.nick.as_deref() else {
                    return Ok(());
                };
                debug!(channel = %channel, sender = %sender, "channel message");
                let mut ctx = Context {
                    channel: &channel,
                    responses: &self.responses,
                    rng: &mut self.rng,
                    dice: &self.settings.dice,
                };
                for reply in self.registry.dispatch(&mut ctx, nick, &text) {
                    link.send(Message::privmsg(channel.as_str(), reply));
                }
            }
            LinkEventKind::ProtocolError(detail) => {
                self.link = None;
                return Err(SessionError::Protocol(detail));
            }
            LinkEventKind::NetworkError(detail) => {
                self.link = None;
                return Err(SessionError::Network(detail));
            }
        }
        Ok(())
    }
}
