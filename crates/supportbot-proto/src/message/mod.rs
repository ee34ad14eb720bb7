//! Owned IRC messages.

mod nom_parser;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

use nom_parser::ParsedMessage;

/// A parsed IRC message: optional source plus a command.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    /// Message prefix/source (e.g. `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Build a message from raw components.
    pub fn new(
        prefix: Option<&str>,
        command: &str,
        args: Vec<&str>,
    ) -> Result<Message, MessageParseError> {
        let prefix = prefix.map(Prefix::try_from_str).transpose()?;
        Ok(Message {
            prefix,
            command: Command::new(command, args)?,
        })
    }

    /// Nickname of the sender, if the prefix names a user.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// `PRIVMSG <target> :<text>`
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// `JOIN <channel>`
    pub fn join(channel: impl Into<String>) -> Self {
        Command::JOIN(channel.into()).into()
    }

    /// `NICK <nickname>`
    pub fn nick(nickname: impl Into<String>) -> Self {
        Command::NICK(nickname.into()).into()
    }

    /// `QUIT :<reason>`
    pub fn quit(reason: impl Into<String>) -> Self {
        Command::QUIT(Some(reason.into())).into()
    }

    /// `PONG <token>`
    pub fn pong(token: impl Into<String>) -> Self {
        Command::PONG(token.into(), None).into()
    }

    /// Attach a source prefix.
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        if s.trim_end_matches(['\r', '\n']).is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        let parsed = ParsedMessage::parse(s)
            .map_err(|position| invalid(MessageParseError::ParseContext { position }))?;

        Message::new(parsed.prefix, parsed.command, parsed.params.to_vec()).map_err(invalid)
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}\r\n", self.command)
    }
}
