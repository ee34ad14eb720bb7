//! Message source (`:nick!user@host` or `:server.name`).

use std::fmt;

use crate::error::MessageParseError;

/// Origin of a message.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server name (e.g. "irc.example.net").
    ServerName(String),
    /// User prefix: (nickname, username, hostname). Missing parts are empty.
    Nickname(String, String, String),
}

impl Prefix {
    /// Lenient parse: anything with a dot before `!`/`@` is a server name.
    pub fn new_from_str(s: &str) -> Self {
        let (before_at, host) = match s.split_once('@') {
            Some((left, host)) => (left, host),
            None => (s, ""),
        };
        let (name, user) = match before_at.split_once('!') {
            Some((name, user)) => (name, user),
            None => (before_at, ""),
        };

        if user.is_empty() && host.is_empty() && name.contains('.') {
            Prefix::ServerName(name.to_owned())
        } else {
            Prefix::Nickname(name.to_owned(), user.to_owned(), host.to_owned())
        }
    }

    /// Parse with validation: non-empty, no spaces or control characters.
    pub fn try_from_str(s: &str) -> Result<Self, MessageParseError> {
        if s.is_empty() || s.chars().any(|c| c == ' ' || c.is_control()) {
            return Err(MessageParseError::InvalidPrefix(s.to_owned()));
        }
        Ok(Self::new_from_str(s))
    }

    /// The nickname, if this is a user prefix.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(name, user, host) => {
                f.write_str(name)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}
