//! IRC commands a client sends or reacts to.

use std::fmt::{self, Write};

use crate::error::MessageParseError;
use crate::response::Response;

/// An IRC command with its parameters.
///
/// Anything the bot has no use for is kept as [`Command::Raw`] so it can still
/// be logged and re-serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Command {
    /// `NICK <nickname>`
    NICK(String),
    /// `USER <username> <mode> * :<realname>`
    USER(String, String, String),
    /// `JOIN <channel>`
    JOIN(String),
    /// `PART <channel> [:<reason>]`
    PART(String, Option<String>),
    /// `KICK <channel> <nick> [:<reason>]`
    KICK(String, String, Option<String>),
    /// `PRIVMSG <target> :<text>`
    PRIVMSG(String, String),
    /// `NOTICE <target> :<text>`
    NOTICE(String, String),
    /// `QUIT [:<reason>]`
    QUIT(Option<String>),
    /// `PING <token> [<server>]`
    PING(String, Option<String>),
    /// `PONG <token> [<server>]`
    PONG(String, Option<String>),
    /// `ERROR :<reason>`, sent by the server right before it closes the link.
    ERROR(String),
    /// A numeric reply.
    Response(Response, Vec<String>),
    /// Any other command, verbatim.
    Raw(String, Vec<String>),
}

impl Command {
    /// Build a command from its name and parameters.
    ///
    /// Known commands with an unexpected parameter count fall back to
    /// [`Command::Raw`] rather than failing.
    pub fn new(cmd: &str, args: Vec<&str>) -> Result<Command, MessageParseError> {
        if cmd.is_empty() {
            return Err(MessageParseError::InvalidCommand);
        }

        let owned = |i: usize| args[i].to_owned();
        let upper = cmd.to_ascii_uppercase();
        let command = match (upper.as_str(), args.len()) {
            ("NICK", 1) => Command::NICK(owned(0)),
            ("USER", 4) => Command::USER(owned(0), owned(1), owned(3)),
            ("JOIN", n) if n >= 1 => Command::JOIN(owned(0)),
            ("PART", 1) => Command::PART(owned(0), None),
            ("PART", 2) => Command::PART(owned(0), Some(owned(1))),
            ("KICK", 2) => Command::KICK(owned(0), owned(1), None),
            ("KICK", 3) => Command::KICK(owned(0), owned(1), Some(owned(2))),
            ("PRIVMSG", 2) => Command::PRIVMSG(owned(0), owned(1)),
            ("NOTICE", 2) => Command::NOTICE(owned(0), owned(1)),
            ("QUIT", 0) => Command::QUIT(None),
            ("QUIT", 1) => Command::QUIT(Some(owned(0))),
            ("PING", 1) => Command::PING(owned(0), None),
            ("PING", 2) => Command::PING(owned(0), Some(owned(1))),
            ("PONG", 1) => Command::PONG(owned(0), None),
            ("PONG", 2) => Command::PONG(owned(0), Some(owned(1))),
            ("ERROR", 1) => Command::ERROR(owned(0)),
            _ => match cmd.parse::<Response>() {
                Ok(resp) => {
                    Command::Response(resp, args.iter().map(|s| (*s).to_owned()).collect())
                }
                Err(()) => {
                    Command::Raw(cmd.to_owned(), args.iter().map(|s| (*s).to_owned()).collect())
                }
            },
        };
        Ok(command)
    }

    /// The command name as it appears on the wire.
    pub fn name(&self) -> String {
        match self {
            Command::NICK(..) => "NICK".into(),
            Command::USER(..) => "USER".into(),
            Command::JOIN(..) => "JOIN".into(),
            Command::PART(..) => "PART".into(),
            Command::KICK(..) => "KICK".into(),
            Command::PRIVMSG(..) => "PRIVMSG".into(),
            Command::NOTICE(..) => "NOTICE".into(),
            Command::QUIT(..) => "QUIT".into(),
            Command::PING(..) => "PING".into(),
            Command::PONG(..) => "PONG".into(),
            Command::ERROR(..) => "ERROR".into(),
            Command::Response(resp, _) => resp.to_string(),
            Command::Raw(name, _) => name.clone(),
        }
    }
}

/// Whether a final parameter has to be written in trailing (`:`) form.
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Write `CMD a b c`, colon-prefixing the last parameter only when required.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    for (i, arg) in args.iter().enumerate() {
        f.write_char(' ')?;
        if i + 1 == args.len() && needs_colon_prefix(arg) {
            f.write_char(':')?;
        }
        f.write_str(arg)?;
    }
    Ok(())
}

/// Write `CMD a b :c`, always putting the last parameter in trailing form.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    match args.split_last() {
        None => f.write_str(cmd),
        Some((last, init)) => {
            write_cmd(f, cmd, init)?;
            write!(f, " :{}", last)
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NICK(n) => write_cmd(f, "NICK", &[n]),
            Command::USER(u, m, r) => write_cmd_freeform(f, "USER", &[u, m, "*", r]),
            Command::JOIN(c) => write_cmd(f, "JOIN", &[c]),
            Command::PART(c, Some(r)) => write_cmd_freeform(f, "PART", &[c, r]),
            Command::PART(c, None) => write_cmd(f, "PART", &[c]),
            Command::KICK(c, n, Some(r)) => write_cmd_freeform(f, "KICK", &[c, n, r]),
            Command::KICK(c, n, None) => write_cmd(f, "KICK", &[c, n]),
            Command::PRIVMSG(t, m) => write_cmd_freeform(f, "PRIVMSG", &[t, m]),
            Command::NOTICE(t, m) => write_cmd_freeform(f, "NOTICE", &[t, m]),
            Command::QUIT(Some(r)) => write_cmd_freeform(f, "QUIT", &[r]),
            Command::QUIT(None) => write_cmd(f, "QUIT", &[]),
            Command::PING(s, Some(t)) => write_cmd(f, "PING", &[s, t]),
            Command::PING(s, None) => write_cmd(f, "PING", &[s]),
            Command::PONG(s, Some(t)) => write_cmd(f, "PONG", &[s, t]),
            Command::PONG(s, None) => write_cmd(f, "PONG", &[s]),
            Command::ERROR(r) => write_cmd_freeform(f, "ERROR", &[r]),
            Command::Response(resp, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, &resp.to_string(), &args)
            }
            Command::Raw(name, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, name, &args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_known_commands() {
        assert_eq!(
            Command::new("privmsg", vec!["#dice", "Bot roll 1d6"]).unwrap(),
            Command::PRIVMSG("#dice".into(), "Bot roll 1d6".into())
        );
        assert_eq!(
            Command::new("JOIN", vec!["#dice"]).unwrap(),
            Command::JOIN("#dice".into())
        );
        assert_eq!(
            Command::new("PING", vec!["irc.example.net"]).unwrap(),
            Command::PING("irc.example.net".into(), None)
        );
    }

    #[test]
    fn extended_join_keeps_channel() {
        let cmd = Command::new("JOIN", vec!["#dice", "account", "Real Name"]).unwrap();
        assert_eq!(cmd, Command::JOIN("#dice".into()));
    }

    #[test]
    fn numerics_become_responses() {
        let cmd = Command::new("001", vec!["Bot", "Welcome"]).unwrap();
        assert_eq!(
            cmd,
            Command::Response(Response::RPL_WELCOME, vec!["Bot".into(), "Welcome".into()])
        );
    }

    #[test]
    fn wrong_arity_falls_back_to_raw() {
        let cmd = Command::new("PRIVMSG", vec!["#dice"]).unwrap();
        assert_eq!(cmd, Command::Raw("PRIVMSG".into(), vec!["#dice".into()]));
        assert!(Command::new("", vec![]).is_err());
    }

    #[test]
    fn serializes_trailing_params() {
        assert_eq!(
            Command::PRIVMSG("#dice".into(), "hi".into()).to_string(),
            "PRIVMSG #dice :hi"
        );
        assert_eq!(
            Command::QUIT(Some("Shutting down.".into())).to_string(),
            "QUIT :Shutting down."
        );
        assert_eq!(
            Command::USER("bot".into(), "0".into(), "Support Bot".into()).to_string(),
            "USER bot 0 * :Support Bot"
        );
        assert_eq!(Command::NICK("Bot".into()).to_string(), "NICK Bot");
        assert_eq!(
            Command::PONG(":odd".into(), None).to_string(),
            "PONG ::odd"
        );
    }
}
