//! # supportbot-proto
//!
//! The client side of the IRC protocol, as much of it as a channel bot needs:
//! parsing and serializing messages, a line codec for tokio, and a framed TCP
//! transport.
//!
//! ```rust
//! use supportbot_proto::{Command, Message};
//!
//! let msg: Message = ":alice!a@host PRIVMSG #dice :Bot roll 2d6".parse().unwrap();
//! assert_eq!(msg.source_nickname(), Some("alice"));
//! assert!(matches!(msg.command, Command::PRIVMSG(ref t, _) if t == "#dice"));
//!
//! let reply = Message::privmsg("#dice", "3 5");
//! assert_eq!(reply.to_string(), "PRIVMSG #dice :3 5\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod chan;
pub mod command;
pub mod error;
pub mod irc;
pub mod line;
pub mod message;
pub mod prefix;
pub mod response;
pub mod transport;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::chan::ChannelExt;
pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::irc::IrcCodec;
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::prefix::Prefix;
pub use self::response::Response;
pub use self::transport::{Transport, TransportReadError, MAX_IRC_LINE_LEN};
