//! Numeric replies the client reacts to.

#![allow(non_camel_case_types)]

use std::fmt;
use std::str::FromStr;

/// A three-digit server reply.
///
/// Only the handful of numerics the bot inspects get names; everything else
/// is carried as [`Response::Other`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Response {
    /// 001: registration complete.
    RPL_WELCOME,
    /// 376: end of MOTD.
    RPL_ENDOFMOTD,
    /// 403: no such channel.
    ERR_NOSUCHCHANNEL,
    /// 432: erroneous nickname.
    ERR_ERRONEUSNICKNAME,
    /// 433: nickname already in use.
    ERR_NICKNAMEINUSE,
    /// 442: not on that channel.
    ERR_NOTONCHANNEL,
    /// 473: invite-only channel.
    ERR_INVITEONLYCHAN,
    /// 474: banned from channel.
    ERR_BANNEDFROMCHAN,
    /// Any other numeric.
    Other(u16),
}

impl Response {
    /// The numeric code.
    pub fn code(&self) -> u16 {
        match self {
            Response::RPL_WELCOME => 1,
            Response::RPL_ENDOFMOTD => 376,
            Response::ERR_NOSUCHCHANNEL => 403,
            Response::ERR_ERRONEUSNICKNAME => 432,
            Response::ERR_NICKNAMEINUSE => 433,
            Response::ERR_NOTONCHANNEL => 442,
            Response::ERR_INVITEONLYCHAN => 473,
            Response::ERR_BANNEDFROMCHAN => 474,
            Response::Other(code) => *code,
        }
    }

    /// Map a code back to a response.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Response::RPL_WELCOME,
            376 => Response::RPL_ENDOFMOTD,
            403 => Response::ERR_NOSUCHCHANNEL,
            432 => Response::ERR_ERRONEUSNICKNAME,
            433 => Response::ERR_NICKNAMEINUSE,
            442 => Response::ERR_NOTONCHANNEL,
            473 => Response::ERR_INVITEONLYCHAN,
            474 => Response::ERR_BANNEDFROMCHAN,
            other => Response::Other(other),
        }
    }

    /// Whether the code is in the error range (400-599).
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl FromStr for Response {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }
        s.parse::<u16>().map(Response::from_code).map_err(|_| ())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}
