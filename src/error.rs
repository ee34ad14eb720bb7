//! Unified error handling for supportbot.
//!
//! Configuration mistakes are reported to the operator and leave the session
//! untouched. Transport failures are fatal: the process prints them and exits.

use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Session Errors (operator commands and transport events)
// ============================================================================

/// Errors raised by the session state machine.
///
/// The `Display` text of the configuration variants is exactly what the
/// operator console prints.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Info not set.")]
    InfoNotSet,

    #[error("Already connected.")]
    AlreadyConnected,

    #[error("Not in channel.")]
    NotInChannel,

    /// Server-reported protocol failure (`ERROR`, unparseable traffic).
    #[error("{0}")]
    Protocol(String),

    /// Socket-level failure (refused, reset, closed by peer).
    #[error("{0}")]
    Network(String),
}

impl SessionError {
    /// Whether the error must terminate the process.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::Network(_))
    }

    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InfoNotSet => "info_not_set",
            Self::AlreadyConnected => "already_connected",
            Self::NotInChannel => "not_in_channel",
            Self::Protocol(_) => "protocol_error",
            Self::Network(_) => "network_error",
        }
    }
}

// ============================================================================
// Response Source Errors (set-lines)
// ============================================================================

/// Failures loading a canned-response file.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no lines")]
    Empty { path: PathBuf },
}

// ============================================================================
// Dice Errors (never surfaced, logged at debug)
// ============================================================================

/// Why a dice token was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollError {
    #[error("expected <count>d<faces>")]
    NotDiceNotation,

    #[error("bad die count")]
    BadCount,

    #[error("more than one '+' modifier")]
    TooManyModifiers,

    #[error("bad face count")]
    BadFaces,

    #[error("bad offset")]
    BadOffset,

    #[error("{requested} dice exceeds the limit of {limit}")]
    TooManyDice { requested: u32, limit: u32 },

    #[error("roll range overflows")]
    RangeOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_wording_matches_operator_messages() {
        assert_eq!(SessionError::InfoNotSet.to_string(), "Info not set.");
        assert_eq!(SessionError::NotInChannel.to_string(), "Not in channel.");
        assert_eq!(SessionError::AlreadyConnected.to_string(), "Already connected.");
    }

    #[test]
    fn only_transport_errors_are_fatal() {
        assert!(SessionError::Network("connection refused".into()).is_fatal());
        assert!(SessionError::Protocol("Closing link".into()).is_fatal());
        assert!(!SessionError::InfoNotSet.is_fatal());
        assert!(!SessionError::NotInChannel.is_fatal());
        assert_eq!(SessionError::Network(String::new()).error_code(), "network_error");
    }
}
