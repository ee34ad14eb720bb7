//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use supportbot_proto::ChannelExt;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("identity.nick must be non-empty and contain no spaces")]
    InvalidNick,
    #[error("identity.server must be non-empty and contain no spaces")]
    InvalidServer,
    #[error("identity.channels: '{0}' is not a channel name")]
    InvalidChannel(String),
    #[error("identity.channels: '{0}' is listed twice")]
    DuplicateChannel(String),
    #[error("transport.{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("dice.separator must be a single non-digit character, got '{0}'")]
    InvalidSeparator(String),
}

fn is_word(value: &str) -> bool {
    !value.is_empty() && !value.contains(char::is_whitespace)
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let identity = &config.identity;
    if identity.nick.as_deref().is_some_and(|n| !is_word(n)) {
        errors.push(ValidationError::InvalidNick);
    }
    if identity.server.as_deref().is_some_and(|s| !is_word(s)) {
        errors.push(ValidationError::InvalidServer);
    }

    let mut seen: Vec<&str> = Vec::with_capacity(identity.channels.len());
    for channel in &identity.channels {
        if !channel.is_channel_name() {
            errors.push(ValidationError::InvalidChannel(channel.clone()));
        } else if seen.contains(&channel.as_str()) {
            errors.push(ValidationError::DuplicateChannel(channel.clone()));
        } else {
            seen.push(channel);
        }
    }

    let transport = &config.transport;
    for (name, value) in [
        ("event_queue", transport.event_queue),
        ("send_queue", transport.send_queue),
        ("max_line_len", transport.max_line_len),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroLimit(name));
        }
    }

    let mut sep = config.dice.separator.chars();
    match (sep.next(), sep.next()) {
        (Some(c), None) if !c.is_ascii_digit() => {}
        _ => errors.push(ValidationError::InvalidSeparator(config.dice.separator.clone())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
