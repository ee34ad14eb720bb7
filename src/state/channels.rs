//! Insertion-ordered channel set.

use supportbot_proto::irc_eq;

/// Channels the bot should be in once connected, in the order they were added.
///
/// Names compare case-insensitively, so `#Test` and `#test` are one entry.
#[derive(Debug, Clone, Default)]
pub struct ChannelSet {
    channels: Vec<String>,
}

impl ChannelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `channel`. Returns false if it was already tracked.
    pub fn insert(&mut self, channel: &str) -> bool {
        if self.contains(channel) {
            return false;
        }
        self.channels.push(channel.to_string());
        true
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| irc_eq(c, channel))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
