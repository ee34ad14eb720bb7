//! Channel name checks (RFC 2812 section 1.3).

/// Maximum channel name length, prefix included.
pub const MAX_CHANNEL_LEN: usize = 50;

/// Extension trait for checking if a string is a valid IRC channel name.
pub trait ChannelExt {
    /// Valid names start with `#`, `&`, `+` or `!`, are at most
    /// [`MAX_CHANNEL_LEN`] characters, and contain no space, comma or
    /// control characters.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();
        if !matches!(chars.next(), Some('#' | '&' | '+' | '!')) {
            return false;
        }
        if self.chars().count() > MAX_CHANNEL_LEN {
            return false;
        }
        chars.all(|c| c != ' ' && c != ',' && !c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
