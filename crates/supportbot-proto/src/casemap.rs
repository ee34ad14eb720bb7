//! RFC 1459 case mapping.
//!
//! Servers compare nicknames and channel names case-insensitively, with
//! `[]\~` treated as the uppercase forms of `{}|^`. Membership tracking on the
//! client side has to use the same rule or a server echoing `#Dice` for a
//! `JOIN #dice` would look like a different channel.

/// Lowercase a single character under RFC 1459 rules.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Lowercase a string under RFC 1459 rules.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Case-insensitive comparison under RFC 1459 rules.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.chars()
            .zip(b.chars())
            .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}
