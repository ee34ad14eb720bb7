//! Dice notation: `<count>d<faces>[+<offset>]`.
//!
//! Each die yields a value in `[offset, offset + faces)`. Without an explicit
//! modifier the offset is [`DEFAULT_OFFSET`], so a plain `1d6` rolls 1 to 6.

use rand::Rng;
use tracing::debug;

use crate::config::DiceConfig;
use crate::error::RollError;

/// Offset used when a token carries no `+<offset>`.
pub const DEFAULT_OFFSET: i64 = 1;

/// One parsed dice token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollSpec {
    pub count: u32,
    pub faces: u32,
    pub offset: i64,
}

impl RollSpec {
    /// Parse a single token, rejecting anything that asks for more than
    /// `max_count` dice.
    pub fn parse(token: &str, max_count: u32) -> Result<Self, RollError> {
        let mut parts = token.split('d');
        let (Some(count), Some(rest), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RollError::NotDiceNotation);
        };
        let count: u32 = count.parse().map_err(|_| RollError::BadCount)?;

        let mut mods = rest.split('+');
        let faces = mods.next().unwrap_or_default();
        let offset = mods.next();
        if mods.next().is_some() {
            return Err(RollError::TooManyModifiers);
        }

        let faces: u32 = faces.parse().map_err(|_| RollError::BadFaces)?;
        if faces == 0 {
            return Err(RollError::BadFaces);
        }
        let offset: i64 = match offset {
            Some(o) => o.parse().map_err(|_| RollError::BadOffset)?,
            None => DEFAULT_OFFSET,
        };

        if count > max_count {
            return Err(RollError::TooManyDice {
                requested: count,
                limit: max_count,
            });
        }
        offset
            .checked_add(i64::from(faces))
            .ok_or(RollError::RangeOverflow)?;

        Ok(Self {
            count,
            faces,
            offset,
        })
    }

    /// Exclusive upper bound of a single die.
    fn upper(&self) -> i64 {
        // Checked in `parse`.
        self.offset.saturating_add(i64::from(self.faces))
    }

    /// Roll every die.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<i64> {
        let upper = self.upper();
        (0..self.count)
            .map(|_| rng.gen_range(self.offset..upper))
            .collect()
    }
}

/// Format an integer with digit grouping, e.g. `-1,234,567`.
pub fn format_grouped(value: i64, separator: char) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Evaluate every token in `args`, producing one reply line per valid token.
///
/// Malformed tokens are skipped without affecting their neighbours. A token
/// rolling zero dice produces nothing since an empty line cannot be sent.
pub fn evaluate<R: Rng + ?Sized>(args: &str, rng: &mut R, settings: &DiceConfig) -> Vec<String> {
    let separator = settings.separator_char();
    let mut replies = Vec::new();

    for token in args.split_whitespace() {
        let spec = match RollSpec::parse(token, settings.max_count) {
            Ok(spec) => spec,
            Err(e) => {
                debug!(token = %token, error = %e, "skipping dice token");
                continue;
            }
        };
        if spec.count == 0 {
            debug!(token = %token, "zero dice requested");
            continue;
        }
        let line = spec
            .roll(rng)
            .into_iter()
            .map(|v| format_grouped(v, separator))
            .collect::<Vec<_>>()
            .join(" ");
        replies.push(line);
    }

    replies
}
