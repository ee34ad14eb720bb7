//! In-channel command routing.
//!
//! A channel message is a command when it starts with the bot's nickname and
//! a single space, followed by a keyword, another space, and arguments:
//! `Bot roll 2d6+1`. Handlers are pure: they receive a [`Context`] and return
//! the lines to send back to the channel.

mod roll;
mod tell;

pub use roll::RollHandler;
pub use tell::TellHandler;

use std::collections::HashMap;

use rand::rngs::StdRng;
use tracing::debug;

use crate::config::DiceConfig;
use crate::responses::ResponseStore;
use crate::telemetry::spans;

/// A message addressed to the bot, split into keyword and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressed<'a> {
    /// Lowercased command keyword.
    pub keyword: String,
    pub args: &'a str,
}

/// Recognize `<nick> <keyword> <args>`.
///
/// Returns `None` for messages not addressed to `nick`, and for addressed
/// messages with no space after the keyword.
pub fn parse_addressed<'a>(nick: &str, text: &'a str) -> Option<Addressed<'a>> {
    if nick.is_empty() {
        return None;
    }
    let rest = text.strip_prefix(nick)?.strip_prefix(' ')?;
    let (keyword, args) = rest.split_once(' ')?;
    Some(Addressed {
        keyword: keyword.to_lowercase(),
        args,
    })
}

/// Borrowed session state handed to a handler for one invocation.
pub struct Context<'a> {
    pub channel: &'a str,
    pub responses: &'a ResponseStore,
    pub rng: &'a mut StdRng,
    pub dice: &'a DiceConfig,
}

/// An in-channel command.
pub trait Handler: Send + Sync {
    /// Produce the reply lines for `args`, in sending order.
    fn handle(&self, ctx: &mut Context<'_>, args: &str) -> Vec<String>;
}

/// Keyword -> handler table, built once at startup.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a registry with the built-in handlers.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();
        handlers.insert("roll", Box::new(RollHandler));
        handlers.insert("tell", Box::new(TellHandler));
        Self { handlers }
    }

    /// Route a channel message. Returns the replies for `ctx.channel`;
    /// anything not addressed to `nick` or naming no known keyword yields none.
    pub fn dispatch(&self, ctx: &mut Context<'_>, nick: &str, text: &str) -> Vec<String> {
        let Some(addressed) = parse_addressed(nick, text) else {
            return Vec::new();
        };
        let Some(handler) = self.handlers.get(addressed.keyword.as_str()) else {
            debug!(keyword = %addressed.keyword, "unknown command keyword");
            return Vec::new();
        };

        let _span = spans::command(&addressed.keyword, ctx.channel).entered();
        let replies = handler.handle(ctx, addressed.args);
        debug!(replies = replies.len(), "command handled");
        replies
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
