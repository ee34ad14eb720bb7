//! `tell <topic>`: a random canned line for the topic.

use tracing::debug;

use super::{Context, Handler};

pub struct TellHandler;

impl Handler for TellHandler {
    fn handle(&self, ctx: &mut Context<'_>, args: &str) -> Vec<String> {
        match ctx.responses.pick(args, ctx.rng) {
            Some(line) => vec![line.to_string()],
            None => {
                debug!(topic = %args, "no responses loaded for topic");
                Vec::new()
            }
        }
    }
}
