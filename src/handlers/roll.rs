//! `roll <dice>...`: one reply per valid dice token.

use super::{Context, Handler};
use crate::dice;

pub struct RollHandler;

impl Handler for RollHandler {
    fn handle(&self, ctx: &mut Context<'_>, args: &str) -> Vec<String> {
        dice::evaluate(args, ctx.rng, ctx.dice)
    }
}
