//! supportbot: a single-session IRC channel bot.
//!
//! The bot keeps one connection to one server, joins a list of channels and
//! answers `roll` and `tell` commands addressed to it by name. An operator
//! drives it from a line-oriented console.

pub mod config;
pub mod console;
pub mod dice;
pub mod error;
pub mod handlers;
pub mod network;
pub mod responses;
pub mod state;
pub mod telemetry;
