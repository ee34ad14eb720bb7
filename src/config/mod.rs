//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions and file loading
//! - [`validation`]: startup checks, all problems reported together

mod types;
mod validation;

pub use types::{
    BotConfig, Config, ConfigError, DEFAULT_CONFIG_PATH, DiceConfig, IdentityConfig,
    LoggingConfig, TransportConfig,
};
pub use validation::{ValidationError, validate};
