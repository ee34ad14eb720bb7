//! Core configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::validation::{ValidationError, validate};

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "supportbot.toml";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Initial identity and channel set.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Response files, quit reason, RNG seed.
    #[serde(default)]
    pub bot: BotConfig,
    /// Dice limits and result formatting.
    #[serde(default)]
    pub dice: DiceConfig,
    /// Queue sizes and connection timing.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Log filtering.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Resolve the config source: an explicit path, else [`DEFAULT_CONFIG_PATH`]
    /// if it exists, else built-in defaults.
    pub fn discover(explicit: Option<&str>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(PathBuf::from(path))));
        }
        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.is_file() {
            return Ok((Self::load(fallback)?, Some(fallback.to_path_buf())));
        }
        Ok((Self::default(), None))
    }
}

/// Identity the operator would otherwise type at the console.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    pub nick: Option<String>,
    /// `host[:port]`.
    pub server: Option<String>,
    /// USER ident; the nickname when absent.
    pub username: Option<String>,
    /// GECOS; the nickname when absent.
    pub realname: Option<String>,
    /// Joined in order once registered.
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Directory `set-lines` reads `<name>.txt` from (default: ".").
    #[serde(default = "default_lines_dir")]
    pub lines_dir: PathBuf,
    /// QUIT reason (default: "Shutting down.").
    #[serde(default = "default_quit_message")]
    pub quit_message: String,
    /// Fixed RNG seed for reproducible rolls; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            lines_dir: default_lines_dir(),
            quit_message: default_quit_message(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiceConfig {
    /// Tokens asking for more dice than this are dropped (default: no limit).
    #[serde(default = "default_max_count")]
    pub max_count: u32,
    /// Digit-group separator (default: ',').
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl DiceConfig {
    /// The separator as a single char. Validation guarantees exactly one.
    pub fn separator_char(&self) -> char {
        self.separator.chars().next().unwrap_or(',')
    }
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            separator: default_separator(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Link events buffered toward the session (default: 256).
    #[serde(default = "default_queue")]
    pub event_queue: usize,
    /// Outbound messages buffered toward the socket (default: 256).
    #[serde(default = "default_queue")]
    pub send_queue: usize,
    /// Longest inbound line accepted, in bytes (default: 8191).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// How long `exit` waits for the QUIT to flush (default: 2000ms).
    #[serde(default = "default_quit_grace_ms")]
    pub quit_grace_ms: u64,
}

impl TransportConfig {
    pub fn quit_grace(&self) -> Duration {
        Duration::from_millis(self.quit_grace_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            event_queue: default_queue(),
            send_queue: default_queue(),
            max_line_len: default_max_line_len(),
            quit_grace_ms: default_quit_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "warn").
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_lines_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_quit_message() -> String {
    "Shutting down.".to_string()
}

fn default_max_count() -> u32 {
    u32::MAX
}

fn default_separator() -> String {
    ",".to_string()
}

fn default_queue() -> usize {
    256
}

fn default_max_line_len() -> usize {
    supportbot_proto::MAX_IRC_LINE_LEN
}

fn default_quit_grace_ms() -> u64 {
    2000
}

fn default_filter() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.identity.nick.is_none());
        assert!(config.identity.channels.is_empty());
        assert_eq!(config.bot.quit_message, "Shutting down.");
        assert_eq!(config.bot.lines_dir, PathBuf::from("."));
        assert_eq!(config.dice.max_count, u32::MAX);
        assert_eq!(config.dice.separator_char(), ',');
        assert_eq!(config.transport.event_queue, 256);
        assert_eq!(config.transport.max_line_len, 8191);
        assert_eq!(config.transport.quit_grace(), Duration::from_secs(2));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn full_file_parses() {
        let config = Config::from_toml(
            r##"
[identity]
nick = "Bot"
server = "irc.example.net:6697"
channels = ["#test", "#dice"]

[bot]
lines_dir = "lines"
seed = 7

[dice]
separator = "."
"##,
        )
        .unwrap();
        assert_eq!(config.identity.nick.as_deref(), Some("Bot"));
        assert_eq!(config.identity.channels, vec!["#test", "#dice"]);
        assert_eq!(config.bot.seed, Some(7));
        assert_eq!(config.bot.lines_dir, PathBuf::from("lines"));
        assert_eq!(config.dice.separator_char(), '.');
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("[bot]\nsede = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.toml");
        std::fs::write(&path, "[identity]\nnick = \"Bot\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.identity.nick.as_deref(), Some("Bot"));

        let missing = Config::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
