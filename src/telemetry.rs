//! Tracing setup and standardized spans.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured filter. Output goes to stderr so the
/// operator console on stdout stays readable.
pub fn init(config_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Standardized span constructors for bot observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span covering one server connection.
    pub fn link(server: &str, generation: u64) -> Span {
        info_span!("link", server = %server, generation)
    }

    /// Span covering one in-channel command.
    pub fn command(name: &str, channel: &str) -> Span {
        info_span!("command", name = %name, channel = %channel)
    }
}
