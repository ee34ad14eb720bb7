//! Integration test common infrastructure.
//!
//! A scripted IRC server on loopback plus helpers for building a bot whose
//! event loop runs in the background.

pub mod server;

#[allow(unused_imports)]
pub use server::{MockServer, ServerConn};

use std::time::Duration;

use supportbot::config::Config;
use supportbot::error::SessionError;
use supportbot::state::{self, Session, SharedSession};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A session with its event loop spawned.
pub struct TestBot {
    pub session: SharedSession,
    pub events: JoinHandle<Result<(), SessionError>>,
}

impl TestBot {
    /// Build a bot from `config`.
    pub fn spawn(config: Config) -> Self {
        let (tx, rx) = mpsc::channel(config.transport.event_queue);
        let session = Session::new(&config, tx).into_shared();
        let events = tokio::spawn(state::run_events(session.clone(), rx));
        Self { session, events }
    }

    /// Bot named `nick` pointed at `server`, with a fixed seed.
    #[allow(dead_code)]
    pub fn for_server(nick: &str, server: &str) -> Self {
        Self::spawn(config_for(nick, server))
    }

    /// Wait for the event loop to stop and return its result.
    #[allow(dead_code)]
    pub async fn fatal_error(self) -> anyhow::Result<SessionError> {
        match tokio::time::timeout(Duration::from_secs(5), self.events).await?? {
            Ok(()) => anyhow::bail!("event loop ended without an error"),
            Err(e) => Ok(e),
        }
    }
}

/// Default configuration with an identity and a fixed seed.
pub fn config_for(nick: &str, server: &str) -> Config {
    let mut config = Config::default();
    config.identity.nick = Some(nick.to_string());
    config.identity.server = Some(server.to_string());
    config.bot.seed = Some(42);
    config.transport.quit_grace_ms = 500;
    config
}

/// Poll `cond` until it holds or a few seconds pass.
#[allow(dead_code)]
pub async fn wait_for<F>(mut cond: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..300 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
