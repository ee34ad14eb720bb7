//! Session state management.
//!
//! A single [`Session`] behind one mutex holds identity, channels, responses
//! and the live link. Operator commands and link events both take that lock
//! for their whole body, so configuration changes never interleave with
//! command dispatch.

mod channels;
mod session;

pub use channels::ChannelSet;
pub use session::{Session, SessionState};

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::SessionError;
use crate::network::LinkEvent;

/// The session as shared between the console and the event loop.
pub type SharedSession = Arc<Mutex<Session>>;

/// Feed link events into the session until one of them is fatal.
///
/// The lock is taken per event and never held across the receive.
pub async fn run_events(
    session: SharedSession,
    mut events: mpsc::Receiver<LinkEvent>,
) -> Result<(), SessionError> {
    while let Some(event) = events.recv().await {
        session.lock().handle_event(event)?;
    }
    Ok(())
}
