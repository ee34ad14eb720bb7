//! Network module.
//!
//! One [`Link`] per live server connection. The link task owns the socket;
//! the session owns the [`Link`] handle and talks to the task through queues.

mod link;

pub use link::{Link, LinkEvent, LinkEventKind, LinkSettings, server_endpoint};
