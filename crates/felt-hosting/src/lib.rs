//! WebSocket hosting for feltd: command bridge, broadcast fan-out, and
//! the static table directory.
//!
//! ## Data flow
//!
//! client frame → session lookup → identity resolution → [`Casino`]
//! dispatch → room task → engine events → fan-out to every viewer of that
//! table, snapshots sanitized per viewer.
//!
//! ## Modules
//!
//! - [`Directory`] catalog — the fixed tables created at boot
//! - [`Command`] / [`Message`] — the wire protocol
//! - [`TableView`] — per-viewer sanitized snapshots (the single
//!   choke point private cards pass through)
//! - [`Casino`] — room registry, bridge dispatch, broadcast fan-out
//! - [`server`] — actix HTTP/WS listener
mod bridge;
mod casino;
mod command;
mod directory;
mod message;
mod server;
mod snapshot;

pub use bridge::*;
pub use casino::*;
pub use command::*;
pub use directory::*;
pub use message::*;
pub use server::*;
pub use snapshot::*;
