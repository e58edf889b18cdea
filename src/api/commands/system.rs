//! System integration command module
//!
//! Host lifecycle events and the JSON message protocol.

use crate::api::{AppState, CommandResult};
use crate::core::host::{self, HostReply, InstallReason};

/// Liveness check through the regular message path.
pub fn ping() -> HostReply {
    host::handle_message(r#"{"type":"ping"}"#)
}

/// Answer a raw JSON message from the host.
pub fn handle_host_message(raw: &str) -> HostReply {
    host::handle_message(raw)
}

pub fn install(state: &AppState, reason: InstallReason) -> CommandResult<()> {
    host::on_installed(reason, &state.prefs);
    Ok(())
}
