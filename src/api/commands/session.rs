//! Bridge session command module
//!
//! Runs a full explain session for a host on the other end of a pipe: host
//! events come in as JSON lines and surface commands go out as JSON lines.
//! The session ends when the input reaches EOF.

use std::io::Write;
use std::sync::Arc;

use tokio::io::AsyncBufRead;

use crate::api::{AppState, CommandResult};
use crate::core::popup::BridgeSurface;
use crate::core::session::{driver, ExplainSession};
use crate::shared::emit::HostEventBus;
use crate::shared::AppError;

pub async fn run_bridge_session<R, W>(
    state: &AppState,
    input: R,
    surface: BridgeSurface<W>,
) -> CommandResult<ExplainSession<BridgeSurface<W>>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: Write,
{
    let bus = HostEventBus::new();
    let events = bus.subscribe();
    let session = ExplainSession::new(surface, Arc::clone(&state.prefs), &state.settings);

    let reader = tokio::spawn(bus.forward_json_lines(input));
    let session = driver::run(session, events, Arc::clone(&state.router)).await;

    let forwarded = reader
        .await
        .map_err(|e| AppError::Host(format!("event reader stopped: {}", e)))??;
    tracing::info!(events = forwarded, "bridge session finished");

    Ok(session)
}
