//! Extension host
//!
//! Lifecycle and messaging for the process that embeds the explainer:
//! first-install seeding of preferences and a small JSON request protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::prefs::PreferenceStore;
use crate::shared::{AppError, AppResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallReason {
    Install,
    Update,
}

/// Reply sent back for every host message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HostRequest {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
}

pub fn on_installed(reason: InstallReason, prefs: &PreferenceStore) {
    match reason {
        InstallReason::Install => {
            prefs.seed_defaults();
            tracing::info!(version = VERSION, "Quick Explain installed, default preferences stored");
        }
        InstallReason::Update => {
            tracing::info!(version = VERSION, "Quick Explain updated");
        }
    }
}

/// Handle a raw JSON message. Never fails; errors become failure replies.
pub fn handle_message(raw: &str) -> HostReply {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => handle_value(&value),
        Err(e) => {
            let error = AppError::from(e);
            tracing::warn!(error = %error, "malformed host message");
            HostReply::failure(error.to_string())
        }
    }
}

pub fn handle_value(value: &Value) -> HostReply {
    match dispatch(value) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "host message handler failed");
            HostReply::failure(e.to_string())
        }
    }
}

fn dispatch(value: &Value) -> AppResult<HostReply> {
    if !value.is_object() {
        return Err(AppError::Validation("Message must be a JSON object".to_string()));
    }

    let request = HostRequest::deserialize(value)?;
    match request.kind.as_ref().and_then(Value::as_str) {
        Some("ping") => Ok(HostReply::with_message("pong")),
        kind => {
            tracing::debug!(?kind, "unhandled host message type");
            Ok(HostReply::ok())
        }
    }
}
