//! Command modules
//!
//! - `explain`: one-shot explanation of a piece of text
//! - `preferences`: read and update the stored source/tone/theme
//! - `session`: long-running explain session over JSON lines
//! - `settings`: application settings persistence
//! - `system`: host lifecycle and liveness messages

pub mod explain;
pub mod preferences;
pub mod session;
pub mod settings;
pub mod system;
