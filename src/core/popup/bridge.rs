//! JSON-lines surface for hosts running in another process.
//!
//! Every surface call becomes one [`SurfaceCommand`] line on the writer; the
//! host renders it and reports user input back as `HostEvent` lines.

use std::io::Write;

use serde::Serialize;

use super::surface::{PopupSurface, SurfaceId};
use super::view::{theme_toggle_label, PopupView, SettingsView};
use crate::shared::types::{Point, Size, Theme, Viewport};
use crate::shared::AppResult;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", content = "payload")]
pub enum SurfaceCommand<'a> {
    #[serde(rename = "popup://mount")]
    Mount { id: SurfaceId, view: &'a PopupView },

    #[serde(rename = "popup://place")]
    Place { id: SurfaceId, position: Point },

    #[serde(rename = "popup://theme")]
    ApplyTheme {
        id: SurfaceId,
        theme: Theme,
        toggle_label: &'static str,
    },

    #[serde(rename = "popup://unmount")]
    Unmount { id: SurfaceId },

    #[serde(rename = "settings://mount")]
    MountSettings { id: SurfaceId, view: &'a SettingsView },

    #[serde(rename = "settings://unmount")]
    UnmountSettings { id: SurfaceId },
}

/// Writes surface commands as JSON lines. The host does not report rendered
/// sizes back, so placement uses a fixed popup size.
pub struct BridgeSurface<W: Write> {
    out: W,
    next_id: u64,
    popup_size: Size,
    viewport: Viewport,
    prefers_dark: bool,
}

impl<W: Write> BridgeSurface<W> {
    pub fn new(out: W, viewport: Viewport, popup_size: Size, prefers_dark: bool) -> Self {
        Self {
            out,
            next_id: 0,
            popup_size,
            viewport,
            prefers_dark,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn send(&mut self, command: &SurfaceCommand<'_>) -> AppResult<()> {
        serde_json::to_writer(&mut self.out, command)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    fn send_or_warn(&mut self, command: &SurfaceCommand<'_>) {
        if let Err(e) = self.send(command) {
            tracing::warn!(error = %e, ?command, "failed to write surface command");
        }
    }
}

impl<W: Write> PopupSurface for BridgeSurface<W> {
    fn mount(&mut self, view: &PopupView) -> AppResult<(SurfaceId, Size)> {
        let id = SurfaceId(self.next_id + 1);
        self.send(&SurfaceCommand::Mount { id, view })?;
        self.next_id = id.0;
        Ok((id, self.popup_size))
    }

    fn place(&mut self, id: SurfaceId, position: Point) {
        self.send_or_warn(&SurfaceCommand::Place { id, position });
    }

    fn apply_theme(&mut self, id: SurfaceId, theme: Theme) {
        self.send_or_warn(&SurfaceCommand::ApplyTheme {
            id,
            theme,
            toggle_label: theme_toggle_label(theme),
        });
    }

    fn unmount(&mut self, id: SurfaceId) {
        self.send_or_warn(&SurfaceCommand::Unmount { id });
    }

    fn mount_settings(&mut self, id: SurfaceId, view: &SettingsView) -> AppResult<()> {
        tracing::debug!(
            surface = id.0,
            source = ?view.selected_source(),
            tone = ?view.selected_tone(),
            "mounting settings panel"
        );
        self.send(&SurfaceCommand::MountSettings { id, view })
    }

    fn unmount_settings(&mut self, id: SurfaceId) {
        self.send_or_warn(&SurfaceCommand::UnmountSettings { id });
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }
}
