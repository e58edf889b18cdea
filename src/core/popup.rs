//! Popup presenter
//!
//! Owns at most one popup on a [`PopupSurface`]: loading placeholder, final
//! content, placement, auto-hide and the settings sub-panel. Timers are plain
//! deadlines; whoever drives the presenter calls [`PopupPresenter::expire`]
//! once the deadline passes.

pub mod bridge;
pub mod placement;
pub mod surface;
pub mod view;

use tokio::time::Instant;
use unicode_segmentation::UnicodeSegmentation;

pub use bridge::BridgeSurface;
pub use placement::calculate_popup_position;
pub use surface::{PopupSurface, SurfaceId};
pub use view::{PopupView, SettingsView};

use crate::shared::settings::PopupSettings;
use crate::shared::types::{PopupContent, Preferences, Rect, Theme};
use crate::shared::AppResult;

/// Cut `text` to `max` graphemes, trimming and appending an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    let mut graphemes = text.grapheme_indices(true);
    match graphemes.nth(max) {
        Some((cut, _)) => format!("{}…", text[..cut].trim()),
        None => text.to_string(),
    }
}

#[derive(Debug)]
struct ActivePopup {
    id: SurfaceId,
    anchor: Rect,
    content: PopupContent,
    theme: Theme,
    /// `None` while auto-hide is paused.
    deadline: Option<Instant>,
    ignore_clicks_until: Instant,
    settings_open: bool,
}

pub struct PopupPresenter<U: PopupSurface> {
    surface: U,
    settings: PopupSettings,
    active: Option<ActivePopup>,
}

impl<U: PopupSurface> PopupPresenter<U> {
    pub fn new(surface: U, settings: PopupSettings) -> Self {
        Self {
            surface,
            settings,
            active: None,
        }
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn settings_open(&self) -> bool {
        self.active.as_ref().is_some_and(|popup| popup.settings_open)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.active.as_ref().and_then(|popup| popup.deadline)
    }

    pub fn content(&self) -> Option<&PopupContent> {
        self.active.as_ref().map(|popup| &popup.content)
    }

    /// Replace any open popup with `content` anchored to `anchor`.
    pub fn show(&mut self, anchor: Rect, content: PopupContent, prefs: &Preferences, now: Instant) -> AppResult<()> {
        self.dismiss();

        let content = PopupContent {
            text: truncate(&content.text, self.settings.truncate_len),
            ..content
        };
        let theme = prefs.theme.effective(self.surface.prefers_dark());
        let view = PopupView::build(&content, prefs, theme);

        let (id, size) = self.surface.mount(&view)?;
        let position = calculate_popup_position(&anchor, size, self.surface.viewport(), self.settings.padding);
        self.surface.place(id, position);
        self.surface.apply_theme(id, theme);

        tracing::debug!(surface = id.0, title = %content.title, x = position.x, y = position.y, "popup shown");

        self.active = Some(ActivePopup {
            id,
            anchor,
            content,
            theme,
            deadline: Some(now + self.settings.auto_hide()),
            ignore_clicks_until: now + self.settings.click_grace(),
            settings_open: false,
        });
        Ok(())
    }

    pub fn show_loading(&mut self, anchor: Rect, query: &str, prefs: &Preferences, now: Instant) -> AppResult<()> {
        let content = PopupContent {
            text: view::LOADING_TEXT.to_string(),
            title: query.to_string(),
            url: None,
        };
        self.show(anchor, content, prefs, now)
    }

    /// Remove the popup and its settings panel. Returns whether one was open.
    pub fn dismiss(&mut self) -> bool {
        let Some(popup) = self.active.take() else {
            return false;
        };

        if popup.settings_open {
            self.surface.unmount_settings(popup.id);
        }
        self.surface.unmount(popup.id);
        tracing::debug!(surface = popup.id.0, "popup dismissed");
        true
    }

    /// Dismiss if the auto-hide deadline has passed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.dismiss(),
            _ => false,
        }
    }

    /// Click outside the popup. Ignored during the grace window; closes only the
    /// settings panel when it is open.
    pub fn outside_click(&mut self, now: Instant) -> bool {
        let Some(popup) = &self.active else {
            return false;
        };

        if now < popup.ignore_clicks_until {
            return false;
        }

        if popup.settings_open {
            self.cancel_settings(now);
            return false;
        }

        self.dismiss()
    }

    /// Open the settings panel and pause auto-hide.
    ///
    /// Auto-hide is only paused once the panel is mounted; a failed mount
    /// leaves the popup on a running timer.
    pub fn open_settings(&mut self, prefs: &Preferences, now: Instant) -> AppResult<()> {
        let auto_hide = self.settings.auto_hide();
        let Some(popup) = self.active.as_mut() else {
            return Ok(());
        };

        if popup.settings_open {
            self.surface.unmount_settings(popup.id);
            popup.settings_open = false;
        }

        if let Err(e) = self.surface.mount_settings(popup.id, &SettingsView::build(prefs)) {
            popup.deadline = popup.deadline.or(Some(now + auto_hide));
            return Err(e);
        }

        popup.settings_open = true;
        popup.deadline = None;
        Ok(())
    }

    /// Close the panel and re-render the current content with fresh labels.
    pub fn save_settings(&mut self, prefs: &Preferences, now: Instant) -> AppResult<()> {
        let Some(popup) = self.active.as_ref() else {
            return Ok(());
        };

        let anchor = popup.anchor;
        let content = popup.content.clone();
        self.show(anchor, content, prefs, now)
    }

    /// Close the panel only and resume auto-hide.
    pub fn cancel_settings(&mut self, now: Instant) {
        let auto_hide = self.settings.auto_hide();
        let Some(popup) = self.active.as_mut() else {
            return;
        };

        if popup.settings_open {
            self.surface.unmount_settings(popup.id);
            popup.settings_open = false;
        }
        popup.deadline = Some(now + auto_hide);
    }

    /// Flip the visible theme in place and return it so it can be persisted.
    pub fn toggle_theme(&mut self) -> Option<Theme> {
        let popup = self.active.as_mut()?;
        let next = match popup.theme {
            Theme::Dark => Theme::Light,
            _ => Theme::Dark,
        };

        self.surface.apply_theme(popup.id, next);
        popup.theme = next;
        Some(next)
    }
}
