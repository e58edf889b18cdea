//! Explain session
//!
//! Controller that ties a selection monitor, a popup presenter and the
//! preference store together. It never performs I/O itself: an accepted
//! selection yields a [`FetchRequest`] and the caller reports the result back
//! with the same tag. Results for anything but the current tag are dropped.

pub mod driver;

use std::sync::Arc;

use tokio::time::Instant;

use super::popup::{PopupPresenter, PopupSurface};
use super::prefs::PreferenceStore;
use super::selection::{SelectionMonitor, SelectionOutcome, SelectionTrigger};
use crate::shared::events::HostEvent;
use crate::shared::settings::AppSettings;
use crate::shared::types::{Explanation, PopupContent, RawSelection, Rect, SourceId, ToneId};

pub const ERROR_TEXT: &str = "Error loading information.";

/// Identifies one fetch; strictly increasing per session.
pub type FetchTag = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub tag: FetchTag,
    pub source: SourceId,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub tag: FetchTag,
    pub explanation: Explanation,
}

#[derive(Debug)]
struct PendingFetch {
    tag: FetchTag,
    query: String,
    anchor: Rect,
}

pub struct ExplainSession<U: PopupSurface> {
    presenter: PopupPresenter<U>,
    monitor: SelectionMonitor,
    prefs: Arc<PreferenceStore>,
    last_tag: FetchTag,
    pending: Option<PendingFetch>,
}

impl<U: PopupSurface> ExplainSession<U> {
    pub fn new(surface: U, prefs: Arc<PreferenceStore>, settings: &AppSettings) -> Self {
        Self {
            presenter: PopupPresenter::new(surface, settings.popup.clone()),
            monitor: SelectionMonitor::new(settings.selection.clone()),
            prefs,
            last_tag: 0,
            pending: None,
        }
    }

    pub fn presenter(&self) -> &PopupPresenter<U> {
        &self.presenter
    }

    pub fn prefs(&self) -> &PreferenceStore {
        &self.prefs
    }

    /// Tag of the fetch the popup is waiting for, if any.
    pub fn current_tag(&self) -> Option<FetchTag> {
        self.pending.as_ref().map(|p| p.tag)
    }

    pub fn auto_hide_deadline(&self) -> Option<Instant> {
        self.presenter.deadline()
    }

    pub fn on_selection(
        &mut self,
        trigger: SelectionTrigger,
        selection: Option<&RawSelection>,
        now: Instant,
    ) -> Option<FetchRequest> {
        match self.monitor.evaluate(selection, now) {
            SelectionOutcome::Ignored => {
                tracing::trace!(?trigger, "duplicate selection ignored");
                None
            }
            SelectionOutcome::Dismiss(reason) => {
                tracing::trace!(?trigger, ?reason, "selection dismissed");
                self.close();
                None
            }
            SelectionOutcome::Accepted { query, anchor } => {
                self.last_tag += 1;
                let tag = self.last_tag;
                let prefs = self.prefs.snapshot();

                if let Err(e) = self.presenter.show_loading(anchor, &query, &prefs, now) {
                    tracing::warn!(error = %e, "failed to show loading popup");
                }

                tracing::debug!(?trigger, tag, query = %query, source = %prefs.source, "selection accepted");
                self.pending = Some(PendingFetch {
                    tag,
                    query: query.clone(),
                    anchor,
                });

                Some(FetchRequest {
                    tag,
                    source: prefs.source,
                    query,
                })
            }
        }
    }

    /// Render a finished fetch. Returns `false` when the response was stale.
    pub fn complete_fetch(&mut self, response: FetchResponse, now: Instant) -> bool {
        let Some(pending) = self.take_pending(response.tag) else {
            return false;
        };

        let content = PopupContent {
            text: response.explanation.extract,
            title: response.explanation.title,
            url: response.explanation.url,
        };
        self.render(pending.anchor, content, now);
        true
    }

    /// Render the generic error for a fetch that never produced a result.
    pub fn fail_fetch(&mut self, tag: FetchTag, now: Instant) -> bool {
        let Some(pending) = self.take_pending(tag) else {
            return false;
        };

        let content = PopupContent {
            text: ERROR_TEXT.to_string(),
            title: pending.query,
            url: None,
        };
        self.render(pending.anchor, content, now);
        true
    }

    pub fn on_click(&mut self, inside_popup: bool, now: Instant) {
        if inside_popup {
            return;
        }
        if self.presenter.outside_click(now) {
            self.pending = None;
        }
    }

    pub fn on_key(&mut self, key: &str) {
        if key == "Escape" {
            self.close();
        }
    }

    pub fn on_scroll(&mut self) {
        self.close();
    }

    pub fn on_resize(&mut self) {
        self.close();
    }

    pub fn on_auto_hide(&mut self, now: Instant) {
        if self.presenter.expire(now) {
            tracing::debug!("popup auto-hidden");
            self.pending = None;
        }
    }

    /// Dismiss the popup and forget any in-flight fetch.
    pub fn close(&mut self) {
        self.presenter.dismiss();
        self.pending = None;
    }

    pub fn open_settings(&mut self, now: Instant) {
        let prefs = self.prefs.snapshot();
        if let Err(e) = self.presenter.open_settings(&prefs, now) {
            tracing::warn!(error = %e, "failed to open settings panel");
        }
    }

    pub fn save_settings(&mut self, source: SourceId, tone: ToneId, now: Instant) {
        self.prefs.set_source(source);
        self.prefs.set_tone(tone);
        tracing::info!(%source, %tone, "preferences saved");

        let prefs = self.prefs.snapshot();
        if let Err(e) = self.presenter.save_settings(&prefs, now) {
            tracing::warn!(error = %e, "failed to re-render popup after saving settings");
        }
    }

    pub fn cancel_settings(&mut self, now: Instant) {
        self.presenter.cancel_settings(now);
    }

    pub fn toggle_theme(&mut self) {
        if let Some(theme) = self.presenter.toggle_theme() {
            self.prefs.set_theme(theme);
            tracing::debug!(%theme, "theme toggled");
        }
    }

    /// Route one host event. Returns a fetch to start, if the event produced one.
    pub fn dispatch(&mut self, event: HostEvent, now: Instant) -> Option<FetchRequest> {
        match event {
            HostEvent::PointerUp { inside_popup: true, .. } | HostEvent::DoubleClick { inside_popup: true, .. } => None,
            HostEvent::PointerUp { selection, .. } => {
                self.on_selection(SelectionTrigger::PointerUp, selection.as_ref(), now)
            }
            HostEvent::DoubleClick { selection, .. } => {
                self.on_selection(SelectionTrigger::DoubleClick, selection.as_ref(), now)
            }
            HostEvent::Click { inside_popup } => {
                self.on_click(inside_popup, now);
                None
            }
            HostEvent::KeyDown { key } => {
                self.on_key(&key);
                None
            }
            HostEvent::Scroll => {
                self.on_scroll();
                None
            }
            HostEvent::Resize => {
                self.on_resize();
                None
            }
            HostEvent::CloseClicked => {
                self.close();
                None
            }
            HostEvent::ThemeToggleClicked => {
                self.toggle_theme();
                None
            }
            HostEvent::SettingsClicked => {
                self.open_settings(now);
                None
            }
            HostEvent::SettingsSaved { source, tone } => {
                self.save_settings(source, tone, now);
                None
            }
            HostEvent::SettingsCancelled => {
                self.cancel_settings(now);
                None
            }
        }
    }

    fn take_pending(&mut self, tag: FetchTag) -> Option<PendingFetch> {
        if self.current_tag() == Some(tag) {
            return self.pending.take();
        }

        tracing::debug!(tag, current = ?self.current_tag(), "discarding stale fetch result");
        None
    }

    fn render(&mut self, anchor: Rect, content: PopupContent, now: Instant) {
        let prefs = self.prefs.snapshot();
        if let Err(e) = self.presenter.show(anchor, content, &prefs, now) {
            tracing::warn!(error = %e, "failed to render explanation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::popup::surface::recording::RecordingSurface;
    use crate::shared::types::Theme;
    use std::time::Duration;

    fn session() -> (ExplainSession<RecordingSurface>, RecordingSurface) {
        let surface = RecordingSurface::new();
        let prefs = Arc::new(PreferenceStore::in_memory());
        (ExplainSession::new(surface.clone(), prefs, &AppSettings::default()), surface)
    }

    fn selection(text: &str) -> RawSelection {
        RawSelection::new(text, Rect::new(100.0, 200.0, 60.0, 18.0))
    }

    fn response(tag: FetchTag, extract: &str) -> FetchResponse {
        FetchResponse {
            tag,
            explanation: Explanation::found(extract, Some("https://example.org".to_string()), "Quantum"),
        }
    }

    #[test]
    fn test_selection_shows_loading_and_requests_fetch() {
        let (mut session, surface) = session();
        let request = session
            .on_selection(SelectionTrigger::PointerUp, Some(&selection("  Quantum!! ")), Instant::now())
            .unwrap();

        assert_eq!(request, FetchRequest { tag: 1, source: SourceId::Auto, query: "Quantum".to_string() });
        assert_eq!(surface.body().as_deref(), Some("Loading…"));
        assert_eq!(surface.view().unwrap().aria_label, "Quick explanation: Quantum");
    }

    #[test]
    fn test_complete_fetch_renders_result() {
        let (mut session, surface) = session();
        let now = Instant::now();
        let request = session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), now).unwrap();

        assert!(session.complete_fetch(response(request.tag, "A discrete unit."), now));
        let view = surface.view().unwrap();
        assert_eq!(view.body, "A discrete unit.");
        assert_eq!(view.read_more_href, "https://example.org");
        assert_eq!(session.current_tag(), None);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let (mut session, surface) = session();
        let now = Instant::now();
        let first = session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), now).unwrap();
        let second = session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Photon")), now).unwrap();
        assert!(second.tag > first.tag);

        assert!(!session.complete_fetch(response(first.tag, "old"), now));
        assert_eq!(surface.body().as_deref(), Some("Loading…"));

        assert!(session.complete_fetch(response(second.tag, "new"), now));
        assert_eq!(surface.body().as_deref(), Some("new"));
    }

    #[test]
    fn test_response_after_dismissal_is_dropped() {
        let (mut session, surface) = session();
        let now = Instant::now();
        let request = session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), now).unwrap();

        session.on_key("Escape");
        assert!(surface.log().popup.is_none());
        assert!(!session.complete_fetch(response(request.tag, "late"), now));
        assert!(surface.log().popup.is_none());
    }

    #[test]
    fn test_fail_fetch_renders_error() {
        let (mut session, surface) = session();
        let now = Instant::now();
        let request = session.on_selection(SelectionTrigger::DoubleClick, Some(&selection("Quantum")), now).unwrap();

        assert!(session.fail_fetch(request.tag, now));
        let view = surface.view().unwrap();
        assert_eq!(view.body, "Error loading information.");
        assert_eq!(view.read_more_href, "#");
    }

    #[test]
    fn test_invalid_selection_dismisses_popup() {
        let (mut session, surface) = session();
        let now = Instant::now();
        session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), now);

        let long = selection("one two three four five");
        assert!(session.on_selection(SelectionTrigger::PointerUp, Some(&long), now).is_none());
        assert!(surface.log().popup.is_none());
        assert_eq!(session.current_tag(), None);
    }

    #[test]
    fn test_duplicate_trigger_keeps_popup() {
        let (mut session, surface) = session();
        let now = Instant::now();
        session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), now);

        let again = session.on_selection(
            SelectionTrigger::DoubleClick,
            Some(&selection("Quantum")),
            now + Duration::from_millis(50),
        );
        assert!(again.is_none());
        assert_eq!(surface.log().mounts, 1);
        assert_eq!(session.current_tag(), Some(1));
    }

    #[test]
    fn test_dismissal_events() {
        let (mut session, surface) = session();
        let now = Instant::now();

        let cases = [
            ("Quantum", HostEvent::Scroll),
            ("Photon", HostEvent::Resize),
            ("Boson", HostEvent::CloseClicked),
            ("Lepton", HostEvent::KeyDown { key: "Escape".to_string() }),
        ];

        for (text, event) in cases {
            let request = session.dispatch(
                HostEvent::PointerUp { selection: Some(selection(text)), inside_popup: false },
                now,
            );
            assert!(request.is_some());
            assert!(surface.log().popup.is_some());
            assert!(session.auto_hide_deadline().is_some());

            session.dispatch(event, now);
            assert!(surface.log().popup.is_none());
            assert_eq!(session.auto_hide_deadline(), None);
            assert_eq!(session.current_tag(), None);
        }
    }

    #[test]
    fn test_pointer_up_inside_popup_is_ignored() {
        let (mut session, surface) = session();
        let request = session.dispatch(
            HostEvent::PointerUp { selection: Some(selection("Quantum")), inside_popup: true },
            Instant::now(),
        );
        assert!(request.is_none());
        assert_eq!(surface.log().mounts, 0);
    }

    #[test]
    fn test_outside_click_respects_grace_window() {
        let (mut session, surface) = session();
        let now = Instant::now();
        session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), now);

        session.on_click(false, now + Duration::from_millis(50));
        assert!(surface.log().popup.is_some());
        session.on_click(true, now + Duration::from_secs(1));
        assert!(surface.log().popup.is_some());
        session.on_click(false, now + Duration::from_secs(1));
        assert!(surface.log().popup.is_none());
    }

    #[test]
    fn test_auto_hide() {
        let (mut session, surface) = session();
        let now = Instant::now();
        session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), now);
        assert_eq!(session.auto_hide_deadline(), Some(now + Duration::from_secs(8)));

        session.on_auto_hide(now + Duration::from_secs(8));
        assert!(surface.log().popup.is_none());
        assert_eq!(session.auto_hide_deadline(), None);
    }

    #[test]
    fn test_save_settings_persists_and_rerenders() {
        let (mut session, surface) = session();
        let now = Instant::now();
        let request = session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), now).unwrap();
        session.complete_fetch(response(request.tag, "A discrete unit."), now);

        session.open_settings(now);
        assert_eq!(session.auto_hide_deadline(), None);
        assert!(surface.log().settings.is_some());

        session.save_settings(SourceId::Wiktionary, ToneId::Poweruser, now);
        assert_eq!(session.prefs().source(), SourceId::Wiktionary);
        assert_eq!(session.prefs().tone(), ToneId::Poweruser);

        let view = surface.view().unwrap();
        assert_eq!(view.source_label, "Wiktionary — Language");
        assert_eq!(view.tone_label, "Power-User / Advanced");
        assert_eq!(view.body, "A discrete unit.");
        assert!(surface.log().settings.is_none());
        assert!(session.auto_hide_deadline().is_some());
    }

    #[test]
    fn test_cancel_settings_resumes_timer() {
        let (mut session, surface) = session();
        let now = Instant::now();
        session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), now);
        session.open_settings(now);

        let later = now + Duration::from_secs(2);
        session.cancel_settings(later);
        assert!(surface.log().popup.is_some());
        assert!(surface.log().settings.is_none());
        assert_eq!(session.auto_hide_deadline(), Some(later + Duration::from_secs(8)));
        assert_eq!(session.prefs().source(), SourceId::Auto);
    }

    #[test]
    fn test_toggle_theme_persists() {
        let (mut session, surface) = session();
        session.on_selection(SelectionTrigger::PointerUp, Some(&selection("Quantum")), Instant::now());

        session.toggle_theme();
        assert_eq!(session.prefs().theme(), Theme::Dark);
        assert_eq!(surface.log().theme, Some(Theme::Dark));

        session.toggle_theme();
        assert_eq!(session.prefs().theme(), Theme::Light);
    }

    #[test]
    fn test_toggle_without_popup_does_nothing() {
        let (mut session, _surface) = session();
        session.toggle_theme();
        assert_eq!(session.prefs().theme(), Theme::Auto);
    }
}
