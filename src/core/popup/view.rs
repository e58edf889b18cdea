use serde::Serialize;

use crate::shared::types::{PopupContent, Preferences, SourceId, Theme, ToneId};

/// Class names the host stylesheet targets.
pub mod class {
    pub const POPUP: &str = "quick-explain-popup";
    pub const SOURCE_HEADER: &str = "quick-explain-source-header";
    pub const SOURCE_LABEL: &str = "quick-explain-source-label";
    pub const TONE_LABEL: &str = "quick-explain-tone-label";
    pub const CONTENT: &str = "quick-explain-content";
    pub const CONTROLS: &str = "quick-explain-controls";
    pub const READ_MORE: &str = "quick-explain-readmore";
    pub const THEME_TOGGLE: &str = "quick-explain-theme-toggle";
    pub const SETTINGS: &str = "quick-explain-settings";
    pub const CLOSE: &str = "quick-explain-close";
    pub const SETTINGS_PANEL: &str = "quick-explain-settings-panel";
    pub const SETTINGS_TITLE: &str = "quick-explain-settings-title";
    pub const SETTINGS_ACTIONS: &str = "quick-explain-settings-actions";
    /// Added to the popup root when the dark theme is active.
    pub const DARK: &str = "dark";
}

pub const LOADING_TEXT: &str = "Loading…";
pub const READ_MORE_TEXT: &str = "Read more";
pub const SETTINGS_TITLE: &str = "Quick Explain Settings";
const FALLBACK_HREF: &str = "#";

/// Label on the toggle button; it names the theme a click switches to.
pub fn theme_toggle_label(effective: Theme) -> &'static str {
    match effective {
        Theme::Dark => "☀️ Light",
        _ => "🌙 Dark",
    }
}

pub fn source_icon(source: SourceId) -> &'static str {
    match source {
        SourceId::Auto => "fa-solid fa-wand-magic-sparkles",
        SourceId::Wikipedia => "fa-brands fa-wikipedia-w",
        SourceId::Wikidata => "fa-solid fa-database",
        SourceId::Dbpedia => "fa-solid fa-link",
        SourceId::Dictionary => "fa-solid fa-book",
        SourceId::Wiktionary => "fa-solid fa-language",
        SourceId::Openlibrary => "fa-solid fa-book-open",
        SourceId::Trivia => "fa-solid fa-lightbulb",
    }
}

/// Everything a surface needs to render the popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupView {
    pub aria_label: String,
    pub source_label: String,
    pub source_icon: String,
    pub tone_label: String,
    pub body: String,
    pub read_more_href: String,
    pub theme_toggle_label: String,
    pub theme: Theme,
}

impl PopupView {
    /// `theme` must already be resolved against the system preference.
    pub fn build(content: &PopupContent, prefs: &Preferences, theme: Theme) -> Self {
        let aria_label = if content.title.is_empty() {
            "Quick explanation".to_string()
        } else {
            format!("Quick explanation: {}", content.title)
        };

        Self {
            aria_label,
            source_label: prefs.source.label().to_string(),
            source_icon: source_icon(prefs.source).to_string(),
            tone_label: prefs.tone.label().to_string(),
            body: content.text.clone(),
            read_more_href: content
                .url
                .clone()
                .unwrap_or_else(|| FALLBACK_HREF.to_string()),
            theme_toggle_label: theme_toggle_label(theme).to_string(),
            theme,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsOption {
    pub value: String,
    pub label: String,
    pub description: String,
    pub selected: bool,
}

/// Source and tone pickers shown inside the popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsView {
    pub title: String,
    pub sources: Vec<SettingsOption>,
    pub tones: Vec<SettingsOption>,
}

impl SettingsView {
    pub fn build(prefs: &Preferences) -> Self {
        let sources = SourceId::ALL
            .iter()
            .map(|source| SettingsOption {
                value: source.as_str().to_string(),
                label: source.label().to_string(),
                description: source.description().to_string(),
                selected: *source == prefs.source,
            })
            .collect();

        let tones = ToneId::ALL
            .iter()
            .map(|tone| SettingsOption {
                value: tone.as_str().to_string(),
                label: tone.label().to_string(),
                description: tone.description().to_string(),
                selected: *tone == prefs.tone,
            })
            .collect();

        Self {
            title: SETTINGS_TITLE.to_string(),
            sources,
            tones,
        }
    }

    pub fn selected_source(&self) -> Option<&str> {
        self.sources.iter().find(|o| o.selected).map(|o| o.value.as_str())
    }

    pub fn selected_tone(&self) -> Option<&str> {
        self.tones.iter().find(|o| o.selected).map(|o| o.value.as_str())
    }
}
