use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::AppError;

/// Reference provider selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Auto,
    Wikipedia,
    Wikidata,
    Dbpedia,
    Dictionary,
    Wiktionary,
    Openlibrary,
    Trivia,
}

impl SourceId {
    pub const ALL: [SourceId; 8] = [
        SourceId::Auto,
        SourceId::Wikipedia,
        SourceId::Wikidata,
        SourceId::Dbpedia,
        SourceId::Dictionary,
        SourceId::Wiktionary,
        SourceId::Openlibrary,
        SourceId::Trivia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Auto => "auto",
            SourceId::Wikipedia => "wikipedia",
            SourceId::Wikidata => "wikidata",
            SourceId::Dbpedia => "dbpedia",
            SourceId::Dictionary => "dictionary",
            SourceId::Wiktionary => "wiktionary",
            SourceId::Openlibrary => "openlibrary",
            SourceId::Trivia => "trivia",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceId::Auto => "Auto (Recommended)",
            SourceId::Wikipedia => "Wikipedia — Overview",
            SourceId::Wikidata => "Wikidata — Key Facts",
            SourceId::Dbpedia => "DBpedia — Context",
            SourceId::Dictionary => "Dictionary — Meaning",
            SourceId::Wiktionary => "Wiktionary — Language",
            SourceId::Openlibrary => "Open Library — Books",
            SourceId::Trivia => "Numbers & Trivia",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SourceId::Auto => "Choose the best source automatically.",
            SourceId::Wikipedia => "Concise summaries for general topics.",
            SourceId::Wikidata => "Structured facts and relationships.",
            SourceId::Dbpedia => "Structured abstracts from linked data.",
            SourceId::Dictionary => "Definitions and usage.",
            SourceId::Wiktionary => "Definitions plus etymology.",
            SourceId::Openlibrary => "Books and authors context.",
            SourceId::Trivia => "Quick, surprising facts.",
        }
    }
}

impl Default for SourceId {
    fn default() -> Self {
        SourceId::Auto
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown source: {}", s)))
    }
}

/// Cosmetic phrasing preference shown in the popup header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneId {
    Friendly,
    Academic,
    Poweruser,
}

impl ToneId {
    pub const ALL: [ToneId; 3] = [ToneId::Friendly, ToneId::Academic, ToneId::Poweruser];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToneId::Friendly => "friendly",
            ToneId::Academic => "academic",
            ToneId::Poweruser => "poweruser",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToneId::Friendly => "More Friendly",
            ToneId::Academic => "More Academic",
            ToneId::Poweruser => "Power-User / Advanced",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToneId::Friendly => "Conversational and approachable tone.",
            ToneId::Academic => "Formal and precise language.",
            ToneId::Poweruser => "Technical and detailed explanations.",
        }
    }
}

impl Default for ToneId {
    fn default() -> Self {
        ToneId::Friendly
    }
}

impl fmt::Display for ToneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToneId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToneId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown tone: {}", s)))
    }
}

/// Popup color scheme. `Auto` follows the host's dark-mode preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }

    /// Resolve `Auto` against the host preference; the result is never `Auto`.
    pub fn effective(&self, prefers_dark: bool) -> Theme {
        match self {
            Theme::Auto if prefers_dark => Theme::Dark,
            Theme::Auto => Theme::Light,
            other => *other,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Auto
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            _ => Err(AppError::Validation(format!("Unknown theme: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub source: SourceId,
    pub tone: ToneId,
    pub theme: Theme,
}

/// How a source produced its explanation. Not part of the wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationOutcome {
    Found,
    NotFound,
    Failed,
}

/// Normalized result of any source fetch. `extract` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub extract: String,
    pub url: Option<String>,
    pub title: String,
    #[serde(skip, default = "default_outcome")]
    pub outcome: ExplanationOutcome,
}

fn default_outcome() -> ExplanationOutcome {
    ExplanationOutcome::Found
}

impl Explanation {
    pub fn found(extract: impl Into<String>, url: Option<String>, title: impl Into<String>) -> Self {
        Self::with_outcome(ExplanationOutcome::Found, extract, url, title)
    }

    pub fn not_found(extract: impl Into<String>, url: Option<String>, title: impl Into<String>) -> Self {
        Self::with_outcome(ExplanationOutcome::NotFound, extract, url, title)
    }

    pub fn failed(extract: impl Into<String>, url: Option<String>, title: impl Into<String>) -> Self {
        Self::with_outcome(ExplanationOutcome::Failed, extract, url, title)
    }

    fn with_outcome(
        outcome: ExplanationOutcome,
        extract: impl Into<String>,
        url: Option<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            extract: extract.into(),
            url,
            title: title.into(),
            outcome,
        }
    }

    pub fn is_found(&self) -> bool {
        self.outcome == ExplanationOutcome::Found
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Selection as reported by the host before any validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSelection {
    pub text: String,
    pub collapsed: bool,
    pub bounding_rect: Option<Rect>,
    #[serde(default)]
    pub client_rects: Vec<Rect>,
}

impl RawSelection {
    pub fn new(text: impl Into<String>, bounding_rect: Rect) -> Self {
        Self {
            text: text.into(),
            collapsed: false,
            bounding_rect: Some(bounding_rect),
            client_rects: Vec::new(),
        }
    }
}

/// Content handed to the popup presenter.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub text: String,
    pub title: String,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ids_round_trip_through_strings() {
        for id in SourceId::ALL {
            assert_eq!(id.as_str().parse::<SourceId>().unwrap(), id);
        }
        assert!("bing".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_auto_theme_follows_host() {
        assert_eq!(Theme::Auto.effective(true), Theme::Dark);
        assert_eq!(Theme::Auto.effective(false), Theme::Light);
        assert_eq!(Theme::Light.effective(true), Theme::Light);
    }

    #[test]
    fn test_explanation_wire_shape_omits_outcome() {
        let explanation = Explanation::not_found("No Wikipedia article found.", None, "Foo");
        let value = serde_json::to_value(&explanation).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "extract": "No Wikipedia article found.", "url": null, "title": "Foo" })
        );
    }

    #[test]
    fn test_degenerate_rect() {
        assert!(Rect::default().is_degenerate());
        assert!(!Rect::new(0.0, 0.0, 0.0, 14.0).is_degenerate());
    }
}
