//! Selection monitor
//!
//! Decides whether a host selection should produce a popup. Only words and
//! short phrases are explained; repeated triggers for the same text within the
//! debounce window (mouse-up followed by double-click) are ignored.

use std::sync::OnceLock;

use regex::Regex;
use tokio::time::Instant;

use crate::shared::settings::SelectionSettings;
use crate::shared::types::{RawSelection, Rect};

static BOUNDARY_PUNCTUATION: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTrigger {
    PointerUp,
    DoubleClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    NoSelection,
    Empty,
    TooLong { words: usize, chars: usize },
    NoAnchor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Accepted { query: String, anchor: Rect },
    Dismiss(DismissReason),
    /// Duplicate trigger; leave the current popup alone.
    Ignored,
}

/// Last accepted selection, kept only for de-duplication.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRecord {
    pub normalized_text: String,
    pub accepted_at: Instant,
}

/// Trim whitespace, then strip leading and trailing non-word characters.
pub fn normalize(text: &str) -> String {
    let re = BOUNDARY_PUNCTUATION.get_or_init(|| Regex::new(r"^[\W_]+|[\W_]+$").unwrap());
    re.replace_all(text.trim(), "").into_owned()
}

/// Bounding rect of the selection, or its first client rect when the bounding
/// rect is zero-sized.
pub fn anchor_rect(selection: &RawSelection) -> Option<Rect> {
    match selection.bounding_rect {
        Some(rect) if !rect.is_degenerate() => Some(rect),
        bounding => selection.client_rects.first().copied().or(bounding),
    }
}

/// Host seam for reading the current selection on demand.
pub trait SelectionReader {
    fn read_selection(&self) -> Option<RawSelection>;
}

/// Plain text treated as a selection anchored at the viewport origin.
#[derive(Debug, Clone)]
pub struct TextSelection(pub String);

impl SelectionReader for TextSelection {
    fn read_selection(&self) -> Option<RawSelection> {
        Some(RawSelection::new(self.0.clone(), Rect::new(0.0, 0.0, 1.0, 1.0)))
    }
}

pub struct SelectionMonitor {
    settings: SelectionSettings,
    last: Option<SelectionRecord>,
}

impl SelectionMonitor {
    pub fn new(settings: SelectionSettings) -> Self {
        Self { settings, last: None }
    }

    pub fn last_selection(&self) -> Option<&SelectionRecord> {
        self.last.as_ref()
    }

    pub fn evaluate(&mut self, selection: Option<&RawSelection>, now: Instant) -> SelectionOutcome {
        let Some(selection) = selection.filter(|s| !s.collapsed && !s.text.is_empty()) else {
            return SelectionOutcome::Dismiss(DismissReason::NoSelection);
        };

        let query = normalize(&selection.text);
        let words = query.split_whitespace().count();
        if words == 0 {
            return SelectionOutcome::Dismiss(DismissReason::Empty);
        }

        let chars = query.chars().count();
        if words > self.settings.max_words || chars > self.settings.max_chars {
            tracing::debug!(words, chars, "selection too long to explain");
            return SelectionOutcome::Dismiss(DismissReason::TooLong { words, chars });
        }

        if let Some(last) = &self.last {
            if last.normalized_text == query && now.duration_since(last.accepted_at) < self.settings.debounce() {
                return SelectionOutcome::Ignored;
            }
        }

        self.last = Some(SelectionRecord {
            normalized_text: query.clone(),
            accepted_at: now,
        });

        match anchor_rect(selection) {
            Some(anchor) => SelectionOutcome::Accepted { query, anchor },
            None => SelectionOutcome::Dismiss(DismissReason::NoAnchor),
        }
    }

    pub fn evaluate_from(&mut self, reader: &dyn SelectionReader, now: Instant) -> SelectionOutcome {
        let selection = reader.read_selection();
        self.evaluate(selection.as_ref(), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn rect() -> Rect {
        Rect::new(100.0, 200.0, 60.0, 18.0)
    }

    fn monitor() -> SelectionMonitor {
        SelectionMonitor::new(SelectionSettings::default())
    }

    #[test]
    fn test_normalize_strips_boundary_punctuation() {
        assert_eq!(normalize("  Quantum!! "), "Quantum");
        assert_eq!(normalize("\"(hello, world)\""), "hello, world");
        assert_eq!(normalize("__init__"), "init");
        assert_eq!(normalize("café."), "café");
        assert_eq!(normalize("?!..."), "");
    }

    #[test]
    fn test_quantum_scenario_is_accepted() {
        let outcome = monitor().evaluate(Some(&RawSelection::new("  Quantum!! ", rect())), Instant::now());
        assert_eq!(
            outcome,
            SelectionOutcome::Accepted { query: "Quantum".to_string(), anchor: rect() }
        );
    }

    #[test]
    fn test_four_words_accepted_five_rejected() {
        let mut monitor = monitor();
        let now = Instant::now();

        let four = monitor.evaluate(Some(&RawSelection::new("the quick brown fox", rect())), now);
        assert!(matches!(four, SelectionOutcome::Accepted { .. }));

        let five = monitor.evaluate(Some(&RawSelection::new("the quick brown fox jumps", rect())), now);
        assert_eq!(five, SelectionOutcome::Dismiss(DismissReason::TooLong { words: 5, chars: 25 }));
    }

    #[test]
    fn test_long_single_word_rejected() {
        let word = "a".repeat(61);
        let outcome = monitor().evaluate(Some(&RawSelection::new(word, rect())), Instant::now());
        assert!(matches!(outcome, SelectionOutcome::Dismiss(DismissReason::TooLong { words: 1, chars: 61 })));
    }

    #[test]
    fn test_missing_or_collapsed_selection_dismisses() {
        let mut monitor = monitor();
        let now = Instant::now();
        assert_eq!(monitor.evaluate(None, now), SelectionOutcome::Dismiss(DismissReason::NoSelection));

        let mut collapsed = RawSelection::new("word", rect());
        collapsed.collapsed = true;
        assert_eq!(monitor.evaluate(Some(&collapsed), now), SelectionOutcome::Dismiss(DismissReason::NoSelection));

        let punctuation = RawSelection::new(" -- ", rect());
        assert_eq!(monitor.evaluate(Some(&punctuation), now), SelectionOutcome::Dismiss(DismissReason::Empty));
    }

    #[test]
    fn test_repeat_within_debounce_is_ignored() {
        let mut monitor = monitor();
        let start = Instant::now();
        let selection = RawSelection::new("Quantum", rect());

        assert!(matches!(monitor.evaluate(Some(&selection), start), SelectionOutcome::Accepted { .. }));
        assert_eq!(
            monitor.evaluate(Some(&selection), start + Duration::from_millis(100)),
            SelectionOutcome::Ignored
        );
        assert!(matches!(
            monitor.evaluate(Some(&selection), start + Duration::from_millis(600)),
            SelectionOutcome::Accepted { .. }
        ));
    }

    #[test]
    fn test_different_text_within_debounce_is_accepted() {
        let mut monitor = monitor();
        let start = Instant::now();
        monitor.evaluate(Some(&RawSelection::new("Quantum", rect())), start);

        let outcome = monitor.evaluate(Some(&RawSelection::new("Photon", rect())), start + Duration::from_millis(50));
        assert!(matches!(outcome, SelectionOutcome::Accepted { .. }));
        assert_eq!(monitor.last_selection().unwrap().normalized_text, "Photon");
    }

    #[test]
    fn test_degenerate_rect_uses_first_client_rect() {
        let client = Rect::new(10.0, 20.0, 30.0, 12.0);
        let selection = RawSelection {
            text: "word".to_string(),
            collapsed: false,
            bounding_rect: Some(Rect::default()),
            client_rects: vec![client, rect()],
        };
        assert_eq!(anchor_rect(&selection), Some(client));
    }

    #[test]
    fn test_text_selection_reader() {
        let outcome = monitor().evaluate_from(&TextSelection("(Photosynthesis)".to_string()), Instant::now());
        assert!(matches!(outcome, SelectionOutcome::Accepted { ref query, .. } if query == "Photosynthesis"));
    }

    #[test]
    fn test_no_rect_dismisses() {
        let selection = RawSelection {
            text: "word".to_string(),
            collapsed: false,
            bounding_rect: None,
            client_rects: Vec::new(),
        };
        let outcome = monitor().evaluate(Some(&selection), Instant::now());
        assert_eq!(outcome, SelectionOutcome::Dismiss(DismissReason::NoAnchor));
    }
}
