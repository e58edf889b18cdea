//! Preference command module
//!
//! Reads and updates the stored source, tone and theme.

use serde::Deserialize;

use crate::api::{AppState, CommandResult};
use crate::shared::types::{Preferences, SourceId, Theme, ToneId};

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub source: Option<SourceId>,
    pub tone: Option<ToneId>,
    pub theme: Option<Theme>,
}

impl PreferencesUpdate {
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.tone.is_none() && self.theme.is_none()
    }
}

pub fn get_preferences(state: &AppState) -> CommandResult<Preferences> {
    Ok(state.prefs.snapshot())
}

pub fn update_preferences(state: &AppState, update: PreferencesUpdate) -> CommandResult<Preferences> {
    if let Some(source) = update.source {
        state.prefs.set_source(source);
    }
    if let Some(tone) = update.tone {
        state.prefs.set_tone(tone);
    }
    if let Some(theme) = update.theme {
        state.prefs.set_theme(theme);
    }

    let prefs = state.prefs.snapshot();
    tracing::info!(source = %prefs.source, tone = %prefs.tone, theme = %prefs.theme, "preferences updated");
    Ok(prefs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prefs::PreferenceStore;
    use crate::core::sources::{test_support, SourceRouter};
    use crate::shared::settings::AppSettings;
    use std::sync::Arc;

    #[test]
    fn test_partial_update() {
        let state = AppState::new(
            AppSettings::default(),
            Arc::new(PreferenceStore::in_memory()),
            Arc::new(SourceRouter::new(test_support::unreachable())),
        );

        assert_eq!(get_preferences(&state).unwrap(), Preferences::default());

        let update = PreferencesUpdate {
            tone: Some(ToneId::Academic),
            ..Default::default()
        };
        assert!(!update.is_empty());
        let prefs = update_preferences(&state, update).unwrap();

        assert_eq!(prefs.tone, ToneId::Academic);
        assert_eq!(prefs.source, SourceId::Auto);
        assert_eq!(prefs.theme, Theme::Auto);
        assert!(PreferencesUpdate::default().is_empty());
    }
}
