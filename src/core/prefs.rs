//! Preference store
//!
//! Three flat string entries (source, tone, theme) behind a key-value backend.
//! Reads and writes never fail outward: backend errors are logged and the
//! store falls back to values held in memory, then to defaults.

pub mod backend;

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Mutex;

use crate::shared::types::{Preferences, SourceId, Theme, ToneId};
pub use backend::{KeyValueBackend, MemoryBackend, RedbBackend};

pub const SOURCE_KEY: &str = "quickExplainSource";
pub const TONE_KEY: &str = "quickExplainTone";
pub const THEME_KEY: &str = "quickExplainTheme";

pub struct PreferenceStore {
    backend: Box<dyn KeyValueBackend>,
    cache: Mutex<CacheState>,
}

/// Values seen or written this session. Keys in `unsynced` failed to persist
/// and take precedence over whatever the backend reports.
#[derive(Default)]
struct CacheState {
    values: HashMap<String, String>,
    unsynced: HashSet<String>,
}

impl PreferenceStore {
    pub fn new(backend: Box<dyn KeyValueBackend>) -> Self {
        Self {
            backend,
            cache: Mutex::new(CacheState::default()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Open the on-disk store, or an in-memory one if the database is unavailable.
    pub fn open_default() -> Self {
        match RedbBackend::open_default() {
            Ok(backend) => Self::new(Box::new(backend)),
            Err(e) => {
                tracing::warn!(error = %e, "preference database unavailable, using memory store");
                Self::in_memory()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        {
            let cache = self.lock_cache();
            if cache.unsynced.contains(key) {
                return cache.values.get(key).cloned();
            }
        }

        match self.backend.get(key) {
            Ok(Some(value)) => {
                self.lock_cache().values.insert(key.to_string(), value.clone());
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read preference");
                self.lock_cache().values.get(key).cloned()
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        let mut cache = self.lock_cache();
        cache.values.insert(key.to_string(), value.to_string());

        match self.backend.set(key, value) {
            Ok(()) => {
                cache.unsynced.remove(key);
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to save preference, keeping it in memory");
                cache.unsynced.insert(key.to_string());
            }
        }
    }

    pub fn source(&self) -> SourceId {
        self.parsed(SOURCE_KEY)
    }

    pub fn tone(&self) -> ToneId {
        self.parsed(TONE_KEY)
    }

    pub fn theme(&self) -> Theme {
        self.parsed(THEME_KEY)
    }

    pub fn set_source(&self, source: SourceId) {
        self.set(SOURCE_KEY, source.as_str());
    }

    pub fn set_tone(&self, tone: ToneId) {
        self.set(TONE_KEY, tone.as_str());
    }

    pub fn set_theme(&self, theme: Theme) {
        self.set(THEME_KEY, theme.as_str());
    }

    pub fn snapshot(&self) -> Preferences {
        Preferences {
            source: self.source(),
            tone: self.tone(),
            theme: self.theme(),
        }
    }

    /// Write the default value of every key.
    pub fn seed_defaults(&self) {
        let defaults = Preferences::default();
        self.set_source(defaults.source);
        self.set_tone(defaults.tone);
        self.set_theme(defaults.theme);
    }

    fn parsed<T: FromStr + Default>(&self, key: &str) -> T {
        self.get(key)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, CacheState> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::{AppError, AppResult};

    struct BrokenBackend;

    impl KeyValueBackend for BrokenBackend {
        fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::Storage("disk unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(AppError::Storage("disk unavailable".into()))
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let store = PreferenceStore::in_memory();
        assert_eq!(store.snapshot(), Preferences {
            source: SourceId::Auto,
            tone: ToneId::Friendly,
            theme: Theme::Auto,
        });
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let store = PreferenceStore::in_memory();
        store.set_source(SourceId::Openlibrary);
        store.set_tone(ToneId::Academic);
        store.set_theme(Theme::Dark);

        assert_eq!(store.source(), SourceId::Openlibrary);
        assert_eq!(store.tone(), ToneId::Academic);
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn test_broken_backend_falls_back_to_defaults() {
        let store = PreferenceStore::new(Box::new(BrokenBackend));
        assert_eq!(store.source(), SourceId::Auto);
        assert_eq!(store.get(THEME_KEY), None);
    }

    #[test]
    fn test_broken_backend_still_round_trips_in_session() {
        let store = PreferenceStore::new(Box::new(BrokenBackend));
        store.set_source(SourceId::Trivia);
        assert_eq!(store.source(), SourceId::Trivia);
    }

    #[test]
    fn test_unparsable_value_reads_as_default() {
        let store = PreferenceStore::in_memory();
        store.set(TONE_KEY, "sarcastic");
        assert_eq!(store.tone(), ToneId::Friendly);
    }

    #[test]
    fn test_redb_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.redb");
        {
            let store = PreferenceStore::new(Box::new(RedbBackend::open(&path).unwrap()));
            store.set_source(SourceId::Wikidata);
        }

        let store = PreferenceStore::new(Box::new(RedbBackend::open(&path).unwrap()));
        assert_eq!(store.source(), SourceId::Wikidata);
        assert_eq!(store.tone(), ToneId::Friendly);
    }
}
