//! Command surface shared by the CLI and any embedding host.

pub mod commands;

use std::sync::Arc;

use crate::core::prefs::PreferenceStore;
use crate::core::sources::{Endpoints, HttpContext, SourceRouter};
use crate::shared::settings::AppSettings;
use crate::shared::AppResult;

pub type CommandResult<T> = AppResult<T>;

/// Long-lived handles every command works against.
pub struct AppState {
    pub settings: AppSettings,
    pub prefs: Arc<PreferenceStore>,
    pub router: Arc<SourceRouter>,
}

impl AppState {
    pub fn new(settings: AppSettings, prefs: Arc<PreferenceStore>, router: Arc<SourceRouter>) -> Self {
        Self { settings, prefs, router }
    }

    /// Open the preference database and build the HTTP client for the public
    /// providers.
    pub fn from_settings(settings: AppSettings) -> AppResult<Self> {
        let http = HttpContext::new(&settings.network, Endpoints::default())?;
        let router = Arc::new(SourceRouter::new(http));
        let prefs = Arc::new(PreferenceStore::open_default());

        Ok(Self::new(settings, prefs, router))
    }
}
