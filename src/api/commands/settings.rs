//! Settings command module
//!
//! Reads, writes and resets `settings.json` in the platform config directory.

use std::path::PathBuf;

use crate::api::CommandResult;
use crate::shared::settings::AppSettings;

pub fn settings_path() -> CommandResult<PathBuf> {
    AppSettings::get_settings_path()
}

/// Current settings; the file is created with defaults if missing.
pub async fn get_settings() -> CommandResult<AppSettings> {
    AppSettings::load().await
}

pub async fn save_settings(settings: AppSettings) -> CommandResult<()> {
    settings.save().await?;
    tracing::info!("settings saved");
    Ok(())
}

/// Overwrite the settings file with defaults.
pub async fn reset_settings() -> CommandResult<AppSettings> {
    let settings = AppSettings::default();
    save_settings(settings.clone()).await?;
    Ok(settings)
}
