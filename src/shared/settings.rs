use serde::{Deserialize, Serialize};
use tokio::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;

use super::error::{AppError, AppResult};

pub const QUALIFIER: &str = "com";
pub const ORGANIZATION: &str = "antigravity";
pub const APPLICATION: &str = "quick-explain";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub selection: SelectionSettings,
    pub popup: PopupSettings,
    pub network: NetworkSettings,
    pub debug_logging: bool,
}

/// Guardrails that keep the popup for words and short phrases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub max_words: usize,
    pub max_chars: usize,
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupSettings {
    pub auto_hide_ms: u64,
    pub click_grace_ms: u64,
    pub truncate_len: usize,
    pub padding: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            max_words: 4,
            max_chars: 60,
            debounce_ms: 500,
        }
    }
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self {
            auto_hide_ms: 8000,
            click_grace_ms: 200,
            truncate_len: 300,
            padding: 8.0,
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "QuickExplain/1.0".to_string(),
        }
    }
}

impl SelectionSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl PopupSettings {
    pub fn auto_hide(&self) -> Duration {
        Duration::from_millis(self.auto_hide_ms)
    }

    pub fn click_grace(&self) -> Duration {
        Duration::from_millis(self.click_grace_ms)
    }
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn project_dirs() -> AppResult<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .ok_or_else(|| AppError::Io("Failed to determine config directory".to_string()))
}

impl AppSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("settings.json"))
    }

    /// Load from the platform config directory, writing defaults on first run.
    pub async fn load() -> AppResult<Self> {
        Self::load_from(&Self::get_settings_path()?).await
    }

    pub async fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path).await?;
            return Ok(settings);
        }

        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save(&self) -> AppResult<()> {
        self.save_to(&Self::get_settings_path()?).await
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }
}
