use serde::{Deserialize, Serialize};

use super::types::{RawSelection, SourceId, ToneId};

/// Everything a host surface reports to an explain session.
///
/// Tagged so a webview bridge can post the same JSON it would send over IPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum HostEvent {
    #[serde(rename = "selection://pointer-up")]
    PointerUp {
        selection: Option<RawSelection>,
        #[serde(default)]
        inside_popup: bool,
    },

    #[serde(rename = "selection://double-click")]
    DoubleClick {
        selection: Option<RawSelection>,
        #[serde(default)]
        inside_popup: bool,
    },

    #[serde(rename = "page://click")]
    Click { inside_popup: bool },

    #[serde(rename = "page://keydown")]
    KeyDown { key: String },

    #[serde(rename = "page://scroll")]
    Scroll,

    #[serde(rename = "page://resize")]
    Resize,

    #[serde(rename = "popup://close")]
    CloseClicked,

    #[serde(rename = "popup://theme-toggle")]
    ThemeToggleClicked,

    #[serde(rename = "popup://settings")]
    SettingsClicked,

    #[serde(rename = "settings://save")]
    SettingsSaved { source: SourceId, tone: ToneId },

    #[serde(rename = "settings://cancel")]
    SettingsCancelled,
}
