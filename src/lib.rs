//! Quick Explain: select a word or short phrase, get a short explanation from
//! a public reference source in a popup next to the selection.

pub mod api;
pub mod core;
pub mod logging;
pub mod shared;

pub use crate::core::popup::{PopupPresenter, PopupSurface};
pub use crate::core::prefs::PreferenceStore;
pub use crate::core::session::{driver, ExplainSession};
pub use crate::core::sources::{ExplanationSource, SourceRouter};
pub use crate::shared::{AppError, AppResult};
