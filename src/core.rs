//! Core explainer logic, independent of any particular host UI.

pub mod host;
pub mod popup;
pub mod prefs;
pub mod selection;
pub mod session;
pub mod sources;
