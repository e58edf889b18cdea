use serde::Serialize;

use super::view::{PopupView, SettingsView};
use crate::shared::types::{Point, Size, Theme, Viewport};
use crate::shared::AppResult;

/// Handle to a mounted popup, issued by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SurfaceId(pub u64);

/// Host UI the presenter draws into.
///
/// Coordinates are viewport-relative. `apply_theme` is also expected to refresh
/// the theme toggle label (see [`super::view::theme_toggle_label`]).
pub trait PopupSurface {
    /// Attach the popup and report its rendered size.
    fn mount(&mut self, view: &PopupView) -> AppResult<(SurfaceId, Size)>;
    fn place(&mut self, id: SurfaceId, position: Point);
    fn apply_theme(&mut self, id: SurfaceId, theme: Theme);
    fn unmount(&mut self, id: SurfaceId);
    fn mount_settings(&mut self, id: SurfaceId, view: &SettingsView) -> AppResult<()>;
    fn unmount_settings(&mut self, id: SurfaceId);
    fn viewport(&self) -> Viewport;
    fn prefers_dark(&self) -> bool;
}
