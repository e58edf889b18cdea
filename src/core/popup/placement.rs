use crate::shared::types::{Point, Rect, Size, Viewport};

/// Calculate popup position relative to the selection, keeping it on screen.
///
/// Prefers the space below the anchor and flips above when the popup would
/// overflow the bottom edge. Both axes are then clamped to the viewport with
/// `padding` on every side; on a viewport too small for the popup the
/// top-left padding wins.
pub fn calculate_popup_position(anchor: &Rect, popup: Size, viewport: Viewport, padding: f64) -> Point {
    let mut y = anchor.bottom() + padding;

    // Check bottom boundary
    if y + popup.height > viewport.height - padding {
        y = anchor.top - popup.height - padding;
    }

    let y = y.min(viewport.height - popup.height - padding).max(padding);
    let x = anchor
        .left
        .min(viewport.width - popup.width - padding)
        .max(padding);

    Point { x, y }
}
