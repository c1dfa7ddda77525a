//! Placement Model
//!
//! Converts a drop interaction (pointer offset within a shelf's
//! rendered bounds) into a stored fractional position, and stored
//! state back into a left-to-right rendering order. There is no
//! collision avoidance: identical positions are legal and tie-break
//! by stable iteration order.

use crate::domain::{Item, ShelfIndex};

/// Fractional position for a drop at `offset_x` on a shelf rendered
/// `shelf_width` wide. The offset clamps to `[0, width]` before the
/// division; degenerate geometry falls back to the shelf's middle.
pub fn position_from_drop(offset_x: f64, shelf_width: f64) -> f64 {
    if shelf_width > 0.0 {
        offset_x.clamp(0.0, shelf_width) / shelf_width
    } else {
        0.5
    }
}

/// Items on `shelf`, sorted ascending by stored position. Items with
/// no numeric position sort after all positioned items, keeping their
/// relative iteration order.
pub fn shelf_order<'a>(items: &'a [Item], shelf: ShelfIndex) -> Vec<&'a Item> {
    let mut on_shelf: Vec<&Item> = items
        .iter()
        .filter(|item| item.placement.shelf() == Some(shelf))
        .collect();
    on_shelf.sort_by(|a, b| {
        let a_pos = a.placement.position().unwrap_or(f64::INFINITY);
        let b_pos = b.placement.position().unwrap_or(f64::INFINITY);
        a_pos.partial_cmp(&b_pos).unwrap_or(std::cmp::Ordering::Equal)
    });
    on_shelf
}

/// Ordered items on `shelf` paired with the position to render at:
/// the stored fraction, or an evenly spaced `(index+1)/(count+1)`
/// fallback for positionless items. The fallback is render-only and
/// never written back to the store.
pub fn shelf_layout<'a>(items: &'a [Item], shelf: ShelfIndex) -> Vec<(&'a Item, f64)> {
    let ordered = shelf_order(items, shelf);
    let count = ordered.len();
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let pos = item
                .placement
                .position()
                .unwrap_or((index as f64 + 1.0) / (count as f64 + 1.0));
            (item, pos)
        })
        .collect()
}

/// Items currently in the holding tray, in arrival order
pub fn tray_items(items: &[Item]) -> Vec<&Item> {
    items
        .iter()
        .filter(|item| item.placement.is_unplaced())
        .collect()
}
