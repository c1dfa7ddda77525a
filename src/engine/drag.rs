//! Drag/Drop Interaction State Machine
//!
//! Tracks the single item in motion and interprets drop targets into
//! placement commands. Drag state is purely interactive: it clears on
//! every drop, before any sync confirmation comes back.

use super::placement::position_from_drop;
use crate::domain::{ItemId, ShelfIndex};

/// Where a drop landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropTarget {
    /// A shelf, with the pointer offset from its left edge and its
    /// rendered width
    Shelf {
        shelf: ShelfIndex,
        offset_x: f64,
        width: f64,
    },
    /// The holding tray
    Tray,
    /// Anything not recognized as a shelf or tray
    Outside,
}

/// Mutation to hand to the sync engine after a completed drop
#[derive(Debug, Clone, PartialEq)]
pub enum DropCommand {
    Place {
        item: ItemId,
        shelf: ShelfIndex,
        position: f64,
    },
    Stow {
        item: ItemId,
    },
}

/// At most one item is in motion at a time
pub struct DragController {
    dragging: Option<ItemId>,
}

impl DragController {
    pub fn new() -> Self {
        Self { dragging: None }
    }

    /// Start dragging an item. A drag already in progress is simply
    /// replaced; drags do not stack.
    pub fn pick_up(&mut self, item: impl Into<ItemId>) {
        self.dragging = Some(item.into());
    }

    /// Abort without any mutation
    pub fn cancel(&mut self) {
        self.dragging = None;
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    /// Complete the drag. Always returns to idle; yields a command
    /// only when an item was in motion and the target is recognized.
    pub fn drop_on(&mut self, target: DropTarget) -> Option<DropCommand> {
        let item = self.dragging.take()?;
        match target {
            DropTarget::Shelf {
                shelf,
                offset_x,
                width,
            } => Some(DropCommand::Place {
                item,
                shelf,
                position: position_from_drop(offset_x, width),
            }),
            DropTarget::Tray => Some(DropCommand::Stow { item }),
            DropTarget::Outside => None,
        }
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}
