//! Engine Layer
//!
//! The placement synchronization core: capacity policy, placement
//! math, the drag/drop state machine, the optimistic sync engine, and
//! the session lifecycle that ties them to the remote collaborators.

mod capacity;
mod drag;
mod placement;
mod session;
mod sync;

mod tests;

pub use capacity::{can_admit_one, MAX_TRAY_ITEMS};
pub use drag::{DragController, DropCommand, DropTarget};
pub use placement::{position_from_drop, shelf_layout, shelf_order, tray_items};
pub use session::Session;
pub use sync::{Notice, SyncEngine};
