//! Tray Capacity Policy
//!
//! Admission control for the unplaced holding area. Only net-new
//! unplaced items consume capacity; moving an already-unplaced item
//! around is free, and shelf population is unbounded.

/// Maximum number of items simultaneously in the tray
pub const MAX_TRAY_ITEMS: usize = 18;

/// True iff one more item may enter the tray.
///
/// Batch imports check once before the batch begins rather than per
/// item; two batches racing in one session can still overshoot. That
/// is a documented simplification, not a guarantee.
pub fn can_admit_one(current_unplaced: usize) -> bool {
    current_unplaced < MAX_TRAY_ITEMS
}
