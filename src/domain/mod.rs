//! Domain Layer
//!
//! Contains all domain entities and pure derivations.
//! This layer has NO external dependencies; encoding to and from the
//! stored document shape lives in the repository layer.

mod entity;
mod item;
mod spine;

pub use entity::{DomainError, DomainResult, Entity};
pub use item::{DecorKind, Item, ItemId, ItemKind, Placement, ShelfIndex, SHELF_COUNT};
pub use spine::{color_for_key, spine_metrics, SpineMetrics};
