//! ShelfSync
//!
//! Placement synchronization engine for a drag-and-drop virtual
//! bookshelf: items (books and decor) move between a capacity-bounded
//! holding tray and a fixed set of shelves, with local edits applied
//! optimistically and reconciled against an eventually-consistent
//! remote document store by full-snapshot replacement.
//!
//! Layered architecture:
//! - domain: Core entities and pure derivations (colors, spine geometry)
//! - repository: Remote-collaborator interfaces, in-memory store, catalog client
//! - engine: Capacity policy, placement math, drag state machine, sync engine
//!
//! Rendering, the real document-store client, and authentication live
//! outside this crate; they plug in through the traits in
//! `repository` via an [`AppContext`].

pub mod context;
pub mod domain;
pub mod engine;
pub mod repository;

pub use context::AppContext;
pub use domain::{
    color_for_key, spine_metrics, DecorKind, DomainError, DomainResult, Item, ItemId, ItemKind,
    Placement, ShelfIndex, SpineMetrics, SHELF_COUNT,
};
pub use engine::{
    can_admit_one, position_from_drop, DragController, DropCommand, DropTarget, Notice, Session,
    SyncEngine, MAX_TRAY_ITEMS,
};
pub use repository::{
    AnonymousIdentity, CatalogClient, DocumentStore, GoogleBooksCatalog, IdentityProvider,
    MemoryStore, Snapshot, SnapshotReceiver, Volume,
};
