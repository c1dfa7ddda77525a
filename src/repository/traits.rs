//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for the remote collaborators: the
//! identity provider and the per-user document store. Implementations
//! can be in-memory, a cloud document database, etc.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{DomainResult, Item, Placement};

/// A complete, authoritative dump of all items for one user's layout.
///
/// The subscription side always delivers whole snapshots; the engine
/// never depends on per-field partial updates from the stream.
pub type Snapshot = Vec<Item>;

/// Live stream of collection snapshots. Stream errors arrive in-band;
/// a closed channel means the subscription ended.
pub type SnapshotReceiver = mpsc::UnboundedReceiver<DomainResult<Snapshot>>;

/// Provides a stable anonymous user identifier.
///
/// No collection operation may begin before this resolves.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn ensure_user(&self) -> DomainResult<String>;
}

/// Per-user document store for the default layout and its items
///
/// Every write is an unconditional field-level update; concurrent
/// cross-session writers degrade to last-write-wins at the store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lazily materialize the user's default layout document
    async fn ensure_layout(&self, user_id: &str) -> DomainResult<()>;

    /// Read one item by id
    async fn get(&self, user_id: &str, item_id: &str) -> DomainResult<Option<Item>>;

    /// Read all items in the user's layout
    async fn list(&self, user_id: &str) -> DomainResult<Vec<Item>>;

    /// Write/merge one item. Assigns an id when the item's id is empty
    /// and stamps the store-managed timestamps. Returns the item as
    /// stored.
    async fn put(&self, user_id: &str, item: &Item) -> DomainResult<Item>;

    /// Batch write, one logical commit
    async fn put_many(&self, user_id: &str, items: &[Item]) -> DomainResult<Vec<Item>>;

    /// Field-level update of an item's placement. Moving to the tray
    /// clears both the shelf index and the position.
    async fn set_placement(
        &self,
        user_id: &str,
        item_id: &str,
        placement: Placement,
    ) -> DomainResult<()>;

    /// Delete one item by id
    async fn delete(&self, user_id: &str, item_id: &str) -> DomainResult<()>;

    /// Subscribe to the user's collection. Delivers the current
    /// snapshot immediately, then one snapshot per store mutation.
    async fn subscribe(&self, user_id: &str) -> SnapshotReceiver;
}
