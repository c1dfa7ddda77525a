//! Repository Layer
//!
//! Abstract interfaces for the remote collaborators (document store,
//! identity, catalog search) plus the in-memory implementations and
//! the stored-document codec.

mod catalog;
mod docs;
mod memory;
mod traits;

pub use catalog::{CatalogClient, GoogleBooksCatalog, Volume};
pub use docs::{doc_to_item, item_to_doc, Doc};
pub use memory::{AnonymousIdentity, MemoryStore};
pub use traits::{DocumentStore, IdentityProvider, Snapshot, SnapshotReceiver};
