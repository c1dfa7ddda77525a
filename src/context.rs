//! Application Context
//!
//! The process-scoped handles to the remote collaborators, constructed
//! once at startup and passed explicitly to everything that needs
//! store access. No ambient singletons; any collaborator can be
//! swapped for a test double.

use std::sync::Arc;

use crate::repository::{
    AnonymousIdentity, CatalogClient, DocumentStore, IdentityProvider, MemoryStore,
};

/// Shared handles for one process
pub struct AppContext {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub catalog: Arc<dyn CatalogClient>,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        catalog: Arc<dyn CatalogClient>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            identity,
            catalog,
        })
    }

    /// Session-local wiring: in-memory store and anonymous identity,
    /// with the given catalog client.
    pub fn in_memory(catalog: Arc<dyn CatalogClient>) -> Arc<Self> {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(AnonymousIdentity::new()),
            catalog,
        )
    }
}
