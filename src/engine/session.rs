//! Session Lifecycle
//!
//! Provisioning gate and subscription ownership: no collection
//! operation runs before an identity exists and the default layout is
//! materialized. Exactly one snapshot subscription lives per session;
//! it is not re-established on stream error.

use std::sync::Arc;

use crate::context::AppContext;
use crate::domain::{DomainError, DomainResult, Item};
use crate::repository::SnapshotReceiver;

use super::sync::SyncEngine;

/// Starter books written into an empty collection on first use
const STARTER_BOOKS: [(&str, &str, &str); 5] = [
    ("b1", "Book 1", "#f97316"),
    ("b2", "Book 2", "#22c55e"),
    ("b3", "Book 3", "#6366f1"),
    ("b4", "Book 4", "#e11d48"),
    ("b5", "Book 5", "#a855f7"),
];

/// One user's live editing session: the sync engine plus the single
/// active snapshot subscription.
pub struct Session {
    engine: SyncEngine,
    snapshots: SnapshotReceiver,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Provision and subscribe: ensure an identity, materialize the
    /// default layout, seed starter books into an empty collection,
    /// then open the snapshot stream. Any failure here is fatal to
    /// session start.
    pub async fn start(ctx: Arc<AppContext>) -> DomainResult<Self> {
        let user_id = ctx
            .identity
            .ensure_user()
            .await
            .map_err(|err| DomainError::Provisioning(err.to_string()))?;
        log::info!("session starting for {}", user_id);

        ctx.store
            .ensure_layout(&user_id)
            .await
            .map_err(|err| DomainError::Provisioning(err.to_string()))?;
        seed_initial_books_if_empty(&ctx, &user_id)
            .await
            .map_err(|err| DomainError::Provisioning(err.to_string()))?;

        let snapshots = ctx.store.subscribe(&user_id).await;
        Ok(Self {
            engine: SyncEngine::new(ctx, user_id),
            snapshots,
        })
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SyncEngine {
        &mut self.engine
    }

    /// Wait for the next snapshot and merge it into the local view.
    ///
    /// Returns `Ok(false)` once the stream has closed. A stream error
    /// surfaces as `Subscription` and the session does not resubscribe.
    pub async fn pump_one(&mut self) -> DomainResult<bool> {
        match self.snapshots.recv().await {
            Some(Ok(snapshot)) => {
                self.engine.apply_snapshot(snapshot);
                Ok(true)
            }
            Some(Err(err)) => {
                log::error!("snapshot stream error: {}", err);
                Err(DomainError::Subscription(err.to_string()))
            }
            None => Ok(false),
        }
    }

    /// Drain every snapshot already delivered, without waiting.
    /// The view ends up at the most recently received snapshot.
    pub fn pump_ready(&mut self) -> DomainResult<usize> {
        let mut applied = 0;
        while let Ok(message) = self.snapshots.try_recv() {
            match message {
                Ok(snapshot) => {
                    self.engine.apply_snapshot(snapshot);
                    applied += 1;
                }
                Err(err) => {
                    log::error!("snapshot stream error: {}", err);
                    return Err(DomainError::Subscription(err.to_string()));
                }
            }
        }
        Ok(applied)
    }
}

/// Write the starter books only when the collection is empty.
/// Seeding does not consult the capacity policy; it can only run on a
/// collection with zero tray items.
async fn seed_initial_books_if_empty(ctx: &AppContext, user_id: &str) -> DomainResult<()> {
    let existing = ctx.store.list(user_id).await?;
    if !existing.is_empty() {
        return Ok(());
    }
    log::info!("seeding {} starter books for {}", STARTER_BOOKS.len(), user_id);
    for (id, label, color) in STARTER_BOOKS {
        ctx.store
            .put(user_id, &Item::seed_book(id, label, color))
            .await?;
    }
    Ok(())
}
