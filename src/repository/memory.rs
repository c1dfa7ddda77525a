//! In-Memory Document Store
//!
//! Per-user document maps with snapshot broadcast after every mutation.
//! Serves as the default session-local backend and as the test double
//! for the sync engine; a remote client implements the same trait.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use super::docs::{doc_to_item, item_to_doc, Doc};
use super::traits::{DocumentStore, IdentityProvider, Snapshot, SnapshotReceiver};
use crate::domain::{DomainError, DomainResult, Item, Placement};

/// Anonymous identity provider: one stable generated id per instance
pub struct AnonymousIdentity {
    user_id: Mutex<Option<String>>,
}

impl AnonymousIdentity {
    pub fn new() -> Self {
        Self {
            user_id: Mutex::new(None),
        }
    }
}

impl Default for AnonymousIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for AnonymousIdentity {
    async fn ensure_user(&self) -> DomainResult<String> {
        let mut guard = self.user_id.lock().await;
        Ok(guard
            .get_or_insert_with(|| format!("anon-{}", Uuid::new_v4()))
            .clone())
    }
}

struct Inner {
    /// Default layout document per user
    layouts: HashMap<String, Doc>,
    /// Item documents per user, keyed by document id (ordered for
    /// deterministic snapshots)
    docs: HashMap<String, BTreeMap<String, Doc>>,
    subscribers: HashMap<String, Vec<mpsc::UnboundedSender<DomainResult<Snapshot>>>>,
    write_count: u64,
    fail_next_write: bool,
}

/// In-memory `DocumentStore` implementation
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                layouts: HashMap::new(),
                docs: HashMap::new(),
                subscribers: HashMap::new(),
                write_count: 0,
                fail_next_write: false,
            }),
        }
    }

    /// Number of item writes applied so far (puts, batches count each
    /// document, placement updates, deletes)
    pub async fn write_count(&self) -> u64 {
        self.inner.lock().await.write_count
    }

    /// Make the next mutating call fail with `DomainError::Write`
    /// without touching stored state. For exercising the optimistic
    /// failure path.
    pub async fn fail_next_write(&self) {
        self.inner.lock().await.fail_next_write = true;
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn check_fault(&mut self) -> DomainResult<()> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(DomainError::Write("injected write failure".to_string()));
        }
        Ok(())
    }

    fn snapshot(&self, user_id: &str) -> DomainResult<Snapshot> {
        self.docs
            .get(user_id)
            .into_iter()
            .flatten()
            .map(|(id, doc)| doc_to_item(id, doc))
            .collect()
    }

    /// Deliver the current snapshot to every live subscriber,
    /// dropping the ones whose receiver is gone.
    fn broadcast(&mut self, user_id: &str) {
        let snapshot = self.snapshot(user_id);
        if let Some(senders) = self.subscribers.get_mut(user_id) {
            senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
        }
    }

    fn store_doc(&mut self, user_id: &str, item: &Item) -> DomainResult<Item> {
        let id = if item.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            item.id.clone()
        };
        let now = Utc::now().timestamp_millis();
        let mut doc = item_to_doc(item);
        doc.insert("id".into(), json!(id));
        doc.insert("updatedAt".into(), json!(now));

        let docs = self.docs.entry(user_id.to_string()).or_default();
        match docs.get_mut(&id) {
            Some(existing) => {
                // Merge write: keep the original creation timestamp
                let created = existing.get("createdAt").cloned();
                existing.extend(doc);
                if let Some(created) = created {
                    existing.insert("createdAt".into(), created);
                }
                doc_to_item(&id, existing)
            }
            None => {
                doc.insert("createdAt".into(), json!(now));
                let stored = doc_to_item(&id, &doc)?;
                docs.insert(id, doc);
                Ok(stored)
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_layout(&self, user_id: &str) -> DomainResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.layouts.contains_key(user_id) {
            let now = Utc::now().timestamp_millis();
            let layout = json!({
                "name": "My Default Shelf",
                "roomStyleId": "cozy_living_room",
                "bookcaseStyleId": "dark_wood",
                "layoutId": "3_shelves",
                "createdAt": now,
                "updatedAt": now,
            });
            let layout = layout.as_object().cloned().unwrap_or_default();
            inner.layouts.insert(user_id.to_string(), layout);
        }
        Ok(())
    }

    async fn get(&self, user_id: &str, item_id: &str) -> DomainResult<Option<Item>> {
        let inner = self.inner.lock().await;
        inner
            .docs
            .get(user_id)
            .and_then(|docs| docs.get(item_id))
            .map(|doc| doc_to_item(item_id, doc))
            .transpose()
    }

    async fn list(&self, user_id: &str) -> DomainResult<Vec<Item>> {
        self.inner.lock().await.snapshot(user_id)
    }

    async fn put(&self, user_id: &str, item: &Item) -> DomainResult<Item> {
        let mut inner = self.inner.lock().await;
        inner.check_fault()?;
        let stored = inner.store_doc(user_id, item)?;
        inner.write_count += 1;
        inner.broadcast(user_id);
        Ok(stored)
    }

    async fn put_many(&self, user_id: &str, items: &[Item]) -> DomainResult<Vec<Item>> {
        let mut inner = self.inner.lock().await;
        inner.check_fault()?;
        let stored = items
            .iter()
            .map(|item| inner.store_doc(user_id, item))
            .collect::<DomainResult<Vec<_>>>()?;
        inner.write_count += items.len() as u64;
        // One logical commit, one snapshot
        inner.broadcast(user_id);
        Ok(stored)
    }

    async fn set_placement(
        &self,
        user_id: &str,
        item_id: &str,
        placement: Placement,
    ) -> DomainResult<()> {
        let mut inner = self.inner.lock().await;
        inner.check_fault()?;
        let now = Utc::now().timestamp_millis();
        let doc = inner
            .docs
            .get_mut(user_id)
            .and_then(|docs| docs.get_mut(item_id))
            .ok_or_else(|| DomainError::NotFound(format!("item {}", item_id)))?;
        match placement {
            Placement::Unplaced => {
                doc.insert("shelfIndex".into(), Value::Null);
                doc.insert("shelfPos".into(), Value::Null);
            }
            Placement::Placed { shelf, position } => {
                doc.insert("shelfIndex".into(), json!(shelf.get()));
                doc.insert("shelfPos".into(), json!(position));
            }
        }
        doc.insert("updatedAt".into(), json!(now));
        inner.write_count += 1;
        inner.broadcast(user_id);
        Ok(())
    }

    async fn delete(&self, user_id: &str, item_id: &str) -> DomainResult<()> {
        let mut inner = self.inner.lock().await;
        inner.check_fault()?;
        if let Some(docs) = inner.docs.get_mut(user_id) {
            docs.remove(item_id);
        }
        inner.write_count += 1;
        inner.broadcast(user_id);
        Ok(())
    }

    async fn subscribe(&self, user_id: &str) -> SnapshotReceiver {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = mpsc::unbounded_channel();
        // The current state is delivered immediately, like a remote
        // change stream's initial snapshot
        let _ = tx.send(inner.snapshot(user_id));
        inner
            .subscribers
            .entry(user_id.to_string())
            .or_default()
            .push(tx);
        rx
    }
}
