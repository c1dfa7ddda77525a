//! Sync Engine
//!
//! The optimistic-write / realtime-merge core. Mutations apply to the
//! local view immediately, then dispatch to the store; a failed
//! dispatch is never rolled back, it raises a user-visible notice and
//! waits for the next authoritative snapshot to correct the view.
//! Snapshots fully replace the local view, never a per-field patch.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use super::capacity::can_admit_one;
use super::drag::DropCommand;
use super::placement;
use crate::context::AppContext;
use crate::domain::{DecorKind, Item, Placement, ShelfIndex};
use crate::repository::{Snapshot, Volume};

/// Result page size for free-text search
const SEARCH_MAX_RESULTS: u32 = 20;
/// Volumes fetched per random tray fill
const RANDOM_FILL_COUNT: u32 = 8;
/// Random fills start at a random offset within the first N results
const RANDOM_START_RANGE: u32 = 40;

const RANDOM_SUBJECTS: [&str; 7] = [
    "fiction",
    "fantasy",
    "mystery",
    "romance",
    "horror",
    "young adult",
    "historical fiction",
];

/// User-visible transient condition raised by a mutation.
///
/// Capacity rejections and remote write failures surface identically:
/// a message the user can act on. None of these block the next action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    TrayFull,
    MoveFailed,
    DeleteFailed,
    AddBookFailed,
    AddDecorFailed,
    SearchFailed,
    EmptySearch,
    RandomFillFailed,
    EmptyRandomFill,
}

impl Notice {
    pub fn user_message(&self) -> &'static str {
        match self {
            Notice::TrayFull => "Tray is full. Move some items to a shelf or remove them.",
            Notice::MoveFailed => "Failed to move item. Try again.",
            Notice::DeleteFailed => "Failed to remove item.",
            Notice::AddBookFailed => "Failed to add book to shelf.",
            Notice::AddDecorFailed => "Failed to add decor item.",
            Notice::SearchFailed => "Failed to fetch books. Try again.",
            Notice::EmptySearch => "No books found for that search.",
            Notice::RandomFillFailed => "Failed to fetch random books. Try again.",
            Notice::EmptyRandomFill => "No random books found. Try again.",
        }
    }
}

/// Owns the optimistic local view of one user's collection
pub struct SyncEngine {
    ctx: Arc<AppContext>,
    user_id: String,
    items: Vec<Item>,
    notice: Option<Notice>,
}

impl SyncEngine {
    pub fn new(ctx: Arc<AppContext>, user_id: impl Into<String>) -> Self {
        Self {
            ctx,
            user_id: user_id.into(),
            items: Vec::new(),
            notice: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // ---- read side ----

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn tray_items(&self) -> Vec<&Item> {
        placement::tray_items(&self.items)
    }

    pub fn tray_books(&self) -> Vec<&Item> {
        self.tray_items()
            .into_iter()
            .filter(|item| !item.kind.is_decor())
            .collect()
    }

    pub fn tray_decor(&self) -> Vec<&Item> {
        self.tray_items()
            .into_iter()
            .filter(|item| item.kind.is_decor())
            .collect()
    }

    pub fn shelf_order(&self, shelf: ShelfIndex) -> Vec<&Item> {
        placement::shelf_order(&self.items, shelf)
    }

    pub fn shelf_layout(&self, shelf: ShelfIndex) -> Vec<(&Item, f64)> {
        placement::shelf_layout(&self.items, shelf)
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    // ---- merge side ----

    /// Full-replace merge: the snapshot is the authoritative set and
    /// discards any optimistic state wholesale. Idempotent.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.items = snapshot;
    }

    // ---- mutations ----

    /// Place an item on a shelf at a fractional position
    pub async fn move_to_shelf(&mut self, item_id: &str, shelf: ShelfIndex, position: f64) {
        let target = Placement::Placed {
            shelf,
            position: Some(position),
        };
        self.apply_local_placement(item_id, target);
        if let Err(err) = self
            .ctx
            .store
            .set_placement(&self.user_id, item_id, target)
            .await
        {
            log::error!("failed to move item {} to shelf: {}", item_id, err);
            self.notice = Some(Notice::MoveFailed);
        }
    }

    /// Move an item back into the tray, clearing shelf and position
    pub async fn move_to_tray(&mut self, item_id: &str) {
        self.apply_local_placement(item_id, Placement::Unplaced);
        if let Err(err) = self
            .ctx
            .store
            .set_placement(&self.user_id, item_id, Placement::Unplaced)
            .await
        {
            log::error!("failed to move item {} to tray: {}", item_id, err);
            self.notice = Some(Notice::MoveFailed);
        }
    }

    /// Run the mutation a completed drag resolved to
    pub async fn apply_drop(&mut self, command: DropCommand) {
        match command {
            DropCommand::Place {
                item,
                shelf,
                position,
            } => self.move_to_shelf(&item, shelf, position).await,
            DropCommand::Stow { item } => self.move_to_tray(&item).await,
        }
    }

    /// Delete an item outright
    pub async fn delete(&mut self, item_id: &str) {
        self.items.retain(|item| item.id != item_id);
        if let Err(err) = self.ctx.store.delete(&self.user_id, item_id).await {
            log::error!("failed to delete item {}: {}", item_id, err);
            self.notice = Some(Notice::DeleteFailed);
        }
    }

    /// Add a decor piece to the tray; the requested variant is clamped
    /// to the subtype's asset range.
    pub async fn add_decor(&mut self, kind: DecorKind, requested_variant: i64) {
        if !self.admit_one() {
            return;
        }
        match self
            .ctx
            .store
            .put(&self.user_id, &Item::decor(kind, requested_variant))
            .await
        {
            Ok(created) => self.items.push(created),
            Err(err) => {
                log::error!("failed to add {} decor: {}", kind.as_str(), err);
                self.notice = Some(Notice::AddDecorFailed);
            }
        }
    }

    /// Import one catalog volume into the tray
    pub async fn add_volume(&mut self, volume: &Volume) {
        if !self.admit_one() {
            return;
        }
        match self.ctx.store.put(&self.user_id, &volume.to_item()).await {
            Ok(created) => self.items.push(created),
            Err(err) => {
                log::error!("failed to add volume {}: {}", volume.external_id, err);
                self.notice = Some(Notice::AddBookFailed);
            }
        }
    }

    /// Free-text catalog search. Zero hits raise an informational
    /// notice; a failed request raises an error notice and yields an
    /// empty list. Neither blocks further actions.
    pub async fn search(&mut self, query: &str) -> Vec<Volume> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        match self.ctx.catalog.search(query, SEARCH_MAX_RESULTS).await {
            Ok(volumes) => {
                if volumes.is_empty() {
                    self.notice = Some(Notice::EmptySearch);
                }
                volumes
            }
            Err(err) => {
                log::error!("catalog search {:?} failed: {}", query, err);
                self.notice = Some(Notice::SearchFailed);
                Vec::new()
            }
        }
    }

    /// Fill the tray with a random batch of catalog volumes.
    ///
    /// Capacity is checked once before the batch begins, not per item.
    pub async fn random_fill(&mut self) {
        if !self.admit_one() {
            return;
        }
        let (subject, start_index) = {
            let mut rng = rand::thread_rng();
            (
                RANDOM_SUBJECTS.choose(&mut rng).copied().unwrap_or("fiction"),
                rng.gen_range(0..RANDOM_START_RANGE),
            )
        };
        let volumes = match self
            .ctx
            .catalog
            .by_subject(subject, RANDOM_FILL_COUNT, start_index)
            .await
        {
            Ok(volumes) => volumes,
            Err(err) => {
                log::error!("random fill fetch for {:?} failed: {}", subject, err);
                self.notice = Some(Notice::RandomFillFailed);
                return;
            }
        };
        if volumes.is_empty() {
            self.notice = Some(Notice::EmptyRandomFill);
            return;
        }
        let drafts: Vec<Item> = volumes.iter().map(Volume::to_item).collect();
        match self.ctx.store.put_many(&self.user_id, &drafts).await {
            Ok(created) => self.items.extend(created),
            Err(err) => {
                log::error!("random fill write failed: {}", err);
                self.notice = Some(Notice::RandomFillFailed);
            }
        }
    }

    // ---- internals ----

    /// Capacity gate for mutations that add one net-new tray item.
    /// On rejection no write happens at all.
    fn admit_one(&mut self) -> bool {
        if can_admit_one(self.tray_items().len()) {
            true
        } else {
            log::warn!("tray at capacity, mutation rejected");
            self.notice = Some(Notice::TrayFull);
            false
        }
    }

    fn apply_local_placement(&mut self, item_id: &str, placement: Placement) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == item_id) {
            item.placement = placement;
        }
    }
}
