//! Bookmark store: ordered, duplicate-free favorites.
//!
//! # Responsibility
//! - Own the in-memory bookmark list and persist it after every change.
//! - Broadcast `bookmark-changed` with the new list.
//!
//! # Invariants
//! - No duplicates; display order survives persistence round-trips.
//! - Reads never touch disk after `load`.
//! - A failed save restores the previous list and publishes nothing.

use crate::bus::{ChangeBus, ChangeEvent};
use crate::error::{LauncherError, LauncherResult};
use crate::model::item::{normalize_item_id, ItemId};
use crate::repo::bookmark_repo::BookmarkRepository;
use log::{error, info, warn};
use std::collections::HashSet;
use std::rc::Rc;

/// Use-case service over a bookmark repository.
pub struct BookmarkStore<R: BookmarkRepository> {
    repo: R,
    bus: Rc<ChangeBus>,
    bookmarks: Vec<ItemId>,
}

impl<R: BookmarkRepository> BookmarkStore<R> {
    /// Creates the store and loads the persisted list.
    pub fn open(repo: R, bus: Rc<ChangeBus>) -> Self {
        let mut store = Self {
            repo,
            bus,
            bookmarks: Vec::new(),
        };
        store.load();
        store
    }

    /// Re-reads the persisted list, replacing the in-memory copy.
    ///
    /// Missing or malformed input yields an empty list.
    pub fn load(&mut self) -> Vec<ItemId> {
        let loaded = match self.repo.load() {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    "event=bookmarks_load module=bookmarks status=degraded error={}",
                    err
                );
                Vec::new()
            }
        };

        self.bookmarks = dedup_preserving_order(loaded);
        info!(
            "event=bookmarks_load module=bookmarks status=ok count={}",
            self.bookmarks.len()
        );
        self.bookmarks.clone()
    }

    /// Snapshot of the current list in display order.
    pub fn list(&self) -> Vec<ItemId> {
        self.bookmarks.clone()
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.bookmarks.iter().any(|entry| entry == item_id.trim())
    }

    /// Appends `item_id` if absent. Returns whether the list changed.
    pub fn add(&mut self, item_id: &str) -> LauncherResult<bool> {
        let item_id = normalize_item_id(item_id)?;
        if self.contains(&item_id) {
            return Ok(false);
        }

        let mut next = self.bookmarks.clone();
        next.push(item_id);
        self.commit(next, "add")?;
        Ok(true)
    }

    /// Removes `item_id` if present. Returns whether the list changed.
    pub fn remove(&mut self, item_id: &str) -> LauncherResult<bool> {
        let item_id = normalize_item_id(item_id)?;
        let Some(position) = self.position(&item_id) else {
            return Ok(false);
        };

        let mut next = self.bookmarks.clone();
        next.remove(position);
        self.commit(next, "remove")?;
        Ok(true)
    }

    /// Moves `item_id` to `new_index`, clamped to the list bounds.
    ///
    /// Returns whether the list changed; an absent item is a no-op.
    pub fn reorder(&mut self, item_id: &str, new_index: usize) -> LauncherResult<bool> {
        let item_id = normalize_item_id(item_id)?;
        let Some(position) = self.position(&item_id) else {
            return Ok(false);
        };

        let mut next = self.bookmarks.clone();
        let moved = next.remove(position);
        let target = new_index.min(next.len());
        if target == position {
            return Ok(false);
        }
        next.insert(target, moved);
        self.commit(next, "reorder")?;
        Ok(true)
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.bookmarks.iter().position(|entry| entry == item_id)
    }

    fn commit(&mut self, next: Vec<ItemId>, action: &str) -> LauncherResult<()> {
        if let Err(err) = self.repo.save(&next) {
            error!(
                "event=bookmarks_save module=bookmarks status=error action={} error={}",
                action, err
            );
            return Err(LauncherError::from(err));
        }

        self.bookmarks = next;
        info!(
            "event=bookmarks_save module=bookmarks status=ok action={} count={}",
            action,
            self.bookmarks.len()
        );
        self.bus.publish(&ChangeEvent::BookmarkChanged {
            bookmarks: self.bookmarks.clone(),
        });
        Ok(())
    }
}

fn dedup_preserving_order(items: Vec<ItemId>) -> Vec<ItemId> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|raw| normalize_item_id(&raw).ok())
        .filter(|item_id| seen.insert(item_id.clone()))
        .collect()
}
