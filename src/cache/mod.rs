// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Invalidatable cache cells and the cache-invalidation walk.
//!
//! Debuggee-derived state is memoized aggressively (thread lists, module
//! tables, variable values) and all of it becomes stale the moment the
//! target runs. [`invalidate_caches`] walks the object graph from a session
//! root, clears every [`Invalidatable`] slot it can reach, and recurses into
//! the objects each cache was holding before it was cleared.
//!
//! The walk runs synchronously on the loop thread immediately after a stop
//! is acknowledged and before any caller-visible state is read, so a
//! breakpoint action always sees a consistent post-stop view.
//!
//! Cached-state graphs carry back-references (a module pointing at its
//! owning process), so the walk keeps a visited set of object identities per
//! pass; cyclic ownership terminates and no node is cleared twice.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::{CacheOwner, CachedPayload, Invalidatable};

/// A single memoized slot: validity flag and payload in one.
///
/// `CacheCell` is safe to clear while other threads hold the owning object;
/// the subsystem's external contract is that nobody inspects debuggee-derived
/// state while the target is running, so clears never race live readers.
pub struct CacheCell<T> {
    slot: Mutex<Option<T>>,
}

impl<T> CacheCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Whether the cell currently holds a value.
    pub fn is_cached(&self) -> bool {
        self.lock().is_some()
    }

    /// Store a value, replacing any cached one.
    pub fn set(&self, value: T) {
        *self.lock() = Some(value);
    }

    /// Drop the cached value, returning it.
    pub fn clear(&self) -> Option<T> {
        self.lock().take()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> CacheCell<T> {
    /// Return the cached value, computing and storing it first if the cell
    /// is empty.
    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> T {
        let mut slot = self.lock();
        slot.get_or_insert_with(compute).clone()
    }

    /// The cached value, if any, without computing.
    pub fn peek(&self) -> Option<T> {
        self.lock().clone()
    }
}

impl<T> Default for CacheCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CachedPayload + Send> Invalidatable for CacheCell<T> {
    fn is_cached(&self) -> bool {
        CacheCell::is_cached(self)
    }

    fn invalidate(&self) -> Vec<Arc<dyn CacheOwner>> {
        match self.clear() {
            Some(payload) => payload.cached_owners(),
            None => Vec::new(),
        }
    }
}

/// Clear every invalidatable slot reachable from `root`.
///
/// Returns the number of cells that actually held a value. Use it when the
/// debuggee state may have changed and every memoized value must go.
pub fn invalidate_caches(root: &Arc<dyn CacheOwner>) -> usize {
    let mut visited = HashSet::new();
    visited.insert(owner_identity(root));

    let mut pending: Vec<Arc<dyn CacheOwner>> = vec![Arc::clone(root)];
    let mut cleared = 0;

    while let Some(owner) = pending.pop() {
        for slot in owner.invalidatable_slots() {
            // Clear only slots which are cached.
            if !slot.is_cached() {
                continue;
            }
            let held = slot.invalidate();
            cleared += 1;

            for child in held {
                if visited.insert(owner_identity(&child)) {
                    pending.push(child);
                }
            }
        }
    }

    cleared
}

fn owner_identity(owner: &Arc<dyn CacheOwner>) -> usize {
    Arc::as_ptr(owner) as *const () as usize
}
