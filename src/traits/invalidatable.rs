// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability traits for the cache-invalidation walk.
//!
//! Objects that memoize debuggee-derived state (a process caching its thread
//! list, a module caching its type table) declare their cache cells through
//! [`CacheOwner`], and every cell implements [`Invalidatable`]. The walk in
//! `crate::cache` is driven entirely by these two traits — there is no
//! hidden, type-specific traversal.

use std::sync::Arc;

/// A memoized value that must be discarded when debuggee state may have
/// changed.
pub trait Invalidatable: Send + Sync {
    /// Whether the cell currently holds a value.
    fn is_cached(&self) -> bool;

    /// Clear the cell. Returns the owners that were held by the discarded
    /// payload so the walk can recurse into their caches.
    fn invalidate(&self) -> Vec<Arc<dyn CacheOwner>>;
}

/// An object that declares invalidatable cache cells.
pub trait CacheOwner: Send + Sync {
    /// The cache cells this object owns. Borrowed, not transferred; the walk
    /// only calls [`Invalidatable::invalidate`] on them.
    fn invalidatable_slots(&self) -> Vec<&dyn Invalidatable>;
}

/// Conversion from a cached payload to the owners it holds.
///
/// Implemented for leaf values (no owners), containers, and `Arc`s of cache
/// owners; this is what lets `CacheCell<Vec<Arc<Thread>>>` hand its threads
/// back to the walk after the list itself has been dropped from the cache.
pub trait CachedPayload {
    fn cached_owners(&self) -> Vec<Arc<dyn CacheOwner>>;
}

impl<T: CacheOwner + 'static> CachedPayload for Arc<T> {
    fn cached_owners(&self) -> Vec<Arc<dyn CacheOwner>> {
        vec![self.clone() as Arc<dyn CacheOwner>]
    }
}

impl CachedPayload for Arc<dyn CacheOwner> {
    fn cached_owners(&self) -> Vec<Arc<dyn CacheOwner>> {
        vec![self.clone()]
    }
}

impl<T: CachedPayload> CachedPayload for Vec<T> {
    fn cached_owners(&self) -> Vec<Arc<dyn CacheOwner>> {
        self.iter().flat_map(CachedPayload::cached_owners).collect()
    }
}

impl<T: CachedPayload> CachedPayload for Option<T> {
    fn cached_owners(&self) -> Vec<Arc<dyn CacheOwner>> {
        self.as_ref().map(CachedPayload::cached_owners).unwrap_or_default()
    }
}

/// Marks types whose cached form holds no further cache owners.
macro_rules! leaf_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CachedPayload for $ty {
                fn cached_owners(&self) -> Vec<Arc<dyn CacheOwner>> {
                    Vec::new()
                }
            }
        )*
    };
}

leaf_payload!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, bool, f32, f64, String);
