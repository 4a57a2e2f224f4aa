//! Memoized lookup handles.
//!
//! Cache-or-build-then-store: the cache holds at most one live
//! [`Lookup`] per application, rebuilt whenever the owning
//! application's registrations change. Construction happens outside the
//! lock and is side-effect-free on the registries, so concurrent first
//! accesses may build redundantly; only fully built snapshots are ever
//! published, never one under construction.

use crate::app::App;
use crate::lookup::Lookup;
use std::sync::{Arc, PoisonError, RwLock};

/// Caches one application's merged lookup.
#[derive(Default)]
pub struct LookupCache {
    slot: RwLock<Option<Arc<Lookup>>>,
}

impl LookupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized lookup for `app`, built on first access or when any
    /// merged layer has moved past the epoch it was built from.
    pub fn get(&self, app: &Arc<App>) -> Arc<Lookup> {
        {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(lookup) = slot.as_ref() {
                if lookup.is_fresh() {
                    return Arc::clone(lookup);
                }
            }
        }

        let built = Lookup::build(app);
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&built));
        built
    }

    /// Drop the memoized handle. Called by every mutation path on the
    /// owning application.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_returns_same_handle() {
        let app = App::create("cached", Vec::new());
        let cache = LookupCache::new();

        let first = cache.get(&app);
        let second = cache.get(&app);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalidate_drops_handle() {
        let app = App::create("cached", Vec::new());
        let cache = LookupCache::new();

        let first = cache.get(&app);
        cache.invalidate();
        let second = cache.get(&app);
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
