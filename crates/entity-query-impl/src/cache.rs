// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Cache of rendered derived queries.
//!
//! The text of a derived query only depends on the dynamic sort and on which
//! arguments are `null` (those render as `IS NULL`). Both form the cache key.

use std::{num::NonZeroUsize, sync::Arc};

use entity_query_core::{ParameterAccessor, Sort};
use lru::LruCache;
use parking_lot::Mutex;

use crate::{binder::ParameterBinder, binding::ParameterBinding};

/// Default number of cached queries per method.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Rendered query text together with what binds it.
#[derive(Debug, Clone)]
pub struct CachedQuery {
    query:     String,
    bindings:  Vec<ParameterBinding>,
    binder:    ParameterBinder,
    use_tuple: bool
}

impl CachedQuery {
    /// Cache entry.
    pub fn new(query: String, bindings: Vec<ParameterBinding>, binder: ParameterBinder, use_tuple: bool) -> Self {
        Self {
            query,
            bindings,
            binder,
            use_tuple
        }
    }

    /// Rendered query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Bindings of the rendered query.
    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    /// Binder of the rendered query.
    pub const fn binder(&self) -> &ParameterBinder {
        &self.binder
    }

    /// Check if rows are read as tuples.
    pub const fn use_tuple_query(&self) -> bool {
        self.use_tuple
    }
}

/// Cache key: dynamic sort plus the null pattern of the arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    sort:  Sort,
    nulls: Vec<bool>
}

impl CacheKey {
    /// Key for an invocation.
    pub fn of(sort: &Sort, accessor: &dyn ParameterAccessor) -> Self {
        let nulls = (0..accessor.bindable_len())
            .map(|i| accessor.bindable_value(i).is_none_or(|value| value.is_null()))
            .collect();
        Self {
            sort: sort.clone(),
            nulls
        }
    }
}

/// LRU cache of [`CachedQuery`] entries, shared between threads.
#[derive(Debug)]
pub struct PartTreeQueryCache {
    entries: Mutex<LruCache<CacheKey, Arc<CachedQuery>>>
}

impl Default for PartTreeQueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl PartTreeQueryCache {
    /// Cache holding at most `capacity` entries; zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity))
        }
    }

    /// Cached entry for `key`, marking it as recently used.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CachedQuery>> {
        self.entries.lock().get(key).cloned()
    }

    /// Store `query` under `key`.
    pub fn put(&self, key: CacheKey, query: CachedQuery) -> Arc<CachedQuery> {
        let query = Arc::new(query);
        self.entries.lock().put(key, Arc::clone(&query));
        query
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use entity_query_core::{Arguments, Order, Value};

    use super::*;

    fn entry(query: &str) -> CachedQuery {
        CachedQuery::new(query.to_owned(), Vec::new(), ParameterBinder::default(), false)
    }

    #[test]
    fn key_tracks_sort_and_nulls() {
        let sort = Sort::by(["name"]);
        let a = CacheKey::of(&sort, &Arguments::of([Value::from("x"), Value::Null]));
        let b = CacheKey::of(&sort, &Arguments::of([Value::from("y"), Value::Null]));
        let c = CacheKey::of(&sort, &Arguments::of([Value::Null, Value::Null]));
        let d = CacheKey::of(&Sort::by_orders(vec![Order::desc("name")]), &Arguments::of([Value::from("x"), Value::Null]));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = PartTreeQueryCache::new(2);
        let key = |name: &str| CacheKey::of(&Sort::by([name]), &Arguments::new());
        cache.put(key("a"), entry("A"));
        cache.put(key("b"), entry("B"));
        assert!(cache.get(&key("a")).is_some());
        cache.put(key("c"), entry("C"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("b")).is_none());
        assert_eq!(cache.get(&key("a")).map(|q| q.query().to_owned()).as_deref(), Some("A"));
    }

    #[test]
    fn zero_capacity_holds_one() {
        let cache = PartTreeQueryCache::new(0);
        assert!(cache.is_empty());
        cache.put(CacheKey::of(&Sort::unsorted(), &Arguments::new()), entry("A"));
        assert_eq!(cache.len(), 1);
    }
}
