//! Bounded in-memory memoization of upstream fetches.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::data_source::{FetchRequest, FetchedMarketData, MarketDataSource, SourceError};

/// Default number of (symbol, start, end) entries kept.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: FetchedMarketData,
    last_used: u64,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<FetchRequest, CacheEntry>,
    capacity: usize,
    tick: u64,
}

impl CacheInner {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            capacity,
            tick: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn get(&mut self, key: &FetchRequest) -> Option<FetchedMarketData> {
        let tick = self.next_tick();
        let entry = self.map.get_mut(key)?;
        entry.last_used = tick;
        Some(entry.data.clone())
    }

    fn put(&mut self, key: FetchRequest, data: FetchedMarketData) {
        if self.capacity == 0 {
            return;
        }

        if !self.map.contains_key(&key) && self.map.len() >= self.capacity {
            self.evict_least_recent();
        }

        let last_used = self.next_tick();
        self.map.insert(key, CacheEntry { data, last_used });
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .map
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.map.remove(&key);
        }
    }
}

/// Thread-safe LRU cache keyed on (symbol, start, end).
#[derive(Debug, Clone)]
pub struct FetchCache {
    inner: Arc<tokio::sync::Mutex<CacheInner>>,
}

impl FetchCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(tokio::sync::Mutex::new(CacheInner::new(capacity))),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Look up an entry and mark it most recently used.
    pub async fn get(&self, key: &FetchRequest) -> Option<FetchedMarketData> {
        let mut store = self.inner.lock().await;
        store.get(key)
    }

    /// Insert or replace an entry, evicting the least recently used one at capacity.
    pub async fn put(&self, key: FetchRequest, data: FetchedMarketData) {
        let mut store = self.inner.lock().await;
        store.put(key, data);
    }

    pub async fn len(&self) -> usize {
        let store = self.inner.lock().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn capacity(&self) -> usize {
        let store = self.inner.lock().await;
        store.capacity
    }
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Memoizing wrapper: successful fetches are served from a [`FetchCache`]; failures are not cached.
pub struct CachedSource<S> {
    inner: S,
    cache: FetchCache,
}

impl<S: MarketDataSource> CachedSource<S> {
    pub fn new(inner: S, cache: FetchCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: MarketDataSource> MarketDataSource for CachedSource<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn fetch<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedMarketData, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(hit) = self.cache.get(&req).await {
                debug!(symbol = %req.symbol, source = self.inner.name(), "fetch cache hit");
                return Ok(hit);
            }

            debug!(symbol = %req.symbol, source = self.inner.name(), "fetch cache miss");
            let data = self.inner.fetch(req.clone()).await?;
            self.cache.put(req, data.clone()).await;
            Ok(data)
        })
    }
}
