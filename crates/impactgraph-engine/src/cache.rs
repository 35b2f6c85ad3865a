use dashmap::DashMap;
use impactgraph_core::{CacheConfig, ChangeType, ImpactPrediction, Result, SymbolId};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Identity of one prediction: the resolved symbol, the change kind and a
/// digest of the free-form simulated-change text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredictionKey {
    pub symbol: SymbolId,
    pub change_type: ChangeType,
    pub change_digest: String,
}

impl PredictionKey {
    pub fn new(symbol: SymbolId, change_type: ChangeType, simulated_change: Option<&str>) -> Self {
        let change_digest = match simulated_change {
            Some(change) => format!("change_{:x}", Sha256::digest(change.as_bytes())),
            None => "change_none".to_string(),
        };
        Self {
            symbol,
            change_type,
            change_digest,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

struct CacheEntry {
    value: Arc<ImpactPrediction>,
    created_at: SystemTime,
    access_count: u64,
}

impl CacheEntry {
    fn new(value: Arc<ImpactPrediction>) -> Self {
        Self {
            value,
            created_at: SystemTime::now(),
            access_count: 0,
        }
    }

    fn is_expired(&self, config: &CacheConfig) -> bool {
        match config.ttl {
            Some(ttl) => {
                self.created_at
                    .elapsed()
                    .unwrap_or(std::time::Duration::ZERO)
                    > ttl
            }
            None => false,
        }
    }
}

/// Memoizes full predictions keyed by scenario identity.
///
/// At-most-one concurrent computation per key: every key has a gate mutex;
/// the first caller through computes while later callers wait, re-check
/// the map and receive the first result without recomputing. A failed
/// computation caches nothing, so the next caller retries. Storage is a
/// bounded LRU with an optional TTL; there is no automatic invalidation
/// beyond that.
pub struct PredictionCache {
    entries: DashMap<PredictionKey, CacheEntry>,
    gates: DashMap<PredictionKey, Arc<tokio::sync::Mutex<()>>>,
    lru: Mutex<VecDeque<PredictionKey>>,
    stats: Mutex<CacheStats>,
    config: CacheConfig,
}

impl PredictionCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            gates: DashMap::new(),
            lru: Mutex::new(VecDeque::new()),
            stats: Mutex::new(CacheStats::default()),
            config,
        }
    }

    pub async fn get_or_compute<F, Fut>(
        &self,
        key: PredictionKey,
        compute: F,
    ) -> Result<Arc<ImpactPrediction>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ImpactPrediction>>,
    {
        if let Some(value) = self.peek(&key) {
            self.stats.lock().hits += 1;
            return Ok(value);
        }

        let gate = self
            .gates
            .entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let _guard = gate.lock().await;

        // A computation may have finished while we waited on the gate.
        if let Some(value) = self.peek(&key) {
            self.stats.lock().hits += 1;
            return Ok(value);
        }
        self.stats.lock().misses += 1;

        let value = Arc::new(compute().await?);
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Lookup without touching hit/miss counters; drops expired entries.
    fn peek(&self, key: &PredictionKey) -> Option<Arc<ImpactPrediction>> {
        let accesses = {
            let mut entry = self.entries.get_mut(key)?;
            if !entry.is_expired(&self.config) {
                entry.access_count += 1;
                return Some(entry.value.clone());
            }
            entry.access_count
        };
        debug!(?key, accesses, "cache entry expired");
        self.remove(key);
        None
    }

    fn insert(&self, key: PredictionKey, value: Arc<ImpactPrediction>) {
        self.entries.insert(key.clone(), CacheEntry::new(value));

        let mut lru = self.lru.lock();
        lru.retain(|k| k != &key);
        lru.push_back(key);
        while lru.len() > self.config.max_entries {
            if let Some(oldest) = lru.pop_front() {
                self.entries.remove(&oldest);
                self.gates.remove(&oldest);
                self.stats.lock().evictions += 1;
            }
        }
    }

    fn remove(&self, key: &PredictionKey) {
        self.entries.remove(key);
        self.gates.remove(key);
        self.lru.lock().retain(|k| k != key);
    }

    /// Drop one entry so the next request recomputes.
    pub fn invalidate(&self, key: &PredictionKey) {
        self.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.gates.clear();
        self.lru.lock().clear();
        self.stats.lock().entries = 0;
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();
        stats.entries = self.entries.len();
        stats
    }
}
