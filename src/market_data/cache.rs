// =============================================================================
// TtlCache — explicit memoisation for fetch results
// =============================================================================
//
// Keyed by the fetch arguments (unit for the ticker snapshot, the symbol for
// candles). Values are cheap-to-clone handles (`Arc<[T]>`), so reads copy a
// pointer and never hold the lock across an await.
//
// Concurrent misses on the same key both fetch; the later insert wins.
// =============================================================================

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// When a cached entry stops being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Entries expire `Duration` after insertion.
    Ttl(Duration),
    /// Entries live until `invalidate` / `clear` is called.
    Manual,
}

impl CachePolicy {
    /// `0` selects the manual-clear policy.
    pub fn from_ttl_secs(secs: u64) -> Self {
        if secs == 0 {
            Self::Manual
        } else {
            Self::Ttl(Duration::from_secs(secs))
        }
    }

    fn is_fresh(&self, stored_at: Instant) -> bool {
        match self {
            Self::Ttl(ttl) => stored_at.elapsed() < *ttl,
            Self::Manual => true,
        }
    }
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    policy: CachePolicy,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// Return the cached value for `key` if present and still fresh.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let map = self.entries.read();
        map.get(key)
            .filter(|e| self.policy.is_fresh(e.stored_at))
            .map(|e| e.value.clone())
    }

    /// Store `value`, replacing any previous entry. Expired entries for other
    /// keys are dropped at the same time.
    pub fn insert(&self, key: K, value: V) {
        let mut map = self.entries.write();
        if matches!(self.policy, CachePolicy::Ttl(_)) {
            map.retain(|_, e| self.policy.is_fresh(e.stored_at));
        }
        map.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop a single entry. Returns whether one was present.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.write().remove(key).is_some()
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut map = self.entries.write();
        let n = map.len();
        map.clear();
        n
    }

    /// Number of entries that would currently be served.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|e| self.policy.is_fresh(e.stored_at))
            .count()
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }
}
