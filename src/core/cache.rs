//! C5 — Signal Cache.
//!
//! A bounded, TTL-expiring cache of [`ConsensusSignal`]s keyed by
//! `(pair, timeframe, bucket(as_of))`. Bucketing rounds `as_of` down to the
//! timeframe's own duration so that two requests for the same candle window
//! hit the same entry even if their `as_of` timestamps differ by a few
//! seconds (spec.md §4.4 step 1).

use crate::core::types::{ConsensusSignal, Timeframe};
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    pair: String,
    timeframe: Timeframe,
    bucket_secs: i64,
}

struct Entry {
    signal: ConsensusSignal,
    inserted_at: Instant,
}

pub struct SignalCache {
    entries: Mutex<LruCache<CacheKey, Entry>>,
    ttl: Duration,
}

impl SignalCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Look up a cached signal for `(pair, timeframe, as_of)`. Expired
    /// entries are evicted lazily, on access, rather than on a timer.
    pub fn get(&self, pair: &str, timeframe: Timeframe, as_of: DateTime<Utc>) -> Option<ConsensusSignal> {
        let key = Self::key_for(pair, timeframe, as_of);
        let mut entries = self.entries.lock();
        let expired = match entries.peek(&key) {
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
            None => return None,
        };
        if expired {
            entries.pop(&key);
            return None;
        }
        entries.get(&key).map(|entry| entry.signal.clone())
    }

    pub fn put(&self, pair: &str, timeframe: Timeframe, as_of: DateTime<Utc>, signal: ConsensusSignal) {
        let key = Self::key_for(pair, timeframe, as_of);
        self.entries.lock().put(
            key,
            Entry {
                signal,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key_for(pair: &str, timeframe: Timeframe, as_of: DateTime<Utc>) -> CacheKey {
        let bucket = timeframe.duration().as_secs() as i64;
        let bucket_secs = (as_of.timestamp() / bucket.max(1)) * bucket.max(1);
        CacheKey {
            pair: pair.to_uppercase(),
            timeframe,
            bucket_secs,
        }
    }
}
