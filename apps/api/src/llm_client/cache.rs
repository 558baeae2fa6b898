#![allow(dead_code)]

//! In-process TTL cache for LLM responses.
//!
//! Document analysis and report prompts repeat verbatim when an admin
//! retries an upload or re-requests a report, so identical (model, system,
//! prompt) triples within the TTL are served from memory. Keys are SHA-256
//! digests; whole prompts never sit in the map as keys.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

struct CacheEntry {
    value: String,
    inserted_at: Instant,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// Point-in-time cache counters, for log lines.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct ResponseCache {
    inner: Mutex<CacheInner>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Digest of everything that shapes a completion. Two calls share a
    /// cache slot only if all three parts are byte-identical.
    pub fn key(model: &str, system: &str, prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update([0u8]);
        hasher.update(system.as_bytes());
        hasher.update([0u8]);
        hasher.update(prompt.as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        let live = inner.entries.get(key).and_then(|entry| {
            if now.duration_since(entry.inserted_at) < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        });

        match live {
            Some(value) => {
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.entries.remove(key);
                inner.misses += 1;
                None
            }
        }
    }

    /// Inserts a response, evicting the oldest entry when the cache is at
    /// capacity and the key is new.
    pub fn put(&self, key: String, value: String) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        if inner.entries.len() >= self.max_entries && !inner.entries.contains_key(&key) {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
            }
        }

        inner.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("cache lock poisoned");
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}
