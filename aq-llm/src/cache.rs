use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

struct Entry {
    response: CachedResponse,
    expires_at: Instant,
}

/// LRU cache keyed by `model ∥ SHA256(system ∥ 0x00 ∥ user)`, with a
/// per-entry TTL checked on access. Entries past their TTL are dropped
/// rather than returned, even if still within LRU capacity.
pub struct ResponseCache {
    inner: Mutex<LruCache<String, Entry>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self { inner: Mutex::new(LruCache::new(capacity)), ttl }
    }

    pub fn key(model: &str, system: &str, user: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(system.as_bytes());
        hasher.update([0u8]);
        hasher.update(user.as_bytes());
        let digest = hasher.finalize();
        format!("{model}:{}", hex_encode(&digest))
    }

    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        let expired = match inner.peek(key) {
            Some(entry) => Instant::now() >= entry.expires_at,
            None => return None,
        };
        if expired {
            return None;
        }
        inner.get(key).map(|entry| entry.response.clone())
    }

    /// Read an entry ignoring its TTL, without promoting LRU order. Used
    /// only by the breaker-open fallback path: once the upstream is known
    /// to be degraded, a stale cached answer beats none at all, as long as
    /// the entry hasn't been evicted outright by capacity pressure.
    pub fn get_stale(&self, key: &str) -> Option<CachedResponse> {
        let inner = self.inner.lock().expect("cache mutex poisoned");
        inner.peek(key).map(|entry| entry.response.clone())
    }

    pub fn put(&self, key: String, response: CachedResponse) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.put(key, Entry { response, expires_at: Instant::now() + self.ttl });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(text: &str) -> CachedResponse {
        CachedResponse { text: text.to_string(), input_tokens: 1, output_tokens: 1 }
    }

    #[test]
    fn key_is_stable_for_same_inputs() {
        let a = ResponseCache::key("m", "sys", "user");
        let b = ResponseCache::key("m", "sys", "user");
        assert_eq!(a, b);
    }

    #[test]
    fn key_differs_when_boundary_shifts_between_system_and_user() {
        // "ab" + "" vs "a" + "b" must not collide even though concatenation
        // alone would produce the same bytes; the 0x00 separator prevents it.
        let a = ResponseCache::key("m", "ab", "");
        let b = ResponseCache::key("m", "a", "b");
        assert_ne!(a, b);
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        let key = ResponseCache::key("m", "s", "u");
        cache.put(key.clone(), resp("hello"));
        assert_eq!(cache.get(&key).unwrap().text, "hello");
    }

    #[test]
    fn expired_entries_are_not_returned_but_remain_for_stale_reads() {
        let cache = ResponseCache::new(10, Duration::from_millis(10));
        let key = ResponseCache::key("m", "s", "u");
        cache.put(key.clone(), resp("hello"));
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.get_stale(&key).unwrap().text, "hello");
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = ResponseCache::new(1, Duration::from_secs(60));
        let k1 = ResponseCache::key("m", "s1", "u");
        let k2 = ResponseCache::key("m", "s2", "u");
        cache.put(k1.clone(), resp("one"));
        cache.put(k2.clone(), resp("two"));
        assert!(cache.get(&k1).is_none());
        assert_eq!(cache.get(&k2).unwrap().text, "two");
    }
}
