//! Memoization seam for the pipeline's pure operations.
//!
//! Every derived-data operation is a pure function of its inputs, so a result
//! can be stored under a [`CacheKey`] that hashes the input identity and the
//! parameters. The cache itself is owned by the caller and injected; the
//! operations never reach for global state.

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use sha2::{Digest, Sha256};

use crate::error::Result;

pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// SHA-256 digest over an operation name, its inputs and parameters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn builder(operation: &str) -> KeyBuilder { KeyBuilder::new(operation) }

    pub fn to_hex(&self) -> String { hex::encode(self.0) }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", &self.to_hex()[..12])
    }
}

/// Incrementally hashes named components. Each component is length-prefixed
/// so `("ab", "c")` and `("a", "bc")` cannot collide.
pub struct KeyBuilder {
    hasher: Sha256,
}

impl KeyBuilder {
    fn new(operation: &str) -> Self {
        let mut builder = Self { hasher: Sha256::new() };
        builder.feed(b"op", operation.as_bytes());
        builder
    }

    fn feed(&mut self, name: &[u8], bytes: &[u8]) {
        for part in [name, bytes] {
            self.hasher.update((part.len() as u64).to_le_bytes());
            self.hasher.update(part);
        }
    }

    pub fn str(mut self, name: &str, value: &str) -> Self {
        self.feed(name.as_bytes(), value.as_bytes());
        self
    }

    pub fn u64(mut self, name: &str, value: u64) -> Self {
        self.feed(name.as_bytes(), &value.to_le_bytes());
        self
    }

    pub fn f64(mut self, name: &str, value: f64) -> Self {
        self.feed(name.as_bytes(), &value.to_bits().to_le_bytes());
        self
    }

    pub fn opt_u64(self, name: &str, value: Option<u64>) -> Self {
        match value {
            Some(v) => self.u64(name, v),
            None => self.str(name, "none"),
        }
    }

    /// Chain on a previously computed key (e.g. the dataset a table came from).
    pub fn key(mut self, name: &str, parent: &CacheKey) -> Self {
        self.feed(name.as_bytes(), &parent.0);
        self
    }

    pub fn finish(self) -> CacheKey { CacheKey(self.hasher.finalize().into()) }
}

/// Storage for memoized results.
pub trait Cache {
    fn get(&self, key: &CacheKey) -> Option<CachedValue>;
    fn put(&mut self, key: CacheKey, value: CachedValue);
}

/// Process-lifetime in-memory cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: HashMap<CacheKey, CachedValue>,
}

impl MemoryCache {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn clear(&mut self) { self.entries.clear() }
}

impl Cache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<CachedValue> { self.entries.get(key).cloned() }

    fn put(&mut self, key: CacheKey, value: CachedValue) { self.entries.insert(key, value); }
}

/// Cache that never stores anything; every call recomputes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<CachedValue> { None }

    fn put(&mut self, _key: CacheKey, _value: CachedValue) {}
}

/// Returns the cached value for `key`, or computes, stores and returns it.
/// An entry of the wrong type is treated as a miss and overwritten.
pub fn memoize<C, T, F>(cache: &mut C, key: CacheKey, compute: F) -> Result<Arc<T>>
where
    C: Cache + ?Sized,
    T: Any + Send + Sync,
    F: FnOnce() -> Result<T>,
{
    if let Some(hit) = cache.get(&key).and_then(|value| value.downcast::<T>().ok()) {
        log::debug!("cache hit {key:?}");
        return Ok(hit);
    }
    let value = Arc::new(compute()?);
    cache.put(key, value.clone());
    Ok(value)
}
