//! A bounded in-memory cache that evicts the least recently used entry.
//!
//! Both writes and successful reads count as a use. When a new key arrives at
//! a full cache, the entry untouched for the longest time is dropped and every
//! registered eviction listener hears about it before the write returns.
//!
//! ```
//! use bounded_lru::BoundedLru;
//! use std::sync::{Arc, Mutex};
//!
//! let cache = BoundedLru::new(2).unwrap();
//! let evicted = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&evicted);
//! cache.on_evicted(move |key: &u32| sink.lock().unwrap().push(*key));
//!
//! cache.add_or_update(1, "one").unwrap();
//! cache.add_or_update(2, "two").unwrap();
//!
//! // This `get` touches 1 so 2 is now the oldest.
//! assert_eq!(cache.get(&1), Some("one"));
//!
//! cache.add_or_update(3, "three").unwrap();
//! assert_eq!(*evicted.lock().unwrap(), vec![2]);
//! assert_eq!(cache.eviction_queue(), vec![1, 3]);
//! ```

use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::{hash::Hash, num::NonZeroUsize};

mod error;
pub use error::{Argument, Error, Result};
mod listener;
pub use listener::EvictionListener;
use listener::Listeners;
mod lru_map;
use lru_map::LruMap;
mod presence;
pub use presence::{AlwaysPresent, Presence};

/// Capacity used by [`BoundedLru::default`].
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(capacity) => capacity,
    None => panic!("default capacity must be non-zero"),
};

/// Capacity-bounded LRU cache, safe to share between threads.
///
/// Every operation runs under one lock, so the recency order and the stored
/// entries never disagree. Eviction listeners run while that lock is held and
/// must not call back into the same cache.
pub struct BoundedLru<K, V> {
    capacity: NonZeroUsize,
    inner: Mutex<Inner<K, V>>,
}

struct Inner<K, V> {
    entries: LruMap<K, V>,
    listeners: Listeners<K>,
}

impl<K, V> BoundedLru<K, V>
where
    K: Eq + Hash + Clone + Presence + 'static,
    V: Presence,
{
    /// Fails with [`Error::InvalidConfiguration`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        match NonZeroUsize::new(capacity) {
            Some(capacity) => Ok(Self::with_capacity(capacity)),
            None => Err(Error::InvalidConfiguration { capacity }),
        }
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        debug!("creating LRU cache holding up to {} entries", capacity);
        BoundedLru {
            capacity,
            inner: Mutex::new(Inner {
                entries: LruMap::with_capacity(capacity.get()),
                listeners: Listeners::new(),
            }),
        }
    }

    /// Stores `value` under `key` and marks the key most recently used.
    ///
    /// A new key arriving at a full cache first evicts the least recently
    /// used entry. The eviction and the insert commit together; listeners are
    /// told afterwards, in registration order. If a listener panics the panic
    /// reaches the caller, but the cache already holds the new entry and
    /// remains usable.
    pub fn add_or_update(&self, key: K, value: V) -> Result<()> {
        reject_absent(&key, Argument::Key)?;
        reject_absent(&value, Argument::Value)?;

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if inner.entries.contains_key(&key) {
            inner.entries.replace(&key, value);
            trace!("updated existing entry");
            return Ok(());
        }

        let evicted = if inner.entries.len() >= self.capacity.get() {
            inner.entries.take_oldest()
        } else {
            None
        };
        inner.entries.insert(key, value);
        trace!("inserted entry, {} resident", inner.entries.len());

        if let Some((key, _value)) = evicted {
            debug!(
                "evicted least recently used entry, notifying {} listener(s)",
                inner.listeners.len()
            );
            inner.listeners.notify(&key);
        }

        Ok(())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Removes `key` outright. Listeners are not told; they only observe
    /// entries dropped to make room.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().entries.remove(key)
    }

    /// Drops every entry without notifying listeners.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Keys from least to most recently used, copied out of the cache.
    pub fn eviction_queue(&self) -> Vec<K> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Registers a listener called with each evicted key.
    ///
    /// Registrations accumulate and cannot be undone.
    pub fn on_evicted(&self, listener: impl EvictionListener<K>) {
        self.register(Box::new(listener));
    }

    fn register(&self, listener: Box<dyn EvictionListener<K>>) {
        let mut inner = self.inner.lock();
        inner.listeners.register(listener);
        debug!("registered eviction listener #{}", inner.listeners.len());
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

impl<K, V> BoundedLru<K, V>
where
    K: Eq + Hash + Clone + Presence + 'static,
    V: Presence + Clone,
{
    /// Looks up `key`, marking it most recently used on a hit.
    ///
    /// The value is copied out, so the lock is released before returning.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        match inner.entries.touch(key) {
            Some(value) => {
                trace!("cache hit");
                Some(value.clone())
            }
            None => {
                trace!("cache miss");
                None
            }
        }
    }

    /// Looks up `key` without changing its position.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().entries.peek(key).cloned()
    }
}

impl<K, V> Default for BoundedLru<K, V>
where
    K: Eq + Hash + Clone + Presence + 'static,
    V: Presence,
{
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

fn reject_absent<T: Presence>(candidate: &T, argument: Argument) -> Result<()> {
    if candidate.is_absent() {
        warn!("rejected absent {}", argument);
        return Err(Error::InvalidArgument { argument });
    }
    Ok(())
}

/// Object-safe view of a cache: store, fetch a copy, observe evictions.
pub trait MemoryCache<K, V> {
    fn add_or_update(&self, key: K, value: V) -> Result<()>;

    fn try_get(&self, key: &K) -> Option<V>;

    fn on_evicted(&self, listener: Box<dyn EvictionListener<K>>);
}

impl<K, V> MemoryCache<K, V> for BoundedLru<K, V>
where
    K: Eq + Hash + Clone + Presence + 'static,
    V: Presence + Clone,
{
    fn add_or_update(&self, key: K, value: V) -> Result<()> {
        BoundedLru::add_or_update(self, key, value)
    }

    fn try_get(&self, key: &K) -> Option<V> {
        self.get(key)
    }

    fn on_evicted(&self, listener: Box<dyn EvictionListener<K>>) {
        self.register(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        panic::{self, AssertUnwindSafe},
        sync::{Arc, Mutex as StdMutex},
    };

    fn is_sync<T: Sync>() -> bool {
        true
    }
    fn is_send<T: Send>() -> bool {
        true
    }

    fn assert_consistent<K, V>(cache: &BoundedLru<K, V>)
    where
        K: Eq + Hash + Clone + Presence + std::fmt::Debug + 'static,
        V: Presence,
    {
        let inner = cache.inner.lock();
        inner.entries.assert_consistent();
        assert!(inner.entries.len() <= cache.capacity());
    }

    fn recorder<K>(cache: &BoundedLru<K, &'static str>) -> Arc<StdMutex<Vec<K>>>
    where
        K: Eq + Hash + Clone + Presence + Send + 'static,
    {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        cache.on_evicted(move |key: &K| sink.lock().unwrap().push(key.clone()));
        seen
    }

    #[test]
    fn cache_send_sync() {
        assert!(is_send::<BoundedLru<String, String>>());
        assert!(is_sync::<BoundedLru<String, String>>());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = BoundedLru::<u32, u32>::new(0).err();
        assert_eq!(err, Some(Error::InvalidConfiguration { capacity: 0 }));
    }

    #[test]
    fn default_holds_three() {
        let cache: BoundedLru<u32, u32> = BoundedLru::default();
        assert_eq!(cache.capacity(), 3);
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_one_swaps_occupant() {
        let cache = BoundedLru::new(1).unwrap();
        let evicted = recorder(&cache);

        cache.add_or_update(1, "a").unwrap();
        cache.add_or_update(1, "b").unwrap();
        assert!(evicted.lock().unwrap().is_empty());

        cache.add_or_update(2, "c").unwrap();
        assert_eq!(*evicted.lock().unwrap(), vec![1]);
        assert_eq!(cache.eviction_queue(), vec![2]);
        assert_consistent(&cache);
    }

    #[test]
    fn update_does_not_evict() {
        let cache = BoundedLru::new(2).unwrap();
        let evicted = recorder(&cache);

        cache.add_or_update(1, "a").unwrap();
        cache.add_or_update(2, "b").unwrap();
        cache.add_or_update(1, "c").unwrap();

        assert!(evicted.lock().unwrap().is_empty());
        assert_eq!(cache.eviction_queue(), vec![2, 1]);
        assert_eq!(cache.get(&1), Some("c"));
        assert_consistent(&cache);
    }

    #[test]
    fn absent_key_leaves_cache_unchanged() {
        let cache: BoundedLru<&str, &str> = BoundedLru::new(3).unwrap();
        cache.add_or_update("Key1", "Value1").unwrap();

        let err = cache.add_or_update("", "Value2").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument {
                argument: Argument::Key
            }
        );
        assert_eq!(cache.eviction_queue(), vec!["Key1"]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn absent_value_leaves_cache_unchanged() {
        let cache: BoundedLru<&str, Option<String>> = BoundedLru::new(1).unwrap();
        cache.add_or_update("Key1", Some("v".to_string())).unwrap();

        let err = cache.add_or_update("Key2", None).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument {
                argument: Argument::Value
            }
        );
        assert_eq!(cache.eviction_queue(), vec!["Key1"]);
        assert!(cache.contains(&"Key1"));
    }

    #[test]
    fn miss_does_not_reorder() {
        let cache = BoundedLru::new(3).unwrap();
        cache.add_or_update(1, "a").unwrap();
        cache.add_or_update(2, "b").unwrap();

        assert!(cache.get(&9).is_none());
        assert_eq!(cache.eviction_queue(), vec![1, 2]);
    }

    #[test]
    fn repeated_get_is_stable() {
        let cache = BoundedLru::new(3).unwrap();
        for key in 1..=3 {
            cache.add_or_update(key, "v").unwrap();
        }

        for _ in 0..2 {
            assert_eq!(cache.get(&2), Some("v"));
            assert_eq!(cache.eviction_queue().last(), Some(&2));
        }
        assert_eq!(cache.eviction_queue(), vec![1, 3, 2]);
    }

    #[test]
    fn lookups_release_the_lock() {
        let cache = BoundedLru::new(2).unwrap();
        cache.add_or_update(1, "a").unwrap();
        cache.add_or_update(2, "b").unwrap();

        let first = cache.get(&1);
        let second = cache.get(&2);
        let peeked = cache.peek(&1);
        cache.add_or_update(3, "c").unwrap();

        assert_eq!((first, second, peeked), (Some("a"), Some("b"), Some("a")));
        assert_eq!(cache.eviction_queue(), vec![2, 3]);
    }

    #[test]
    fn peek_and_contains_do_not_touch() {
        let cache = BoundedLru::new(2).unwrap();
        cache.add_or_update(1, "a").unwrap();
        cache.add_or_update(2, "b").unwrap();

        assert_eq!(cache.peek(&1), Some("a"));
        assert!(cache.contains(&1));
        assert!(cache.peek(&3).is_none());

        cache.add_or_update(3, "c").unwrap();
        assert!(!cache.contains(&1));
    }

    #[test]
    fn remove_and_clear_skip_listeners() {
        let cache = BoundedLru::new(3).unwrap();
        let evicted = recorder(&cache);
        for key in 1..=3 {
            cache.add_or_update(key, "v").unwrap();
        }

        assert_eq!(cache.remove(&2), Some("v"));
        assert_eq!(cache.remove(&2), None);
        assert_eq!(cache.eviction_queue(), vec![1, 3]);
        assert_consistent(&cache);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.eviction_queue().is_empty());
        assert!(evicted.lock().unwrap().is_empty());
    }

    #[test]
    fn every_listener_fires_in_order() {
        let cache = BoundedLru::new(1).unwrap();
        let calls = Arc::new(StdMutex::new(Vec::new()));
        for tag in ["first", "second"].iter().copied() {
            let calls = Arc::clone(&calls);
            cache.on_evicted(move |key: &u8| calls.lock().unwrap().push((tag, *key)));
        }
        assert_eq!(cache.listener_count(), 2);

        cache.add_or_update(1, "a").unwrap();
        cache.add_or_update(2, "b").unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![("first", 1), ("second", 1)]);
    }

    #[test]
    fn panicking_listener_leaves_cache_usable() {
        let cache = BoundedLru::new(2).unwrap();
        cache.on_evicted(|_: &u8| panic!("listener failed"));

        cache.add_or_update(1, "a").unwrap();
        cache.add_or_update(2, "b").unwrap();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| cache.add_or_update(3, "c")));
        assert!(outcome.is_err());

        assert_eq!(cache.eviction_queue(), vec![2, 3]);
        assert!(!cache.contains(&1));
        cache.add_or_update(2, "d").unwrap();
        assert_eq!(cache.get(&2), Some("d"));
        assert_consistent(&cache);
    }

    #[test]
    fn trait_object_access() {
        let cache: Box<dyn MemoryCache<u32, String>> =
            Box::new(BoundedLru::<u32, String>::new(2).unwrap());
        let evicted = Arc::new(StdMutex::new(None));
        let sink = Arc::clone(&evicted);
        cache.on_evicted(Box::new(move |key: &u32| *sink.lock().unwrap() = Some(*key)));

        cache.add_or_update(1, "one".to_string()).unwrap();
        cache.add_or_update(2, "two".to_string()).unwrap();
        assert_eq!(cache.try_get(&1), Some("one".to_string()));
        cache.add_or_update(3, "three".to_string()).unwrap();

        assert_eq!(*evicted.lock().unwrap(), Some(2));
        assert_eq!(cache.try_get(&2), None);
    }
}
