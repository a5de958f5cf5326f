use std::{collections::HashMap, hash::Hash, mem};

/// A map that also keeps its keys in recency order.
///
/// Every entry stores the keys of its neighbours, so the map doubles as the
/// index of an intrusive doubly linked list running from `oldest` to `newest`.
#[derive(Debug)]
pub(crate) struct LruMap<K, V> {
    items: HashMap<K, Entry<K, V>>,
    oldest: Option<K>,
    newest: Option<K>,
}

impl<K, V> LruMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        LruMap {
            items: HashMap::with_capacity(capacity),
            oldest: None,
            newest: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserts `key` as the newest entry. The key must not be present yet.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        debug_assert!(!self.items.contains_key(&key));

        let entry = Entry {
            value,
            prev: None,
            next: None,
        };
        self.items.insert(key.clone(), entry);

        self.insert_newest(&key);
    }

    /// Swaps in a new value for an existing key and marks it newest.
    ///
    /// Returns the previous value, or `None` (leaving the map untouched) when
    /// the key is missing.
    pub(crate) fn replace(&mut self, key: &K, value: V) -> Option<V> {
        let entry = self.items.get_mut(key)?;
        let old = mem::replace(&mut entry.value, value);
        self.set_newest(key)?;
        Some(old)
    }

    pub(crate) fn contains_key(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    /// Looks up a value without changing its position.
    pub(crate) fn peek(&self, key: &K) -> Option<&V> {
        self.items.get(key).map(|entry| &entry.value)
    }

    /// Marks `key` newest and hands out its value.
    pub(crate) fn touch(&mut self, key: &K) -> Option<&mut V> {
        self.set_newest(key)?;
        self.items.get_mut(key).map(|entry| &mut entry.value)
    }

    pub(crate) fn take_oldest(&mut self) -> Option<(K, V)> {
        let oldest = self.oldest.clone()?;
        let value = self.remove(&oldest)?;

        Some((oldest, value))
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key)?;

        let entry = self.items.remove(key)?;

        Some(entry.value)
    }

    pub(crate) fn set_newest(&mut self, key: &K) -> Option<()> {
        if self.newest.as_ref() == Some(key) {
            return Some(());
        }
        self.remove_entry(key)?;
        self.insert_newest(key)?;
        Some(())
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.oldest = None;
        self.newest = None;
    }

    /// Keys from oldest to newest.
    pub(crate) fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            map: self,
            cursor: self.oldest.as_ref(),
            remaining: self.items.len(),
        }
    }

    /// Unlinks `key` from its neighbours. The entry itself stays in `items`.
    fn remove_entry(&mut self, key: &K) -> Option<()> {
        let entry = self.items.get(key)?;
        let (prev, next) = (entry.prev.clone(), entry.next.clone());

        match &prev {
            Some(prev) => self.items.get_mut(prev)?.next = next.clone(),
            None => self.oldest = next.clone(),
        }
        match &next {
            Some(next) => self.items.get_mut(next)?.prev = prev,
            None => self.newest = prev,
        }

        Some(())
    }

    fn insert_newest(&mut self, key: &K) -> Option<()> {
        let entry = self.items.get_mut(key)?;
        entry.prev = self.newest.clone();
        entry.next = None;

        if self.oldest.is_none() {
            self.oldest = Some(key.clone());
        }

        if let Some(newest) = &self.newest {
            self.items.get_mut(newest)?.next = Some(key.clone());
        }
        self.newest = Some(key.clone());

        Some(())
    }

    /// Walks the list in both directions and checks it against `items`.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self)
    where
        K: std::fmt::Debug,
    {
        let forward: Vec<&K> = self.keys().collect();
        assert_eq!(forward.len(), self.items.len(), "forward walk length");

        let mut backward = Vec::with_capacity(forward.len());
        let mut cursor = self.newest.as_ref();
        while let Some(key) = cursor {
            backward.push(key);
            cursor = self.items[key].prev.as_ref();
        }
        backward.reverse();
        assert_eq!(forward, backward, "backward walk disagrees");

        assert_eq!(self.oldest.as_ref(), forward.first().copied());
        assert_eq!(self.newest.as_ref(), forward.last().copied());
    }
}

#[derive(Debug)]
struct Entry<K, V> {
    value: V,
    next: Option<K>,
    prev: Option<K>,
}

pub(crate) struct Keys<'m, K, V> {
    map: &'m LruMap<K, V>,
    cursor: Option<&'m K>,
    remaining: usize,
}

impl<'m, K, V> Iterator for Keys<'m, K, V>
where
    K: Eq + Hash,
{
    type Item = &'m K;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        self.cursor = self.map.items.get(key).and_then(|entry| entry.next.as_ref());
        self.remaining = self.remaining.saturating_sub(1);
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'m, K, V> ExactSizeIterator for Keys<'m, K, V> where K: Eq + Hash {}
