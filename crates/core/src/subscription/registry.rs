use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Opaque identifier for one live subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u64);

impl Handle {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Subscribers by handle, plus a reference count for every distinct key.
#[derive(Debug)]
pub struct Registry<K> {
    next_handle: u64,
    entries: HashMap<Handle, K>,
    counts: BTreeMap<K, usize>,
}

impl<K: Clone + Ord> Registry<K> {
    pub fn new() -> Self {
        Self {
            next_handle: 0,
            entries: HashMap::new(),
            counts: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: K) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;

        *self.counts.entry(key.clone()).or_insert(0) += 1;
        self.entries.insert(handle, key);

        handle
    }

    /// Remove a subscriber, returning its key. Unknown handles are a no-op.
    pub fn remove(&mut self, handle: Handle) -> Option<K> {
        let key = self.entries.remove(&handle)?;

        if let Some(count) = self.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&key);
            }
        }

        Some(key)
    }

    pub fn key(&self, handle: Handle) -> Option<&K> {
        self.entries.get(&handle)
    }

    pub fn ref_count(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.counts.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (Handle, &K)> {
        self.entries.iter().map(|(handle, key)| (*handle, key))
    }
}

impl<K: Clone + Ord> Default for Registry<K> {
    fn default() -> Self {
        Self::new()
    }
}
