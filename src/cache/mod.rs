//! Bounded score cache shared by concurrent evaluations
//!
//! Oracle answers are keyed by content + parameters and never change once
//! stored, so the cache only has to bound memory: when full, the least
//! recently used entry is evicted.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use tokio::sync::Mutex;

pub const DEFAULT_CAPACITY: usize = 1024;

pub struct ScoreCache<K, V> {
    capacity: usize,
    state: Mutex<LruState<K, V>>,
}

struct LruState<K, V> {
    entries: HashMap<K, (V, u64)>,
    recency: BTreeMap<u64, K>,
    tick: u64,
}

impl<K, V> LruState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn touch(&mut self, key: &K) {
        let tick = self.next_tick();
        if let Some((_, stamp)) = self.entries.get_mut(key) {
            self.recency.remove(stamp);
            *stamp = tick;
            self.recency.insert(tick, key.clone());
        }
    }
}

impl<K, V> ScoreCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (0 disables caching)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(LruState {
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                tick: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a value, marking it as recently used
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut state = self.state.lock().await;
        let value = state.entries.get(key).map(|(value, _)| value.clone())?;
        state.touch(key);
        Some(value)
    }

    /// Insert a value unless the key is already present.
    ///
    /// Existing entries are never overwritten; a repeated insert only
    /// refreshes recency.
    pub async fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.state.lock().await;
        if state.entries.contains_key(&key) {
            state.touch(&key);
            return;
        }

        while state.entries.len() >= self.capacity {
            match state.recency.pop_first() {
                Some((_, oldest)) => {
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }

        let tick = state.next_tick();
        state.recency.insert(tick, key.clone());
        state.entries.insert(key, (value, tick));
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<K, V> Default for ScoreCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
