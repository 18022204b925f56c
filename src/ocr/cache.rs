//! Bounded least-recently-used cache of recognized text.
//!
//! Keys combine a field tag with the content hash of the crop, so a crop that
//! reappears in a later screenshot skips Tesseract entirely.

use std::collections::{BTreeMap, HashMap};

/// Default number of entries kept across scans.
pub const DEFAULT_CAPACITY: usize = 200;

struct Entry {
    value: String,
    last_used: u64,
}

/// Fixed-capacity LRU map from `String` keys to `String` values.
///
/// Both [`get`](Self::get) and [`put`](Self::put) count as a use. Recency is a
/// monotonically increasing tick; `order` maps tick -> key so the oldest entry
/// is always the first one in the B-tree.
pub struct ResultCache {
    capacity: usize,
    tick: u64,
    entries: HashMap<String, Entry>,
    order: BTreeMap<u64, String>,
}

impl ResultCache {
    /// Creates an empty cache. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    /// Builds the key for a field crop.
    pub fn key(field: &str, content_hash: &str) -> String {
        format!("{}{}", field, content_hash)
    }

    pub fn get(&mut self, key: &str) -> Option<String> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.last_used);
        entry.last_used = tick;
        self.order.insert(tick, key.to_string());
        Some(entry.value.clone())
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let tick = self.next_tick();

        if let Some(old) = self.entries.insert(
            key.clone(),
            Entry {
                value: value.into(),
                last_used: tick,
            },
        ) {
            self.order.remove(&old.last_used);
        }
        self.order.insert(tick, key);

        while self.entries.len() > self.capacity {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::trace!("Evicted cache entry {}", oldest);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
