//! Read-write entity cache.
//!
//! Rows are cached by primary key. Reads populate the cache, writes
//! invalidate the affected keys once their transaction has committed. There
//! is no eviction besides explicit invalidation.
//!
//! Every key carries a generation that invalidation bumps. A reader takes a
//! [`Stamp`] before going to the store and hands it back with the row it
//! read; if a write was invalidated in between, the row is dropped instead
//! of cached.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

/// Generation of a key at lookup time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stamp(u64);

#[derive(Debug)]
struct Slot<V> {
    value: Option<V>,
    generation: u64,
}

#[derive(Debug)]
pub struct EntityCache<V> {
    slots: RwLock<HashMap<i64, Slot<V>>>,
}

impl<V> Default for EntityCache<V> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone> EntityCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: i64) -> Option<V> {
        self.lookup(id).0
    }

    /// Cached value of `id` along with the stamp to fill it with on a miss.
    pub fn lookup(&self, id: i64) -> (Option<V>, Stamp) {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        match slots.get(&id) {
            Some(slot) => (slot.value.clone(), Stamp(slot.generation)),
            None => (None, Stamp(0)),
        }
    }

    /// Cache `value` unless `id` was invalidated since `stamp` was taken.
    ///
    /// Returns whether the value was stored.
    pub fn put(&self, id: i64, value: V, stamp: Stamp) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(id).or_insert(Slot {
            value: None,
            generation: 0,
        });
        if slot.generation != stamp.0 {
            tracing::trace!(id, "stale cache fill dropped");
            return false;
        }
        slot.value = Some(value);
        true
    }

    pub fn invalidate(&self, id: i64) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        bump(&mut slots, id);
    }

    pub fn invalidate_all<I>(&self, ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        for id in ids {
            bump(&mut slots, id);
        }
    }

    /// Drop every cached value. Fills in flight for known keys are rejected.
    pub fn clear(&self) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        for slot in slots.values_mut() {
            slot.value = None;
            slot.generation += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.value.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn bump<V>(slots: &mut HashMap<i64, Slot<V>>, id: i64) {
    let slot = slots.entry(id).or_insert(Slot {
        value: None,
        generation: 0,
    });
    slot.value = None;
    slot.generation += 1;
}
