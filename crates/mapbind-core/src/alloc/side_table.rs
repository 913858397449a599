//! Generational slot table.
//!
//! A [`SideTable`] hands out [`SlotKey`]s for the values it stores. Removing a
//! value bumps the slot's generation, so a stale key never resolves to a value
//! inserted later into the same slot.

use crate::profiling::profile_function;
use std::num::NonZeroU64;

/// Key into a [`SideTable`]: slot index in the low half, generation in the high half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey(NonZeroU64);

impl SlotKey {
    pub fn new(generation: u32, idx: u32) -> Self {
        // The low half stores `idx + 1`, which keeps the raw value non-zero.
        let raw = ((generation as u64) << 32) | (idx as u64 + 1);
        Self(NonZeroU64::MIN.saturating_add(raw - 1))
    }

    pub fn generation(&self) -> u32 {
        (self.0.get() >> 32) as u32
    }

    pub fn index(&self) -> u32 {
        (self.0.get() & u32::MAX as u64) as u32 - 1
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage addressed by generational keys.
pub struct SideTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> SideTable<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> SlotKey {
        profile_function!();
        self.len += 1;
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.value = Some(value);
            SlotKey::new(slot.generation, idx)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            SlotKey::new(0, idx)
        }
    }

    fn slot(&self, key: SlotKey) -> Option<&Slot<T>> {
        self.slots
            .get(key.index() as usize)
            .filter(|slot| slot.generation == key.generation())
    }

    pub fn get(&self, key: SlotKey) -> Option<&T> {
        self.slot(key).and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        self.slots
            .get_mut(key.index() as usize)
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        self.get(key).is_some()
    }

    /// Remove the value behind `key`. Returns `None` for stale or unknown keys.
    pub fn remove(&mut self, key: SlotKey) -> Option<T> {
        profile_function!();
        let index = key.index();
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(value)
    }

    /// Remove every value, invalidating all outstanding keys.
    pub fn clear(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(idx as u32);
            }
        }
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.value
                .as_ref()
                .map(|value| (SlotKey::new(slot.generation, idx as u32), value))
        })
    }
}

impl<T> Default for SideTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_eq_size!(SlotKey, Option<SlotKey>);
