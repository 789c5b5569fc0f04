// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Time-History Ring
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fixed-capacity ring of past time levels for multistep integrators.
//!
//! Every slot is always populated: the ring is created seeded with one value
//! and `push` overwrites the oldest level. Index 0 is the most recent level.

use std::ops::Index;

#[derive(Debug, Clone)]
pub struct HistoryRing<T> {
    slots: Vec<T>,
    head: usize,
}

impl<T: Clone> HistoryRing<T> {
    /// Ring of `capacity` levels (at least one), all equal to `value`.
    pub fn seeded(capacity: usize, value: T) -> Self {
        HistoryRing {
            slots: vec![value; capacity.max(1)],
            head: 0,
        }
    }

    /// Overwrite every level with `value`.
    pub fn reseed(&mut self, value: T) {
        for slot in &mut self.slots {
            slot.clone_from(&value);
        }
        self.head = 0;
    }
}

impl<T> HistoryRing<T> {
    /// Make `value` level 0; the oldest level is dropped.
    pub fn push(&mut self, value: T) {
        let cap = self.slots.len();
        self.head = (self.head + cap - 1) % cap;
        self.slots[self.head] = value;
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn latest(&self) -> &T {
        &self.slots[self.head]
    }

    /// Level `age` (0 = newest), `None` past the capacity.
    pub fn get(&self, age: usize) -> Option<&T> {
        if age < self.slots.len() {
            Some(&self.slots[(self.head + age) % self.slots.len()])
        } else {
            None
        }
    }

    /// Newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.slots.len()).map(move |age| &self.slots[(self.head + age) % self.slots.len()])
    }
}

impl<T> Index<usize> for HistoryRing<T> {
    type Output = T;

    fn index(&self, age: usize) -> &T {
        let cap = self.slots.len();
        assert!(age < cap, "history level {age} exceeds capacity {cap}");
        &self.slots[(self.head + age) % cap]
    }
}
