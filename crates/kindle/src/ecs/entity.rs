//! # Entity — Generational Identifiers
//!
//! An [`Entity`] carries no data of its own. It is the key the
//! [`ComponentStore`](super::store::ComponentStore) uses to find components.
//!
//! ## Generational Indices
//!
//! Slots are recycled once an entity is destroyed, so a bare index is not
//! enough to tell a live entity from a stale handle that a system or a queued
//! event still holds:
//!
//! ```text
//! 1. create entity   -> Entity { index: 5, generation: 0 }
//! 2. handler keeps a copy of it
//! 3. destroy entity  -> slot 5 generation becomes 1
//! 4. create entity   -> Entity { index: 5, generation: 1 }
//! 5. handler uses its copy -> generation 0 != 1, lookup fails safely
//! ```
//!
//! Every store access validates the generation first, which is what makes
//! destroying an entity mid-tick safe for anyone still holding its id.

use std::fmt;

/// A lightweight handle to an entity in a [`World`](super::world::World).
///
/// Only meaningful for the world that created it, and only while its
/// generation matches the slot's current generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Returns the raw slot index. Useful for diagnostics.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation. Useful for diagnostics.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity ids and recycles destroyed slots.
///
/// ```text
/// generations: [0, 1, 0, 2]   ← current generation of every slot
/// free_list:   [1]            ← destroyed slots, reused LIFO
/// ```
///
/// A slot whose generation reaches `u32::MAX` is retired: it is never put
/// back on the free list, so no handle can ever alias it.
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
    alive: usize,
}

const RETIRED: u32 = u32::MAX;

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
            alive: 0,
        }
    }

    /// Allocate a new [`Entity`], reusing a freed slot when one exists.
    ///
    /// # Panics
    ///
    /// Panics when every `u32` slot is in use. Running out of entity ids is
    /// resource exhaustion, not a recoverable error.
    pub fn allocate(&mut self) -> Entity {
        self.alive += 1;
        if let Some(index) = self.free_list.pop() {
            let generation = self.generations[index as usize];
            return Entity { index, generation };
        }
        let index = u32::try_from(self.generations.len())
            .unwrap_or_else(|_| panic!("entity slots exhausted"));
        self.generations.push(0);
        Entity {
            index,
            generation: 0,
        }
    }

    /// Free an entity's slot. Returns `false` if the handle was already stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.alive -= 1;
        self.bump(entity.index);
        true
    }

    /// Whether the handle still refers to a live entity.
    pub fn is_alive(&self, entity: Entity) -> bool {
        entity.generation != RETIRED
            && self
                .generations
                .get(entity.index as usize)
                .is_some_and(|&generation| generation == entity.generation)
    }

    /// Number of live entities.
    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Total slots ever handed out.
    #[cfg(test)]
    pub fn total_slots(&self) -> usize {
        self.generations.len()
    }

    /// Forget every entity. Generations are bumped so old handles stay stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        self.alive = 0;
        // Pushed in reverse so low indices are reused first.
        for index in (0..self.generations.len()).rev() {
            if self.generations[index] != RETIRED {
                self.bump(index as u32);
            }
        }
    }

    fn bump(&mut self, index: u32) {
        let slot = &mut self.generations[index as usize];
        *slot += 1;
        if *slot != RETIRED {
            self.free_list.push(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let e1 = alloc.allocate();
        assert_eq!(e0.index, 0);
        assert_eq!(e1.index, 1);
        assert_eq!(e0.generation, 0);
    }

    #[test]
    fn recycle_bumps_generation() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        assert!(alloc.deallocate(e0));
        let reused = alloc.allocate();
        assert_eq!(reused.index, 0);
        assert_eq!(reused.generation, 1);
        assert!(!alloc.is_alive(e0));
        assert!(alloc.is_alive(reused));
    }

    #[test]
    fn double_free_returns_false() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        assert!(alloc.deallocate(e0));
        assert!(!alloc.deallocate(e0));
    }

    #[test]
    fn alive_count_tracks_free_slots() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let _e1 = alloc.allocate();
        assert_eq!(alloc.alive_count(), 2);
        alloc.deallocate(e0);
        assert_eq!(alloc.alive_count(), 1);
        assert_eq!(alloc.total_slots(), 2);
    }

    #[test]
    fn clear_invalidates_every_handle() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let e1 = alloc.allocate();
        alloc.clear();
        assert_eq!(alloc.alive_count(), 0);
        assert!(!alloc.is_alive(e0));
        assert!(!alloc.is_alive(e1));

        let fresh = alloc.allocate();
        assert_eq!(fresh.index, 0);
        assert_eq!(fresh.generation, 1);
    }

    #[test]
    fn retired_slot_is_never_reused() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        alloc.generations[0] = RETIRED - 1;
        let old = Entity {
            index: e0.index,
            generation: RETIRED - 1,
        };
        assert!(alloc.deallocate(old));
        assert_eq!(alloc.alive_count(), 0);
        let next = alloc.allocate();
        assert_eq!(next.index, 1);
    }
}
