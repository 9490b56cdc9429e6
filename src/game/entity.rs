//! Entity handles with generational indices
//!
//! Every sprite in a level (hero, spiders, coins, platforms, walls...) is an
//! `Entity`. Slots are reused after despawn, and the generation counter makes
//! old handles stop matching: a death-animation continuation captured for a
//! spider that was already cleared by a level restart can never act on
//! whatever entity reuses its slot.

use serde::{Deserialize, Serialize};

/// Handle to a live game object: slot index plus slot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Only the allocator mints handles (and tests).
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index, used to address component storage.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Placeholder for "no entity".
    pub const NULL: Entity = Entity { index: u32::MAX, generation: 0 };

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Hands out entity slots and tracks which handles are still alive.
pub struct EntityAllocator {
    /// Current generation per slot
    generations: Vec<u32>,
    /// Whether the slot is occupied right now
    occupied: Vec<bool>,
    /// Freed slots, reused LIFO
    free_indices: Vec<u32>,
    alive_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            occupied: Vec::new(),
            free_indices: Vec::new(),
            alive_count: 0,
        }
    }

    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            // Generation was bumped when the slot was freed
            self.occupied[index as usize] = true;
            Entity::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.occupied.push(true);
            Entity::new(index, 0)
        }
    }

    /// Free a slot. Returns false if the handle was already stale.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let idx = entity.index as usize;
        self.generations[idx] += 1;
        self.occupied[idx] = false;
        self.free_indices.push(entity.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        let idx = entity.index as usize;
        idx < self.generations.len() && self.occupied[idx] && self.generations[idx] == entity.generation
    }

    /// Rebuild the full handle for an occupied slot.
    ///
    /// Component storage is keyed by index only; systems iterating a storage
    /// use this to get back a handle they can hand to continuations.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        let idx = index as usize;
        if idx < self.occupied.len() && self.occupied[idx] {
            Some(Entity::new(index, self.generations[idx]))
        } else {
            None
        }
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Free every slot at once (level teardown).
    pub fn clear(&mut self) {
        self.free_indices.clear();
        for (i, gen) in self.generations.iter_mut().enumerate() {
            if self.occupied[i] {
                *gen += 1;
                self.occupied[i] = false;
            }
            self.free_indices.push(i as u32);
        }
        self.alive_count = 0;
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
