//! Generational slot storage
//!
//! Every slot carries a generation counter that is bumped when the slot is
//! vacated. Handles remember the generation they were issued with, so a
//! handle to a removed node or document resolves to `None` instead of
//! aliasing whatever reuses the slot later.

/// Generation counter for a single slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Generation(u32);

impl Generation {
    /// Initial generation (never vacated)
    pub const INITIAL: Self = Generation(0);

    /// Get the raw value
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Get the next generation
    #[inline]
    pub const fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

/// Generational index for safe references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenIndex {
    index: u32,
    generation: Generation,
}

impl GenIndex {
    /// Slot index
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation the handle was issued with
    #[inline]
    pub fn generation(self) -> Generation {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    generation: Generation,
}

/// Generational arena (slot map)
#[derive(Debug)]
pub struct GenArena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> Default for GenArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GenArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Insert item
    pub fn insert(&mut self, value: T) -> GenIndex {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            GenIndex { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { value: Some(value), generation: Generation::INITIAL });
            GenIndex { index, generation: Generation::INITIAL }
        }
    }

    /// Get item
    pub fn get(&self, idx: GenIndex) -> Option<&T> {
        self.slots.get(idx.index as usize)
            .filter(|slot| slot.generation == idx.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Get mutable item
    pub fn get_mut(&mut self, idx: GenIndex) -> Option<&mut T> {
        self.slots.get_mut(idx.index as usize)
            .filter(|slot| slot.generation == idx.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Whether the handle still resolves
    pub fn contains(&self, idx: GenIndex) -> bool {
        self.get(idx).is_some()
    }

    /// Remove item, invalidating every outstanding handle to it
    pub fn remove(&mut self, idx: GenIndex) -> Option<T> {
        let slot = self.slots.get_mut(idx.index as usize)?;
        if slot.generation != idx.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.next();
        self.free_list.push(idx.index);
        self.len -= 1;
        Some(value)
    }

    /// Iterate live items with their handles
    pub fn iter(&self) -> impl Iterator<Item = (GenIndex, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value.as_ref().map(|v| {
                (GenIndex { index: i as u32, generation: slot.generation }, v)
            })
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
