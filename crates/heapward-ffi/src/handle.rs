//! Generational handle table for heaps owned on behalf of C callers.
//!
//! A handle packs a slot index (upper 32 bits) and that slot's generation
//! (lower 32 bits). Destroying a heap bumps the generation, so a stale
//! handle resolves to `None` rather than to whichever heap reuses the slot.

fn pack(index: u32, generation: u32) -> u64 {
    (u64::from(index) << 32) | u64::from(generation)
}

fn unpack(handle: u64) -> (usize, u32) {
    ((handle >> 32) as usize, handle as u32)
}

enum Entry<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<u32> },
}

/// Slot table with an intrusive free list threaded through vacant entries.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<u32>,
}

impl<T> HandleTable<T> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
        }
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        if let Some(index) = self.free_head {
            let entry = &mut self.entries[index as usize];
            let (generation, next_free) = match *entry {
                Entry::Vacant {
                    generation,
                    next_free,
                } => (generation, next_free),
                Entry::Occupied { .. } => unreachable!("free list points at an occupied slot"),
            };
            *entry = Entry::Occupied { generation, value };
            self.free_head = next_free;
            return pack(index, generation);
        }
        let index = self.entries.len() as u32;
        self.entries.push(Entry::Occupied {
            generation: 0,
            value,
        });
        pack(index, 0)
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        let (index, generation) = unpack(handle);
        match self.entries.get(index)? {
            Entry::Occupied {
                generation: g,
                value,
            } if *g == generation => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        let (index, generation) = unpack(handle);
        match self.entries.get_mut(index)? {
            Entry::Occupied {
                generation: g,
                value,
            } if *g == generation => Some(value),
            _ => None,
        }
    }

    /// Take the value out. Stale or repeated removal returns `None`.
    ///
    /// A slot whose generation would wrap to zero is left vacant and never
    /// linked into the free list, so an old handle can never match again.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (index, generation) = unpack(handle);
        match self.entries.get(index)? {
            Entry::Occupied { generation: g, .. } if *g == generation => {}
            _ => return None,
        }
        let next_generation = generation.wrapping_add(1);
        let retired = next_generation == 0;
        let vacant = Entry::Vacant {
            generation: next_generation,
            next_free: if retired { None } else { self.free_head },
        };
        let old = std::mem::replace(&mut self.entries[index], vacant);
        if !retired {
            self.free_head = Some(index as u32);
        }
        match old {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Number of live values.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Occupied { .. }))
            .count()
    }
}
