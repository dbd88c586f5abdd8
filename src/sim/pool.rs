//! Index-based entity pool for short-lived entities
//!
//! Bullets, meteors and particles churn fast enough that allocating one per
//! spawn would dominate the steady-state frame cost. The pool is a dense
//! slot arena plus a stack of recycled indices: `acquire` pops a free index
//! (or grows the arena by one default slot), `release` pushes it back. Both
//! are O(1) and dead slots are never iterated - live membership is tracked
//! by the caller's live lists, not by the pool.
//!
//! Pools grow on demand and never shrink. Blocks and powerups are not
//! pooled; their lifetimes track level boundaries.

/// A growable slot arena with a free-index stack.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<T>,
    free: Vec<u32>,
}

impl<T: Default> Pool<T> {
    /// Create a pool pre-warmed with `initial` free slots.
    pub fn with_capacity(initial: usize) -> Self {
        let mut slots = Vec::with_capacity(initial);
        let mut free = Vec::with_capacity(initial);
        for i in 0..initial {
            slots.push(T::default());
            free.push(i as u32);
        }
        Self { slots, free }
    }

    /// Take a slot out of the free stack, constructing a new one if empty.
    ///
    /// The returned slot holds whatever the previous occupant left behind;
    /// callers must fully re-initialize it before adding it to a live list.
    pub fn acquire(&mut self) -> u32 {
        if let Some(idx) = self.free.pop() {
            idx
        } else {
            self.slots.push(T::default());
            (self.slots.len() - 1) as u32
        }
    }

    /// Return a slot to the free stack.
    ///
    /// The caller must already have removed the index from every live list
    /// and cleared the entity's active flag. Double release is a programming
    /// error, checked in debug builds only.
    pub fn release(&mut self, idx: u32) {
        debug_assert!((idx as usize) < self.slots.len(), "release of unknown slot");
        debug_assert!(!self.free.contains(&idx), "double release of slot {idx}");
        self.free.push(idx);
    }

    #[inline]
    pub fn get(&self, idx: u32) -> &T {
        &self.slots[idx as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, idx: u32) -> &mut T {
        &mut self.slots[idx as usize]
    }

    /// Total slots, live and free
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots currently in the free stack
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// True if the index sits in the free stack (test/debug helper).
    pub fn is_free(&self, idx: u32) -> bool {
        self.free.contains(&idx)
    }
}

impl<T: Default> Default for Pool<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
