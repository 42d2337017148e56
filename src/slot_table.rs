//! The slot arena shared by every container in this crate.
//!
//! Entries live in a flat array of slots addressed by integer ids. Slot `0` is
//! reserved as the null link, so the first usable id is `1`. Collisions are
//! resolved with singly linked chains threaded through a parallel `next`
//! array, and removed slots are pushed onto a free list (threaded through the
//! same array) for reuse before the high-water mark advances.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::capacity::next_capacity;
use crate::error::Error;
use crate::error::Result;
use crate::policy::DuplicateKeyPolicy;
use crate::policy::InsertOutcome;

/// Identifier of a slot in a [`SlotTable`].
///
/// Ids are stable for as long as the entry stays in the table, including
/// across growth. Once an entry is removed its id may be handed out again.
pub type SlotId = usize;

/// The null link. Never refers to an entry.
pub const NIL: SlotId = 0;

/// Number of entries a table of `size` slots accepts before it grows.
#[inline(always)]
fn growth_threshold(size: usize) -> usize {
    size - size / 4
}

/// Computes the size a table grows into, or fails if the capacity list cannot
/// supply anything larger.
fn grown_size(size: usize, high_water: usize) -> Result<usize> {
    let new_size = next_capacity(size.saturating_mul(2));
    if new_size <= size || new_size <= high_water {
        return Err(Error::CapacityInvariantViolation { size, high_water });
    }
    Ok(new_size)
}

/// An open-chaining hash table over a slot arena.
///
/// `SlotTable<T>` stores values of type `T`. Like a raw hash table it does not
/// hash anything itself: every operation takes the 64-bit hash of the entry
/// and an equality predicate. The hash is stored next to the entry so growth
/// never has to recompute it.
///
/// ## Layout
///
/// - `buckets[hash & mask]` holds the first slot of the chain, or [`NIL`].
/// - `next[id]` links to the next slot in the same chain, or, for a free
///   slot, to the next free slot.
/// - `slots[id]` is `Some(entry)` while occupied.
///
/// The table grows to twice its size once the high-water mark passes three
/// quarters of the slot count.
///
/// ## Example
///
/// ```rust
/// use slot_hash::DuplicateKeyPolicy;
/// use slot_hash::slot_table::SlotTable;
///
/// let mut table: SlotTable<(u32, &str)> = SlotTable::with_capacity(4);
/// let hash = 10u64;
///
/// let (slot, outcome) = table
///     .entry(hash, |(k, _)| *k == 10)
///     .resolve((10, "ten"), DuplicateKeyPolicy::Replace)
///     .unwrap();
/// assert!(outcome.is_inserted());
/// assert_eq!(table.get(slot), Some(&(10, "ten")));
/// assert_eq!(table.find(hash, |(k, _)| *k == 10), Some(&(10, "ten")));
/// ```
#[derive(Clone)]
pub struct SlotTable<T> {
    buckets: Vec<SlotId>,
    next: Vec<SlotId>,
    hashes: Vec<u64>,
    slots: Vec<Option<T>>,

    high_water: usize,
    free_count: usize,
    next_free: SlotId,
    mask: usize,
}

impl<T> Debug for SlotTable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let chains = self
            .buckets
            .iter()
            .map(|&head| {
                let mut chain = Vec::new();
                let mut slot = head;
                while slot != NIL {
                    chain.push(slot);
                    slot = self.next[slot];
                }
                chain
            })
            .collect::<Vec<_>>();

        f.debug_struct("SlotTable")
            .field("size", &self.size())
            .field("len", &self.len())
            .field("high_water", &self.high_water)
            .field("free_count", &self.free_count)
            .field("next_free", &self.next_free)
            .field("chains", &chains)
            .finish()
    }
}

impl<T> SlotTable<T> {
    /// Creates a table with at least `capacity` slots.
    ///
    /// The slot count is rounded up by
    /// [`next_capacity`](crate::capacity::next_capacity), so it is always a
    /// power of two and never below 4.
    ///
    /// ```rust
    /// # use slot_hash::slot_table::SlotTable;
    /// let table: SlotTable<u64> = SlotTable::with_capacity(100);
    /// assert_eq!(table.size(), 128);
    /// assert!(table.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let size = next_capacity(capacity);
        Self {
            buckets: vec![NIL; size],
            next: vec![NIL; size],
            hashes: vec![0; size],
            slots: core::iter::repeat_with(|| None).take(size).collect(),
            high_water: 1,
            free_count: 0,
            next_free: NIL,
            mask: size - 1,
        }
    }

    /// Returns the number of slots, which is also the number of buckets.
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of entries the table holds before it grows.
    pub fn capacity(&self) -> usize {
        growth_threshold(self.size())
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.high_water - self.free_count - 1
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the next slot id that has never been allocated.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Returns the number of reclaimed slots waiting on the free list.
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    #[inline(always)]
    fn bucket_index(&self, hash: u64) -> usize {
        hash as usize & self.mask
    }

    /// Returns the entry stored in `slot`, if that slot is occupied.
    pub fn get(&self, slot: SlotId) -> Option<&T> {
        self.slots.get(slot)?.as_ref()
    }

    /// Returns a mutable reference to the entry stored in `slot`, if that slot
    /// is occupied.
    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut T> {
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Returns the stored hash of an occupied slot.
    pub fn hash_of(&self, slot: SlotId) -> Option<u64> {
        self.get(slot).map(|_| self.hashes[slot])
    }

    /// Walks the chain for `hash` and returns the slot whose entry satisfies
    /// `eq`.
    pub fn find_slot(&self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<SlotId> {
        let mut slot = self.buckets[self.bucket_index(hash)];
        while slot != NIL {
            if self.hashes[slot] == hash {
                if let Some(entry) = &self.slots[slot] {
                    if eq(entry) {
                        return Some(slot);
                    }
                }
            }
            slot = self.next[slot];
        }
        None
    }

    /// Finds the entry matching `hash` and `eq`.
    ///
    /// ```rust
    /// # use slot_hash::DuplicateKeyPolicy;
    /// # use slot_hash::slot_table::SlotTable;
    /// let mut table = SlotTable::with_capacity(8);
    /// let _ = table.entry(7, |&v: &u32| v == 7).resolve(7, DuplicateKeyPolicy::Replace);
    ///
    /// assert_eq!(table.find(7, |&v| v == 7), Some(&7));
    /// assert_eq!(table.find(8, |&v| v == 8), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<&T> {
        let slot = self.find_slot(hash, eq)?;
        self.slots[slot].as_ref()
    }

    /// Finds the entry matching `hash` and `eq` for modification.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<&mut T> {
        let slot = self.find_slot(hash, eq)?;
        self.slots[slot].as_mut()
    }

    /// Looks up the entry for `hash` and `eq`, returning a handle that either
    /// points at the occupied slot or can fill a new one.
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Entry<'_, T> {
        match self.find_slot(hash, eq) {
            Some(slot) => Entry::Occupied(OccupiedEntry { table: self, slot }),
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Removes the entry matching `hash` and `eq`, returning it.
    ///
    /// The slot is unlinked from its chain and pushed onto the free list.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<T> {
        let bucket = self.bucket_index(hash);
        let mut prev = NIL;
        let mut slot = self.buckets[bucket];
        while slot != NIL {
            let matched = self.hashes[slot] == hash && self.slots[slot].as_ref().is_some_and(&eq);
            if matched {
                self.unlink(bucket, prev, slot);
                return self.release(slot);
            }
            prev = slot;
            slot = self.next[slot];
        }
        None
    }

    /// Removes the entry stored in `slot`, returning it.
    ///
    /// The chain predecessor is not known from the id alone, so this walks the
    /// chain of the slot's stored hash to unlink it.
    pub fn remove_slot(&mut self, slot: SlotId) -> Option<T> {
        let hash = self.hash_of(slot)?;
        let bucket = self.bucket_index(hash);
        let mut prev = NIL;
        let mut current = self.buckets[bucket];
        while current != NIL {
            if current == slot {
                self.unlink(bucket, prev, slot);
                return self.release(slot);
            }
            prev = current;
            current = self.next[current];
        }
        None
    }

    #[inline]
    fn unlink(&mut self, bucket: usize, prev: SlotId, slot: SlotId) {
        if prev == NIL {
            self.buckets[bucket] = self.next[slot];
        } else {
            self.next[prev] = self.next[slot];
        }
    }

    #[inline]
    fn release(&mut self, slot: SlotId) -> Option<T> {
        let entry = self.slots[slot].take();
        self.hashes[slot] = 0;
        self.next[slot] = self.next_free;
        self.next_free = slot;
        self.free_count += 1;
        entry
    }

    /// Claims a slot for a new entry and links it at the head of its chain.
    fn allocate(&mut self, hash: u64, value: T) -> Result<SlotId> {
        let slot = if self.free_count > 0 {
            let slot = self.next_free;
            self.next_free = self.next[slot];
            self.free_count -= 1;
            slot
        } else {
            if self.high_water > self.capacity() {
                self.grow()?;
            }
            let slot = self.high_water;
            self.high_water += 1;
            slot
        };

        let bucket = self.bucket_index(hash);
        self.next[slot] = self.buckets[bucket];
        self.buckets[bucket] = slot;
        self.hashes[slot] = hash;
        self.slots[slot] = Some(value);
        Ok(slot)
    }

    #[cold]
    fn grow(&mut self) -> Result<()> {
        let new_size = grown_size(self.size(), self.high_water)?;
        self.rebuild(new_size);
        Ok(())
    }

    /// Resizes every array to `new_size` and relinks all chains.
    ///
    /// Occupied slots keep their ids. Every filled slot below the high-water
    /// mark is pushed onto the front of its new chain in ascending id order,
    /// so within a bucket the newest id ends up first. Free slots keep their
    /// free-list links.
    fn rebuild(&mut self, new_size: usize) {
        let old_size = self.size();
        debug_assert!(new_size.is_power_of_two() && new_size > old_size);

        self.slots.resize_with(new_size, || None);
        self.hashes.resize(new_size, 0);
        let old_next = core::mem::replace(&mut self.next, vec![NIL; new_size]);
        self.buckets = vec![NIL; new_size];
        self.mask = new_size - 1;

        for slot in 1..self.high_water {
            if self.slots[slot].is_some() {
                let bucket = self.bucket_index(self.hashes[slot]);
                self.next[slot] = self.buckets[bucket];
                self.buckets[bucket] = slot;
            } else {
                self.next[slot] = old_next[slot];
            }
        }

        tracing::debug!(old_size, new_size, len = self.len(), "slot table grew");
    }

    /// Makes room for at least `additional` more entries without growing.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let required = self.high_water.saturating_add(additional);
        if required <= self.capacity() + 1 {
            return Ok(());
        }

        let mut new_size = self.size();
        while growth_threshold(new_size) + 1 < required {
            new_size = grown_size(new_size, self.high_water)?;
        }
        self.rebuild(new_size);
        Ok(())
    }

    /// Removes every entry. The slot count is kept.
    pub fn clear(&mut self) {
        if self.high_water == 1 {
            return;
        }

        self.buckets.fill(NIL);
        self.next.fill(NIL);
        self.hashes.fill(0);
        for slot in &mut self.slots[..self.high_water] {
            *slot = None;
        }

        tracing::trace!(len = self.len(), "slot table cleared");

        self.high_water = 1;
        self.free_count = 0;
        self.next_free = NIL;
    }

    /// Takes the entries of `order` out of the table in the given order, then
    /// clears the table.
    ///
    /// This is cheaper than removing each slot, because no chain is walked.
    /// Ids that are not occupied are skipped.
    pub fn drain_ordered(&mut self, order: impl IntoIterator<Item = SlotId>) -> Vec<T> {
        let mut drained = Vec::with_capacity(self.len());
        for slot in order {
            if let Some(entry) = self.slots.get_mut(slot).and_then(Option::take) {
                drained.push(entry);
            }
        }
        self.clear();
        drained
    }

    /// Takes every entry out of the table in slot id order, then clears it.
    pub fn drain(&mut self) -> Vec<T> {
        let end = self.high_water;
        self.drain_ordered(1..end)
    }

    /// Returns an iterator over the occupied slots in ascending id order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.slots[..self.high_water].iter().enumerate(),
            remaining: self.len(),
        }
    }
}

/// A view into a single slot of a [`SlotTable`], which may either be vacant or
/// occupied.
pub enum Entry<'a, T> {
    /// A matching entry exists.
    Occupied(OccupiedEntry<'a, T>),
    /// No matching entry exists.
    Vacant(VacantEntry<'a, T>),
}

impl<'a, T> Entry<'a, T> {
    /// Inserts `value` according to `policy`.
    ///
    /// Returns the slot that now holds the key and what happened to it. Under
    /// [`DuplicateKeyPolicy::ThrowOnDuplicate`] an occupied entry fails with
    /// [`Error::DuplicateKey`] and the table is left untouched.
    pub fn resolve(
        self,
        value: T,
        policy: DuplicateKeyPolicy,
    ) -> Result<(SlotId, InsertOutcome<T>)> {
        self.resolve_with(value, policy, core::convert::identity, core::mem::replace)
    }

    /// Inserts `incoming` according to `policy` when only part of the stored
    /// entry is subject to the policy, such as the value of a key-value pair.
    ///
    /// A vacant entry stores `build(incoming)`. Under
    /// [`DuplicateKeyPolicy::Replace`] an occupied entry is updated with
    /// `replace`, which returns the part it displaced.
    ///
    /// ```rust
    /// use slot_hash::DuplicateKeyPolicy;
    /// use slot_hash::InsertOutcome;
    /// use slot_hash::SlotTable;
    ///
    /// let mut table: SlotTable<(&str, u32)> = SlotTable::with_capacity(4);
    /// for value in [1, 2] {
    ///     let (_, outcome) = table
    ///         .entry(9, |(k, _)| *k == "a")
    ///         .resolve_with(
    ///             value,
    ///             DuplicateKeyPolicy::Replace,
    ///             |v| ("a", v),
    ///             |(_, stored), v| core::mem::replace(stored, v),
    ///         )
    ///         .unwrap();
    ///     if value == 2 {
    ///         assert_eq!(outcome, InsertOutcome::Replaced(1));
    ///     }
    /// }
    /// ```
    pub fn resolve_with<U>(
        self,
        incoming: U,
        policy: DuplicateKeyPolicy,
        build: impl FnOnce(U) -> T,
        replace: impl FnOnce(&mut T, U) -> U,
    ) -> Result<(SlotId, InsertOutcome<U>)> {
        match self {
            Entry::Occupied(mut entry) => match policy {
                DuplicateKeyPolicy::KeepExisting => {
                    Ok((entry.slot, InsertOutcome::Kept(incoming)))
                }
                DuplicateKeyPolicy::Replace => {
                    let old = replace(entry.get_mut(), incoming);
                    Ok((entry.slot, InsertOutcome::Replaced(old)))
                }
                DuplicateKeyPolicy::ThrowOnDuplicate => Err(Error::DuplicateKey),
            },
            Entry::Vacant(entry) => {
                let slot = entry.insert(build(incoming))?;
                Ok((slot, InsertOutcome::Inserted))
            }
        }
    }

    /// Returns the slot of an occupied entry.
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            Entry::Occupied(entry) => Some(entry.slot),
            Entry::Vacant(_) => None,
        }
    }
}

/// A vacant entry in a [`SlotTable`].
pub struct VacantEntry<'a, T> {
    table: &'a mut SlotTable<T>,
    hash: u64,
}

impl<'a, T> VacantEntry<'a, T> {
    /// Returns the hash the entry will be stored under.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Fills a slot with `value`, reusing a freed slot when one exists and
    /// growing the table when the high-water mark crosses the threshold.
    pub fn insert(self, value: T) -> Result<SlotId> {
        self.table.allocate(self.hash, value)
    }
}

/// An occupied entry in a [`SlotTable`].
pub struct OccupiedEntry<'a, T> {
    table: &'a mut SlotTable<T>,
    slot: SlotId,
}

impl<'a, T> OccupiedEntry<'a, T> {
    /// Returns the id of the occupied slot.
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Returns a reference to the stored entry.
    pub fn get(&self) -> &T {
        self.table.slots[self.slot]
            .as_ref()
            .unwrap_or_else(|| unreachable!("occupied entry points at an empty slot"))
    }

    /// Returns a mutable reference to the stored entry.
    pub fn get_mut(&mut self) -> &mut T {
        self.table.slots[self.slot]
            .as_mut()
            .unwrap_or_else(|| unreachable!("occupied entry points at an empty slot"))
    }

    /// Converts the entry into a mutable reference bound to the table.
    pub fn into_mut(self) -> &'a mut T {
        self.table.slots[self.slot]
            .as_mut()
            .unwrap_or_else(|| unreachable!("occupied entry points at an empty slot"))
    }

    /// Replaces the stored entry in place, returning the old one. The slot id
    /// does not change.
    pub fn replace(&mut self, value: T) -> T {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the table.
    pub fn remove(self) -> T {
        let slot = self.slot;
        self.table
            .remove_slot(slot)
            .unwrap_or_else(|| unreachable!("occupied entry points at an empty slot"))
    }
}

/// An iterator over the entries of a [`SlotTable`] in slot id order.
pub struct Iter<'a, T> {
    slots: core::iter::Enumerate<core::slice::Iter<'a, Option<T>>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    /// Adapts this iterator to also yield each entry's slot id.
    pub fn with_slots(self) -> impl Iterator<Item = (SlotId, &'a T)> {
        self.slots
            .filter_map(|(slot, entry)| entry.as_ref().map(|entry| (slot, entry)))
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        for (_, entry) in self.slots.by_ref() {
            if let Some(entry) = entry {
                self.remaining -= 1;
                return Some(entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a SlotTable<T> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
