use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::capacity::DEFAULT_CAPACITY;
use crate::error::Error;
use crate::error::Result;
use crate::policy::DuplicateKeyPolicy;
use crate::policy::InsertOutcome;
use crate::slot_table::SlotId;
use crate::slot_table::SlotTable;

/// A hash set using the chained [`SlotTable`] as the underlying storage.
///
/// `HashSet<T, S>` stores values of type `T` where `T` implements `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash values.
///
/// Inserting a value equal to one already stored is resolved by the
/// [`DuplicateKeyPolicy`] given at construction: `Replace` swaps in the new
/// value, which matters when equality does not cover every field.
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: SlotTable<T>,
    hash_builder: S,
    policy: DuplicateKeyPolicy,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.iter()).finish()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a set with room for `capacity` slots, the given duplicate
    /// policy, and the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use slot_hash::DuplicateKeyPolicy;
    /// use slot_hash::hash_set::HashSet;
    ///
    /// let set: HashSet<i32, _> =
    ///     HashSet::with_hasher(16, DuplicateKeyPolicy::KeepExisting, RandomState::new());
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 12);
    /// # }
    /// ```
    pub fn with_hasher(capacity: usize, policy: DuplicateKeyPolicy, hash_builder: S) -> Self {
        Self {
            table: SlotTable::with_capacity(capacity),
            hash_builder,
            policy,
        }
    }

    /// Returns the duplicate policy this set was built with.
    pub fn policy(&self) -> DuplicateKeyPolicy {
        self.policy
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the set holds before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of slots in the underlying table.
    pub fn size(&self) -> usize {
        self.table.size()
    }

    /// Removes all elements from the set, keeping its allocation.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Reserves room for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.table.reserve(additional)
    }

    /// Adds a value to the set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if an equal value is present and the
    /// policy is [`DuplicateKeyPolicy::ThrowOnDuplicate`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_hash::DuplicateKeyPolicy;
    /// # use slot_hash::HashSet;
    /// # use slot_hash::InsertOutcome;
    /// let mut set: HashSet<i32> = HashSet::new(4, DuplicateKeyPolicy::KeepExisting);
    /// assert_eq!(set.insert(2), Ok(InsertOutcome::Inserted));
    /// assert_eq!(set.insert(2), Ok(InsertOutcome::Kept(2)));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> Result<InsertOutcome<T>> {
        self.insert_slot(value).map(|(_, outcome)| outcome)
    }

    pub(crate) fn insert_slot(&mut self, value: T) -> Result<(SlotId, InsertOutcome<T>)> {
        let hash = self.hash_builder.hash_one(&value);
        self.table
            .entry(hash, |v| v == &value)
            .resolve(value, self.policy)
    }

    /// Inserts every value from `iter`.
    ///
    /// Values rejected with [`Error::DuplicateKey`] are skipped; any other
    /// error stops the extension and is returned.
    pub fn try_extend(&mut self, iter: impl IntoIterator<Item = T>) -> Result<()> {
        for value in iter {
            match self.insert(value) {
                Ok(_) | Err(Error::DuplicateKey) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    pub(crate) fn find_slot(&self, value: &T) -> Option<SlotId> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find_slot(hash, |v| v == value)
    }

    /// Returns `true` if the set contains a value.
    pub fn contains(&self, value: &T) -> bool {
        self.find_slot(value).is_some()
    }

    /// Returns a reference to the stored value equal to the given one.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value)
    }

    /// Removes a value from the set. Returns whether the value was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equal to the given one.
    ///
    /// ```rust
    /// # use slot_hash::DuplicateKeyPolicy;
    /// # use slot_hash::HashSet;
    /// let mut set: HashSet<u8> = HashSet::new(4, DuplicateKeyPolicy::Replace);
    /// set.insert(3).unwrap();
    /// assert_eq!(set.take(&3), Some(3));
    /// assert_eq!(set.take(&3), None);
    /// ```
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Removes every element and returns them in slot order.
    pub fn drain(&mut self) -> Vec<T> {
        self.table.drain()
    }

    /// An iterator visiting all elements in slot order.
    pub fn iter(&self) -> crate::slot_table::Iter<'_, T> {
        self.table.iter()
    }

    /// Returns a snapshot of the elements in slot order.
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T, S> HashSet<T, S> {
    pub(crate) fn table(&self) -> &SlotTable<T> {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut SlotTable<T> {
        &mut self.table
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a set with room for `capacity` slots and the given duplicate
    /// policy, using the default hasher builder.
    pub fn new(capacity: usize, policy: DuplicateKeyPolicy) -> Self {
        Self::with_hasher(capacity, policy, S::default())
    }
}

impl<T, S> Default for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DuplicateKeyPolicy::default())
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = crate::slot_table::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
