use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::capacity::DEFAULT_CAPACITY;
use crate::error::Error;
use crate::error::Result;
use crate::fifo::FifoIndex;
use crate::hash_set::HashSet;
use crate::policy::DuplicateKeyPolicy;
use crate::policy::InsertOutcome;

/// A [`HashSet`] that drains in first-insertion order.
///
/// Each distinct value is queued once. Enqueueing a value that is already
/// queued follows the [`DuplicateKeyPolicy`] and never moves it.
///
/// ```rust
/// use slot_hash::DuplicateKeyPolicy;
/// use slot_hash::FifoSet;
///
/// let mut queue: FifoSet<&str> = FifoSet::new(4, DuplicateKeyPolicy::KeepExisting);
/// for job in ["build", "test", "build", "deploy"] {
///     queue.enqueue(job).unwrap();
/// }
/// assert_eq!(queue.drain_all(), vec!["build", "test", "deploy"]);
/// ```
#[derive(Clone)]
pub struct FifoSet<T, S = DefaultHashBuilder> {
    set: HashSet<T, S>,
    order: FifoIndex,
}

impl<T, S> Debug for FifoSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let table = self.set.table();
        f.debug_list()
            .entries(self.order.iter().filter_map(|slot| table.get(slot)))
            .finish()
    }
}

impl<T, S> FifoSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a queue with room for `capacity` slots, the given duplicate
    /// policy, and the given hasher builder.
    pub fn with_hasher(capacity: usize, policy: DuplicateKeyPolicy, hash_builder: S) -> Self {
        let set = HashSet::with_hasher(capacity, policy, hash_builder);
        let order = FifoIndex::with_capacity(set.size());
        Self { set, order }
    }

    /// Returns the duplicate policy this queue was built with.
    pub fn policy(&self) -> DuplicateKeyPolicy {
        self.set.policy()
    }

    /// Returns the number of queued values.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.set.clear();
        self.order.clear();
    }

    /// Adds `value` to the back of the queue unless an equal value is queued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] under
    /// [`DuplicateKeyPolicy::ThrowOnDuplicate`] when an equal value is queued.
    pub fn enqueue(&mut self, value: T) -> Result<InsertOutcome<T>> {
        let (slot, outcome) = self.set.insert_slot(value)?;
        if outcome.is_inserted() {
            self.order.push_back(slot);
        }
        debug_assert_eq!(self.order.len(), self.set.len());
        Ok(outcome)
    }

    /// Removes and returns the oldest value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if nothing is queued.
    pub fn dequeue(&mut self) -> Result<T> {
        let slot = self.order.pop_front().ok_or(Error::Empty)?;
        self.set.table_mut().remove_slot(slot).ok_or(Error::Empty)
    }

    /// Returns the oldest value without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if nothing is queued.
    pub fn peek(&self) -> Result<&T> {
        let slot = self.order.front().ok_or(Error::Empty)?;
        self.set.table().get(slot).ok_or(Error::Empty)
    }

    /// Returns `true` if an equal value is queued.
    pub fn contains(&self, value: &T) -> bool {
        self.set.contains(value)
    }

    /// Removes an equal value from anywhere in the queue.
    pub fn remove(&mut self, value: &T) -> bool {
        let Some(slot) = self.set.find_slot(value) else {
            return false;
        };
        self.order.remove(slot);
        self.set.table_mut().remove_slot(slot).is_some()
    }

    /// Removes every value and returns them, oldest first.
    pub fn drain_all(&mut self) -> Vec<T> {
        let drained = self.set.table_mut().drain_ordered(self.order.iter());
        self.order.clear();
        drained
    }

    /// Returns an iterator over the queued values, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let table = self.set.table();
        self.order.iter().filter_map(move |slot| table.get(slot))
    }

    /// Returns a snapshot of the queued values, oldest first.
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T, S> FifoSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a queue with room for `capacity` slots and the given duplicate
    /// policy, using the default hasher builder.
    pub fn new(capacity: usize, policy: DuplicateKeyPolicy) -> Self {
        Self::with_hasher(capacity, policy, S::default())
    }
}

impl<T, S> Default for FifoSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DuplicateKeyPolicy::default())
    }
}
