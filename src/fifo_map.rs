use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::capacity::DEFAULT_CAPACITY;
use crate::error::Error;
use crate::error::Result;
use crate::fifo::FifoIndex;
use crate::hash_map::HashMap;
use crate::policy::DuplicateKeyPolicy;
use crate::policy::InsertOutcome;

/// A [`HashMap`] that also remembers the order keys were first inserted in,
/// and drains in that order.
///
/// Every key lives in exactly one slot of the underlying table; the queue
/// keeps the ids of those slots in a ring. Replacing the value of a queued key
/// does not move it: the key drains at its original position with the new
/// value.
///
/// # Examples
///
/// ```rust
/// use slot_hash::DuplicateKeyPolicy;
/// use slot_hash::FifoKeyedQueue;
///
/// let mut queue: FifoKeyedQueue<&str, u32> = FifoKeyedQueue::new(4, DuplicateKeyPolicy::Replace);
/// queue.enqueue("a", 1).unwrap();
/// queue.enqueue("b", 2).unwrap();
/// queue.enqueue("a", 3).unwrap();
///
/// assert_eq!(queue.dequeue_pair(), Ok(("a", 3)));
/// assert_eq!(queue.dequeue(), Ok(2));
/// assert!(queue.dequeue().is_err());
/// ```
#[derive(Clone)]
pub struct FifoKeyedQueue<K, V, S = DefaultHashBuilder> {
    map: HashMap<K, V, S>,
    order: FifoIndex,
}

impl<K, V, S> Debug for FifoKeyedQueue<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let table = self.map.table();
        f.debug_map()
            .entries(
                self.order
                    .iter()
                    .filter_map(|slot| table.get(slot))
                    .map(|(k, v)| (k, v)),
            )
            .finish()
    }
}

impl<K, V, S> FifoKeyedQueue<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a queue with room for `capacity` slots, the given duplicate-key
    /// policy, and the given hasher builder.
    pub fn with_hasher(capacity: usize, policy: DuplicateKeyPolicy, hash_builder: S) -> Self {
        let map = HashMap::with_hasher(capacity, policy, hash_builder);
        let order = FifoIndex::with_capacity(map.size());
        Self { map, order }
    }

    /// Returns the duplicate-key policy this queue was built with.
    pub fn policy(&self) -> DuplicateKeyPolicy {
        self.map.policy()
    }

    /// Returns the number of queued entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of entries the queue holds before its table grows.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.map.reserve(additional)
    }

    /// Adds `key` to the back of the queue.
    ///
    /// A key that is already queued is resolved by the queue's
    /// [`DuplicateKeyPolicy`] and keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] under
    /// [`DuplicateKeyPolicy::ThrowOnDuplicate`] when the key is queued.
    pub fn enqueue(&mut self, key: K, value: V) -> Result<InsertOutcome<V>> {
        let (slot, outcome) = self.map.insert_slot(key, value)?;
        if outcome.is_inserted() {
            self.order.push_back(slot);
        }
        debug_assert_eq!(self.order.len(), self.map.len());
        Ok(outcome)
    }

    /// Same as [`enqueue`](Self::enqueue).
    pub fn insert(&mut self, key: K, value: V) -> Result<InsertOutcome<V>> {
        self.enqueue(key, value)
    }

    /// Enqueues every pair from `iter`, skipping [`Error::DuplicateKey`]
    /// rejections.
    pub fn try_extend(&mut self, iter: impl IntoIterator<Item = (K, V)>) -> Result<()> {
        for (key, value) in iter {
            match self.enqueue(key, value) {
                Ok(_) | Err(Error::DuplicateKey) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Removes the oldest entry and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if nothing is queued.
    pub fn dequeue(&mut self) -> Result<V> {
        self.dequeue_pair().map(|(_, v)| v)
    }

    /// Removes the oldest entry and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if nothing is queued.
    pub fn dequeue_pair(&mut self) -> Result<(K, V)> {
        let slot = self.order.pop_front().ok_or(Error::Empty)?;
        self.map.table_mut().remove_slot(slot).ok_or(Error::Empty)
    }

    /// Returns the value of the oldest entry without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if nothing is queued.
    pub fn peek(&self) -> Result<&V> {
        self.peek_pair().map(|(_, v)| v)
    }

    /// Returns the oldest entry without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if nothing is queued.
    pub fn peek_pair(&self) -> Result<(&K, &V)> {
        let slot = self.order.front().ok_or(Error::Empty)?;
        self.map
            .table()
            .get(slot)
            .map(|(k, v)| (k, v))
            .ok_or(Error::Empty)
    }

    /// Removes every entry and returns the values, oldest first.
    ///
    /// ```rust
    /// # use slot_hash::DuplicateKeyPolicy;
    /// # use slot_hash::FifoKeyedQueue;
    /// let mut queue: FifoKeyedQueue<u32, char> = FifoKeyedQueue::default();
    /// queue.try_extend([(3, 'c'), (1, 'a'), (2, 'b')]).unwrap();
    /// assert_eq!(queue.drain_all(), vec!['c', 'a', 'b']);
    /// assert!(queue.is_empty());
    /// ```
    pub fn drain_all(&mut self) -> Vec<V> {
        self.drain_all_pairs().into_iter().map(|(_, v)| v).collect()
    }

    /// Removes every entry and returns the pairs, oldest first.
    pub fn drain_all_pairs(&mut self) -> Vec<(K, V)> {
        let drained = self.map.table_mut().drain_ordered(self.order.iter());
        self.order.clear();
        drained
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is not queued.
    pub fn get(&self, key: &K) -> Result<&V> {
        self.map.get(key)
    }

    /// Returns a reference to the value corresponding to the key, or `None`.
    pub fn try_get(&self, key: &K) -> Option<&V> {
        self.map.try_get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    /// The key's position in the queue does not change.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    /// Returns a copy of the value for `key`, or `V::default()`.
    pub fn get_or_default(&self, key: &K) -> V
    where
        V: Clone + Default,
    {
        self.map.get_or_default(key)
    }

    /// Returns `true` if the key is queued.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Removes a key from anywhere in the queue, returning its value.
    ///
    /// Entries behind it move up one place.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from anywhere in the queue, returning the stored pair.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let slot = self.map.find_slot(key)?;
        self.order.remove(slot);
        self.map.table_mut().remove_slot(slot)
    }

    /// Removes `key` only if it currently maps to `value`.
    pub fn try_remove_with_value(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        match self.map.try_get(key) {
            Some(stored) if stored == value => self.remove_entry(key).is_some(),
            _ => false,
        }
    }

    /// Returns an iterator over the queued pairs, oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> + '_ {
        let table = self.map.table();
        Iter {
            slots: self.order.iter(),
            table,
        }
    }

    /// Returns a snapshot of the keys, oldest first.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Returns a snapshot of the values, oldest first.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Returns a snapshot of the pairs, oldest first.
    pub fn items(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V, S> FifoKeyedQueue<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a queue with room for `capacity` slots and the given
    /// duplicate-key policy, using the default hasher builder.
    pub fn new(capacity: usize, policy: DuplicateKeyPolicy) -> Self {
        Self::with_hasher(capacity, policy, S::default())
    }
}

impl<K, V, S> Default for FifoKeyedQueue<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DuplicateKeyPolicy::default())
    }
}

struct Iter<'a, K, V, I> {
    slots: I,
    table: &'a crate::slot_table::SlotTable<(K, V)>,
}

impl<'a, K, V, I> Iterator for Iter<'a, K, V, I>
where
    I: Iterator<Item = crate::slot_table::SlotId>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        self.table.get(slot).map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<K, V, I> ExactSizeIterator for Iter<'_, K, V, I> where
    I: ExactSizeIterator<Item = crate::slot_table::SlotId>
{
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::vec;
    use core::hash::BuildHasher;

    use siphasher::sip::SipHasher;

    use super::*;

    /// Fixed keys so chain layout is the same on every run.
    #[derive(Clone, Default)]
    struct FixedSip;

    impl BuildHasher for FixedSip {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(7, 11)
        }
    }

    fn queue(policy: DuplicateKeyPolicy) -> FifoKeyedQueue<u32, &'static str, FixedSip> {
        FifoKeyedQueue::new(4, policy)
    }

    #[test]
    fn order_ring_matches_table_size() {
        for capacity in [0, 4, 5, 100, 1000] {
            let q: FifoKeyedQueue<u32, u32, FixedSip> =
                FifoKeyedQueue::new(capacity, DuplicateKeyPolicy::Replace);
            assert_eq!(q.order.buffer_len(), q.map.size(), "capacity {capacity}");
        }
    }

    #[test]
    fn dequeues_in_insertion_order() {
        let mut q = queue(DuplicateKeyPolicy::Replace);
        for k in 0..100 {
            q.enqueue(k, "v").unwrap();
        }
        for k in 0..100 {
            assert_eq!(q.dequeue_pair(), Ok((k, "v")), "{:?}", q);
        }
        assert_eq!(q.dequeue(), Err(Error::Empty));
        assert!(q.is_empty());
    }

    #[test]
    fn replace_keeps_position() {
        let mut q = queue(DuplicateKeyPolicy::Replace);
        q.enqueue(1, "k1").unwrap();
        q.enqueue(2, "k2").unwrap();
        q.enqueue(3, "k3").unwrap();
        assert_eq!(q.enqueue(2, "k2-new"), Ok(InsertOutcome::Replaced("k2")));

        assert_eq!(q.len(), 3);
        assert_eq!(q.dequeue(), Ok("k1"));
        assert_eq!(q.dequeue(), Ok("k2-new"));
        assert_eq!(q.dequeue(), Ok("k3"));
    }

    #[test]
    fn keep_and_throw_leave_queue_alone() {
        let mut keep = queue(DuplicateKeyPolicy::KeepExisting);
        keep.enqueue(1, "a").unwrap();
        assert_eq!(keep.enqueue(1, "b"), Ok(InsertOutcome::Kept("b")));
        assert_eq!(keep.drain_all(), vec!["a"]);

        let mut throw = queue(DuplicateKeyPolicy::ThrowOnDuplicate);
        throw.enqueue(1, "a").unwrap();
        throw.enqueue(2, "b").unwrap();
        assert_eq!(throw.enqueue(1, "c"), Err(Error::DuplicateKey));
        assert_eq!(throw.len(), 2);
        assert_eq!(throw.keys(), vec![1, 2]);
    }

    #[test]
    fn peek_does_not_remove() {
        let mut q = queue(DuplicateKeyPolicy::Replace);
        assert_eq!(q.peek(), Err(Error::Empty));
        assert_eq!(q.peek_pair(), Err(Error::Empty));

        q.enqueue(5, "five").unwrap();
        q.enqueue(6, "six").unwrap();
        assert_eq!(q.peek(), Ok(&"five"));
        assert_eq!(q.peek_pair(), Ok((&5, &"five")));
        assert_eq!(q.len(), 2);

        q.dequeue().unwrap();
        assert_eq!(q.peek_pair(), Ok((&6, &"six")));
    }

    #[test]
    fn drain_all_pairs_in_order_and_resets() {
        let mut q = queue(DuplicateKeyPolicy::Replace);
        for k in [9, 3, 7, 1, 5] {
            q.enqueue(k, "x").unwrap();
        }
        q.dequeue().unwrap();

        let drained = q.drain_all_pairs();
        assert_eq!(drained, vec![(3, "x"), (7, "x"), (1, "x"), (5, "x")]);
        assert!(q.is_empty());
        assert_eq!(q.peek(), Err(Error::Empty));

        q.enqueue(42, "again").unwrap();
        assert_eq!(q.dequeue_pair(), Ok((42, "again")));
    }

    #[test]
    fn remove_from_middle_keeps_order() {
        let mut q = queue(DuplicateKeyPolicy::Replace);
        for k in 1..=5 {
            q.enqueue(k, "v").unwrap();
        }
        assert_eq!(q.remove(&3), Some("v"));
        assert_eq!(q.remove(&3), None);
        assert!(!q.contains_key(&3));

        // 6 reuses the slot 3 gave up but still queues last.
        q.enqueue(6, "v").unwrap();
        assert_eq!(q.keys(), vec![1, 2, 4, 5, 6]);
    }

    #[test]
    fn try_remove_with_value_matches_value() {
        let mut q = queue(DuplicateKeyPolicy::Replace);
        q.enqueue(1, "a").unwrap();
        q.enqueue(2, "b").unwrap();
        assert!(!q.try_remove_with_value(&1, &"b"));
        assert!(q.try_remove_with_value(&1, &"a"));
        assert_eq!(q.items(), vec![(2, "b")]);
    }

    #[test]
    fn lookups_delegate_to_map() {
        let mut q: FifoKeyedQueue<u32, u32, FixedSip> =
            FifoKeyedQueue::new(4, DuplicateKeyPolicy::Replace);
        q.enqueue(1, 10).unwrap();
        assert_eq!(q.get(&1), Ok(&10));
        assert_eq!(q.get(&2), Err(Error::NotFound));
        assert_eq!(q.try_get(&2), None);
        assert_eq!(q.get_or_default(&2), 0);

        *q.get_mut(&1).unwrap() += 1;
        assert_eq!(q.peek(), Ok(&11));
    }

    #[test]
    fn interleaved_churn_across_growth() {
        let mut q: FifoKeyedQueue<u32, u32, FixedSip> =
            FifoKeyedQueue::new(4, DuplicateKeyPolicy::Replace);
        let mut expected = alloc::collections::VecDeque::new();
        for k in 0..500u32 {
            q.enqueue(k, k * 2).unwrap();
            expected.push_back(k);
            if k % 3 == 0 {
                let front = expected.pop_front().unwrap();
                assert_eq!(q.dequeue_pair(), Ok((front, front * 2)));
            }
        }
        assert_eq!(q.len(), expected.len());
        assert_eq!(q.keys(), expected.iter().copied().collect::<Vec<_>>());
        assert_eq!(q.iter().len(), expected.len());
    }

    #[test]
    fn clear_empties_both_views() {
        let mut q = queue(DuplicateKeyPolicy::Replace);
        q.try_extend([(1, "a"), (2, "b")]).unwrap();
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.peek(), Err(Error::Empty));
        assert!(q.keys().is_empty());
        assert_eq!(format!("{:?}", q), "{}");
    }

    #[test]
    fn debug_lists_in_queue_order() {
        let mut q = queue(DuplicateKeyPolicy::Replace);
        q.enqueue(2, "b").unwrap();
        q.enqueue(1, "a").unwrap();
        assert_eq!(format!("{:?}", q), "{2: \"b\", 1: \"a\"}");
    }
}
