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

/// A hash map using the chained [`SlotTable`] as the underlying storage.
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash keys. Keys are expected
/// to be small values; they are stored inline next to their value.
///
/// Inserting a key that is already present is resolved by the
/// [`DuplicateKeyPolicy`] given at construction.
///
/// # Examples
///
/// ```rust
/// use slot_hash::DuplicateKeyPolicy;
/// use slot_hash::HashMap;
/// use slot_hash::InsertOutcome;
///
/// let mut map: HashMap<u32, &str> = HashMap::new(4, DuplicateKeyPolicy::KeepExisting);
/// assert_eq!(map.insert(1, "a"), Ok(InsertOutcome::Inserted));
/// assert_eq!(map.insert(1, "b"), Ok(InsertOutcome::Kept("b")));
/// assert_eq!(map.get(&1), Ok(&"a"));
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: SlotTable<(K, V)>,
    hash_builder: S,
    policy: DuplicateKeyPolicy,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.table.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a map with room for `capacity` slots, the given duplicate-key
    /// policy, and the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use slot_hash::DuplicateKeyPolicy;
    /// # use slot_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> =
    ///     HashMap::with_hasher(100, DuplicateKeyPolicy::Replace, SimpleHasher);
    /// assert!(map.capacity() >= 96);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(capacity: usize, policy: DuplicateKeyPolicy, hash_builder: S) -> Self {
        Self {
            table: SlotTable::with_capacity(capacity),
            hash_builder,
            policy,
        }
    }

    /// Returns the duplicate-key policy this map was built with.
    pub fn policy(&self) -> DuplicateKeyPolicy {
        self.policy
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the map holds before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of slots in the underlying table.
    pub fn size(&self) -> usize {
        self.table.size()
    }

    /// Removes all elements from the map, keeping its allocation.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Reserves room for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.table.reserve(additional)
    }

    /// Inserts a key-value pair, resolving an existing key with the map's
    /// [`DuplicateKeyPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the key is present and the policy is
    /// [`DuplicateKeyPolicy::ThrowOnDuplicate`]; the map is left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_hash::DuplicateKeyPolicy;
    /// # use slot_hash::HashMap;
    /// # use slot_hash::InsertOutcome;
    /// let mut map: HashMap<u32, &str> = HashMap::new(4, DuplicateKeyPolicy::Replace);
    /// assert_eq!(map.insert(37, "a"), Ok(InsertOutcome::Inserted));
    /// assert_eq!(map.insert(37, "b"), Ok(InsertOutcome::Replaced("a")));
    /// assert_eq!(map.try_get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<InsertOutcome<V>> {
        self.insert_slot(key, value).map(|(_, outcome)| outcome)
    }

    /// Inserts like [`insert`](Self::insert), also reporting the slot that
    /// holds the key afterwards.
    pub(crate) fn insert_slot(&mut self, key: K, value: V) -> Result<(SlotId, InsertOutcome<V>)> {
        let hash = self.hash_builder.hash_one(&key);
        // The stored key is never swapped; only the value follows the policy.
        let entry = self.table.entry(hash, |(k, _)| k == &key);
        entry.resolve_with(
            value,
            self.policy,
            |value| (key, value),
            |(_, stored), value| core::mem::replace(stored, value),
        )
    }

    /// Inserts every pair from `iter`.
    ///
    /// Pairs rejected with [`Error::DuplicateKey`] are skipped; any other
    /// error stops the extension and is returned.
    pub fn try_extend(&mut self, iter: impl IntoIterator<Item = (K, V)>) -> Result<()> {
        for (key, value) in iter {
            match self.insert(key, value) {
                Ok(_) | Err(Error::DuplicateKey) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    pub(crate) fn find_slot(&self, key: &K) -> Option<SlotId> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_slot(hash, |(k, _)| k == key)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_hash::DuplicateKeyPolicy;
    /// # use slot_hash::Error;
    /// # use slot_hash::HashMap;
    /// let mut map: HashMap<u32, &str> = HashMap::new(4, DuplicateKeyPolicy::Replace);
    /// map.insert(1, "a").unwrap();
    /// assert_eq!(map.get(&1), Ok(&"a"));
    /// assert_eq!(map.get(&2), Err(Error::NotFound));
    /// ```
    pub fn get(&self, key: &K) -> Result<&V> {
        self.try_get(key).ok_or(Error::NotFound)
    }

    /// Returns a reference to the value corresponding to the key, or `None`.
    pub fn try_get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a copy of the value for `key`, or `V::default()` if the key is
    /// absent.
    pub fn get_or_default(&self, key: &K) -> V
    where
        V: Clone + Default,
    {
        self.try_get(key).cloned().unwrap_or_default()
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_slot(key).is_some()
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// The freed slot is reused by the next insert.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Removes `key` only if it currently maps to `value`.
    ///
    /// Returns `true` if the pair was present and has been removed.
    ///
    /// ```rust
    /// # use slot_hash::DuplicateKeyPolicy;
    /// # use slot_hash::HashMap;
    /// let mut map: HashMap<u32, u32> = HashMap::new(4, DuplicateKeyPolicy::Replace);
    /// map.insert(1, 10).unwrap();
    /// assert!(!map.try_remove_with_value(&1, &11));
    /// assert!(map.try_remove_with_value(&1, &10));
    /// assert!(map.is_empty());
    /// ```
    pub fn try_remove_with_value(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .remove(hash, |(k, v)| k == key && v == value)
            .is_some()
    }

    /// Removes every pair and returns them in slot order.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        self.table.drain()
    }

    /// Returns an iterator over the key-value pairs in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns a snapshot of the keys in slot order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Returns a snapshot of the values in slot order.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Returns a snapshot of the key-value pairs in slot order.
    pub fn items(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    pub(crate) fn table(&self) -> &SlotTable<(K, V)> {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut SlotTable<(K, V)> {
        &mut self.table
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a map with room for `capacity` slots and the given
    /// duplicate-key policy, using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_hash::DuplicateKeyPolicy;
    /// # use slot_hash::HashMap;
    /// let map: HashMap<u64, String> = HashMap::new(4, DuplicateKeyPolicy::Replace);
    /// assert_eq!(map.size(), 4);
    /// assert!(map.is_empty());
    /// ```
    pub fn new(capacity: usize, policy: DuplicateKeyPolicy) -> Self {
        Self::with_hasher(capacity, policy, S::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DuplicateKeyPolicy::default())
    }
}

/// An iterator over the entries of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::slot_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
