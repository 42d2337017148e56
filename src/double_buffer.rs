//! Lock-free handoff of batches from one writer thread to one reader thread.
//!
//! A [`DoubleBuffer`] owns two containers. At any instant the writer appends
//! into one of them (the *receive* buffer) while the other (the *transmit*
//! buffer) belongs to the reader. A swap flips the roles: the reader claims
//! the buffer the writer was filling and hands back the one it just emptied.
//!
//! The receive index doubles as a short busy flag. [`Writer::add`] exchanges
//! it for `BUSY` for the duration of one append, and the reader's swap is a
//! compare-and-swap that only succeeds while the writer is outside that
//! window. The writer never waits; the reader spins for at most one append.
//!
//! ```rust
//! use std::thread;
//!
//! use slot_hash::DoubleBuffer;
//! use slot_hash::HashSet;
//!
//! let (mut writer, mut reader) = DoubleBuffer::split_with(HashSet::<u32>::default);
//!
//! let producer = thread::spawn(move || {
//!     for i in 0..100 {
//!         writer.add(i).unwrap();
//!     }
//! });
//!
//! let mut seen = Vec::new();
//! while !producer.is_finished() {
//!     seen.extend(reader.swap_and_drain());
//! }
//! producer.join().unwrap();
//! seen.extend(reader.swap_and_drain());
//!
//! seen.sort();
//! assert_eq!(seen, (0..100).collect::<Vec<_>>());
//! ```

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ops::Deref;
use core::ops::DerefMut;

use crossbeam_utils::Backoff;

use crate::error::Result;
use crate::fifo_map::FifoKeyedQueue;
use crate::fifo_set::FifoSet;
use crate::hash_map::HashMap;
use crate::hash_set::HashSet;
use crate::sync::Arc;
use crate::sync::UnsafeCell;
use crate::sync::atomic::AtomicUsize;
use crate::sync::atomic::Ordering;
use crate::sync::spin;

/// Receive-index value while the writer is inside an append.
const BUSY: usize = 2;

/// A collection the double buffer can fill and drain.
pub trait Container {
    /// What the writer appends.
    type Item;

    /// Adds one item.
    fn append(&mut self, item: Self::Item) -> Result<()>;

    /// Takes every item out, leaving the container empty.
    fn drain_items(&mut self) -> Vec<Self::Item>;

    /// Number of items held.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every item.
    fn clear(&mut self);
}

impl<K, V, S> Container for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (K, V);

    fn append(&mut self, (key, value): (K, V)) -> Result<()> {
        self.insert(key, value).map(drop)
    }

    fn drain_items(&mut self) -> Vec<(K, V)> {
        self.drain()
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }
}

impl<T, S> Container for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = T;

    fn append(&mut self, item: T) -> Result<()> {
        self.insert(item).map(drop)
    }

    fn drain_items(&mut self) -> Vec<T> {
        self.drain()
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn clear(&mut self) {
        HashSet::clear(self);
    }
}

impl<K, V, S> Container for FifoKeyedQueue<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (K, V);

    fn append(&mut self, (key, value): (K, V)) -> Result<()> {
        self.enqueue(key, value).map(drop)
    }

    fn drain_items(&mut self) -> Vec<(K, V)> {
        self.drain_all_pairs()
    }

    fn len(&self) -> usize {
        FifoKeyedQueue::len(self)
    }

    fn clear(&mut self) {
        FifoKeyedQueue::clear(self);
    }
}

impl<T, S> Container for FifoSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = T;

    fn append(&mut self, item: T) -> Result<()> {
        self.enqueue(item).map(drop)
    }

    fn drain_items(&mut self) -> Vec<T> {
        self.drain_all()
    }

    fn len(&self) -> usize {
        FifoSet::len(self)
    }

    fn clear(&mut self) {
        FifoSet::clear(self);
    }
}

/// Two containers and the index naming which one the writer fills.
///
/// Only reachable through the [`Writer`] and [`Reader`] handles returned by
/// [`DoubleBuffer::split`]; there is exactly one of each.
pub struct DoubleBuffer<C> {
    containers: [UnsafeCell<C>; 2],
    receive: AtomicUsize,
}

impl<C: Container> DoubleBuffer<C> {
    /// Wraps two containers and returns the writer and reader handles.
    ///
    /// `first` receives writes until the first swap.
    pub fn split(first: C, second: C) -> (Writer<C>, Reader<C>) {
        let shared = Arc::new(DoubleBuffer {
            containers: [UnsafeCell::new(first), UnsafeCell::new(second)],
            receive: AtomicUsize::new(0),
        });
        let writer = Writer {
            shared: shared.clone(),
        };
        let reader = Reader {
            shared,
            transmit: 1,
            claimed: 0,
        };
        (writer, reader)
    }

    /// Like [`split`](Self::split), building both containers with `make`.
    pub fn split_with(mut make: impl FnMut() -> C) -> (Writer<C>, Reader<C>) {
        let first = make();
        let second = make();
        Self::split(first, second)
    }
}

/// The appending side of a [`DoubleBuffer`].
pub struct Writer<C> {
    shared: Arc<DoubleBuffer<C>>,
}

// SAFETY: the writer only touches the container named by the receive index,
// which the reader never claims while the index reads `BUSY`.
unsafe impl<C> Send for Writer<C>
where
    C: Container + Send,
    C::Item: Send,
{
}

impl<C> Debug for Writer<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Writer").finish_non_exhaustive()
    }
}

/// Restores the receive index when an append finishes, even by unwinding.
struct Idle<'a> {
    receive: &'a AtomicUsize,
    index: usize,
}

impl Drop for Idle<'_> {
    fn drop(&mut self) {
        self.receive.store(self.index, Ordering::Release);
    }
}

impl<C: Container> Writer<C> {
    /// Appends `item` to the current receive buffer.
    ///
    /// Never blocks. Errors come from the container, for example
    /// [`Error::DuplicateKey`](crate::Error::DuplicateKey) from a map built
    /// with [`DuplicateKeyPolicy::ThrowOnDuplicate`](crate::DuplicateKeyPolicy::ThrowOnDuplicate).
    pub fn add(&mut self, item: C::Item) -> Result<()> {
        let index = self.shared.receive.swap(BUSY, Ordering::Acquire);
        debug_assert!(index < BUSY, "writer found the buffer already busy");
        let _idle = Idle {
            receive: &self.shared.receive,
            index,
        };

        // SAFETY: while the index reads `BUSY` the reader's compare-and-swap
        // fails, so this is the only access to `containers[index]`.
        self.shared.containers[index].with_mut(|container| unsafe { (*container).append(item) })
    }
}

/// The draining side of a [`DoubleBuffer`].
pub struct Reader<C> {
    shared: Arc<DoubleBuffer<C>>,
    transmit: usize,
    /// Items held by the transmit buffer when the last swap claimed it.
    claimed: usize,
}

// SAFETY: the reader only touches `containers[transmit]`, which the writer
// cannot reach until the next successful swap.
unsafe impl<C> Send for Reader<C>
where
    C: Container + Send,
    C::Item: Send,
{
}

impl<C> Debug for Reader<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reader")
            .field("transmit", &self.transmit)
            .field("claimed", &self.claimed)
            .finish_non_exhaustive()
    }
}

impl<C: Container> Reader<C> {
    /// Hands the writer the transmit buffer and claims the receive buffer.
    /// Returns the index of the buffer now owned by the reader and records
    /// how many items it holds.
    fn swap(&mut self) -> usize {
        let candidate = 1 - self.transmit;
        let backoff = Backoff::new();
        while self
            .shared
            .receive
            .compare_exchange_weak(candidate, self.transmit, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            spin(&backoff);
        }
        self.transmit = candidate;
        // SAFETY: the swap above moved the writer to the other buffer.
        self.claimed = self.shared.containers[candidate]
            .with(|container| unsafe { (*container).len() });
        candidate
    }

    /// Swaps buffers and returns everything the writer appended since the
    /// previous swap. The claimed buffer is left empty.
    pub fn swap_and_drain(&mut self) -> Vec<C::Item> {
        let index = self.swap();
        // SAFETY: after the swap the writer appends to the other buffer.
        let drained = self.shared.containers[index]
            .with_mut(|container| unsafe { (*container).drain_items() });
        tracing::trace!(buffer = index, drained = drained.len(), "double buffer swapped");
        drained
    }

    /// Swaps buffers and returns only the values of the drained pairs.
    ///
    /// ```rust
    /// use slot_hash::DoubleBuffer;
    /// use slot_hash::FifoKeyedQueue;
    ///
    /// let (mut writer, mut reader) = DoubleBuffer::split_with(FifoKeyedQueue::<u32, &str>::default);
    /// writer.add((2, "two")).unwrap();
    /// writer.add((1, "one")).unwrap();
    /// assert_eq!(reader.swap_and_drain_values(), vec!["two", "one"]);
    /// ```
    pub fn swap_and_drain_values<K, V>(&mut self) -> Vec<V>
    where
        C: Container<Item = (K, V)>,
    {
        self.swap_and_drain()
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }

    /// Swaps buffers and returns a guard over the claimed buffer for direct
    /// inspection. The buffer is cleared when the guard drops.
    ///
    /// ```rust
    /// use slot_hash::DoubleBuffer;
    /// use slot_hash::FifoKeyedQueue;
    ///
    /// let (mut writer, mut reader) = DoubleBuffer::split_with(FifoKeyedQueue::<u32, &str>::default);
    /// writer.add((1, "one")).unwrap();
    /// writer.add((2, "two")).unwrap();
    ///
    /// {
    ///     let snapshot = reader.active_container_snapshot();
    ///     assert_eq!(snapshot.keys(), vec![1, 2]);
    /// }
    /// assert_eq!(reader.len(), 2);
    /// ```
    pub fn active_container_snapshot(&mut self) -> ActiveSnapshot<'_, C> {
        let index = self.swap();
        tracing::trace!(buffer = index, "double buffer swapped for snapshot");
        ActiveSnapshot {
            cell: &self.shared.containers[index],
        }
    }

    /// Number of items the buffer held when the last swap claimed it, before
    /// it was drained or cleared. Zero before the first swap.
    pub fn len(&self) -> usize {
        self.claimed
    }

    /// Returns `true` if the last swap claimed an empty buffer.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to the buffer a [`Reader`] claimed. Clears the buffer
/// on drop.
pub struct ActiveSnapshot<'a, C: Container> {
    cell: &'a UnsafeCell<C>,
}

impl<C: Container> Deref for ActiveSnapshot<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        // SAFETY: the guard borrows the reader mutably, so no swap can hand
        // this buffer back to the writer while it lives.
        self.cell.with(|container| unsafe { &*container })
    }
}

impl<C: Container> DerefMut for ActiveSnapshot<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        // SAFETY: as for `deref`.
        self.cell.with_mut(|container| unsafe { &mut *container })
    }
}

impl<C: Container> Drop for ActiveSnapshot<'_, C> {
    fn drop(&mut self) {
        // SAFETY: as for `deref`.
        self.cell.with_mut(|container| unsafe { (*container).clear() });
    }
}
