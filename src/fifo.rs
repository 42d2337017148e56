//! Insertion-order index shared by the queue containers.

use alloc::vec;
use alloc::vec::Vec;

use crate::capacity::DEFAULT_CAPACITY;
use crate::slot_table::NIL;
use crate::slot_table::SlotId;

/// A ring of slot ids in insertion order.
///
/// The live window is `len` ids starting at `head`. When a push finds the
/// ring full, the buffer doubles and the window is copied to start at index
/// `0`.
#[derive(Debug, Clone)]
pub(crate) struct FifoIndex {
    ids: Vec<SlotId>,
    head: usize,
    len: usize,
}

impl FifoIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: vec![NIL; capacity.max(DEFAULT_CAPACITY)],
            head: 0,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn buffer_len(&self) -> usize {
        self.ids.len()
    }

    #[inline(always)]
    fn physical(&self, offset: usize) -> usize {
        let index = self.head + offset;
        if index >= self.ids.len() {
            index - self.ids.len()
        } else {
            index
        }
    }

    pub(crate) fn push_back(&mut self, slot: SlotId) {
        if self.len == self.ids.len() {
            self.grow();
        }
        let tail = self.physical(self.len);
        self.ids[tail] = slot;
        self.len += 1;
    }

    #[cold]
    fn grow(&mut self) {
        let old_len = self.ids.len();
        let mut ids = vec![NIL; old_len * 2];
        for (offset, id) in ids.iter_mut().take(self.len).enumerate() {
            *id = self.ids[self.physical(offset)];
        }
        self.ids = ids;
        self.head = 0;

        tracing::debug!(old_len, new_len = self.ids.len(), "fifo index grew");
    }

    pub(crate) fn front(&self) -> Option<SlotId> {
        (self.len > 0).then(|| self.ids[self.head])
    }

    pub(crate) fn pop_front(&mut self) -> Option<SlotId> {
        let slot = self.front()?;
        self.ids[self.head] = NIL;
        self.head = self.physical(1);
        self.len -= 1;
        if self.len == 0 {
            self.head = 0;
        }
        Some(slot)
    }

    /// Deletes `slot` from the window, shifting later ids forward by one.
    ///
    /// Returns `false` if the id is not queued.
    pub(crate) fn remove(&mut self, slot: SlotId) -> bool {
        let Some(position) = (0..self.len).find(|&offset| self.ids[self.physical(offset)] == slot)
        else {
            return false;
        };

        for offset in position..self.len - 1 {
            let to = self.physical(offset);
            self.ids[to] = self.ids[self.physical(offset + 1)];
        }
        let last = self.physical(self.len - 1);
        self.ids[last] = NIL;
        self.len -= 1;
        if self.len == 0 {
            self.head = 0;
        }
        true
    }

    pub(crate) fn clear(&mut self) {
        self.ids.fill(NIL);
        self.head = 0;
        self.len = 0;
    }

    /// Queued ids, oldest first.
    pub(crate) fn iter(&self) -> impl ExactSizeIterator<Item = SlotId> + '_ {
        (0..self.len).map(move |offset| self.ids[self.physical(offset)])
    }
}
