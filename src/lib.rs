#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod capacity;

mod error;
mod policy;
mod sync;

pub mod slot_table;

/// A key-value map over the slot arena.
///
/// This module provides a `HashMap` that wraps the `SlotTable` and resolves
/// duplicate keys with a [`DuplicateKeyPolicy`] fixed at construction.
pub mod hash_map;

/// A hash set over the slot arena.
///
/// This module provides a `HashSet` that wraps the `SlotTable` and resolves
/// duplicate values with a [`DuplicateKeyPolicy`] fixed at construction.
pub mod hash_set;

mod fifo;

/// A keyed queue that drains in insertion order.
pub mod fifo_map;

/// A value-only queue that drains in insertion order.
pub mod fifo_set;

/// Single-writer, single-reader handoff between two containers.
pub mod double_buffer;

pub use double_buffer::Container;
pub use double_buffer::DoubleBuffer;
pub use error::Error;
pub use error::Result;
pub use fifo_map::FifoKeyedQueue;
pub use fifo_set::FifoSet;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use policy::DuplicateKeyPolicy;
pub use policy::InsertOutcome;
pub use slot_table::SlotTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is given.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder used when neither `foldhash` nor `std` is enabled.
        ///
        /// It implements no `BuildHasher`, so containers must be built with
        /// an explicit hasher.
        #[derive(Debug, Clone, Copy)]
        pub enum DefaultHashBuilder {}
    }
}
