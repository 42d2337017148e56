/// Errors surfaced by the slot containers.
///
/// All of these are local to the call that produced them. Nothing is retried
/// internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A keyed lookup found no matching entry.
    #[error("no entry exists for the requested key")]
    NotFound,

    /// A dequeue or peek was attempted on an empty queue.
    #[error("the queue is empty")]
    Empty,

    /// An insert hit an existing key under
    /// [`DuplicateKeyPolicy::ThrowOnDuplicate`](crate::DuplicateKeyPolicy::ThrowOnDuplicate).
    #[error("an entry with this key already exists")]
    DuplicateKey,

    /// Growth could not produce a table larger than the current one.
    ///
    /// Normal operation never reaches this: it means the capacity table has
    /// been exhausted.
    #[error("cannot grow table of size {size} holding {high_water} allocated slots")]
    CapacityInvariantViolation {
        /// Size of the table at the time growth was attempted.
        size: usize,
        /// High-water slot id at the time growth was attempted.
        high_water: usize,
    },
}

/// Result type used throughout this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
