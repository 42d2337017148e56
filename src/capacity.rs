//! Table sizes.
//!
//! Every slot table is sized from a fixed list of powers of two so that the
//! bucket index can be taken with a mask instead of a modulo.

/// Capacity used when a container is built through `Default`.
pub const DEFAULT_CAPACITY: usize = 4;

const CAPACITIES: [usize; 29] = [
    1 << 2,
    1 << 3,
    1 << 4,
    1 << 5,
    1 << 6,
    1 << 7,
    1 << 8,
    1 << 9,
    1 << 10,
    1 << 11,
    1 << 12,
    1 << 13,
    1 << 14,
    1 << 15,
    1 << 16,
    1 << 17,
    1 << 18,
    1 << 19,
    1 << 20,
    1 << 21,
    1 << 22,
    1 << 23,
    1 << 24,
    1 << 25,
    1 << 26,
    1 << 27,
    1 << 28,
    1 << 29,
    1 << 30,
];

/// Returns the smallest supported capacity that is at least `requested`.
///
/// Requests below the smallest entry are rounded up to it. Requests above the
/// largest entry saturate at the largest entry, so callers that need strict
/// growth must compare the result against their current size.
///
/// # Examples
///
/// ```rust
/// use slot_hash::capacity::next_capacity;
///
/// assert_eq!(next_capacity(0), 4);
/// assert_eq!(next_capacity(4), 4);
/// assert_eq!(next_capacity(5), 8);
/// assert_eq!(next_capacity(1000), 1024);
/// ```
pub fn next_capacity(requested: usize) -> usize {
    let index = CAPACITIES.partition_point(|&capacity| capacity < requested);
    CAPACITIES[index.min(CAPACITIES.len() - 1)]
}

/// Largest capacity [`next_capacity`] can return.
pub const fn max_capacity() -> usize {
    CAPACITIES[CAPACITIES.len() - 1]
}
