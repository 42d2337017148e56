/// What an insert does when the key it carries is already present.
///
/// The policy is fixed when a container is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DuplicateKeyPolicy {
    /// Leave the stored entry untouched and hand the new value back.
    KeepExisting,
    /// Overwrite the stored value and hand the old value back.
    #[default]
    Replace,
    /// Fail the insert with [`Error::DuplicateKey`](crate::Error::DuplicateKey),
    /// leaving the container unchanged.
    ThrowOnDuplicate,
}

/// The result of a successful insert.
///
/// `T` is the value type of the container: for maps it is the mapped value,
/// for sets it is the element itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    /// The key was not present; a new slot was filled.
    Inserted,
    /// The key was present and the policy kept the stored entry. Carries the
    /// value that was not inserted.
    Kept(T),
    /// The key was present and its value was overwritten. Carries the old
    /// value.
    Replaced(T),
}

impl<T> InsertOutcome<T> {
    /// Returns `true` if a new slot was filled.
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }

    /// Returns `true` if an existing value was overwritten.
    pub fn is_replaced(&self) -> bool {
        matches!(self, InsertOutcome::Replaced(_))
    }

    /// Returns `true` if the stored entry was kept and the new value rejected.
    pub fn is_kept(&self) -> bool {
        matches!(self, InsertOutcome::Kept(_))
    }

    /// Maps the carried value, if any.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> InsertOutcome<U> {
        match self {
            InsertOutcome::Inserted => InsertOutcome::Inserted,
            InsertOutcome::Kept(value) => InsertOutcome::Kept(f(value)),
            InsertOutcome::Replaced(value) => InsertOutcome::Replaced(f(value)),
        }
    }

    /// Returns the carried value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            InsertOutcome::Inserted => None,
            InsertOutcome::Kept(value) | InsertOutcome::Replaced(value) => Some(value),
        }
    }
}
