//! Value identities.
//!
//! Every signal reports a [`ValueId`] for the value it currently carries. Two
//! reads that report the same id observe the same value, so consumers can skip
//! recomputation by comparing ids instead of values (which would need
//! `PartialEq` and may be expensive).

use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

/// Cheap, comparable identity of a signal's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(u64);

impl ValueId {
    /// Reported by signals that never carry a value.
    pub const EMPTY: ValueId = ValueId(0);

    /// Generate a new unique id.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn fresh() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Id of a value identified by its hash.
    pub fn of_hash<H: Hash + ?Sized>(value: &H) -> Self {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Id of a value determined by two other values.
    pub fn combine(self, other: ValueId) -> Self {
        Self::of_hash(&(self.0, other.0))
    }

    /// Id of the transform type `F`.
    ///
    /// Derived values mix this into their identity so that two different
    /// functions of the same inputs never report the same id.
    pub(crate) fn of_type<F: ?Sized + 'static>() -> Self {
        Self::of_hash(&TypeId::of::<F>())
    }

    /// Id of the `version`-th value held by the storage identified by `self`.
    pub(crate) fn versioned(self, version: u64) -> Self {
        Self::of_hash(&(self.0, version, "version"))
    }

    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ValueId {
    fn default() -> Self {
        Self::fresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        let id1 = ValueId::fresh();
        let id2 = ValueId::fresh();
        let id3 = ValueId::fresh();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
        assert_ne!(id1, ValueId::EMPTY);
    }

    #[test]
    fn combine_is_deterministic_and_ordered() {
        let a = ValueId::fresh();
        let b = ValueId::fresh();

        assert_eq!(a.combine(b), a.combine(b));
        assert_ne!(a.combine(b), b.combine(a));
    }

    #[test]
    fn transform_types_are_distinguished() {
        fn kind<F: 'static>(_: &F) -> ValueId {
            ValueId::of_type::<F>()
        }
        let double = |v: i32| v * 2;
        let same = |v: i32| v;
        assert_ne!(kind(&double), kind(&same));
        assert_eq!(kind(&double), kind(&double));
    }

    #[test]
    fn versions_of_one_origin_differ() {
        let origin = ValueId::fresh();
        assert_ne!(origin.versioned(0), origin.versioned(1));
        assert_eq!(origin.versioned(3), origin.versioned(3));
    }
}
