//! State Store
//!
//! The store is an arena of slots indexed by [`Address`]. It is the only
//! owner of persistent state; everything else holds shared handles.
//!
//! # Algorithm
//!
//! Each traversal is stamped with a number:
//!
//! 1. [`StateStore::begin`] starts a new stamp. Every entry still carrying the
//!    previous stamp is, at this point, "mounted by the previous traversal".
//! 2. [`StateStore::resolve`] finds (or creates) the slot at an address and
//!    re-stamps it.
//! 3. [`StateStore::sweep`] drops every entry whose stamp is stale. Hidden
//!    branches and collapsed subtrees lose their state here, before the next
//!    traversal can observe it.
//!
//! Entries are kept in insertion order so sweeps and snapshots are
//! deterministic.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use super::address::Address;
use super::cell::CellState;
use crate::error::StateError;

/// Anything the store can own at an address.
pub trait Slot: Send + Sync + 'static {
    /// Called once when the store drops the slot.
    fn on_unmount(&self);

    /// Lifecycle, for slots that track one.
    fn lifecycle(&self) -> Option<CellState> {
        None
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

struct Entry {
    slot: Arc<dyn Slot>,
    type_name: &'static str,
    /// Stamp of the last traversal that resolved this entry.
    visited: u64,
}

/// Counters for one traversal, as reported by [`StateStore::sweep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    /// Entries resolved this traversal.
    pub visited: usize,
    /// Entries created this traversal.
    pub mounted: usize,
    /// Entries dropped by the sweep.
    pub unmounted: usize,
}

/// One mounted entry, as listed by [`StateStore::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    pub address: Address,
    pub type_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<CellState>,
}

/// Tree-shaped persistent store addressed by traversal position.
pub struct StateStore {
    entries: IndexMap<Address, Entry>,

    /// Current traversal stamp.
    stamp: u64,

    /// Counters for the traversal in progress.
    round: SweepStats,

    /// Raised by slots whenever persistent state is written.
    changed: Arc<AtomicBool>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            stamp: 0,
            round: SweepStats::default(),
            changed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a new traversal stamp. Returns the stamp.
    pub fn begin(&mut self) -> u64 {
        self.stamp += 1;
        self.round = SweepStats::default();
        self.changed.store(false, Ordering::Release);
        self.stamp
    }

    /// Find or create the slot of type `S` at `address`, marking it visited.
    ///
    /// Fails if the address already holds a slot of another type.
    pub fn resolve<S, F>(&mut self, address: &Address, init: F) -> Result<Arc<S>, StateError>
    where
        S: Slot,
        F: FnOnce() -> S,
    {
        if let Some(entry) = self.entries.get_mut(address) {
            if entry.visited != self.stamp {
                entry.visited = self.stamp;
                self.round.visited += 1;
            }
            let found = entry.type_name;
            return Arc::clone(&entry.slot)
                .into_any()
                .downcast::<S>()
                .map_err(|_| StateError::TypeMismatch {
                    address: address.clone(),
                    expected: std::any::type_name::<S>(),
                    found,
                });
        }

        let slot = Arc::new(init());
        self.entries.insert(
            address.clone(),
            Entry {
                slot: slot.clone(),
                type_name: std::any::type_name::<S>(),
                visited: self.stamp,
            },
        );
        self.round.visited += 1;
        self.round.mounted += 1;
        tracing::trace!(%address, "mounted");
        Ok(slot)
    }

    /// Drop every entry not resolved since the last [`begin`](Self::begin).
    pub fn sweep(&mut self) -> SweepStats {
        let stamp = self.stamp;
        let mut unmounted = 0;
        self.entries.retain(|address, entry| {
            let keep = entry.visited == stamp;
            if !keep {
                entry.slot.on_unmount();
                unmounted += 1;
                tracing::trace!(%address, "unmounted");
            }
            keep
        });
        self.round.unmounted = unmounted;
        self.round
    }

    /// Flag raised whenever a slot writes persistent state.
    pub fn changed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.changed)
    }

    /// Whether persistent state was written since the last `begin`.
    pub fn has_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.entries.contains_key(address)
    }

    pub fn lifecycle(&self, address: &Address) -> Option<CellState> {
        self.entries.get(address).and_then(|entry| entry.slot.lifecycle())
    }

    /// Mounted addresses, in mount order.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.entries.keys()
    }

    /// Number of mounted entries under `ancestor` (inclusive).
    pub fn count_under(&self, ancestor: &Address) -> usize {
        self.entries
            .keys()
            .filter(|address| address.starts_with(ancestor))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Vec<SlotSummary> {
        self.entries
            .iter()
            .map(|(address, entry)| SlotSummary {
                address: address.clone(),
                type_name: entry.type_name,
                lifecycle: entry.slot.lifecycle(),
            })
            .collect()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
