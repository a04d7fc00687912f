//! State cells.
//!
//! A [`StateCell`] is the persistent storage behind a piece of
//! component-local state. The [`StateStore`](super::StateStore) owns every
//! cell; signals created by `Context::state` only hold a shared handle and
//! stop seeing the cell's value once the store unmounts it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use super::store::Slot;
use crate::error::SignalError;
use crate::signal::{Capability, Signal, Source, Value, ValueId};

/// Lifecycle of a mounted slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    /// Created by the current or an earlier traversal and never written.
    Initialized,

    /// Written at least once since it was mounted.
    Updated,

    /// Dropped by the store. Reads are empty and writes are discarded.
    Unmounted,
}

/// A persistent, address-owned storage slot.
pub struct StateCell<T> {
    /// Identity of this cell; combined with `version` to identify values.
    origin: ValueId,

    value: RwLock<Option<T>>,

    /// Bumped on every write, including clears.
    version: AtomicU64,

    lifecycle: RwLock<CellState>,

    /// Shared with the store; raised whenever the cell is written.
    changed: Arc<AtomicBool>,
}

impl<T> StateCell<T>
where
    T: Value,
{
    pub(crate) fn new(initial: Option<T>, changed: Arc<AtomicBool>) -> Self {
        Self {
            origin: ValueId::fresh(),
            value: RwLock::new(initial),
            version: AtomicU64::new(0),
            lifecycle: RwLock::new(CellState::Initialized),
            changed,
        }
    }

    pub fn lifecycle(&self) -> CellState {
        *self.lifecycle.read()
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle() != CellState::Unmounted
    }

    pub fn value_id(&self) -> ValueId {
        self.origin.versioned(self.version.load(Ordering::Acquire))
    }

    /// Current value. Always empty once unmounted.
    pub fn get(&self) -> Option<T> {
        if !self.is_mounted() {
            return None;
        }
        self.value.read().clone()
    }

    /// Replace the value. Discarded if the cell was unmounted.
    pub fn set(&self, value: Option<T>) {
        let mut lifecycle = self.lifecycle.write();
        if *lifecycle == CellState::Unmounted {
            tracing::debug!(cell = self.origin.raw(), "write to unmounted cell dropped");
            return;
        }

        *self.value.write() = value;
        self.version.fetch_add(1, Ordering::AcqRel);
        *lifecycle = CellState::Updated;
        self.changed.store(true, Ordering::Release);
    }

    /// A read-write signal viewing this cell.
    pub fn signal(self: &Arc<Self>) -> Signal<T> {
        Signal::from_source(CellView {
            cell: Arc::clone(self),
        })
    }
}

impl<T> Slot for StateCell<T>
where
    T: Value,
{
    fn on_unmount(&self) {
        *self.lifecycle.write() = CellState::Unmounted;
        *self.value.write() = None;
    }

    fn lifecycle(&self) -> Option<CellState> {
        Some(StateCell::lifecycle(self))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn std::any::Any + Send + Sync> {
        self
    }
}

/// Signal source reading and writing a [`StateCell`].
struct CellView<T> {
    cell: Arc<StateCell<T>>,
}

impl<T> Source<T> for CellView<T>
where
    T: Value,
{
    fn capability(&self) -> Capability {
        Capability::ReadWrite
    }

    fn value_id(&self) -> ValueId {
        self.cell.value_id()
    }

    fn read(&self) -> Option<T> {
        self.cell.get()
    }

    fn ready_to_write(&self) -> bool {
        self.cell.is_mounted()
    }

    fn write(&self, value: T) -> Result<(), SignalError> {
        self.cell.set(Some(value));
        Ok(())
    }

    fn clear(&self) -> Result<(), SignalError> {
        self.cell.set(None);
        Ok(())
    }
}
