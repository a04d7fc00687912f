//! Signal Implementation
//!
//! A [`Signal`] is a lightweight, cloneable handle onto a value that may or
//! may not be present. Signals are rebuilt on every traversal; the data they
//! expose lives elsewhere (a state cell, a constant, a function of other
//! signals) behind the [`Source`] trait.
//!
//! # Validity
//!
//! An empty signal is a normal state, not an error. [`Signal::read`] returns
//! `None` and anything derived from the signal is empty as well.
//!
//! # Capabilities
//!
//! Each handle carries a [`Capability`]. Handles can be narrowed
//! ([`Signal::read_only`], [`Signal::write_only`]) but never widened. Reading
//! through a write-only handle or writing through a read-only one is a
//! programmer error and halts.
//!
//! # Identity
//!
//! [`Signal::value_id`] reports a [`ValueId`] for the current value without
//! computing it. Derived signals and persistent `apply` slots compare ids to
//! decide whether they must recompute.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::Serialize;

use super::derived::MemoState;
use super::id::ValueId;
use crate::error::{fatal, SignalError};

/// What a signal handle permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Capability {
    pub fn can_read(self) -> bool {
        !matches!(self, Capability::WriteOnly)
    }

    pub fn can_write(self) -> bool {
        !matches!(self, Capability::ReadOnly)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::ReadOnly => "read-only",
            Capability::WriteOnly => "write-only",
            Capability::ReadWrite => "read-write",
        })
    }
}

/// Types that can flow through signals.
pub trait Value: Clone + Send + Sync + 'static {}

impl<T> Value for T where T: Clone + Send + Sync + 'static {}

/// The backing implementation of a [`Signal`].
///
/// Implementors decide where the value lives. Write support is optional:
/// the default `write`/`clear` refuse with [`SignalError::NotWritable`].
pub trait Source<T>: Send + Sync {
    fn capability(&self) -> Capability;

    /// Identity of the value `read` would currently return.
    fn value_id(&self) -> ValueId;

    fn read(&self) -> Option<T>;

    /// Cache state, for sources that memoize.
    fn memo_state(&self) -> Option<MemoState> {
        None
    }

    /// Whether a write would currently be accepted.
    fn ready_to_write(&self) -> bool {
        self.capability().can_write()
    }

    fn write(&self, value: T) -> Result<(), SignalError> {
        drop(value);
        Err(SignalError::NotWritable(self.capability()))
    }

    /// Make the value empty.
    fn clear(&self) -> Result<(), SignalError> {
        Err(SignalError::NotWritable(self.capability()))
    }
}

/// A typed, possibly-empty value handle.
///
/// # Example
///
/// ```rust
/// use lattice_dataflow::signal::{empty, value};
///
/// let price = value(4.0);
/// let quantity = empty::<f64>();
/// let total = price.times(&quantity);
///
/// assert_eq!(price.read(), Some(4.0));
/// assert_eq!(total.read(), None);
/// ```
pub struct Signal<T>
where
    T: Value,
{
    source: Arc<dyn Source<T>>,

    /// Capability of this handle; never wider than the source's.
    capability: Capability,
}

impl<T> Signal<T>
where
    T: Value,
{
    /// Wrap a source in a handle with the source's full capability.
    pub fn from_source<S>(source: S) -> Self
    where
        S: Source<T> + 'static,
    {
        let capability = source.capability();
        Self {
            source: Arc::new(source),
            capability,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Identity of the current value. Cheap: never evaluates derived values.
    pub fn value_id(&self) -> ValueId {
        self.source.value_id()
    }

    /// Read the current value, reporting capability misuse as an error.
    pub fn try_read(&self) -> Result<Option<T>, SignalError> {
        if !self.capability.can_read() {
            return Err(SignalError::NotReadable(self.capability));
        }
        Ok(self.source.read())
    }

    /// Read the current value. `None` means the signal is empty.
    ///
    /// # Panics
    ///
    /// Panics if the handle is write-only.
    #[track_caller]
    pub fn read(&self) -> Option<T> {
        match self.try_read() {
            Ok(value) => value,
            Err(err) => fatal(err),
        }
    }

    /// Whether a memoized source would recompute on the next read.
    ///
    /// `None` for sources that do not cache.
    pub fn memo_state(&self) -> Option<MemoState> {
        self.source.memo_state()
    }

    /// Whether the signal currently carries a value.
    #[track_caller]
    pub fn has_value(&self) -> bool {
        self.read().is_some()
    }

    /// Whether a write through this handle would currently be accepted.
    pub fn ready_to_write(&self) -> bool {
        self.capability.can_write() && self.source.ready_to_write()
    }

    /// Write a value, reporting capability misuse as an error.
    pub fn try_write(&self, value: T) -> Result<(), SignalError> {
        if !self.capability.can_write() {
            return Err(SignalError::NotWritable(self.capability));
        }
        self.source.write(value)
    }

    /// Write a value.
    ///
    /// # Panics
    ///
    /// Panics if the handle (or its source) is not writable.
    #[track_caller]
    pub fn write(&self, value: T) {
        if let Err(err) = self.try_write(value) {
            fatal(err);
        }
    }

    pub fn try_clear(&self) -> Result<(), SignalError> {
        if !self.capability.can_write() {
            return Err(SignalError::NotWritable(self.capability));
        }
        self.source.clear()
    }

    /// Make the signal empty.
    ///
    /// # Panics
    ///
    /// Panics if the handle (or its source) is not writable.
    #[track_caller]
    pub fn clear(&self) {
        if let Err(err) = self.try_clear() {
            fatal(err);
        }
    }

    /// A handle onto the same source that only permits reading.
    #[track_caller]
    pub fn read_only(&self) -> Signal<T> {
        if !self.capability.can_read() {
            fatal(SignalError::NotReadable(self.capability));
        }
        self.with_capability(Capability::ReadOnly)
    }

    /// A handle onto the same source that only permits writing.
    #[track_caller]
    pub fn write_only(&self) -> Signal<T> {
        if !self.capability.can_write() {
            fatal(SignalError::NotWritable(self.capability));
        }
        self.with_capability(Capability::WriteOnly)
    }

    fn with_capability(&self, capability: Capability) -> Signal<T> {
        Self {
            source: Arc::clone(&self.source),
            capability,
        }
    }
}

impl<T> Clone for Signal<T>
where
    T: Value,
{
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            capability: self.capability,
        }
    }
}

impl<T> fmt::Debug for Signal<T>
where
    T: Value,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("type", &std::any::type_name::<T>())
            .field("capability", &self.capability)
            .field("value_id", &self.value_id())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Basic Sources
// ----------------------------------------------------------------------------

struct Constant<T> {
    value: T,
    id: ValueId,
}

impl<T> Source<T> for Constant<T>
where
    T: Value,
{
    fn capability(&self) -> Capability {
        Capability::ReadOnly
    }

    fn value_id(&self) -> ValueId {
        self.id
    }

    fn read(&self) -> Option<T> {
        Some(self.value.clone())
    }
}

struct Empty;

impl<T> Source<T> for Empty
where
    T: Value,
{
    fn capability(&self) -> Capability {
        Capability::ReadOnly
    }

    fn value_id(&self) -> ValueId {
        ValueId::EMPTY
    }

    fn read(&self) -> Option<T> {
        None
    }
}

struct Sink<F> {
    accept: F,
}

impl<T, F> Source<T> for Sink<F>
where
    T: Value,
    F: Fn(T) + Send + Sync,
{
    fn capability(&self) -> Capability {
        Capability::WriteOnly
    }

    fn value_id(&self) -> ValueId {
        ValueId::EMPTY
    }

    fn read(&self) -> Option<T> {
        None
    }

    fn write(&self, value: T) -> Result<(), SignalError> {
        (self.accept)(value);
        Ok(())
    }
}

/// A read-only signal that always carries `value`.
///
/// Each call produces a new identity, so consumers that cache on identities
/// recompute when a constant is rebuilt. Use [`hashed_value`] when the value
/// is hashable and the cache should survive across traversals.
pub fn value<T>(value: T) -> Signal<T>
where
    T: Value,
{
    Signal::from_source(Constant {
        value,
        id: ValueId::fresh(),
    })
}

/// A read-only constant whose identity is the hash of the value.
pub fn hashed_value<T>(value: T) -> Signal<T>
where
    T: Value + Hash,
{
    let id = ValueId::of_hash(&value);
    Signal::from_source(Constant { value, id })
}

/// A read-only signal that never carries a value.
pub fn empty<T>() -> Signal<T>
where
    T: Value,
{
    Signal::from_source(Empty)
}

/// A write-only signal that hands every written value to `accept`.
pub fn sink<T, F>(accept: F) -> Signal<T>
where
    T: Value,
    F: Fn(T) + Send + Sync + 'static,
{
    Signal::from_source(Sink { accept })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
