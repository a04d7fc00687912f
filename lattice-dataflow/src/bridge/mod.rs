//! External Event Bridge
//!
//! Adapters between host-driven sources and the signal/action vocabulary.
//! Nothing here performs I/O or waits: timers are read through their
//! [`Countdown`] interface, external readings are pulled through [`probe`],
//! and host callbacks are wrapped with [`callback`].

mod clock;
mod timer;

use std::hash::Hash;

use crate::signal::{Capability, Signal, Source, Value, ValueId};

pub use crate::action::callback;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use timer::{ClockTimer, Countdown, Timer};

struct Probe<F> {
    read: F,
}

impl<T, F> Source<T> for Probe<F>
where
    T: Value + Hash,
    F: Fn() -> Option<T> + Send + Sync,
{
    fn capability(&self) -> Capability {
        Capability::ReadOnly
    }

    fn value_id(&self) -> ValueId {
        (self.read)().map_or(ValueId::EMPTY, |value| ValueId::of_hash(&value))
    }

    fn read(&self) -> Option<T> {
        (self.read)()
    }
}

/// A read-only signal that asks `read` for its value on every access.
///
/// The value's hash serves as its identity, so derived signals and `apply`
/// slots recompute exactly when the reading changes.
pub fn probe<T, F>(read: F) -> Signal<T>
where
    T: Value + Hash,
    F: Fn() -> Option<T> + Send + Sync + 'static,
{
    Signal::from_source(Probe { read })
}
