//! Actions
//!
//! An [`Action`] is a deferred request to mutate state. It is built during a
//! traversal, handed to the renderer or a timer, and triggered later by an
//! external event.
//!
//! # How Triggering Works
//!
//! 1. The host asks [`Action::is_ready`] to decide whether to offer the action
//!    (enable a button, arm a timer).
//! 2. On trigger, the action is *latched*: readiness is checked again and every
//!    value the action needs is read. Nothing has been written yet.
//! 3. If every part latched, the recorded writes run in declared order.
//!    Otherwise nothing runs and the caller receives [`NotReady`].
//!
//! # Building Actions
//!
//! - Operators on writable signals: [`Signal::reset`], [`Signal::assign`],
//!   [`Signal::increment`], [`Signal::add_assign`], [`Signal::toggle`], ...
//! - [`callback`] wraps external code taking a value.
//! - [`Action::bind`] fixes an argument to a signal's value at trigger time.
//! - [`sequence`] and [`Action::then`] combine actions atomically.
//!
//! [`Signal::reset`]: crate::signal::Signal::reset
//! [`Signal::assign`]: crate::signal::Signal::assign
//! [`Signal::increment`]: crate::signal::Signal::increment
//! [`Signal::add_assign`]: crate::signal::Signal::add_assign
//! [`Signal::toggle`]: crate::signal::Signal::toggle

mod combine;
mod ops;

pub use combine::{callback, noop, sequence, Action, Effect};
pub use crate::error::{Blocker, NotReady};
