//! Signals
//!
//! This module implements the value side of the runtime: signal handles,
//! the derived-signal evaluator, and duplex views.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A [`Signal`] is a handle onto a value that may be missing. Signals are
//! cheap to clone and are rebuilt on every traversal; persistent data lives in
//! state cells owned by the store.
//!
//! ## Derived Signals
//!
//! [`lazy_apply`] and the fluent operators ([`Signal::plus`],
//! [`Signal::less_than`], ...) build read-only signals from functions of other
//! signals. They evaluate on first read, skip the function when an input is
//! empty, and memoize on the identities of their inputs.
//!
//! ## Views
//!
//! [`Signal::bimap`] and [`scale`] present a signal through a reversible
//! conversion. Writes to the view are converted back and stored in the
//! backing signal.

mod handle;
mod derived;
mod id;
mod ops;
mod view;

pub use handle::{empty, hashed_value, sink, value, Capability, Signal, Source, Value};
pub use derived::{lazy_apply, lazy_apply2, lazy_apply3, MemoState};
pub use id::ValueId;
pub use ops::conditional;
pub use view::{scale, ScaleFactor};
