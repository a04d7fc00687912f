//! Lattice Dataflow
//!
//! This crate provides the dataflow runtime behind Lattice UI descriptions.
//! A UI is described by a function that is re-run on every update; the
//! runtime makes that cheap and correct. It implements:
//!
//! - Signals: typed values that may be absent, with capabilities and
//!   identities
//! - Lazy, memoized derived signals
//! - Actions: deferred, composable, latched state mutations
//! - Tree-addressed persistent state with mount/unmount sweeping
//! - Adapters for timers and host callbacks
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `signal`: Signal handles, derived values and duplex views
//! - `action`: Actions, combinators and operator-derived actions
//! - `tree`: Addresses and the state store
//! - `runtime`: The traversal engine, conditionals, validation, events,
//!   `Runtime`/`System`
//! - `bridge`: Timers, clocks, probes and callbacks
//! - `config`: Runtime settings
//! - `error`: Error types
//!
//! # Example
//!
//! ```rust
//! use lattice_dataflow::{Runtime, Signal};
//!
//! let mut runtime = Runtime::default();
//! let mut shown = None;
//!
//! runtime.traverse(|ctx| {
//!     let bill: Signal<f64> = ctx.state_empty();
//!     let rate = ctx.state(0.18);
//!     let tip = bill.times(&rate);
//!
//!     // Nothing to show until the bill is entered.
//!     assert_eq!(tip.read(), None);
//!
//!     bill.reset(20.0).trigger().unwrap();
//!     shown = tip.read();
//! });
//!
//! assert!((shown.unwrap() - 3.6).abs() < 1e-9);
//! ```

pub mod action;
pub mod bridge;
pub mod config;
pub mod error;
pub mod runtime;
pub mod signal;
pub mod tree;

pub use action::{callback, sequence, Action, NotReady};
pub use config::RuntimeConfig;
pub use error::{DispatchError, SignalError, StateError, ValidationError};
pub use runtime::{Context, EventId, Runtime, System, TraversalStats, Validated};
pub use signal::{Capability, Signal};
