//! Traversal Engine
//!
//! This module drives the UI function: it hands out addresses, resolves
//! persistent state, scopes conditionals, and collects event handlers.
//!
//! # Concepts
//!
//! ## Traversals
//!
//! The UI function is called once per update with a [`Context`]. It declares
//! state, derived values and event handlers as it goes; the [`Runtime`]
//! sweeps everything it did not declare this time.
//!
//! ## Conditionals
//!
//! [`Context::when`] and [`Context::branch`] are control flow that the
//! runtime can see. An arm that is not taken is not visited, so its state is
//! unmounted and starts over from its defaults the next time the arm shows.
//!
//! ## Validation
//!
//! [`Context::enforce_validity`] guards a writable signal with a validator.
//! Refused writes blank the signal and are kept at their own position until
//! a valid value replaces them.
//!
//! ## Events
//!
//! [`Context::on_event`] registers an action and returns an [`EventId`] the
//! renderer attaches to a widget. The host calls [`Runtime::dispatch`] (or
//! [`System::dispatch`]) when the widget fires.

mod branch;
mod context;
mod events;
mod memo;
mod system;
mod validity;

pub use branch::Branch;
pub use context::Context;
pub use events::EventId;
pub use system::{Runtime, System, TraversalStats};
pub use validity::Validated;
