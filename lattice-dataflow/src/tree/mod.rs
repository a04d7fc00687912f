//! State Tree
//!
//! This module implements the persistent side of the runtime: the addresses
//! that identify positions in the UI tree and the store that keeps state at
//! those positions across traversals.
//!
//! # Overview
//!
//! The UI function is re-run on every update. Each call that needs state
//! takes the next position in its scope, and the resulting [`Address`] is the
//! key into the [`StateStore`]:
//!
//! - Same structure, same addresses: state survives re-runs.
//! - A branch that is not taken is not visited, so its state is dropped by the
//!   sweep that ends the traversal.
//! - Branch arms and keyed scopes add their own segments, so two structurally
//!   different subtrees never share an address.
//!
//! # Design Decisions
//!
//! 1. Addresses are paths rather than pointers from a previous run, so
//!    matching across traversals needs no reflection or diffing.
//!
//! 2. The store is a flat arena indexed by full address. Dropping a subtree is
//!    a single pass over the arena.

mod address;
mod cell;
mod store;

pub use address::{Address, Segment};
pub use cell::{CellState, StateCell};
pub use store::{Slot, SlotSummary, StateStore, SweepStats};
