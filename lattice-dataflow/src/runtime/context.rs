//! Traversal Context
//!
//! A [`Context`] is handed to the UI function for the duration of one
//! traversal. Every call that needs persistent state takes the next position
//! in the current scope, so the address of a piece of state is determined by
//! the shape of the UI function, not by what the state contains.
//!
//! # How Addressing Works
//!
//! 1. Each scope counts the positional slots it has handed out. `state`,
//!    `apply`, `enforce_validity`, `on_event`, `countdown`, `scope`, `keyed`
//!    and branches each take exactly one slot, whether or not they end up
//!    mounting anything.
//!
//! 2. Nested scopes (`scope`, `keyed`, branch arms) start counting from zero
//!    under their own address.
//!
//! 3. A keyed scope appends a segment derived from the key, so re-invoking
//!    the same code with a different key mounts different state.
//!
//! 4. A branch arm appends an arm segment, so two arms at the same position
//!    never share state.
//!
//! # Example
//!
//! ```rust
//! use lattice_dataflow::Runtime;
//!
//! let mut runtime = Runtime::default();
//! for _ in 0..2 {
//!     runtime.traverse(|ctx| {
//!         let clicks = ctx.state(0u32);
//!         ctx.when(&clicks.greater_than(&lattice_dataflow::signal::value(3)), |ctx| {
//!             let _celebrated = ctx.state(false);
//!         });
//!     });
//! }
//! assert_eq!(runtime.store().len(), 1);
//! ```

use std::hash::Hash;
use std::sync::Arc;

use super::branch::Branch;
use super::events::{EventId, EventRegistry};
use super::memo::MemoSlot;
use crate::action::Action;
use crate::bridge::{Clock, ClockTimer, Countdown, Timer};
use crate::config::RuntimeConfig;
use crate::error::{fatal, StateError};
use crate::signal::{Signal, Value};
use crate::tree::{Address, Segment, Slot, StateCell, StateStore};

/// Scope-aware access to the store during one traversal.
pub struct Context<'a> {
    store: &'a mut StateStore,
    events: &'a mut EventRegistry,
    config: &'a RuntimeConfig,

    /// Raised when something mounted this traversal wants another one soon.
    refresh: &'a mut bool,

    traversal: u64,

    /// Address of the scope this context hands out slots in.
    scope: Address,

    next_slot: u32,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        store: &'a mut StateStore,
        events: &'a mut EventRegistry,
        config: &'a RuntimeConfig,
        refresh: &'a mut bool,
        traversal: u64,
    ) -> Self {
        Self {
            store,
            events,
            config,
            refresh,
            traversal,
            scope: Address::root(),
            next_slot: 0,
        }
    }

    /// Number of the traversal in progress, starting at 1.
    pub fn traversal(&self) -> u64 {
        self.traversal
    }

    /// Address of the current scope.
    pub fn address(&self) -> &Address {
        &self.scope
    }

    /// Take the next positional slot in the current scope.
    pub(crate) fn next_address(&mut self) -> Address {
        let address = self.scope.child(Segment::Slot(self.next_slot));
        self.next_slot += 1;
        address
    }

    #[track_caller]
    fn resolve<S, F>(&mut self, address: &Address, init: F) -> Arc<S>
    where
        S: Slot,
        F: FnOnce() -> S,
    {
        match self.store.resolve(address, init) {
            Ok(slot) => slot,
            Err(err) => fatal(err),
        }
    }

    /// The state cell at the next position, created with `initial` on first
    /// visit.
    ///
    /// # Panics
    ///
    /// Panics if the position already holds state of another type.
    #[track_caller]
    pub fn cell<T>(&mut self, initial: Option<T>) -> Arc<StateCell<T>>
    where
        T: Value,
    {
        let address = self.next_address();
        let changed = self.store.changed_flag();
        self.resolve(&address, || StateCell::new(initial, changed))
    }

    /// Persistent state at the next position, starting at `default`.
    ///
    /// `default` only matters the first time the position is visited, and
    /// again after the position was unmounted.
    #[track_caller]
    pub fn state<T>(&mut self, default: T) -> Signal<T>
    where
        T: Value,
    {
        self.cell(Some(default)).signal()
    }

    /// Persistent state at the next position, starting empty.
    #[track_caller]
    pub fn state_empty<T>(&mut self) -> Signal<T>
    where
        T: Value,
    {
        self.cell(None).signal()
    }

    /// Apply `f` to `input`, caching the result at the next position.
    ///
    /// Unlike [`lazy_apply`](crate::signal::lazy_apply), the cache outlives
    /// the traversal: `f` runs again only when `input` reports a different
    /// value id. The result is empty while `input` is.
    #[track_caller]
    pub fn apply<A, R, F>(&mut self, f: F, input: &Signal<A>) -> Signal<R>
    where
        A: Value,
        R: Value,
        F: FnOnce(A) -> R,
    {
        let address = self.next_address();
        let memo = self.resolve(&address, MemoSlot::<R>::new);
        memo.refresh(input.value_id(), || input.read().map(f));
        memo.signal()
    }

    /// Two-input variant of [`apply`](Self::apply).
    #[track_caller]
    pub fn apply2<A, B, R, F>(&mut self, f: F, a: &Signal<A>, b: &Signal<B>) -> Signal<R>
    where
        A: Value,
        B: Value,
        R: Value,
        F: FnOnce(A, B) -> R,
    {
        let address = self.next_address();
        let memo = self.resolve(&address, MemoSlot::<R>::new);
        let input = a.value_id().combine(b.value_id());
        memo.refresh(input, || Some(f(a.read()?, b.read()?)));
        memo.signal()
    }

    /// Run `f` in a fresh scope at the next position.
    ///
    /// Components use this to keep their slot numbering independent of
    /// whatever precedes them.
    #[track_caller]
    pub fn scope<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Context<'_>) -> R,
    {
        let address = self.next_address();
        self.enter(address, f)
    }

    /// Run `f` in a scope identified by `key` at the next position.
    ///
    /// State inside the scope belongs to that key: calling this again with a
    /// different key at the same position mounts fresh state and unmounts the
    /// old key's state.
    #[track_caller]
    pub fn keyed<K, R, F>(&mut self, key: &K, f: F) -> R
    where
        K: Hash + ?Sized,
        F: FnOnce(&mut Context<'_>) -> R,
    {
        let address = self.next_address().child(Segment::key(key));
        self.enter(address, f)
    }

    /// Run `f` only while `condition` is true.
    ///
    /// Returns `None` when the condition is false or empty; state declared
    /// inside `f` is then unmounted at the end of the traversal.
    #[track_caller]
    pub fn when<R, F>(&mut self, condition: &Signal<bool>, f: F) -> Option<R>
    where
        F: FnOnce(&mut Context<'_>) -> R,
    {
        let address = self.next_address().child(Segment::Arm(0));
        if condition.read() == Some(true) {
            Some(self.enter(address, f))
        } else {
            None
        }
    }

    /// Start a multi-arm conditional at the next position.
    ///
    /// ```rust
    /// # use lattice_dataflow::{Runtime, signal::value};
    /// # let mut runtime = Runtime::default();
    /// # runtime.traverse(|ctx| {
    /// let n = ctx.state(4);
    /// ctx.branch()
    ///     .when(&n.less_than(&value(0)), |_| {})
    ///     .when(&n.equals(&value(0)), |_| {})
    ///     .otherwise(|ctx| {
    ///         let _expanded = ctx.state(false);
    ///     });
    /// # });
    /// ```
    #[track_caller]
    pub fn branch(&mut self) -> Branch<'_, 'a> {
        let base = self.next_address();
        Branch::new(self, base)
    }

    /// Register `action` as the handler for an event the renderer will
    /// report. The id stays valid until the next traversal.
    pub fn on_event(&mut self, action: &Action) -> EventId {
        let address = self.next_address();
        self.events.register(address, action.clone())
    }

    /// A countdown timer driven by `clock`, owned by the next position.
    ///
    /// The timer is disarmed when its position is unmounted. While it runs,
    /// the runtime asks the host for another traversal so that readers of
    /// [`Timer::ticks_left`] see fresh values.
    #[track_caller]
    pub fn countdown(&mut self, clock: &Arc<dyn Clock>) -> Timer<ClockTimer> {
        let address = self.next_address();
        let changed = self.store.changed_flag();
        let timer = self.resolve(&address, || ClockTimer::new(Arc::clone(clock), changed));
        if timer.is_active() {
            self.request_refresh();
        }
        Timer::new(timer)
    }

    /// Ask the host to run another traversal after this one.
    pub fn request_refresh(&mut self) {
        *self.refresh = true;
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.config
    }

    #[track_caller]
    pub(crate) fn enter<R, F>(&mut self, scope: Address, f: F) -> R
    where
        F: FnOnce(&mut Context<'_>) -> R,
    {
        let limit = self.config.max_scope_depth;
        if scope.depth() > limit {
            fatal(StateError::DepthExceeded {
                address: scope,
                limit,
            });
        }

        let mut nested = Context {
            store: &mut *self.store,
            events: &mut *self.events,
            config: self.config,
            refresh: &mut *self.refresh,
            traversal: self.traversal,
            scope,
            next_slot: 0,
        };
        f(&mut nested)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::runtime::Runtime;
    use crate::signal::{scale, value, Signal};
    use crate::tree::{Address, CellState, Segment};
    use crate::RuntimeConfig;

    #[test]
    fn state_persists_across_traversals() {
        let mut runtime = Runtime::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            runtime.traverse(|ctx| {
                let count = ctx.state(0);
                seen.push(count.read());
                count.increment().trigger().unwrap();
            });
        }
        assert_eq!(seen, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn positions_are_assigned_in_call_order() {
        let mut runtime = Runtime::default();
        runtime.traverse(|ctx| {
            ctx.state(1);
            ctx.scope(|ctx| {
                ctx.state(2);
            });
            ctx.keyed("row", |ctx| {
                assert_eq!(ctx.address().depth(), 2);
                ctx.state(3);
            });
        });

        let addresses: Vec<String> = runtime.store().addresses().map(|a| a.to_string()).collect();
        assert_eq!(addresses[0], "/0");
        assert_eq!(addresses[1], "/1/0");
        assert!(addresses[2].starts_with("/2/#"));
        assert!(addresses[2].ends_with("/0"));
    }

    #[test]
    fn equal_keys_at_different_positions_stay_distinct() {
        let mut runtime = Runtime::default();
        runtime.traverse(|ctx| {
            let left = ctx.keyed(&5u64, |ctx| ctx.state(1));
            let right = ctx.keyed(&5u64, |ctx| ctx.state(1));
            left.write(10);
            assert_eq!(right.read(), Some(1));
        });
        assert_eq!(runtime.store().len(), 2);
    }

    #[test]
    fn hidden_branch_state_is_reset() {
        let mut runtime = Runtime::default();
        let open = |runtime: &mut Runtime, shown: bool| {
            let mut read = None;
            runtime.traverse(|ctx| {
                read = ctx.when(&value(shown), |ctx| {
                    let expanded = ctx.state(false);
                    let seen = expanded.read();
                    expanded.write(true);
                    seen
                });
            });
            read.flatten()
        };

        assert_eq!(open(&mut runtime, true), Some(false));
        assert_eq!(open(&mut runtime, true), Some(true));
        assert_eq!(open(&mut runtime, false), None);
        assert_eq!(open(&mut runtime, true), Some(false));
    }

    #[test]
    fn unmounted_cells_stop_accepting_writes() {
        let mut runtime = Runtime::default();
        let mut kept: Option<Signal<i32>> = None;
        runtime.traverse(|ctx| {
            kept = ctx.when(&value(true), |ctx| ctx.state(1));
        });
        runtime.traverse(|ctx| {
            ctx.when(&value(false), |ctx| ctx.state(1));
        });

        let stale = kept.unwrap();
        assert_eq!(stale.read(), None);
        assert!(!stale.ready_to_write());
        assert!(stale.reset(4).trigger().is_err());
    }

    #[test]
    fn apply_reuses_result_while_input_is_stable() {
        let calls = AtomicUsize::new(0);
        let mut runtime = Runtime::default();
        let mut run = |runtime: &mut Runtime, bump: bool| {
            let mut out = None;
            runtime.traverse(|ctx| {
                let n = ctx.state(10);
                if bump {
                    n.increment().trigger().unwrap();
                }
                let doubled = ctx.apply(
                    |n: i32| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        n * 2
                    },
                    &n,
                );
                out = doubled.read();
            });
            out
        };

        assert_eq!(run(&mut runtime, false), Some(20));
        assert_eq!(run(&mut runtime, false), Some(20));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(run(&mut runtime, true), Some(22));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn apply_can_consume_its_own_previous_result() {
        let mut runtime = Runtime::default();
        let mut previous: Option<Signal<i32>> = None;
        let mut seen = Vec::new();
        for _ in 0..3 {
            runtime.traverse(|ctx| {
                let n = ctx.state(5);
                let input = previous.clone().unwrap_or(n);
                let next = ctx.apply(|v| v + 1, &input);
                seen.push(next.read());
                previous = Some(next);
            });
        }
        assert_eq!(seen, vec![Some(6), Some(7), Some(8)]);
    }

    #[test]
    fn apply_recomputes_when_the_derivation_changes() {
        let mut runtime = Runtime::default();
        let mut seen = Vec::new();
        for doubled in [false, true] {
            runtime.traverse(|ctx| {
                let n = ctx.state(5);
                let input = if doubled { n.map(|v| v * 2) } else { n.map(|v| v) };
                let shown = ctx.apply(|v| v, &input);
                seen.push((input.read(), shown.read()));
            });
        }
        assert_eq!(seen, vec![(Some(5), Some(5)), (Some(10), Some(10))]);
    }

    #[test]
    fn apply_recomputes_when_a_view_replaces_its_backing() {
        let mut runtime = Runtime::default();
        let mut labels = Vec::new();
        for percent in [false, true] {
            runtime.traverse(|ctx| {
                let rate = ctx.state(0.18);
                let shown = if percent { scale(&rate, 100.0) } else { rate };
                labels.push(ctx.apply(|v| format!("{v}"), &shown).read());
            });
        }
        assert_eq!(labels, vec![Some("0.18".to_string()), Some("18".to_string())]);
    }

    #[test]
    fn apply_skips_empty_inputs() {
        let mut runtime = Runtime::default();
        runtime.traverse(|ctx| {
            let missing = ctx.state_empty::<i32>();
            let present = ctx.state(2);
            let product = ctx.apply2(
                |_: i32, _: i32| -> i32 { panic!("must not run") },
                &missing,
                &present,
            );
            assert_eq!(product.read(), None);
        });
    }

    #[test]
    fn lifecycle_follows_writes() {
        let mut runtime = Runtime::default();
        runtime.traverse(|ctx| {
            let count = ctx.state(0);
            count.write(1);
        });
        let address: Address = [Segment::Slot(0)].into_iter().collect();
        assert_eq!(runtime.store().lifecycle(&address), Some(CellState::Updated));
    }

    #[test]
    #[should_panic(expected = "deeper than the configured limit")]
    fn runaway_recursion_is_fatal() {
        fn descend(ctx: &mut crate::Context<'_>) {
            ctx.scope(descend);
        }

        let config = RuntimeConfig {
            max_scope_depth: 8,
            ..RuntimeConfig::default()
        };
        Runtime::new(config).traverse(descend);
    }

    #[test]
    #[should_panic(expected = "was requested")]
    fn changing_the_type_at_a_position_is_fatal() {
        let mut runtime = Runtime::default();
        runtime.traverse(|ctx| {
            ctx.state(0i32);
        });
        runtime.traverse(|ctx| {
            ctx.state(String::new());
        });
    }
}
