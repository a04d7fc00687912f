//! Derived Signals
//!
//! A derived signal is a pure function applied to other signals.
//!
//! # How Derived Signals Work
//!
//! 1. Construction only captures the inputs and the function. Nothing runs.
//!
//! 2. On first read, the inputs are read. If any is empty the result is empty
//!    and the function is never called; otherwise the function runs.
//!
//! 3. The result is cached together with the identity of the inputs. That
//!    identity also carries the type of the function, so `a.map(f)` and
//!    `a.map(g)` never share one. Values captured by the function are not
//!    part of it; pass data that varies between traversals as a signal.
//!
//! 4. Later reads compare the current input identity with the cached one and
//!    only recompute when it changed.
//!
//! # Why This Matters
//!
//! A traversal may read the same derived value several times (a label, a
//! condition, a nested derivation). Only the first read pays for the
//! function, and derived values that nothing reads cost nothing at all.

use parking_lot::Mutex;

use super::handle::{Signal, Source, Value};
use super::id::ValueId;
use crate::signal::Capability;

/// Cache state of a derived signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// Never evaluated, or the inputs changed since the last evaluation.
    Dirty,

    /// The cached result matches the current inputs.
    Clean,
}

type IdFn = Box<dyn Fn() -> ValueId + Send + Sync>;
type ComputeFn<T> = Box<dyn Fn() -> Option<T> + Send + Sync>;

/// Lazily evaluated, memoized source.
pub(crate) struct Derived<T> {
    /// Identity of the function and its inputs, combined in argument order.
    inputs: IdFn,

    /// Reads the inputs and applies the function. `None` if any input is empty.
    compute: ComputeFn<T>,

    /// Last result, keyed by the input identity it was computed from.
    cache: Mutex<Option<(ValueId, Option<T>)>>,
}

impl<T> Derived<T>
where
    T: Value,
{
    pub(crate) fn new<I, C>(inputs: I, compute: C) -> Self
    where
        I: Fn() -> ValueId + Send + Sync + 'static,
        C: Fn() -> Option<T> + Send + Sync + 'static,
    {
        Self {
            inputs: Box::new(inputs),
            compute: Box::new(compute),
            cache: Mutex::new(None),
        }
    }
}

impl<T> Source<T> for Derived<T>
where
    T: Value,
{
    fn capability(&self) -> Capability {
        Capability::ReadOnly
    }

    fn value_id(&self) -> ValueId {
        (self.inputs)()
    }

    fn memo_state(&self) -> Option<MemoState> {
        let current = (self.inputs)();
        match &*self.cache.lock() {
            Some((seen, _)) if *seen == current => Some(MemoState::Clean),
            _ => Some(MemoState::Dirty),
        }
    }

    fn read(&self) -> Option<T> {
        let current = (self.inputs)();
        if let Some((seen, value)) = &*self.cache.lock() {
            if *seen == current {
                return value.clone();
            }
        }

        // Evaluate without holding the lock; inputs may be derived too.
        let value = (self.compute)();
        *self.cache.lock() = Some((current, value.clone()));
        value
    }
}

/// Apply `f` to the value of `a`, lazily.
///
/// The result is empty whenever `a` is empty.
pub fn lazy_apply<A, R, F>(f: F, a: &Signal<A>) -> Signal<R>
where
    A: Value,
    R: Value,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    let kind = ValueId::of_type::<F>();
    let id_a = a.clone();
    let a = a.clone();
    Signal::from_source(Derived::new(
        move || kind.combine(id_a.value_id()),
        move || a.read().map(&f),
    ))
}

/// Apply `f` to the values of `a` and `b`, lazily.
///
/// The result is empty whenever either input is empty.
pub fn lazy_apply2<A, B, R, F>(f: F, a: &Signal<A>, b: &Signal<B>) -> Signal<R>
where
    A: Value,
    B: Value,
    R: Value,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    let kind = ValueId::of_type::<F>();
    let (id_a, id_b) = (a.clone(), b.clone());
    let (a, b) = (a.clone(), b.clone());
    Signal::from_source(Derived::new(
        move || kind.combine(id_a.value_id()).combine(id_b.value_id()),
        move || Some(f(a.read()?, b.read()?)),
    ))
}

/// Apply `f` to the values of `a`, `b` and `c`, lazily.
pub fn lazy_apply3<A, B, C, R, F>(f: F, a: &Signal<A>, b: &Signal<B>, c: &Signal<C>) -> Signal<R>
where
    A: Value,
    B: Value,
    C: Value,
    R: Value,
    F: Fn(A, B, C) -> R + Send + Sync + 'static,
{
    let kind = ValueId::of_type::<F>();
    let (id_a, id_b, id_c) = (a.clone(), b.clone(), c.clone());
    let (a, b, c) = (a.clone(), b.clone(), c.clone());
    Signal::from_source(Derived::new(
        move || {
            kind.combine(id_a.value_id())
                .combine(id_b.value_id())
                .combine(id_c.value_id())
        },
        move || Some(f(a.read()?, b.read()?, c.read()?)),
    ))
}

impl<T> Signal<T>
where
    T: Value,
{
    /// Derive a signal by applying `f` to this one. See [`lazy_apply`].
    pub fn map<R, F>(&self, f: F) -> Signal<R>
    where
        R: Value,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        lazy_apply(f, self)
    }

    /// Derive a signal from this one and `other`. See [`lazy_apply2`].
    pub fn zip_with<U, R, F>(&self, other: &Signal<U>, f: F) -> Signal<R>
    where
        U: Value,
        R: Value,
        F: Fn(T, U) -> R + Send + Sync + 'static,
    {
        lazy_apply2(f, self, other)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
