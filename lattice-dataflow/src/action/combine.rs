//! Action handles and combinators.

use std::fmt;
use std::sync::Arc;

use crate::error::{Blocker, NotReady};
use crate::signal::{Signal, Value};

/// Deferred writes produced by latching an action.
pub type Effect = Box<dyn FnOnce() + Send>;

type ReadyFn = Arc<dyn Fn() -> bool + Send + Sync>;
type LatchFn<A> = Arc<dyn Fn(A) -> Result<Effect, NotReady> + Send + Sync>;

/// A deferred, composable operation taking arguments of type `A`.
///
/// Triggering happens in two phases. *Latching* checks readiness and reads
/// every value the action needs, producing an [`Effect`]; running the effect
/// performs the writes. Because a sequence latches all of its members before
/// running any effect, every read observes the state from before the trigger
/// and a refusal by any member leaves everything untouched.
pub struct Action<A = ()> {
    ready: ReadyFn,
    latch: LatchFn<A>,
}

impl<A> Action<A>
where
    A: Send + 'static,
{
    /// Build an action from a readiness predicate and a latch.
    ///
    /// The latch must not write anything itself; it returns the writes as an
    /// effect. It must refuse whenever `ready` would return false.
    pub fn new<R, L>(ready: R, latch: L) -> Self
    where
        R: Fn() -> bool + Send + Sync + 'static,
        L: Fn(A) -> Result<Effect, NotReady> + Send + Sync + 'static,
    {
        Self {
            ready: Arc::new(ready),
            latch: Arc::new(latch),
        }
    }

    /// Whether triggering right now would do something.
    ///
    /// Only a hint: state can change before the trigger, which checks again.
    pub fn is_ready(&self) -> bool {
        (self.ready)()
    }

    /// Check readiness and read inputs, without writing anything.
    pub fn latch(&self, args: A) -> Result<Effect, NotReady> {
        (self.latch)(args)
    }

    /// Trigger with `args`. Nothing is written if the action is not ready.
    pub fn trigger_with(&self, args: A) -> Result<(), NotReady> {
        let effect = self.latch(args)?;
        effect();
        Ok(())
    }

    /// Fix the argument to the value of `arg` at trigger time.
    ///
    /// The bound action is ready only while `arg` carries a value.
    pub fn bind(&self, arg: &Signal<A>) -> Action<()>
    where
        A: Value,
    {
        let ready = {
            let inner = self.clone();
            let arg = arg.clone();
            move || arg.has_value() && inner.is_ready()
        };
        let inner = self.clone();
        let arg = arg.clone();
        Action::new(ready, move |()| {
            let value = arg.read().ok_or_else(|| NotReady::new(Blocker::InvalidArgument))?;
            inner.latch(value)
        })
    }

    /// Adapt the argument type: the new action converts its argument with
    /// `f` before handing it on.
    pub fn map_args<B, F>(&self, f: F) -> Action<B>
    where
        B: Send + 'static,
        F: Fn(B) -> A + Send + Sync + 'static,
    {
        let inner = self.clone();
        let ready = Arc::clone(&self.ready);
        Action::new(move || ready(), move |args: B| inner.latch(f(args)))
    }

    /// Run `self`, then `next`, as one atomic action. See [`sequence`].
    pub fn then(&self, next: &Action<A>) -> Action<A>
    where
        A: Clone,
    {
        sequence([self.clone(), next.clone()])
    }
}

impl Action<()> {
    /// Trigger the action. Nothing is written if it is not ready.
    pub fn trigger(&self) -> Result<(), NotReady> {
        self.trigger_with(())
    }
}

impl<A, B> Action<(A, B)>
where
    A: Value,
    B: Value,
{
    /// Bind both arguments of a two-argument action.
    pub fn bind2(&self, a: &Signal<A>, b: &Signal<B>) -> Action<()> {
        let ready = {
            let inner = self.clone();
            let (a, b) = (a.clone(), b.clone());
            move || a.has_value() && b.has_value() && inner.is_ready()
        };
        let inner = self.clone();
        let (a, b) = (a.clone(), b.clone());
        Action::new(ready, move |()| {
            let first = a.read().ok_or_else(|| NotReady::new(Blocker::InvalidArgument))?;
            let second = b.read().ok_or_else(|| NotReady::new(Blocker::InvalidArgument))?;
            inner.latch((first, second))
        })
    }
}

impl<A> Clone for Action<A> {
    fn clone(&self) -> Self {
        Self {
            ready: Arc::clone(&self.ready),
            latch: Arc::clone(&self.latch),
        }
    }
}

impl<A> fmt::Debug for Action<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("args", &std::any::type_name::<A>())
            .field("ready", &(self.ready)())
            .finish()
    }
}

/// Combine actions into one that runs them left to right.
///
/// Every member is latched before any effect runs. If a member refuses, the
/// sequence refuses with that member's index prepended to the path and no
/// member's effect runs. The first refusing member (in declaration order) is
/// the one reported.
pub fn sequence<A, I>(actions: I) -> Action<A>
where
    A: Clone + Send + 'static,
    I: IntoIterator<Item = Action<A>>,
{
    let members: Arc<[Action<A>]> = actions.into_iter().collect();
    let ready = {
        let members = Arc::clone(&members);
        move || members.iter().all(Action::is_ready)
    };
    Action::new(ready, move |args: A| {
        let mut effects = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            let effect = member.latch(args.clone()).map_err(|err| err.within(index))?;
            effects.push(effect);
        }
        Ok(Box::new(move || {
            for effect in effects {
                effect();
            }
        }) as Effect)
    })
}

/// An action that hands its argument to `f`.
///
/// Always ready. Bind it to a signal to call `f` with that signal's value:
/// the bound action is ready exactly when the signal carries a value, and `f`
/// receives the value itself, never the signal.
pub fn callback<A, F>(f: F) -> Action<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Action::new(
        || true,
        move |args: A| {
            let f = Arc::clone(&f);
            Ok(Box::new(move || f(args)) as Effect)
        },
    )
}

/// An action that is always ready and does nothing.
pub fn noop<A>() -> Action<A>
where
    A: Send + 'static,
{
    Action::new(|| true, |_: A| Ok(Box::new(|| {}) as Effect))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{empty, value};
    use parking_lot::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Action<String>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let action = callback(move |message: String| log_clone.lock().push(message));
        (log, action)
    }

    #[test]
    fn callback_receives_value() {
        let (log, action) = recorder();
        assert!(action.is_ready());
        action.trigger_with("hello".to_string()).unwrap();
        assert_eq!(*log.lock(), vec!["hello"]);
    }

    #[test]
    fn bound_callback_waits_for_value() {
        let (log, action) = recorder();

        let unbound = action.bind(&empty());
        assert!(!unbound.is_ready());
        let err = unbound.trigger().unwrap_err();
        assert_eq!(err.blocker, Blocker::InvalidArgument);
        assert!(log.lock().is_empty());

        let bound = action.bind(&value("hi".to_string()));
        assert!(bound.is_ready());
        bound.trigger().unwrap();
        assert_eq!(*log.lock(), vec!["hi"]);
    }

    #[test]
    fn sequence_runs_in_declared_order() {
        let (log, action) = recorder();
        let first = action.bind(&value("first".to_string()));
        let second = action.bind(&value("second".to_string()));
        let third = action.bind(&value("third".to_string()));

        sequence([first, second, third]).trigger().unwrap();
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn sequence_with_unready_member_runs_nothing() {
        let (log, action) = recorder();
        let ready = action.bind(&value("ready".to_string()));
        let blocked = action.bind(&empty());

        let combined = ready.then(&blocked);
        assert!(!combined.is_ready());
        let err = combined.trigger().unwrap_err();
        assert_eq!(err.path.as_slice(), &[1]);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn sequence_reports_first_refusal() {
        let blocked = callback(|_: i32| {}).bind(&empty());
        let combined = sequence([noop(), blocked.clone(), blocked]);
        assert_eq!(combined.trigger().unwrap_err().path.as_slice(), &[1]);

        let nested = sequence([noop(), combined]);
        assert_eq!(nested.trigger().unwrap_err().path.as_slice(), &[1, 1]);
    }

    #[test]
    fn map_args_converts_before_latching() {
        let (log, action) = recorder();
        let numbered = action.map_args(|n: i32| format!("#{n}"));
        numbered.trigger_with(7).unwrap();
        assert_eq!(*log.lock(), vec!["#7"]);
    }

    #[test]
    fn bind2_needs_both_arguments() {
        let sums = Arc::new(Mutex::new(Vec::new()));
        let sums_clone = sums.clone();
        let add = callback(move |(a, b): (i32, i32)| sums_clone.lock().push(a + b));

        assert!(add.bind2(&value(1), &empty()).trigger().is_err());
        add.bind2(&value(1), &value(2)).trigger().unwrap();
        assert_eq!(*sums.lock(), vec![3]);
    }
}
