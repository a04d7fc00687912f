//! Countdown timers.
//!
//! A timer is an external stateful object. The runtime never arms, ticks or
//! expires it; it only reads its state through signals and arms it through
//! an action. Hosts can plug in any [`Countdown`] or use a [`ClockTimer`]
//! mounted in the store.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use super::clock::Clock;
use super::probe;
use crate::action::{Action, Effect};
use crate::signal::Signal;
use crate::tree::Slot;

/// The operations a timer collaborator exposes.
pub trait Countdown: Send + Sync + 'static {
    fn is_active(&self) -> bool;

    /// Ticks until expiry. Only meaningful while active.
    fn ticks_left(&self) -> i64;

    /// Arm the timer for `ticks`, restarting it if it was running.
    fn start(&self, ticks: i64);
}

/// Signal and action view of a [`Countdown`].
///
/// ```rust
/// use std::sync::Arc;
/// use lattice_dataflow::bridge::{Clock, ManualClock};
/// use lattice_dataflow::Runtime;
///
/// let clock = Arc::new(ManualClock::new(0));
/// let shared: Arc<dyn Clock> = clock.clone();
/// let mut runtime = Runtime::default();
///
/// runtime.traverse(|ctx| {
///     let timer = ctx.countdown(&shared);
///     let duration = ctx.state(30i64);
///     timer.start_with(&duration).trigger().unwrap();
/// });
///
/// clock.advance(10);
/// runtime.traverse(|ctx| {
///     let timer = ctx.countdown(&shared);
///     assert_eq!(timer.ticks_left().read(), Some(20));
/// });
/// ```
pub struct Timer<C> {
    inner: Arc<C>,
}

impl<C> Timer<C>
where
    C: Countdown,
{
    pub fn new(inner: Arc<C>) -> Self {
        Self { inner }
    }

    pub fn is_active(&self) -> Signal<bool> {
        let inner = Arc::clone(&self.inner);
        probe(move || Some(inner.is_active()))
    }

    /// Ticks left, empty while the timer is not running.
    pub fn ticks_left(&self) -> Signal<i64> {
        let inner = Arc::clone(&self.inner);
        probe(move || inner.is_active().then(|| inner.ticks_left()))
    }

    /// An action arming the timer for the duration it is given.
    ///
    /// Always ready; bind it to a duration signal to make it ready exactly
    /// when the duration is present.
    pub fn start(&self) -> Action<i64> {
        let inner = Arc::clone(&self.inner);
        Action::new(
            || true,
            move |ticks: i64| {
                let inner = Arc::clone(&inner);
                Ok(Box::new(move || inner.start(ticks)) as Effect)
            },
        )
    }

    /// [`start`](Self::start) bound to `duration`.
    pub fn start_with(&self, duration: &Signal<i64>) -> Action {
        self.start().bind(duration)
    }

    pub fn inner(&self) -> &Arc<C> {
        &self.inner
    }
}

impl<C> Clone for Timer<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A countdown measured against a [`Clock`], owned by the state store.
pub struct ClockTimer {
    clock: Arc<dyn Clock>,

    /// Clock reading at which the timer expires; `None` when disarmed.
    deadline: Mutex<Option<u64>>,

    /// The store's change flag, raised when the timer is armed.
    changed: Arc<AtomicBool>,
}

impl ClockTimer {
    pub(crate) fn new(clock: Arc<dyn Clock>, changed: Arc<AtomicBool>) -> Self {
        Self {
            clock,
            deadline: Mutex::new(None),
            changed,
        }
    }

    fn remaining(&self) -> Option<u64> {
        let deadline = (*self.deadline.lock())?;
        deadline.checked_sub(self.clock.now()).filter(|left| *left > 0)
    }
}

impl Countdown for ClockTimer {
    fn is_active(&self) -> bool {
        self.remaining().is_some()
    }

    fn ticks_left(&self) -> i64 {
        self.remaining()
            .map_or(0, |left| i64::try_from(left).unwrap_or(i64::MAX))
    }

    fn start(&self, ticks: i64) {
        let now = self.clock.now();
        let deadline = u64::try_from(ticks).ok().map(|ticks| now.saturating_add(ticks));
        *self.deadline.lock() = deadline;
        self.changed.store(true, Ordering::Release);
        tracing::trace!(ticks, now, "timer armed");
    }
}

impl Slot for ClockTimer {
    fn on_unmount(&self) {
        *self.deadline.lock() = None;
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn std::any::Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ManualClock;
    use crate::signal::{empty, value};

    fn timer() -> (Arc<ManualClock>, Timer<ClockTimer>, Arc<AtomicBool>) {
        let clock = Arc::new(ManualClock::new(100));
        let changed = Arc::new(AtomicBool::new(false));
        let inner = ClockTimer::new(clock.clone(), changed.clone());
        (clock, Timer::new(Arc::new(inner)), changed)
    }

    #[test]
    fn armed_timer_counts_down_and_expires() {
        let (clock, timer, changed) = timer();
        assert_eq!(timer.is_active().read(), Some(false));
        assert_eq!(timer.ticks_left().read(), None);

        timer.start().trigger_with(3).unwrap();
        assert!(changed.load(Ordering::SeqCst));
        assert_eq!(timer.is_active().read(), Some(true));
        assert_eq!(timer.ticks_left().read(), Some(3));

        clock.advance(2);
        assert_eq!(timer.ticks_left().read(), Some(1));

        clock.advance(1);
        assert_eq!(timer.is_active().read(), Some(false));
        assert_eq!(timer.ticks_left().read(), None);
    }

    #[test]
    fn start_waits_for_a_duration() {
        let (_, timer, _) = timer();
        let unbound = timer.start_with(&empty());
        assert!(!unbound.is_ready());
        assert!(unbound.trigger().is_err());
        assert_eq!(timer.is_active().read(), Some(false));

        timer.start_with(&value(10)).trigger().unwrap();
        assert_eq!(timer.ticks_left().read(), Some(10));
    }

    #[test]
    fn unmount_disarms() {
        let (_, timer, _) = timer();
        timer.start().trigger_with(5).unwrap();
        timer.inner().on_unmount();
        assert_eq!(timer.is_active().read(), Some(false));
    }

    #[test]
    fn ticks_left_identity_tracks_the_value() {
        let (clock, timer, _) = timer();
        timer.start().trigger_with(5).unwrap();
        let before = timer.ticks_left().value_id();
        assert_eq!(timer.ticks_left().value_id(), before);
        clock.advance(1);
        assert_ne!(timer.ticks_left().value_id(), before);
    }
}
