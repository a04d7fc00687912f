//! Operator-derived actions.
//!
//! Each operator expands to a primitive write against a writable signal.
//! Reads happen when the action is latched, so inside a [`sequence`] every
//! operator sees the values from before the trigger:
//!
//! ```rust
//! use lattice_dataflow::action::sequence;
//! use lattice_dataflow::Runtime;
//!
//! let mut runtime = Runtime::default();
//! runtime.traverse(|ctx| {
//!     let hand = ctx.state(5);
//!     let bank = ctx.state(10);
//!
//!     let deposit = sequence([hand.reset(0), bank.add_assign(&hand)]);
//!     deposit.trigger().unwrap();
//!
//!     assert_eq!(hand.read(), Some(0));
//!     assert_eq!(bank.read(), Some(15));
//! });
//! ```
//!
//! [`sequence`]: super::sequence

use std::ops::{Add, Div, Mul, Sub};

use super::combine::{Action, Effect};
use crate::error::{fatal, Blocker, NotReady, SignalError};
use crate::signal::{value, Signal, Value};

impl<T> Signal<T>
where
    T: Value,
{
    /// An action writing its argument into this signal.
    ///
    /// Ready while the signal accepts writes. Bind it to supply the value
    /// from another signal.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not writable.
    #[track_caller]
    pub fn setter(&self) -> Action<T> {
        self.require_write();
        let ready = {
            let target = self.clone();
            move || target.ready_to_write()
        };
        let target = self.clone();
        Action::new(ready, move |value: T| {
            if !target.ready_to_write() {
                return Err(NotReady::new(Blocker::Unwritable));
            }
            let target = target.clone();
            Ok(Box::new(move || target.write(value)) as Effect)
        })
    }

    /// Copy the value of `source` into this signal.
    ///
    /// Ready when `source` carries a value and this signal accepts writes.
    /// Whether this signal currently has a value does not matter.
    #[track_caller]
    pub fn assign(&self, source: &Signal<T>) -> Action {
        self.setter().bind(source)
    }

    /// Overwrite this signal with a constant. Always ready while mounted.
    #[track_caller]
    pub fn reset(&self, constant: T) -> Action {
        self.assign(&value(constant))
    }

    /// Read this signal and `operand`, combine them with `op`, write back.
    ///
    /// Ready only when both signals carry values and this one accepts writes.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not readable and writable.
    #[track_caller]
    pub fn update_with<U, F>(&self, operand: &Signal<U>, op: F) -> Action
    where
        U: Value,
        F: Fn(T, U) -> T + Send + Sync + 'static,
    {
        self.require_write();
        if !self.capability().can_read() {
            fatal(SignalError::NotReadable(self.capability()));
        }

        let ready = {
            let target = self.clone();
            let operand = operand.clone();
            move || target.ready_to_write() && target.has_value() && operand.has_value()
        };
        let target = self.clone();
        let operand = operand.clone();
        Action::new(ready, move |()| {
            let current = target
                .read()
                .ok_or_else(|| NotReady::new(Blocker::InvalidTarget))?;
            let argument = operand
                .read()
                .ok_or_else(|| NotReady::new(Blocker::InvalidArgument))?;
            if !target.ready_to_write() {
                return Err(NotReady::new(Blocker::Unwritable));
            }
            let next = op(current, argument);
            let target = target.clone();
            Ok(Box::new(move || target.write(next)) as Effect)
        })
    }

    /// `self += operand`
    #[track_caller]
    pub fn add_assign(&self, operand: &Signal<T>) -> Action
    where
        T: Add<Output = T>,
    {
        self.update_with(operand, |a, b| a + b)
    }

    /// `self -= operand`
    #[track_caller]
    pub fn sub_assign(&self, operand: &Signal<T>) -> Action
    where
        T: Sub<Output = T>,
    {
        self.update_with(operand, |a, b| a - b)
    }

    /// `self *= operand`
    #[track_caller]
    pub fn mul_assign(&self, operand: &Signal<T>) -> Action
    where
        T: Mul<Output = T>,
    {
        self.update_with(operand, |a, b| a * b)
    }

    /// `self /= operand`
    #[track_caller]
    pub fn div_assign(&self, operand: &Signal<T>) -> Action
    where
        T: Div<Output = T>,
    {
        self.update_with(operand, |a, b| a / b)
    }

    #[track_caller]
    pub fn increment(&self) -> Action
    where
        T: Add<Output = T> + From<u8>,
    {
        self.add_assign(&value(T::from(1)))
    }

    #[track_caller]
    pub fn decrement(&self) -> Action
    where
        T: Sub<Output = T> + From<u8>,
    {
        self.sub_assign(&value(T::from(1)))
    }

    #[track_caller]
    fn require_write(&self) {
        if !self.capability().can_write() {
            fatal(SignalError::NotWritable(self.capability()));
        }
    }
}

impl Signal<bool> {
    /// Flip a boolean. Ready while the signal has a value.
    #[track_caller]
    pub fn toggle(&self) -> Action {
        self.update_with(&value(()), |flag, ()| !flag)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
