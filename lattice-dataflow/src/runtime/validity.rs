//! Validated state.
//!
//! [`Context::enforce_validity`] puts a validator in front of a writable
//! signal. A refused write leaves the backing value alone and is recorded in
//! a cell at the next position. Until a valid value arrives, the validated
//! signal reads as empty, so everything derived from it blanks out instead of
//! showing a result for a value the user never meant.
//!
//! A refusal only applies to the backing value it was recorded over. If
//! something else writes the backing signal, the refusal is forgotten.

use std::sync::Arc;

use super::context::Context;
use crate::error::{SignalError, ValidationError};
use crate::signal::{Capability, Signal, Source, Value, ValueId};
use crate::tree::StateCell;

#[derive(Debug, Clone)]
struct Rejection {
    error: ValidationError,

    /// Identity of the backing value when the write was refused.
    over: ValueId,
}

type Validator<T> = Arc<dyn Fn(&T) -> Result<(), ValidationError> + Send + Sync>;

/// A validated signal and the reason its last write was refused.
pub struct Validated<T>
where
    T: Value,
{
    /// Reads as empty while a refusal is pending; otherwise passes through.
    pub value: Signal<T>,

    /// The pending refusal, empty when there is none.
    pub error: Signal<ValidationError>,
}

fn pending<T: Value>(rejection: &StateCell<Rejection>, backing: &Signal<T>) -> Option<Rejection> {
    rejection
        .get()
        .filter(|rejection| rejection.over == backing.value_id())
}

struct Enforced<T>
where
    T: Value,
{
    backing: Signal<T>,
    rejection: Arc<StateCell<Rejection>>,
    validate: Validator<T>,
}

impl<T> Source<T> for Enforced<T>
where
    T: Value,
{
    fn capability(&self) -> Capability {
        self.backing.capability()
    }

    fn value_id(&self) -> ValueId {
        match pending(&self.rejection, &self.backing) {
            Some(_) => self.rejection.value_id(),
            None => self.backing.value_id(),
        }
    }

    fn read(&self) -> Option<T> {
        match pending(&self.rejection, &self.backing) {
            Some(_) => None,
            None => self.backing.read(),
        }
    }

    fn ready_to_write(&self) -> bool {
        self.backing.ready_to_write()
    }

    fn write(&self, value: T) -> Result<(), SignalError> {
        match (self.validate)(&value) {
            Ok(()) => {
                if self.rejection.get().is_some() {
                    self.rejection.set(None);
                }
                self.backing.try_write(value)
            }
            Err(error) => {
                tracing::debug!(%error, "write refused by validator");
                self.rejection.set(Some(Rejection {
                    error,
                    over: self.backing.value_id(),
                }));
                Ok(())
            }
        }
    }

    fn clear(&self) -> Result<(), SignalError> {
        if self.rejection.get().is_some() {
            self.rejection.set(None);
        }
        self.backing.try_clear()
    }
}

struct RejectionView<T>
where
    T: Value,
{
    backing: Signal<T>,
    rejection: Arc<StateCell<Rejection>>,
}

impl<T> Source<ValidationError> for RejectionView<T>
where
    T: Value,
{
    fn capability(&self) -> Capability {
        Capability::ReadOnly
    }

    fn value_id(&self) -> ValueId {
        match pending(&self.rejection, &self.backing) {
            Some(_) => self.rejection.value_id(),
            None => ValueId::EMPTY,
        }
    }

    fn read(&self) -> Option<ValidationError> {
        pending(&self.rejection, &self.backing).map(|rejection| rejection.error)
    }
}

impl Context<'_> {
    /// Refuse writes to `signal` that `validate` rejects.
    ///
    /// Takes one position, which holds the pending refusal across
    /// traversals.
    ///
    /// ```rust
    /// # use lattice_dataflow::Runtime;
    /// use lattice_dataflow::error::ValidationError;
    ///
    /// # let mut runtime = Runtime::default();
    /// # runtime.traverse(|ctx| {
    /// let age = ctx.state(30);
    /// let checked = ctx.enforce_validity(&age, |years: &i32| {
    ///     if *years < 0 {
    ///         return Err(ValidationError::new("age cannot be negative"));
    ///     }
    ///     Ok(())
    /// });
    ///
    /// checked.value.write(-4);
    /// assert_eq!(checked.value.read(), None);
    /// assert_eq!(age.read(), Some(30));
    /// # });
    /// ```
    #[track_caller]
    pub fn enforce_validity<T, F>(&mut self, signal: &Signal<T>, validate: F) -> Validated<T>
    where
        T: Value,
        F: Fn(&T) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        let rejection = self.cell::<Rejection>(None);
        Validated {
            value: Signal::from_source(Enforced {
                backing: signal.clone(),
                rejection: Arc::clone(&rejection),
                validate: Arc::new(validate),
            }),
            error: Signal::from_source(RejectionView {
                backing: signal.clone(),
                rejection,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    fn finite(value: &f64) -> Result<(), ValidationError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ValidationError::new("not a number"))
        }
    }

    #[test]
    fn refused_write_blanks_dependents_until_a_valid_one() {
        let mut runtime = Runtime::default();
        runtime.traverse(|ctx| {
            let raw = ctx.state(2.0);
            let checked = ctx.enforce_validity(&raw, finite);
            let doubled = checked.value.map(|v| v * 2.0);
            assert_eq!(doubled.read(), Some(4.0));
            assert_eq!(checked.error.read(), None);

            checked.value.write(f64::NAN);
            assert_eq!(raw.read(), Some(2.0));
            assert_eq!(doubled.read(), None);
            assert_eq!(checked.error.read().map(|e| e.to_string()).as_deref(), Some("not a number"));

            checked.value.write(3.0);
            assert_eq!(doubled.read(), Some(6.0));
            assert_eq!(checked.error.read(), None);
        });
    }

    #[test]
    fn refusal_persists_across_traversals() {
        let mut runtime = Runtime::default();
        let mut seen = Vec::new();
        for round in 0..3 {
            runtime.traverse(|ctx| {
                let raw = ctx.state(1.0);
                let checked = ctx.enforce_validity(&raw, finite);
                seen.push(checked.value.read());
                if round == 0 {
                    checked.value.write(f64::INFINITY);
                }
                if round == 1 {
                    // Writing the backing state directly supersedes the refusal.
                    raw.write(5.0);
                }
            });
        }
        assert_eq!(seen, vec![Some(1.0), None, Some(5.0)]);
    }

    #[test]
    fn identity_changes_with_the_refusal() {
        let mut runtime = Runtime::default();
        runtime.traverse(|ctx| {
            let raw = ctx.state(1.0);
            let checked = ctx.enforce_validity(&raw, finite);
            let valid = checked.value.value_id();
            assert_eq!(valid, raw.value_id());

            checked.value.write(f64::NAN);
            assert_ne!(checked.value.value_id(), valid);

            checked.value.clear();
            assert_eq!(checked.value.read(), None);
            assert_eq!(checked.error.read(), None);
            assert_eq!(checked.value.value_id(), raw.value_id());
        });
    }

    #[test]
    fn takes_one_position() {
        let mut runtime = Runtime::default();
        runtime.traverse(|ctx| {
            let raw = ctx.state_empty::<f64>();
            ctx.enforce_validity(&raw, finite);
            ctx.state(0);
        });
        assert_eq!(runtime.store().len(), 3);
    }
}
