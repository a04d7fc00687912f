//! Duplex views.
//!
//! A view presents a backing signal through a pair of conversions. Reads apply
//! `forward`; writes apply `inverse` and land in the backing signal, so the
//! view never stores anything itself.
//!
//! A view's identity is the backing signal's identity mixed with the
//! conversion, so a percent view and its raw rate never look alike to an
//! `apply` slot.

use std::ops::{Div, Mul};
use std::sync::Arc;

use super::handle::{Signal, Source, Value};
use super::id::ValueId;
use crate::error::SignalError;
use crate::signal::Capability;

struct Bimap<T: Value, U> {
    backing: Signal<T>,

    /// Identifies the conversion pair.
    salt: ValueId,

    forward: Arc<dyn Fn(T) -> U + Send + Sync>,
    inverse: Arc<dyn Fn(U) -> T + Send + Sync>,
}

impl<T, U> Source<U> for Bimap<T, U>
where
    T: Value,
    U: Value,
{
    fn capability(&self) -> Capability {
        self.backing.capability()
    }

    fn value_id(&self) -> ValueId {
        self.salt.combine(self.backing.value_id())
    }

    fn read(&self) -> Option<U> {
        self.backing.read().map(|v| (self.forward)(v))
    }

    fn ready_to_write(&self) -> bool {
        self.backing.ready_to_write()
    }

    fn write(&self, value: U) -> Result<(), SignalError> {
        self.backing.try_write((self.inverse)(value))
    }

    fn clear(&self) -> Result<(), SignalError> {
        self.backing.try_clear()
    }
}

impl<T> Signal<T>
where
    T: Value,
{
    /// A view of this signal through `forward`, writable through `inverse`.
    ///
    /// The view keeps this handle's capability. `inverse` must undo
    /// `forward` for writes to round-trip.
    pub fn bimap<U, F, G>(&self, forward: F, inverse: G) -> Signal<U>
    where
        U: Value,
        F: Fn(T) -> U + Send + Sync + 'static,
        G: Fn(U) -> T + Send + Sync + 'static,
    {
        let salt = ValueId::of_type::<F>().combine(ValueId::of_type::<G>());
        self.view(salt, forward, inverse)
    }

    fn view<U, F, G>(&self, salt: ValueId, forward: F, inverse: G) -> Signal<U>
    where
        U: Value,
        F: Fn(T) -> U + Send + Sync + 'static,
        G: Fn(U) -> T + Send + Sync + 'static,
    {
        Signal::from_source(Bimap {
            backing: self.clone(),
            salt,
            forward: Arc::new(forward),
            inverse: Arc::new(inverse),
        })
    }
}

/// Numeric types [`scale`] accepts.
///
/// `key` identifies a factor so that views with different factors over the
/// same signal report different ids.
pub trait ScaleFactor: Value + Copy + Mul<Output = Self> + Div<Output = Self> {
    fn key(self) -> u64;
}

macro_rules! float_factor {
    ($($ty:ty),*) => {
        $(impl ScaleFactor for $ty {
            fn key(self) -> u64 {
                u64::from(self.to_bits())
            }
        })*
    };
}

macro_rules! int_factor {
    ($($ty:ty),*) => {
        $(impl ScaleFactor for $ty {
            fn key(self) -> u64 {
                self as u64
            }
        })*
    };
}

float_factor!(f32, f64);
int_factor!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// A view of `signal` multiplied by `factor`.
///
/// Writing `x` to the view stores `x / factor` in `signal`. Useful for
/// presenting a rate as a percentage:
///
/// ```rust
/// use lattice_dataflow::signal::{scale, Signal};
/// # use lattice_dataflow::Runtime;
/// # let mut runtime = Runtime::default();
/// # runtime.traverse(|ctx| {
/// let rate: Signal<f64> = ctx.state(0.15);
/// let percent = scale(&rate, 100.0);
/// percent.write(20.0);
/// assert!((rate.read().unwrap() - 0.2).abs() < 1e-12);
/// # });
/// ```
pub fn scale<T>(signal: &Signal<T>, factor: T) -> Signal<T>
where
    T: ScaleFactor,
{
    let salt = ValueId::of_hash(&("scale", factor.key()));
    signal.view(salt, move |v| v * factor, move |v| v / factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{sink, value};
    use parking_lot::Mutex;

    #[test]
    fn view_reads_through_forward() {
        let view = scale(&value(0.25), 100.0);
        assert_eq!(view.read(), Some(25.0));
        assert_eq!(view.capability(), Capability::ReadOnly);
    }

    #[test]
    fn view_writes_through_inverse() {
        let written = std::sync::Arc::new(Mutex::new(None));
        let written_clone = written.clone();
        let backing = sink(move |v: f64| *written_clone.lock() = Some(v));

        let view = scale(&backing, 100.0);
        assert_eq!(view.capability(), Capability::WriteOnly);
        view.write(18.0);
        assert_eq!(*written.lock(), Some(0.18));
    }

    #[test]
    #[should_panic(expected = "not readable")]
    fn reading_a_view_of_a_write_only_signal_panics() {
        let view = scale(&sink(|_: f64| {}), 100.0);
        assert!(view.try_read().is_err());
        view.read();
    }

    #[test]
    fn view_of_read_only_refuses_writes() {
        let view = value(2).bimap(|v| v.to_string(), |s: String| s.len() as i32);
        assert_eq!(view.read().as_deref(), Some("2"));
        assert!(view.try_write("7".into()).is_err());
    }

    #[test]
    fn view_identity_follows_backing_and_conversion() {
        let backing = value(3);
        let view = backing.bimap(|v| v * 2, |v| v / 2);
        assert_ne!(view.value_id(), backing.value_id());
        assert_ne!(view.value_id(), backing.bimap(|v| v * 3, |v| v / 3).value_id());

        let rate = value(0.18);
        assert_ne!(scale(&rate, 100.0).value_id(), rate.value_id());
        assert_ne!(scale(&rate, 100.0).value_id(), scale(&rate, 10.0).value_id());
        assert_eq!(scale(&rate, 100.0).value_id(), scale(&rate, 100.0).value_id());
    }
}
