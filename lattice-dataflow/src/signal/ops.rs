//! Fluent operators on signals.
//!
//! Every operator builds a lazy derived signal, so the usual rules apply: the
//! result is empty whenever an operand is empty, and it is computed at most
//! once per change of its operands.

use std::ops::{Add, Div, Mul, Sub};

use super::handle::{Signal, Value};
use super::derived::{lazy_apply, lazy_apply2, lazy_apply3};

impl<T> Signal<T>
where
    T: Value,
{
    pub fn plus(&self, other: &Signal<T>) -> Signal<T>
    where
        T: Add<Output = T>,
    {
        lazy_apply2(|a, b| a + b, self, other)
    }

    pub fn minus(&self, other: &Signal<T>) -> Signal<T>
    where
        T: Sub<Output = T>,
    {
        lazy_apply2(|a, b| a - b, self, other)
    }

    pub fn times(&self, other: &Signal<T>) -> Signal<T>
    where
        T: Mul<Output = T>,
    {
        lazy_apply2(|a, b| a * b, self, other)
    }

    /// Integer operands panic on division by zero, as `/` does.
    pub fn divided_by(&self, other: &Signal<T>) -> Signal<T>
    where
        T: Div<Output = T>,
    {
        lazy_apply2(|a, b| a / b, self, other)
    }

    pub fn equals(&self, other: &Signal<T>) -> Signal<bool>
    where
        T: PartialEq,
    {
        lazy_apply2(|a, b| a == b, self, other)
    }

    pub fn not_equals(&self, other: &Signal<T>) -> Signal<bool>
    where
        T: PartialEq,
    {
        lazy_apply2(|a, b| a != b, self, other)
    }

    pub fn less_than(&self, other: &Signal<T>) -> Signal<bool>
    where
        T: PartialOrd,
    {
        lazy_apply2(|a, b| a < b, self, other)
    }

    pub fn less_or_equal(&self, other: &Signal<T>) -> Signal<bool>
    where
        T: PartialOrd,
    {
        lazy_apply2(|a, b| a <= b, self, other)
    }

    pub fn greater_than(&self, other: &Signal<T>) -> Signal<bool>
    where
        T: PartialOrd,
    {
        lazy_apply2(|a, b| a > b, self, other)
    }

    pub fn greater_or_equal(&self, other: &Signal<T>) -> Signal<bool>
    where
        T: PartialOrd,
    {
        lazy_apply2(|a, b| a >= b, self, other)
    }
}

impl Signal<bool> {
    pub fn not(&self) -> Signal<bool> {
        lazy_apply(|v: bool| !v, self)
    }

    /// Logical AND. Empty if either side is empty.
    pub fn and(&self, other: &Signal<bool>) -> Signal<bool> {
        lazy_apply2(|a, b| a && b, self, other)
    }

    /// Logical OR. Empty if either side is empty.
    pub fn or(&self, other: &Signal<bool>) -> Signal<bool> {
        lazy_apply2(|a, b| a || b, self, other)
    }
}

/// `if_true` when `condition` holds, `if_false` otherwise.
///
/// All three inputs must carry values for the result to carry one.
pub fn conditional<T>(condition: &Signal<bool>, if_true: &Signal<T>, if_false: &Signal<T>) -> Signal<T>
where
    T: Value,
{
    lazy_apply3(
        |c, t, f| if c { t } else { f },
        condition,
        if_true,
        if_false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{empty, value};

    #[test]
    fn arithmetic() {
        let a = value(6);
        let b = value(3);
        assert_eq!(a.plus(&b).read(), Some(9));
        assert_eq!(a.minus(&b).read(), Some(3));
        assert_eq!(a.times(&b).read(), Some(18));
        assert_eq!(a.divided_by(&b).read(), Some(2));
    }

    #[test]
    fn comparisons() {
        let a = value(1.5);
        let b = value(2.5);
        assert_eq!(a.less_than(&b).read(), Some(true));
        assert_eq!(a.greater_than(&b).read(), Some(false));
        assert_eq!(a.less_or_equal(&a).read(), Some(true));
        assert_eq!(b.greater_or_equal(&a).read(), Some(true));
        assert_eq!(a.equals(&a).read(), Some(true));
        assert_eq!(a.not_equals(&b).read(), Some(true));
    }

    #[test]
    fn operators_propagate_invalidity() {
        let a = value(1);
        let b = empty::<i32>();
        assert_eq!(a.plus(&b).read(), None);
        assert_eq!(b.less_than(&a).read(), None);
        assert_eq!(value(true).and(&empty()).read(), None);
    }

    #[test]
    fn boolean_logic() {
        let t = value(true);
        let f = value(false);
        assert_eq!(t.not().read(), Some(false));
        assert_eq!(t.and(&f).read(), Some(false));
        assert_eq!(t.or(&f).read(), Some(true));
    }

    #[test]
    fn conditional_selects() {
        let shown = conditional(&value(true), &value("Hide"), &value("Show"));
        assert_eq!(shown.read(), Some("Hide"));

        let hidden = conditional(&value(false), &value("Hide"), &value("Show"));
        assert_eq!(hidden.read(), Some("Show"));

        assert_eq!(conditional(&empty(), &value(1), &value(2)).read(), None);
    }
}
