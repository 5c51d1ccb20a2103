//! The numeric capability shared by every coefficient and degree type.

use std::fmt::Debug;
use std::fmt::Display;

use num::BigInt;
use num::Integer;
use num::traits::NumAssign;
use num::Signed;
use num::ToPrimitive;

/// A signed integer type that can store the coefficients or the degree of a weighted constraint.
///
/// Implemented for `i32`, `i64`, `i128` and [`BigInt`]; the narrow types never see a value that
/// does not fit since the constraint width is selected up front (see
/// [`WeightedWidth`](super::WeightedWidth)).
pub trait Coefficient:
    Clone + Debug + Display + Ord + Integer + Signed + NumAssign + 'static
{
    /// Converts from arbitrary precision, returning `None` if `value` does not fit.
    fn from_big_int(value: &BigInt) -> Option<Self>;

    /// Converts to arbitrary precision.
    fn to_big(&self) -> BigInt;
}

impl Coefficient for i32 {
    fn from_big_int(value: &BigInt) -> Option<Self> {
        value.to_i32()
    }

    fn to_big(&self) -> BigInt {
        BigInt::from(*self)
    }
}

impl Coefficient for i64 {
    fn from_big_int(value: &BigInt) -> Option<Self> {
        value.to_i64()
    }

    fn to_big(&self) -> BigInt {
        BigInt::from(*self)
    }
}

impl Coefficient for i128 {
    fn from_big_int(value: &BigInt) -> Option<Self> {
        value.to_i128()
    }

    fn to_big(&self) -> BigInt {
        BigInt::from(*self)
    }
}

impl Coefficient for BigInt {
    fn from_big_int(value: &BigInt) -> Option<Self> {
        Some(value.clone())
    }

    fn to_big(&self) -> BigInt {
        self.clone()
    }
}

/// A type wide enough to hold any sum of coefficients of type `CF` that can occur in a single
/// constraint.
pub trait Degree<CF: Coefficient>: Coefficient {
    fn widen(coefficient: &CF) -> Self;
}

impl<CF, DG> Degree<CF> for DG
where
    CF: Coefficient,
    DG: Coefficient + From<CF>,
{
    fn widen(coefficient: &CF) -> Self {
        DG::from(coefficient.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_types_reject_values_that_do_not_fit() {
        let large = BigInt::from(i64::MAX);

        assert_eq!(i32::from_big_int(&large), None);
        assert_eq!(i64::from_big_int(&large), Some(i64::MAX));
        assert_eq!(i128::from_big_int(&(large.clone() * 4)), Some(i64::MAX as i128 * 4));
    }

    #[test]
    fn widening_preserves_the_value() {
        assert_eq!(<i64 as Degree<i32>>::widen(&-17), -17_i64);
        assert_eq!(<BigInt as Degree<i128>>::widen(&i128::MAX), BigInt::from(i128::MAX));
    }
}
