use num::BigInt;

/// The coefficient/degree representation used for a weighted constraint.
///
/// Widths are chosen such that no intermediate value of watch maintenance (a degree minus any
/// partial sum of at most [`MAX_CONSTRAINT_SIZE`](crate::basic_types::MAX_CONSTRAINT_SIZE)
/// coefficients) can overflow the degree type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeightedWidth {
    /// `i32` coefficients with an `i64` degree.
    #[default]
    Bits32,
    /// `i64` coefficients with an `i128` degree.
    Bits64,
    /// `i128` coefficients bounded to 96 significant bits with an `i128` degree.
    Bits96,
    /// `i128` coefficients with an arbitrary precision degree.
    Bits128,
    /// Arbitrary precision coefficients and degree.
    Arbitrary,
}

impl WeightedWidth {
    /// The largest magnitude of a coefficient or degree that the width supports, or `None` if it
    /// is unbounded.
    pub fn limit(self) -> Option<BigInt> {
        let exponent = match self {
            WeightedWidth::Bits32 => 9,
            WeightedWidth::Bits64 => 18,
            WeightedWidth::Bits96 => 27,
            WeightedWidth::Bits128 => 36,
            WeightedWidth::Arbitrary => return None,
        };
        Some(num::pow(BigInt::from(10), exponent))
    }

    /// The narrowest width, at least `minimum`, that can hold `largest_coefficient` and `degree`.
    pub fn select(largest_coefficient: &BigInt, degree: &BigInt, minimum: WeightedWidth) -> Self {
        let largest = std::cmp::max(largest_coefficient.magnitude(), degree.magnitude());

        [
            WeightedWidth::Bits32,
            WeightedWidth::Bits64,
            WeightedWidth::Bits96,
            WeightedWidth::Bits128,
        ]
        .into_iter()
        .filter(|&width| width >= minimum)
        .find(|width| {
            width
                .limit()
                .is_some_and(|limit| limit.magnitude() >= largest)
        })
        .unwrap_or(WeightedWidth::Arbitrary)
    }

    pub fn is_arbitrary_precision(self) -> bool {
        self == WeightedWidth::Arbitrary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_constraints_use_the_narrowest_width() {
        let width =
            WeightedWidth::select(&BigInt::from(3), &BigInt::from(4), WeightedWidth::Bits32);

        assert_eq!(width, WeightedWidth::Bits32);
    }

    #[test]
    fn a_large_degree_forces_a_wider_representation() {
        let degree = BigInt::from(10_i64.pow(12));
        let width = WeightedWidth::select(&BigInt::from(3), &degree, WeightedWidth::Bits32);

        assert_eq!(width, WeightedWidth::Bits64);
    }

    #[test]
    fn values_beyond_every_fixed_width_use_arbitrary_precision() {
        let coefficient = num::pow(BigInt::from(10), 40);
        let width = WeightedWidth::select(&coefficient, &coefficient, WeightedWidth::Bits32);

        assert!(width.is_arbitrary_precision());
    }

    #[test]
    fn the_minimum_width_is_respected() {
        let width =
            WeightedWidth::select(&BigInt::from(1), &BigInt::from(2), WeightedWidth::Bits96);

        assert_eq!(width, WeightedWidth::Bits96);
    }
}
