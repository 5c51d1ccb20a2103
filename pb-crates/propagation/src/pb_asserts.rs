//! Tiered assertion macros.
//!
//! Checks are grouped by their cost: simple checks are (close to) constant time, moderate checks
//! may be linear in the size of a constraint, advanced checks recompute derived state such as the
//! slack of a constraint, and extreme checks may touch the whole constraint store. In release
//! builds none of them are evaluated.

#[cfg(any(test, feature = "debug-checks"))]
pub const PB_ASSERT_LEVEL_DEFINITION: u8 = PB_ASSERT_EXTREME;

#[cfg(all(not(test), not(feature = "debug-checks"), debug_assertions))]
pub const PB_ASSERT_LEVEL_DEFINITION: u8 = PB_ASSERT_SIMPLE;

#[cfg(all(not(test), not(feature = "debug-checks"), not(debug_assertions)))]
pub const PB_ASSERT_LEVEL_DEFINITION: u8 = PB_ASSERT_NONE;

pub const PB_ASSERT_NONE: u8 = 0;
pub const PB_ASSERT_SIMPLE: u8 = 1;
pub const PB_ASSERT_MODERATE: u8 = 2;
pub const PB_ASSERT_ADVANCED: u8 = 3;
pub const PB_ASSERT_EXTREME: u8 = 4;

#[macro_export]
#[doc(hidden)]
macro_rules! pb_assert_simple {
    ($($arg:tt)*) => {
        if $crate::pb_asserts::PB_ASSERT_LEVEL_DEFINITION >= $crate::pb_asserts::PB_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! pb_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::pb_asserts::PB_ASSERT_LEVEL_DEFINITION >= $crate::pb_asserts::PB_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! pb_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::pb_asserts::PB_ASSERT_LEVEL_DEFINITION
            >= $crate::pb_asserts::PB_ASSERT_MODERATE
        {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! pb_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::pb_asserts::PB_ASSERT_LEVEL_DEFINITION
            >= $crate::pb_asserts::PB_ASSERT_ADVANCED
        {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! pb_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::pb_asserts::PB_ASSERT_LEVEL_DEFINITION >= $crate::pb_asserts::PB_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}
