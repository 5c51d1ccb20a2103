//! Recomputations of derived state, only used inside debug assertions.

use num::BigInt;
use num::Zero;

use super::ConstraintTerms;
use crate::engine::Assignments;

/// The sum of the coefficients of the literals that are not false, minus the degree.
pub(crate) fn slack(constraint: &impl ConstraintTerms, assignments: &Assignments) -> BigInt {
    (0..constraint.len())
        .filter(|&index| !assignments.is_literal_false(constraint.literal(index)))
        .map(|index| constraint.coefficient_value(index))
        .sum::<BigInt>()
        - constraint.degree_value()
}

pub(crate) fn is_correctly_conflicting(
    constraint: &impl ConstraintTerms,
    assignments: &Assignments,
) -> bool {
    slack(constraint, assignments) < BigInt::zero()
}

/// Whether the constraint forces the literal at `index` to be true.
pub(crate) fn is_correctly_propagating(
    constraint: &impl ConstraintTerms,
    assignments: &Assignments,
    index: usize,
) -> bool {
    assignments.is_literal_unassigned(constraint.literal(index))
        && constraint.coefficient_value(index) > slack(constraint, assignments)
}

/// Recomputes the watch slack of a weighted constraint: the coefficients of the watched literals
/// that are not false-and-processed, minus the degree.
pub(crate) fn watch_slack(
    constraint: &impl ConstraintTerms,
    is_watched: impl Fn(usize) -> bool,
    assignments: &Assignments,
) -> BigInt {
    (0..constraint.len())
        .filter(|&index| {
            is_watched(index)
                && !assignments.is_literal_false_and_processed(constraint.literal(index))
        })
        .map(|index| constraint.coefficient_value(index))
        .sum::<BigInt>()
        - constraint.degree_value()
}
