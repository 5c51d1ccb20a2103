//! The constraints that are propagated with watched literals.
//!
//! Each kind of constraint implements its own watching scheme; the [`Constraint`] enum dispatches
//! to the appropriate one. The operations that only read the terms, such as conversion to an
//! [`ExpandedConstraint`] or conflict analysis steps, are shared through [`ConstraintTerms`].
mod cardinality;
mod clause;
mod consistency;
mod constraint_terms;
mod header;
#[cfg(test)]
pub(crate) mod test_utils;
mod weighted;

use std::fmt::Display;
use std::fmt::Formatter;

pub use cardinality::CardinalityConstraint;
pub use clause::ClauseConstraint;
pub use constraint_terms::ConstraintTerms;
pub use header::ConstraintHeader;
pub use header::ConstraintId;
pub use header::MAX_LBD;
use num::BigInt;
use num::Integer;
use num::ToPrimitive;
pub use weighted::PackedTerms;
pub use weighted::PackedWeighted;
pub use weighted::TermStorage;
pub use weighted::WatchedLiteral;
pub use weighted::WeightedConstraint;
pub use weighted::WideTerms;
pub use weighted::WideWeighted;

use crate::basic_types::ConstraintOperationError;
use crate::basic_types::ConstraintReference;
use crate::basic_types::Literal;
use crate::basic_types::WatchStatus;
use crate::basic_types::MAX_CONSTRAINT_SIZE;
use crate::containers::LiteralSetPool;
use crate::engine::conflict_analysis::ExpandedConstraint;
use crate::engine::conflict_analysis::Term;
use crate::engine::Assignments;
use crate::engine::ImplicationOracle;
use crate::engine::PropagationContext;
use crate::engine::PropagationStatistics;
use crate::engine::WatchHint;
use crate::math::Coefficient;
use crate::math::Degree;
use crate::math::WeightedWidth;
use crate::pb_assert_moderate;
use crate::pb_assert_simple;

/// Every constraint occupies a multiple of this many bytes.
pub const REQUIRED_ALIGNMENT: usize = 8;

fn round_up_to_alignment(bytes: usize) -> usize {
    bytes.next_multiple_of(REQUIRED_ALIGNMENT)
}

/// A linear constraint over literals, stored in the most compact representation that can hold it.
#[derive(Clone, Debug)]
pub enum Constraint {
    Clause(ClauseConstraint),
    Cardinality(CardinalityConstraint),
    Weighted32(PackedWeighted<i32, i64>),
    Weighted64(PackedWeighted<i64, i128>),
    Weighted96(PackedWeighted<i128, i128>),
    Weighted128(WideWeighted<i128, BigInt>),
    WeightedArbitrary(WideWeighted<BigInt, BigInt>),
}

/// The representation of a [`Constraint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Clause,
    Cardinality,
    Weighted(WeightedWidth),
}

impl Display for ConstraintKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintKind::Clause => write!(f, "clause"),
            ConstraintKind::Cardinality => write!(f, "cardinality"),
            ConstraintKind::Weighted(width) => write!(f, "weighted ({width:?})"),
        }
    }
}

macro_rules! dispatch {
    ($constraint:expr, $inner:ident => $body:expr) => {
        match $constraint {
            Constraint::Clause($inner) => $body,
            Constraint::Cardinality($inner) => $body,
            Constraint::Weighted32($inner) => $body,
            Constraint::Weighted64($inner) => $body,
            Constraint::Weighted96($inner) => $body,
            Constraint::Weighted128($inner) => $body,
            Constraint::WeightedArbitrary($inner) => $body,
        }
    };
}

impl Constraint {
    /// Builds the constraint corresponding to `expanded`.
    ///
    /// Constraints whose coefficients are all at least the degree become clauses, constraints with
    /// equal coefficients become cardinality constraints, and all others become weighted
    /// constraints of the narrowest width (but at least `minimum_width`) that can hold them.
    pub fn from_expanded(
        expanded: &ExpandedConstraint,
        header: ConstraintHeader,
        minimum_width: WeightedWidth,
    ) -> Result<Constraint, ConstraintOperationError> {
        if expanded.is_tautology() {
            return Err(ConstraintOperationError::TrivialConstraint);
        }
        if expanded.is_empty() {
            return Err(ConstraintOperationError::EmptyConstraint);
        }
        if expanded.len() >= MAX_CONSTRAINT_SIZE {
            return Err(ConstraintOperationError::TooManyLiterals {
                len: expanded.len(),
            });
        }
        let total = expanded
            .terms()
            .map(|term| &term.coefficient)
            .sum::<BigInt>();
        if &total < expanded.degree() {
            return Err(ConstraintOperationError::InfeasibleConstraint);
        }

        let mut terms = expanded.terms().cloned().collect::<Vec<_>>();
        terms.sort_by(|left, right| {
            right
                .coefficient
                .cmp(&left.coefficient)
                .then(left.literal.cmp(&right.literal))
        });
        let degree = expanded.degree();
        let largest = &terms[0].coefficient;
        let smallest = &terms[terms.len() - 1].coefficient;
        let literals = || terms.iter().map(|term| term.literal).collect::<Vec<_>>();

        if smallest >= degree {
            return Ok(Constraint::Clause(ClauseConstraint::new(header, literals())));
        }
        if largest == smallest {
            let cardinality_degree = Integer::div_ceil(degree, smallest)
                .to_u32()
                .ok_or(ConstraintOperationError::CoefficientOverflow)?;
            return Ok(Constraint::Cardinality(CardinalityConstraint::new(
                header,
                cardinality_degree,
                literals(),
            )));
        }

        let width = WeightedWidth::select(largest, degree, minimum_width);
        let constraint = match width {
            WeightedWidth::Bits32 => {
                Constraint::Weighted32(build_weighted(header, degree, &terms)?)
            }
            WeightedWidth::Bits64 => {
                Constraint::Weighted64(build_weighted(header, degree, &terms)?)
            }
            WeightedWidth::Bits96 => {
                Constraint::Weighted96(build_weighted(header, degree, &terms)?)
            }
            WeightedWidth::Bits128 => {
                Constraint::Weighted128(build_weighted(header, degree, &terms)?)
            }
            WeightedWidth::Arbitrary => {
                Constraint::WeightedArbitrary(build_weighted(header, degree, &terms)?)
            }
        };
        Ok(constraint)
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Clause(_) => ConstraintKind::Clause,
            Constraint::Cardinality(_) => ConstraintKind::Cardinality,
            Constraint::Weighted32(_) => ConstraintKind::Weighted(WeightedWidth::Bits32),
            Constraint::Weighted64(_) => ConstraintKind::Weighted(WeightedWidth::Bits64),
            Constraint::Weighted96(_) => ConstraintKind::Weighted(WeightedWidth::Bits96),
            Constraint::Weighted128(_) => ConstraintKind::Weighted(WeightedWidth::Bits128),
            Constraint::WeightedArbitrary(_) => ConstraintKind::Weighted(WeightedWidth::Arbitrary),
        }
    }

    pub fn header(&self) -> &ConstraintHeader {
        dispatch!(self, constraint => constraint.header())
    }

    pub fn header_mut(&mut self) -> &mut ConstraintHeader {
        dispatch!(self, constraint => constraint.header_mut())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, constraint => constraint.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn literal(&self, index: usize) -> Literal {
        dispatch!(self, constraint => constraint.literal(index))
    }

    pub fn coefficient(&self, index: usize) -> BigInt {
        dispatch!(self, constraint => constraint.coefficient_value(index))
    }

    pub fn degree(&self) -> BigInt {
        dispatch!(self, constraint => constraint.degree_value())
    }

    /// The terms before this index have a coefficient which is at least the degree.
    pub fn unsaturated_index(&self) -> usize {
        dispatch!(self, constraint => constraint.unsaturated_index())
    }

    pub fn is_clause_or_cardinality(&self) -> bool {
        matches!(self, Constraint::Clause(_) | Constraint::Cardinality(_))
    }

    /// Whether at most one of the negated literals can be true.
    pub fn is_at_most_one(&self) -> bool {
        match self {
            Constraint::Clause(clause) => clause.is_at_most_one(),
            Constraint::Cardinality(cardinality) => cardinality.is_at_most_one(),
            _ => false,
        }
    }

    /// The number of bytes this constraint occupies in the constraint store.
    pub fn required_bytes(&self) -> usize {
        let length = self.len();
        match self {
            Constraint::Clause(_) => ClauseConstraint::required_bytes(length),
            Constraint::Cardinality(_) => CardinalityConstraint::required_bytes(length),
            Constraint::Weighted32(_) => PackedWeighted::<i32, i64>::required_bytes(length),
            Constraint::Weighted64(_) => PackedWeighted::<i64, i128>::required_bytes(length),
            Constraint::Weighted96(_) => PackedWeighted::<i128, i128>::required_bytes(length),
            Constraint::Weighted128(_) => WideWeighted::<i128, BigInt>::required_bytes(length),
            Constraint::WeightedArbitrary(_) => {
                WideWeighted::<BigInt, BigInt>::required_bytes(length)
            }
        }
    }

    /// Registers the initial watches; called exactly once, before any other watch operation.
    pub fn initialize_watches(
        &mut self,
        reference: ConstraintReference,
        context: &mut PropagationContext,
    ) {
        dispatch!(self, constraint => constraint.initialize_watches(reference, context))
    }

    /// Notifies the constraint that `falsified`, watched through `hint`, became false.
    pub fn check_for_propagation(
        &mut self,
        reference: ConstraintReference,
        hint: &mut WatchHint,
        falsified: Literal,
        context: &mut PropagationContext,
    ) -> WatchStatus {
        match (self, hint) {
            (Constraint::Clause(clause), WatchHint::Clause { blocker }) => {
                clause.check_for_propagation(reference, blocker, falsified, context)
            }
            (Constraint::Cardinality(cardinality), WatchHint::Cardinality { index }) => {
                cardinality.check_for_propagation(reference, *index as usize, falsified, context)
            }
            (Constraint::Weighted32(weighted), WatchHint::Weighted { index }) => {
                weighted.check_for_propagation(reference, *index as usize, falsified, context)
            }
            (Constraint::Weighted64(weighted), WatchHint::Weighted { index }) => {
                weighted.check_for_propagation(reference, *index as usize, falsified, context)
            }
            (Constraint::Weighted96(weighted), WatchHint::Weighted { index }) => {
                weighted.check_for_propagation(reference, *index as usize, falsified, context)
            }
            (Constraint::Weighted128(weighted), WatchHint::Weighted { index }) => {
                weighted.check_for_propagation(reference, *index as usize, falsified, context)
            }
            (Constraint::WeightedArbitrary(weighted), WatchHint::Weighted { index }) => {
                weighted.check_for_propagation(reference, *index as usize, falsified, context)
            }
            (constraint, hint) => {
                unreachable!("{hint:?} does not belong to a {} constraint", constraint.kind())
            }
        }
    }

    /// The watched literal at `index` was false-and-processed and is not anymore.
    ///
    /// Only weighted constraints keep track of the falsified watches.
    pub fn undo_falsified(&mut self, index: usize) {
        match self {
            Constraint::Weighted32(weighted) => weighted.undo_falsified(index),
            Constraint::Weighted64(weighted) => weighted.undo_falsified(index),
            Constraint::Weighted96(weighted) => weighted.undo_falsified(index),
            Constraint::Weighted128(weighted) => weighted.undo_falsified(index),
            Constraint::WeightedArbitrary(weighted) => weighted.undo_falsified(index),
            Constraint::Clause(_) | Constraint::Cardinality(_) => {
                pb_assert_simple!(false, "only weighted constraints track falsified watches")
            }
        }
    }

    /// Whether the watch slack of a weighted constraint matches a recomputation; always true for
    /// clauses and cardinality constraints.
    pub fn is_watch_slack_consistent(&self, assignments: &Assignments) -> bool {
        match self {
            Constraint::Weighted32(weighted) => weighted.is_watch_slack_consistent(assignments),
            Constraint::Weighted64(weighted) => weighted.is_watch_slack_consistent(assignments),
            Constraint::Weighted96(weighted) => weighted.is_watch_slack_consistent(assignments),
            Constraint::Weighted128(weighted) => weighted.is_watch_slack_consistent(assignments),
            Constraint::WeightedArbitrary(weighted) => {
                weighted.is_watch_slack_consistent(assignments)
            }
            Constraint::Clause(_) | Constraint::Cardinality(_) => true,
        }
    }

    pub fn is_satisfied_at_root(&self, assignments: &Assignments) -> bool {
        dispatch!(self, constraint => constraint.is_satisfied_at_root(assignments))
    }

    pub fn can_be_simplified(
        &self,
        assignments: &Assignments,
        oracle: &impl ImplicationOracle,
        pool: &mut LiteralSetPool,
    ) -> bool {
        dispatch!(self, constraint => constraint.can_be_simplified(assignments, oracle, pool))
    }

    /// See [`ExpandedConstraint::resolve_with`].
    pub fn resolve_with(
        &self,
        accumulator: &mut ExpandedConstraint,
        propagated: Literal,
        statistics: &mut PropagationStatistics,
    ) {
        dispatch!(self, constraint => constraint.resolve_with(accumulator, propagated, statistics))
    }

    /// See [`ExpandedConstraint::subsume_with`].
    pub fn subsume_with(
        &self,
        accumulator: &mut ExpandedConstraint,
        propagated: Literal,
        statistics: &mut PropagationStatistics,
    ) -> bool {
        dispatch!(self, constraint => constraint.subsume_with(accumulator, propagated, statistics))
    }

    pub fn to_expanded(&self) -> ExpandedConstraint {
        let expanded = dispatch!(self, constraint => constraint.to_expanded());
        pb_assert_moderate!(expanded.is_sorted_by_decreasing_coefficient());
        expanded
    }
}

fn build_weighted<CF, DG, Terms>(
    header: ConstraintHeader,
    degree: &BigInt,
    terms: &[Term],
) -> Result<WeightedConstraint<CF, DG, Terms>, ConstraintOperationError>
where
    CF: Coefficient,
    DG: Degree<CF>,
    Terms: TermStorage<CF>,
{
    let degree = DG::from_big_int(degree).ok_or(ConstraintOperationError::CoefficientOverflow)?;
    let terms = terms
        .iter()
        .map(|term| {
            CF::from_big_int(&term.coefficient)
                .map(|coefficient| (coefficient, term.literal))
                .ok_or(ConstraintOperationError::CoefficientOverflow)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(WeightedConstraint::new(header, degree, terms))
}
