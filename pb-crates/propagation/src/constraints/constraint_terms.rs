use num::BigInt;
use num::Zero;

use super::ConstraintHeader;
use crate::basic_types::Literal;
use crate::basic_types::Origin;
use crate::containers::LiteralSetPool;
use crate::engine::conflict_analysis::ExpandedConstraint;
use crate::engine::Assignments;
use crate::engine::ImplicationOracle;
use crate::engine::PropagationStatistics;

/// Read access to the terms of a constraint, shared by every kind of constraint.
///
/// The operations that do not depend on the watching scheme are implemented once in terms of this
/// view.
pub trait ConstraintTerms {
    fn header(&self) -> &ConstraintHeader;

    fn header_mut(&mut self) -> &mut ConstraintHeader;

    fn len(&self) -> usize;

    fn literal(&self, index: usize) -> Literal;

    fn coefficient_value(&self, index: usize) -> BigInt;

    fn degree_value(&self) -> BigInt;

    /// The terms before this index have a coefficient which is at least the degree.
    fn unsaturated_index(&self) -> usize;

    fn is_satisfied_at_root(&self, assignments: &Assignments) -> bool {
        let degree = self.degree_value();
        let mut satisfied = BigInt::zero();
        for index in 0..self.len() {
            if assignments.is_unit(self.literal(index)) {
                satisfied += self.coefficient_value(index);
                if satisfied >= degree {
                    return true;
                }
            }
        }
        false
    }

    /// Whether the constraint could be rewritten into a smaller or stronger one given the root
    /// assignment and the known equalities and implications.
    fn can_be_simplified(
        &self,
        assignments: &Assignments,
        oracle: &impl ImplicationOracle,
        pool: &mut LiteralSetPool,
    ) -> bool {
        let origin = self.header().origin();
        for index in 0..self.len() {
            let literal = self.literal(index);
            if assignments.is_unit(literal) || assignments.is_unit(!literal) {
                return true;
            }
            if origin != Origin::Equality && !oracle.is_canonical(literal) {
                return true;
            }
        }

        if origin == Origin::Implication || self.unsaturated_index() == 0 {
            return false;
        }

        // A literal implying a saturated literal of the same constraint is redundant.
        let mut saturated = pool.take();
        for index in 0..self.unsaturated_index() {
            saturated.insert(self.literal(index));
        }
        let has_redundant_literal = (0..self.len()).any(|index| {
            let literal = self.literal(index);
            oracle.has_implieds(literal)
                && oracle
                    .implieds(literal)
                    .iter()
                    .any(|&implied| implied != literal && saturated.contains(implied))
        });
        pool.release(saturated);

        has_redundant_literal
    }

    fn to_expanded(&self) -> ExpandedConstraint {
        ExpandedConstraint::from_terms(
            (0..self.len()).map(|index| (self.coefficient_value(index), self.literal(index))),
            self.degree_value(),
            self.header().origin(),
        )
    }

    /// Resolves the accumulated conflict with this constraint, which is the reason for
    /// `propagated`.
    fn resolve_with(
        &self,
        accumulator: &mut ExpandedConstraint,
        propagated: Literal,
        statistics: &mut PropagationStatistics,
    ) {
        self.header().record_provenance(statistics);
        let terms = (0..self.len())
            .map(|index| (self.coefficient_value(index), self.literal(index)))
            .collect();
        accumulator.resolve_with(terms, self.degree_value(), self.header().id(), propagated);
    }

    /// Attempts self-subsuming resolution of the accumulated conflict with this constraint, which
    /// is the reason for `propagated`.
    fn subsume_with(
        &self,
        accumulator: &mut ExpandedConstraint,
        propagated: Literal,
        statistics: &mut PropagationStatistics,
    ) -> bool {
        self.header().record_provenance(statistics);
        accumulator.subsume_with(
            (0..self.len()).map(|index| self.literal(index)),
            self.header().id(),
            propagated,
        )
    }
}
