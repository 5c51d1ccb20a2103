#![allow(dead_code, reason = "not every test file uses every helper")]
#![cfg(test)]

use num::BigInt;
use num::Signed;
use pb_propagation::Assignments;
use pb_propagation::Conflict;
use pb_propagation::ConstraintOperationError;
use pb_propagation::ConstraintPropagator;
use pb_propagation::ConstraintReference;
use pb_propagation::ExpandedConstraint;
use pb_propagation::Literal;
use pb_propagation::Origin;
use pb_propagation::PropagatorOptions;

/// A propagator together with the trail it propagates over.
#[derive(Debug)]
pub(crate) struct Harness {
    pub(crate) propagator: ConstraintPropagator,
    pub(crate) assignments: Assignments,
    pub(crate) literals: Vec<Literal>,
}

impl Harness {
    pub(crate) fn new(num_variables: usize) -> Self {
        Self::with_options(num_variables, PropagatorOptions::default())
    }

    pub(crate) fn with_options(num_variables: usize, options: PropagatorOptions) -> Self {
        let mut assignments = Assignments::default();
        let literals = (0..num_variables)
            .map(|_| Literal::positive(assignments.grow()))
            .collect();
        let mut propagator = ConstraintPropagator::new(options);
        propagator.grow(num_variables);

        Harness {
            propagator,
            assignments,
            literals,
        }
    }

    /// Adds `sum coefficient * x_variable >= degree`; negative coefficients refer to the negated
    /// literal.
    pub(crate) fn add(
        &mut self,
        terms: &[(i64, usize)],
        degree: i64,
    ) -> Result<ConstraintReference, ConstraintOperationError> {
        let expanded = self.expanded(terms, degree);
        self.propagator
            .add_constraint(&expanded, &mut self.assignments)
    }

    pub(crate) fn add_big(
        &mut self,
        terms: &[(BigInt, usize)],
        degree: BigInt,
    ) -> Result<ConstraintReference, ConstraintOperationError> {
        let expanded = ExpandedConstraint::from_terms(
            terms
                .iter()
                .map(|(coefficient, variable)| (coefficient.clone(), self.literals[*variable])),
            degree,
            Origin::Formula,
        );
        self.propagator
            .add_constraint(&expanded, &mut self.assignments)
    }

    pub(crate) fn expanded(&self, terms: &[(i64, usize)], degree: i64) -> ExpandedConstraint {
        let mut expanded = ExpandedConstraint::new(Origin::Formula);
        for &(coefficient, variable) in terms {
            if coefficient < 0 {
                expanded.add_lhs(-coefficient, !self.literals[variable]);
            } else {
                expanded.add_lhs(coefficient, self.literals[variable]);
            }
        }
        expanded.add_rhs(degree);
        expanded
    }

    /// Opens a new decision level with `literal` and propagates.
    pub(crate) fn decide(&mut self, literal: Literal) -> Result<(), Conflict> {
        self.assignments.increase_decision_level();
        self.assignments.enqueue_decision(literal);
        self.propagator.propagate(&mut self.assignments)
    }

    pub(crate) fn backtrack(&mut self, decision_level: usize) {
        self.propagator
            .backtrack(&mut self.assignments, decision_level);
    }

    pub(crate) fn trail(&self) -> Vec<Literal> {
        (0..self.assignments.num_trail_entries())
            .map(|position| self.assignments.get_trail_entry(position))
            .collect()
    }

    /// Checks that after a successful propagation no constraint is falsified and no constraint
    /// implies a literal which is still unassigned.
    pub(crate) fn assert_propagation_complete(&self) {
        assert!(self.assignments.is_fully_processed());
        assert!(self.propagator.debug_check_state(&self.assignments));

        for (reference, constraint) in self.propagator.constraints() {
            if constraint.header().is_marked_for_delete() {
                continue;
            }
            let expanded = constraint.to_expanded();
            let slack = expanded.slack(&self.assignments);
            assert!(
                !slack.is_negative(),
                "{reference:?} ({expanded}) is falsified"
            );
            for term in expanded.terms() {
                let unassigned = self.assignments.is_literal_unassigned(term.literal);
                assert!(
                    !unassigned || term.coefficient <= slack,
                    "{reference:?} ({expanded}) implies {} which is unassigned",
                    term.literal
                );
            }
        }
    }

    /// Checks that the reported constraint is indeed falsified by the trail.
    pub(crate) fn assert_conflict_is_sound(&self, conflict: Conflict) {
        let expanded = self.propagator.constraint(conflict.constraint).to_expanded();
        assert!(
            expanded.slack(&self.assignments).is_negative(),
            "{expanded} is reported as conflicting but is not falsified"
        );
    }
}
