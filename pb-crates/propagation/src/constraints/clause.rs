use std::mem::size_of;

use num::BigInt;
use num::One;

use super::consistency;
use super::round_up_to_alignment;
use super::ConstraintHeader;
use super::ConstraintTerms;
use crate::basic_types::ConstraintReference;
use crate::basic_types::Literal;
use crate::basic_types::WatchStatus;
use crate::engine::Assignments;
use crate::engine::PropagationContext;
use crate::engine::WatchHint;
use crate::engine::Watcher;
use crate::pb_assert_advanced;
use crate::pb_assert_moderate;
use crate::pb_assert_simple;

/// A disjunction of literals, i.e. `sum literal_i >= 1`.
///
/// The literals at positions 0 and 1 are watched. The watchers carry the other watched literal as a
/// blocker so that satisfied clauses can be skipped without looking at the clause.
#[derive(Clone, Debug)]
pub struct ClauseConstraint {
    header: ConstraintHeader,
    literals: Box<[Literal]>,
}

impl ClauseConstraint {
    pub(crate) fn new(header: ConstraintHeader, literals: Vec<Literal>) -> Self {
        pb_assert_simple!(!literals.is_empty());
        ClauseConstraint {
            header,
            literals: literals.into_boxed_slice(),
        }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn is_at_most_one(&self) -> bool {
        self.literals.len() == 2
    }

    /// The number of bytes a clause with `length` literals occupies.
    pub fn required_bytes(length: usize) -> usize {
        round_up_to_alignment(size_of::<Self>() + length * size_of::<Literal>())
    }

    /// Sets up the two watches, propagating if only one literal is not false.
    ///
    /// Unit clauses are not watched; they should be added at the root.
    pub(crate) fn initialize_watches(
        &mut self,
        reference: ConstraintReference,
        context: &mut PropagationContext,
    ) {
        let length = self.literals.len();
        if length == 1 {
            pb_assert_simple!(
                context.decision_level() == 0,
                "unit clauses are only enforced when added at the root"
            );
            let literal = self.literals[0];
            if context.is_literal_unassigned(literal) {
                context.propagate(literal, reference);
                context.statistics.num_clause_propagations += 1;
            }
            return;
        }

        let mut num_watches = 0;
        for index in 0..length {
            if num_watches == 2 {
                break;
            }
            if !context.is_literal_false(self.literals[index]) {
                self.literals.swap(num_watches, index);
                num_watches += 1;
            }
        }
        pb_assert_simple!(num_watches > 0, "clause is falsified on creation");

        if num_watches == 1 {
            let literal = self.literals[0];
            if !context.is_literal_true(literal) {
                pb_assert_advanced!(consistency::is_correctly_propagating(
                    self,
                    context.assignments(),
                    0
                ));
                context.propagate(literal, reference);
                context.statistics.num_clause_propagations += 1;
            }
            // Watch the literal that becomes unassigned first on backtracking.
            let latest = (1..length)
                .max_by_key(|&index| context.falsification_position(self.literals[index]))
                .unwrap_or(1);
            self.literals.swap(1, latest);
        }

        for (watched, blocker) in [(0, 1), (1, 0)] {
            context.watch(
                self.literals[watched],
                Watcher {
                    constraint: reference,
                    hint: WatchHint::Clause {
                        blocker: self.literals[blocker],
                    },
                },
            );
        }
    }

    /// Called when the watched literal `falsified` became false.
    pub(crate) fn check_for_propagation(
        &mut self,
        reference: ConstraintReference,
        blocker: &mut Literal,
        falsified: Literal,
        context: &mut PropagationContext,
    ) -> WatchStatus {
        let watch_index = if self.literals[0] == falsified { 0 } else { 1 };
        pb_assert_moderate!(self.literals[watch_index] == falsified);

        let other = self.literals[1 - watch_index];
        if context.is_literal_true(other) {
            *blocker = other;
            return WatchStatus::KeepWatch;
        }

        let length = self.literals.len();
        for index in 2..length {
            let literal = self.literals[index];
            if context.is_literal_false(literal) {
                continue;
            }
            // Falsified literals gather near the front of the unwatched part, which shortens
            // future scans.
            let middle = index / 2 + 1;
            self.literals[index] = self.literals[middle];
            self.literals[middle] = falsified;
            self.literals[watch_index] = literal;
            context.watch(
                literal,
                Watcher {
                    constraint: reference,
                    hint: WatchHint::Clause { blocker: other },
                },
            );
            context.statistics.num_watch_lookups += (index - 1) as u64;
            return WatchStatus::DropWatch;
        }
        context.statistics.num_watch_lookups += length.saturating_sub(2) as u64;

        if context.is_literal_false(other) {
            pb_assert_advanced!(consistency::is_correctly_conflicting(
                self,
                context.assignments()
            ));
            return WatchStatus::Conflicting;
        }

        pb_assert_advanced!(consistency::is_correctly_propagating(
            self,
            context.assignments(),
            1 - watch_index
        ));
        context.propagate(other, reference);
        context.statistics.num_clause_propagations += 1;
        WatchStatus::KeepWatch
    }
}

impl ConstraintTerms for ClauseConstraint {
    fn header(&self) -> &ConstraintHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ConstraintHeader {
        &mut self.header
    }

    fn len(&self) -> usize {
        self.literals.len()
    }

    fn literal(&self, index: usize) -> Literal {
        self.literals[index]
    }

    fn coefficient_value(&self, _index: usize) -> BigInt {
        BigInt::one()
    }

    fn degree_value(&self) -> BigInt {
        BigInt::one()
    }

    fn unsaturated_index(&self) -> usize {
        self.literals.len()
    }

    fn is_satisfied_at_root(&self, assignments: &Assignments) -> bool {
        self.literals
            .iter()
            .any(|&literal| assignments.is_unit(literal))
    }
}
