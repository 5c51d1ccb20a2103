mod term_storage;

use std::cmp::Reverse;
use std::marker::PhantomData;
use std::mem::size_of;

use num::BigInt;
pub use term_storage::PackedTerms;
pub use term_storage::TermStorage;
pub use term_storage::WatchedLiteral;
pub use term_storage::WideTerms;

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
use crate::math::Coefficient;
use crate::math::Degree;
use crate::pb_assert_advanced;
use crate::pb_assert_moderate;
use crate::pb_assert_simple;

/// A weighted constraint with the coefficient stored next to each literal.
pub type PackedWeighted<CF, DG> = WeightedConstraint<CF, DG, PackedTerms<CF>>;
/// A weighted constraint with literals and coefficients in separate buffers.
pub type WideWeighted<CF, DG> = WeightedConstraint<CF, DG, WideTerms<CF>>;

/// `sum coefficient_i * literal_i >= degree`, with terms sorted by non-increasing coefficient.
///
/// A subset of the literals is watched. The watch slack is the sum of the coefficients of the
/// watched literals that are not false-and-processed, minus the degree. As long as it is at least
/// the largest coefficient, no assignment of a single literal can cause a propagation, so no
/// further literals need to be watched. Once it drops below, every non-false literal is watched and
/// literals whose coefficient exceeds the slack are propagated.
///
/// The degree type `DG` is wide enough to hold any sum of coefficients of type `CF`.
#[derive(Clone, Debug)]
pub struct WeightedConstraint<CF, DG, Terms> {
    header: ConstraintHeader,
    degree: DG,
    watch_slack: DG,
    unsaturated_index: u32,
    scan_cursor: u32,
    trail_pops_snapshot: u64,
    terms: Terms,
    coefficient: PhantomData<CF>,
}

impl<CF, DG, Terms> WeightedConstraint<CF, DG, Terms>
where
    CF: Coefficient,
    DG: Degree<CF>,
    Terms: TermStorage<CF>,
{
    pub(crate) fn new(header: ConstraintHeader, degree: DG, terms: Vec<(CF, Literal)>) -> Self {
        pb_assert_simple!(!terms.is_empty());
        pb_assert_moderate!(terms.windows(2).all(|pair| pair[0].0 >= pair[1].0));
        pb_assert_moderate!(terms.iter().all(|(coefficient, _)| coefficient.is_positive()));

        let unsaturated_index = terms
            .iter()
            .take_while(|(coefficient, _)| DG::widen(coefficient) >= degree)
            .count();

        WeightedConstraint {
            header,
            watch_slack: -degree.clone(),
            degree,
            unsaturated_index: unsaturated_index as u32,
            scan_cursor: 0,
            trail_pops_snapshot: 0,
            terms: Terms::from_terms(terms),
            coefficient: PhantomData,
        }
    }

    pub fn degree(&self) -> &DG {
        &self.degree
    }

    pub fn coefficient(&self, index: usize) -> &CF {
        self.terms.coefficient(index)
    }

    pub fn watch_slack(&self) -> &DG {
        &self.watch_slack
    }

    pub fn is_watched(&self, index: usize) -> bool {
        self.terms.is_watched(index)
    }

    /// The number of bytes a weighted constraint with `length` terms occupies.
    pub fn required_bytes(length: usize) -> usize {
        round_up_to_alignment(size_of::<Self>() + Terms::required_bytes(length))
    }

    fn largest_coefficient(&self) -> DG {
        DG::widen(self.terms.coefficient(0))
    }

    fn watch(
        &mut self,
        reference: ConstraintReference,
        index: usize,
        context: &mut PropagationContext,
    ) {
        self.terms.set_watched(index, true);
        context.watch(
            self.terms.literal(index),
            Watcher {
                constraint: reference,
                hint: WatchHint::Weighted {
                    index: index as u32,
                },
            },
        );
    }

    /// Propagates every unassigned literal from the scan cursor onward whose coefficient exceeds
    /// the watch slack.
    fn propagate_from_cursor(
        &mut self,
        reference: ConstraintReference,
        context: &mut PropagationContext,
    ) {
        let length = self.terms.len();
        let mut cursor = self.scan_cursor as usize;
        while cursor < length && DG::widen(self.terms.coefficient(cursor)) > self.watch_slack {
            let literal = self.terms.literal(cursor);
            if context.is_literal_unassigned(literal) {
                pb_assert_advanced!(consistency::is_correctly_propagating(
                    self,
                    context.assignments(),
                    cursor
                ));
                context.propagate(literal, reference);
                context.statistics.num_weighted_propagations += 1;
            }
            cursor += 1;
        }
        self.scan_cursor = cursor as u32;
    }

    pub(crate) fn initialize_watches(
        &mut self,
        reference: ConstraintReference,
        context: &mut PropagationContext,
    ) {
        let length = self.terms.len();
        let largest = self.largest_coefficient();
        self.watch_slack = -self.degree.clone();
        self.scan_cursor = 0;
        self.trail_pops_snapshot = context.num_trail_pops();

        let mut index = 0;
        while index < length && self.watch_slack < largest {
            if !context.is_literal_false_and_processed(self.terms.literal(index)) {
                self.watch_slack += DG::widen(self.terms.coefficient(index));
                self.watch(reference, index, context);
            }
            index += 1;
        }

        if self.watch_slack < largest {
            // Also watch falsified literals, latest falsification first, until the watches would
            // cover the largest coefficient again once they become unassigned.
            let mut falsified = (0..length)
                .filter(|&index| !self.terms.is_watched(index))
                .collect::<Vec<_>>();
            falsified.sort_unstable_by_key(|&index| {
                Reverse(context.falsification_position(self.terms.literal(index)))
            });

            let mut missing = largest - self.watch_slack.clone();
            for term in falsified {
                missing -= DG::widen(self.terms.coefficient(term));
                self.watch(reference, term, context);
                if missing <= DG::zero() {
                    break;
                }
            }

            self.propagate_from_cursor(reference, context);
        }

        pb_assert_advanced!(self.is_watch_slack_consistent(context.assignments()));
    }

    /// Called when the watched literal at `index` became false.
    pub(crate) fn check_for_propagation(
        &mut self,
        reference: ConstraintReference,
        index: usize,
        falsified: Literal,
        context: &mut PropagationContext,
    ) -> WatchStatus {
        pb_assert_moderate!(self.terms.literal(index) == falsified);
        pb_assert_moderate!(self.terms.is_watched(index));
        let length = self.terms.len();

        if self.trail_pops_snapshot != context.num_trail_pops() {
            self.trail_pops_snapshot = context.num_trail_pops();
            self.scan_cursor = 0;
        }

        let largest = self.largest_coefficient();
        let had_spare_slack = self.watch_slack >= largest;
        self.watch_slack -= DG::widen(self.terms.coefficient(index));

        if had_spare_slack {
            // Look for new watches to restore the slack.
            let start = self.scan_cursor as usize;
            let mut cursor = start;
            while cursor < length && self.watch_slack < largest {
                let literal = self.terms.literal(cursor);
                if !self.terms.is_watched(cursor) && !context.is_literal_false(literal) {
                    self.watch_slack += DG::widen(self.terms.coefficient(cursor));
                    self.watch(reference, cursor, context);
                }
                cursor += 1;
            }
            context.statistics.num_watch_lookups += (cursor - start) as u64;
            self.scan_cursor = if self.watch_slack < largest {
                0
            } else {
                cursor as u32
            };
        }

        if self.watch_slack >= largest {
            self.terms.set_watched(index, false);
            pb_assert_advanced!(self.is_watch_slack_consistent(context.assignments()));
            return WatchStatus::DropWatch;
        }

        if self.watch_slack < DG::zero() {
            pb_assert_advanced!(consistency::is_correctly_conflicting(
                self,
                context.assignments()
            ));
            return WatchStatus::Conflicting;
        }

        self.propagate_from_cursor(reference, context);
        pb_assert_advanced!(self.is_watch_slack_consistent(context.assignments()));
        WatchStatus::KeepWatch
    }

    /// The watched literal at `index` is no longer false-and-processed.
    pub(crate) fn undo_falsified(&mut self, index: usize) {
        pb_assert_moderate!(self.terms.is_watched(index));
        self.watch_slack += DG::widen(self.terms.coefficient(index));
    }

    /// Recomputes the watch slack from scratch and compares it to the maintained one.
    pub fn is_watch_slack_consistent(&self, assignments: &Assignments) -> bool {
        let recomputed =
            consistency::watch_slack(self, |index| self.terms.is_watched(index), assignments);
        recomputed == self.watch_slack.to_big()
    }
}

impl<CF, DG, Terms> ConstraintTerms for WeightedConstraint<CF, DG, Terms>
where
    CF: Coefficient,
    DG: Degree<CF>,
    Terms: TermStorage<CF>,
{
    fn header(&self) -> &ConstraintHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ConstraintHeader {
        &mut self.header
    }

    fn len(&self) -> usize {
        self.terms.len()
    }

    fn literal(&self, index: usize) -> Literal {
        self.terms.literal(index)
    }

    fn coefficient_value(&self, index: usize) -> BigInt {
        self.terms.coefficient(index).to_big()
    }

    fn degree_value(&self) -> BigInt {
        self.degree.to_big()
    }

    fn unsaturated_index(&self) -> usize {
        self.unsaturated_index as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::test_utils::TestEnvironment;

    fn weighted<CF, DG, Terms>(
        environment: &mut TestEnvironment,
        degree: DG,
        terms: Vec<(CF, Literal)>,
    ) -> WeightedConstraint<CF, DG, Terms>
    where
        CF: Coefficient,
        DG: Degree<CF>,
        Terms: TermStorage<CF>,
    {
        WeightedConstraint::new(environment.header(), degree, terms)
    }

    #[test]
    fn losing_a_watch_propagates_literals_with_large_coefficients() {
        let mut environment = TestEnvironment::with_variables(3);
        let [x1, x2, x3] = environment.literals();
        let mut constraint: PackedWeighted<i32, i64> =
            weighted(&mut environment, 4, vec![(3, x1), (2, x2), (2, x3)]);
        constraint.initialize_watches(environment.reference, &mut environment.context());
        assert_eq!(*constraint.watch_slack(), 3);

        environment.falsify(x1);
        let status =
            constraint.check_for_propagation(
                environment.reference,
                0,
                x1,
                &mut environment.context(),
            );

        assert_eq!(status, WatchStatus::KeepWatch);
        assert!(environment.assignments.is_literal_true(x2));
        assert!(environment.assignments.is_literal_true(x3));
        assert_eq!(*constraint.watch_slack(), 0);
        assert_eq!(environment.statistics.num_weighted_propagations, 2);
    }

    #[test]
    fn only_enough_literals_to_cover_the_largest_coefficient_are_watched() {
        let mut environment = TestEnvironment::with_variables(4);
        let [a, b, c, d] = environment.literals();
        let constraint = {
            let mut constraint: PackedWeighted<i32, i64> =
                weighted(&mut environment, 2, vec![(2, a), (2, b), (1, c), (1, d)]);
            constraint.initialize_watches(environment.reference, &mut environment.context());
            constraint
        };

        assert!(constraint.is_watched(0) && constraint.is_watched(1));
        assert!(!constraint.is_watched(2) && !constraint.is_watched(3));
        assert_eq!(*constraint.watch_slack(), 2);
    }

    #[test]
    fn replacement_watches_allow_dropping_the_falsified_one() {
        let mut environment = TestEnvironment::with_variables(4);
        let [a, b, c, d] = environment.literals();
        let mut constraint: PackedWeighted<i32, i64> =
            weighted(&mut environment, 2, vec![(2, a), (2, b), (1, c), (1, d)]);
        constraint.initialize_watches(environment.reference, &mut environment.context());

        environment.falsify(a);
        let status =
            constraint.check_for_propagation(
                environment.reference,
                0,
                a,
                &mut environment.context(),
            );

        assert_eq!(status, WatchStatus::DropWatch);
        assert!(!constraint.is_watched(0));
        assert!(constraint.is_watched(2) && constraint.is_watched(3));
        assert_eq!(*constraint.watch_slack(), 2);
        assert_eq!(environment.statistics.num_watch_lookups, 4);
    }

    #[test]
    fn negative_slack_is_a_conflict() {
        let mut environment = TestEnvironment::with_variables(3);
        let [a, b, c] = environment.literals();
        let mut constraint: PackedWeighted<i32, i64> =
            weighted(&mut environment, 4, vec![(3, a), (2, b), (2, c)]);
        constraint.initialize_watches(environment.reference, &mut environment.context());
        environment.assignments.enqueue_decision(!b);
        environment.assignments.enqueue_decision(!c);

        let _ = environment.assignments.next_literal_to_process();
        let status =
            constraint.check_for_propagation(
                environment.reference,
                1,
                b,
                &mut environment.context(),
            );
        assert_eq!(status, WatchStatus::KeepWatch);
        assert!(environment.assignments.is_literal_true(a));

        let _ = environment.assignments.next_literal_to_process();
        let status =
            constraint.check_for_propagation(
                environment.reference,
                2,
                c,
                &mut environment.context(),
            );
        assert_eq!(status, WatchStatus::Conflicting);
        assert!(constraint.is_watched(2));
    }

    #[test]
    fn undoing_a_falsified_watch_restores_the_slack() {
        let mut environment = TestEnvironment::with_variables(3);
        let [x1, x2, x3] = environment.literals();
        let mut constraint: PackedWeighted<i32, i64> =
            weighted(&mut environment, 4, vec![(3, x1), (2, x2), (2, x3)]);
        constraint.initialize_watches(environment.reference, &mut environment.context());
        environment.falsify(x1);
        let _ =
            constraint.check_for_propagation(
                environment.reference,
                0,
                x1,
                &mut environment.context(),
            );

        constraint.undo_falsified(0);

        assert_eq!(*constraint.watch_slack(), 3);
    }

    #[test]
    fn initialisation_watches_recently_falsified_literals_when_short_on_slack() {
        let mut environment = TestEnvironment::with_variables(3);
        let [a, b, c] = environment.literals();
        environment.falsify(a);
        let mut constraint: PackedWeighted<i32, i64> =
            weighted(&mut environment, 4, vec![(3, a), (2, b), (2, c)]);

        constraint.initialize_watches(environment.reference, &mut environment.context());

        assert!(constraint.is_watched(0));
        assert_eq!(environment.watch_lists.watchers(a).len(), 1);
        assert_eq!(*constraint.watch_slack(), 0);
        assert!(environment.assignments.is_literal_true(b));
        assert!(environment.assignments.is_literal_true(c));
    }

    #[test]
    fn saturated_prefix_is_computed_on_creation() {
        let mut environment = TestEnvironment::with_variables(3);
        let [a, b, c] = environment.literals();

        let constraint: PackedWeighted<i64, i128> =
            weighted(&mut environment, 3, vec![(5, a), (3, b), (1, c)]);

        assert_eq!(constraint.unsaturated_index(), 2);
    }

    #[test]
    fn arbitrary_precision_constraints_behave_like_fixed_width_ones() {
        let mut environment = TestEnvironment::with_variables(3);
        let [x1, x2, x3] = environment.literals();
        let huge = num::pow(BigInt::from(10), 40);
        let mut constraint: WideWeighted<BigInt, BigInt> = weighted(
            &mut environment,
            &huge * 4,
            vec![(&huge * 3, x1), (&huge * 2, x2), (&huge * 2, x3)],
        );
        constraint.initialize_watches(environment.reference, &mut environment.context());

        environment.falsify(x1);
        let status =
            constraint.check_for_propagation(
                environment.reference,
                0,
                x1,
                &mut environment.context(),
            );

        assert_eq!(status, WatchStatus::KeepWatch);
        assert!(environment.assignments.is_literal_true(x2));
        assert!(environment.assignments.is_literal_true(x3));
    }

    #[test]
    fn expanding_keeps_terms_degree_and_order() {
        let mut environment = TestEnvironment::with_variables(3);
        let [a, b, c] = environment.literals();
        let constraint: PackedWeighted<i128, i128> =
            weighted(&mut environment, 4, vec![(3, a), (2, !b), (1, c)]);

        let expanded = constraint.to_expanded();

        assert!(expanded.is_sorted_by_decreasing_coefficient());
        assert_eq!(expanded.degree(), &BigInt::from(4));
        assert_eq!(expanded.coefficient(!b), BigInt::from(2));
        assert_eq!(expanded.origin(), constraint.header().origin());
    }
}
