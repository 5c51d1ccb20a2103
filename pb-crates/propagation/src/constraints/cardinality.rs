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
use crate::engine::PropagationContext;
use crate::engine::WatchHint;
use crate::engine::Watcher;
use crate::pb_assert_advanced;
use crate::pb_assert_moderate;
use crate::pb_assert_simple;

/// At least `degree` of the literals are true, i.e. `sum literal_i >= degree` with `degree > 1`.
///
/// The literals at positions `0..=degree` are watched. Unwatched literals before the scan cursor
/// are known to be false, as long as no literal has been removed from the trail since the cursor
/// was last updated.
#[derive(Clone, Debug)]
pub struct CardinalityConstraint {
    header: ConstraintHeader,
    degree: u32,
    scan_cursor: u32,
    trail_pops_snapshot: u64,
    literals: Box<[Literal]>,
}

impl CardinalityConstraint {
    pub(crate) fn new(header: ConstraintHeader, degree: u32, literals: Vec<Literal>) -> Self {
        pb_assert_simple!(degree > 1);
        pb_assert_simple!(degree as usize <= literals.len());
        CardinalityConstraint {
            header,
            degree,
            scan_cursor: degree + 1,
            trail_pops_snapshot: 0,
            literals: literals.into_boxed_slice(),
        }
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn is_at_most_one(&self) -> bool {
        self.degree as usize + 1 == self.literals.len()
    }

    /// The number of bytes a cardinality constraint with `length` literals occupies.
    pub fn required_bytes(length: usize) -> usize {
        round_up_to_alignment(size_of::<Self>() + length * size_of::<Literal>())
    }

    fn num_watches(&self) -> usize {
        (self.degree as usize + 1).min(self.literals.len())
    }

    pub(crate) fn initialize_watches(
        &mut self,
        reference: ConstraintReference,
        context: &mut PropagationContext,
    ) {
        let degree = self.degree as usize;
        let length = self.literals.len();
        let num_watches = self.num_watches();

        let mut num_non_false = 0;
        for index in 0..length {
            if num_non_false == num_watches {
                break;
            }
            if !context.is_literal_false(self.literals[index]) {
                self.literals.swap(num_non_false, index);
                num_non_false += 1;
            }
        }
        pb_assert_simple!(
            num_non_false >= degree,
            "cardinality constraint is falsified on creation"
        );

        if num_non_false == degree {
            pb_assert_simple!(
                degree < length || context.decision_level() == 0,
                "a cardinality constraint over exactly degree literals is added at the root"
            );
            // Every non-false literal is needed.
            for index in 0..degree {
                let literal = self.literals[index];
                if !context.is_literal_true(literal) {
                    context.propagate(literal, reference);
                    context.statistics.num_cardinality_propagations += 1;
                }
            }
            if degree < length {
                let latest = (degree..length)
                    .max_by_key(|&index| context.falsification_position(self.literals[index]))
                    .unwrap_or(degree);
                self.literals.swap(degree, latest);
            }
        }

        self.scan_cursor = self.degree + 1;
        self.trail_pops_snapshot = context.num_trail_pops();
        for index in 0..num_watches {
            context.watch(
                self.literals[index],
                Watcher {
                    constraint: reference,
                    hint: WatchHint::Cardinality {
                        index: index as u32,
                    },
                },
            );
        }
    }

    /// Called when the watched literal at `index` became false.
    pub(crate) fn check_for_propagation(
        &mut self,
        reference: ConstraintReference,
        index: usize,
        falsified: Literal,
        context: &mut PropagationContext,
    ) -> WatchStatus {
        pb_assert_moderate!(self.literals[index] == falsified);
        let degree = self.degree as usize;
        let length = self.literals.len();

        if length == degree {
            // Every literal is needed, there is no spare watch.
            pb_assert_advanced!(consistency::is_correctly_conflicting(
                self,
                context.assignments()
            ));
            return WatchStatus::Conflicting;
        }

        if self.trail_pops_snapshot != context.num_trail_pops() {
            self.trail_pops_snapshot = context.num_trail_pops();
            self.scan_cursor = self.degree + 1;
        }

        let start = self.scan_cursor as usize;
        let mut cursor = start;
        while cursor < length {
            let literal = self.literals[cursor];
            if !context.is_literal_false(literal) {
                let middle = (cursor + degree + 1) / 2;
                self.literals[cursor] = self.literals[middle];
                self.literals[middle] = falsified;
                self.literals[index] = literal;
                context.watch(
                    literal,
                    Watcher {
                        constraint: reference,
                        hint: WatchHint::Cardinality {
                            index: index as u32,
                        },
                    },
                );
                context.statistics.num_watch_lookups += (cursor - start + 1) as u64;
                // The position of the cursor now holds a false literal.
                self.scan_cursor = cursor as u32;
                return WatchStatus::DropWatch;
            }
            cursor += 1;
        }
        context.statistics.num_watch_lookups += (cursor - start) as u64;
        self.scan_cursor = cursor as u32;

        let num_watches = self.num_watches();
        let has_other_false_watch = (0..num_watches)
            .any(|other| other != index && context.is_literal_false(self.literals[other]));
        if has_other_false_watch {
            pb_assert_advanced!(consistency::is_correctly_conflicting(
                self,
                context.assignments()
            ));
            return WatchStatus::Conflicting;
        }

        for other in 0..num_watches {
            let literal = self.literals[other];
            if other != index && !context.is_literal_true(literal) {
                pb_assert_advanced!(consistency::is_correctly_propagating(
                    self,
                    context.assignments(),
                    other
                ));
                context.propagate(literal, reference);
                context.statistics.num_cardinality_propagations += 1;
            }
        }
        WatchStatus::KeepWatch
    }
}

impl ConstraintTerms for CardinalityConstraint {
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
        BigInt::from(self.degree)
    }

    fn unsaturated_index(&self) -> usize {
        0
    }
}
