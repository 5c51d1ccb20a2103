use crate::basic_types::ConstraintReference;
use crate::basic_types::Literal;
use crate::basic_types::Trail;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;
use crate::pb_assert_moderate;
use crate::pb_assert_simple;

/// The truth values of the variables together with the trail on which they were assigned.
///
/// Besides the values, the constraints rely on three pieces of bookkeeping:
/// - the trail position of every assigned variable (to find the most recently falsified literal),
/// - the queue head, which separates the literals whose watchers have been notified (processed)
///   from those that still need to be processed,
/// - the trail-pop counter, which increases every time a literal is removed from the trail or
///   un-processed. Constraints use it to detect that cached scan positions may be stale.
#[derive(Debug, Default)]
pub struct Assignments {
    assignment_info: KeyedVec<Variable, AssignmentInfo>,
    trail: Trail<Literal>,
    queue_head: usize,
    num_trail_pops: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum AssignmentInfo {
    Assigned {
        truth_value: bool,
        decision_level: usize,
        trail_position: usize,
        reason: Option<ConstraintReference>,
    },
    #[default]
    Unassigned,
}

impl Assignments {
    pub fn grow(&mut self) -> Variable {
        self.assignment_info.push(AssignmentInfo::Unassigned)
    }

    pub fn num_variables(&self) -> usize {
        self.assignment_info.len()
    }

    pub fn get_decision_level(&self) -> usize {
        self.trail.get_decision_level()
    }

    pub fn increase_decision_level(&mut self) {
        self.trail.increase_decision_level()
    }

    pub fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    pub fn get_trail_entry(&self, index: usize) -> Literal {
        self.trail[index]
    }

    pub fn trail_length_at_level(&self, decision_level: usize) -> usize {
        self.trail.length_at_level(decision_level)
    }

    /// The number of trail entries whose watchers have been notified.
    pub fn queue_head(&self) -> usize {
        self.queue_head
    }

    pub fn num_trail_pops(&self) -> u64 {
        self.num_trail_pops
    }

    pub fn is_literal_true(&self, literal: Literal) -> bool {
        matches!(
            self.assignment_info[literal.variable()],
            AssignmentInfo::Assigned { truth_value, .. } if truth_value == literal.is_positive()
        )
    }

    pub fn is_literal_false(&self, literal: Literal) -> bool {
        self.is_literal_true(!literal)
    }

    pub fn is_literal_unassigned(&self, literal: Literal) -> bool {
        self.assignment_info[literal.variable()] == AssignmentInfo::Unassigned
    }

    /// Whether the literal is true at the root level.
    pub fn is_unit(&self, literal: Literal) -> bool {
        self.is_literal_true(literal) && self.decision_level_of(literal.variable()) == Some(0)
    }

    pub fn decision_level_of(&self, variable: Variable) -> Option<usize> {
        match self.assignment_info[variable] {
            AssignmentInfo::Assigned { decision_level, .. } => Some(decision_level),
            AssignmentInfo::Unassigned => None,
        }
    }

    pub fn trail_position_of(&self, variable: Variable) -> Option<usize> {
        match self.assignment_info[variable] {
            AssignmentInfo::Assigned { trail_position, .. } => Some(trail_position),
            AssignmentInfo::Unassigned => None,
        }
    }

    pub fn reason_of(&self, variable: Variable) -> Option<ConstraintReference> {
        match self.assignment_info[variable] {
            AssignmentInfo::Assigned { reason, .. } => reason,
            AssignmentInfo::Unassigned => None,
        }
    }

    /// Whether the literal is false and its watchers have already been notified.
    pub fn is_literal_false_and_processed(&self, literal: Literal) -> bool {
        self.is_literal_false(literal)
            && self
                .trail_position_of(literal.variable())
                .is_some_and(|position| position < self.queue_head)
    }

    pub fn enqueue_decision(&mut self, literal: Literal) {
        pb_assert_simple!(self.is_literal_unassigned(literal));
        self.make_assignment(literal, None);
    }

    pub fn propagate(&mut self, literal: Literal, reason: ConstraintReference) {
        pb_assert_simple!(
            self.is_literal_unassigned(literal),
            "Propagating {literal} which is already assigned"
        );
        self.make_assignment(literal, Some(reason));
    }

    fn make_assignment(&mut self, literal: Literal, reason: Option<ConstraintReference>) {
        self.assignment_info[literal.variable()] = AssignmentInfo::Assigned {
            truth_value: literal.is_positive(),
            decision_level: self.get_decision_level(),
            trail_position: self.trail.len(),
            reason,
        };
        self.trail.push(literal);
    }

    /// Returns the next true literal whose watchers have to be notified and marks it as processed.
    pub fn next_literal_to_process(&mut self) -> Option<Literal> {
        let literal = self.trail.get(self.queue_head).copied()?;
        self.queue_head += 1;
        Some(literal)
    }

    /// Marks the most recently processed literal as unprocessed again; used when the processing
    /// of a literal is interrupted by a conflict.
    pub fn unprocess_last_literal(&mut self) {
        pb_assert_simple!(self.queue_head > 0);
        self.queue_head -= 1;
        self.num_trail_pops += 1;
    }

    pub fn is_fully_processed(&self) -> bool {
        self.queue_head == self.trail.len()
    }

    /// Removes the last literal from the trail.
    ///
    /// Returns the literal and whether it had been processed. The decision level is not updated,
    /// see [`Assignments::synchronise`].
    pub fn undo_last_assignment(&mut self) -> Option<(Literal, bool)> {
        let literal = self.trail.pop()?;
        let was_processed = self.queue_head > self.trail.len();
        if was_processed {
            self.queue_head -= 1;
        }
        self.num_trail_pops += 1;
        self.assignment_info[literal.variable()] = AssignmentInfo::Unassigned;
        Some((literal, was_processed))
    }

    /// Closes the decision levels above `new_decision_level`, after all their entries were removed
    /// with [`Assignments::undo_last_assignment`].
    pub fn synchronise(&mut self, new_decision_level: usize) {
        self.trail.synchronise(new_decision_level);
        pb_assert_moderate!(self.queue_head <= self.trail.len());
    }

    pub fn num_literals(&self) -> usize {
        self.num_variables() * 2
    }
}
