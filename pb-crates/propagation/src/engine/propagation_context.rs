use super::Assignments;
use super::PropagationStatistics;
use super::WatchLists;
use super::Watcher;
use crate::basic_types::ConstraintReference;
use crate::basic_types::Literal;

/// Everything a constraint may look at or modify while maintaining its watches.
///
/// The context is created by the owner of the constraint store for each call and is never stored
/// inside a constraint.
#[derive(Debug)]
pub struct PropagationContext<'a> {
    pub(crate) assignments: &'a mut Assignments,
    pub(crate) watch_lists: &'a mut WatchLists,
    pub(crate) statistics: &'a mut PropagationStatistics,
}

impl<'a> PropagationContext<'a> {
    pub fn new(
        assignments: &'a mut Assignments,
        watch_lists: &'a mut WatchLists,
        statistics: &'a mut PropagationStatistics,
    ) -> Self {
        PropagationContext {
            assignments,
            watch_lists,
            statistics,
        }
    }

    pub fn assignments(&self) -> &Assignments {
        self.assignments
    }

    pub(crate) fn decision_level(&self) -> usize {
        self.assignments.get_decision_level()
    }

    pub(crate) fn is_literal_true(&self, literal: Literal) -> bool {
        self.assignments.is_literal_true(literal)
    }

    pub(crate) fn is_literal_false(&self, literal: Literal) -> bool {
        self.assignments.is_literal_false(literal)
    }

    pub(crate) fn is_literal_unassigned(&self, literal: Literal) -> bool {
        self.assignments.is_literal_unassigned(literal)
    }

    pub(crate) fn is_literal_false_and_processed(&self, literal: Literal) -> bool {
        self.assignments.is_literal_false_and_processed(literal)
    }

    /// The trail position of a falsified literal; literals falsified later have larger positions.
    pub(crate) fn falsification_position(&self, literal: Literal) -> usize {
        self.assignments
            .trail_position_of(literal.variable())
            .unwrap_or(usize::MAX)
    }

    pub(crate) fn num_trail_pops(&self) -> u64 {
        self.assignments.num_trail_pops()
    }

    pub(crate) fn propagate(&mut self, literal: Literal, reason: ConstraintReference) {
        self.assignments.propagate(literal, reason)
    }

    pub(crate) fn watch(&mut self, literal: Literal, watcher: Watcher) {
        self.watch_lists.watch(literal, watcher)
    }
}
