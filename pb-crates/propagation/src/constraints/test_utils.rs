//! Scaffolding for testing constraints in isolation from the
//! [`ConstraintPropagator`](crate::engine::ConstraintPropagator).

use super::ConstraintHeader;
use super::ConstraintId;
use crate::basic_types::ConstraintReference;
use crate::basic_types::Literal;
use crate::basic_types::Origin;
use crate::basic_types::Variable;
use crate::engine::Assignments;
use crate::engine::PropagationContext;
use crate::engine::PropagationStatistics;
use crate::engine::WatchLists;

#[derive(Debug)]
pub(crate) struct TestEnvironment {
    pub(crate) assignments: Assignments,
    pub(crate) watch_lists: WatchLists,
    pub(crate) statistics: PropagationStatistics,
    pub(crate) reference: ConstraintReference,
    next_id: u64,
}

impl TestEnvironment {
    pub(crate) fn with_variables(num_variables: usize) -> Self {
        let mut assignments = Assignments::default();
        let mut watch_lists = WatchLists::default();
        for _ in 0..num_variables {
            let variable = assignments.grow();
            watch_lists.grow(variable);
        }
        TestEnvironment {
            assignments,
            watch_lists,
            statistics: PropagationStatistics::default(),
            reference: ConstraintReference::new(0),
            next_id: 0,
        }
    }

    /// The positive literals of the first `N` variables.
    pub(crate) fn literals<const N: usize>(&self) -> [Literal; N] {
        assert!(N <= self.assignments.num_variables());
        std::array::from_fn(|index| Literal::positive(Variable::new(index as u32)))
    }

    pub(crate) fn header(&mut self) -> ConstraintHeader {
        self.next_id += 1;
        ConstraintHeader::new(ConstraintId(self.next_id), Origin::Formula, 2, 1.0)
    }

    pub(crate) fn context(&mut self) -> PropagationContext<'_> {
        PropagationContext::new(
            &mut self.assignments,
            &mut self.watch_lists,
            &mut self.statistics,
        )
    }

    /// Decides `literal` to be false and marks every pending literal as processed.
    pub(crate) fn falsify(&mut self, literal: Literal) {
        self.assignments.enqueue_decision(!literal);
        while self.assignments.next_literal_to_process().is_some() {}
    }
}
