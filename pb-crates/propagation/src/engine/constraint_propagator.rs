use fnv::FnvHashSet;
use log::debug;
use log::trace;
use log::warn;
use num::Signed;

use super::conflict_analysis::ExpandedConstraint;
use super::Assignments;
use super::ConstraintAllocator;
use super::PropagationContext;
use super::PropagationStatistics;
use super::PropagatorOptions;
use super::WatchHint;
use super::WatchLists;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::ConstraintReference;
use crate::basic_types::Variable;
use crate::basic_types::WatchStatus;
use crate::constraints::Constraint;
use crate::constraints::ConstraintHeader;
use crate::constraints::MAX_LBD;
use crate::pb_assert_moderate;
use crate::pb_assert_simple;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The constraint which is falsified by the current assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub constraint: ConstraintReference,
}

/// Owns the constraints together with their watch lists and propagates them over an
/// [`Assignments`].
///
/// The assignments are owned by the caller, which is responsible for making decisions; the
/// propagator only adds propagated literals to the trail and removes entries when backtracking.
#[derive(Debug, Default)]
pub struct ConstraintPropagator {
    allocator: ConstraintAllocator,
    watch_lists: WatchLists,
    statistics: PropagationStatistics,
    options: PropagatorOptions,
}

impl ConstraintPropagator {
    pub fn new(options: PropagatorOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Makes room in the watch lists for the first `num_variables` variables.
    pub fn grow(&mut self, num_variables: usize) {
        if num_variables * 2 > self.watch_lists.num_literals() {
            self.watch_lists.grow(Variable::new(num_variables as u32 - 1));
        }
    }

    /// Adds the constraint with an LBD equal to its number of literals and the configured initial
    /// strength.
    pub fn add_constraint(
        &mut self,
        expanded: &ExpandedConstraint,
        assignments: &mut Assignments,
    ) -> Result<ConstraintReference, ConstraintOperationError> {
        let lbd = u32::try_from(expanded.len())
            .unwrap_or(MAX_LBD)
            .min(self.options.lbd_cap);
        self.add_constraint_with_quality(expanded, lbd, self.options.initial_strength, assignments)
    }

    /// Adds the constraint and sets up its watches, which may propagate literals under the
    /// current assignment.
    ///
    /// Constraints which are satisfied by every assignment, cannot be satisfied at all, or are
    /// falsified by the current assignment are rejected. Above the root, a constraint is also
    /// rejected if the assignments of the lower levels already imply one of its literals; such a
    /// constraint has to be added after backtracking to that level.
    pub fn add_constraint_with_quality(
        &mut self,
        expanded: &ExpandedConstraint,
        lbd: u32,
        strength: f32,
        assignments: &mut Assignments,
    ) -> Result<ConstraintReference, ConstraintOperationError> {
        if expanded.is_empty() {
            warn!("Adding a constraint without literals: {expanded}");
        }
        self.grow(assignments.num_variables());

        let header = ConstraintHeader::new(
            self.allocator.next_id(),
            expanded.origin(),
            lbd,
            strength,
        );
        let constraint =
            Constraint::from_expanded(expanded, header, self.options.minimum_width)?;
        if expanded.slack(assignments).is_negative() {
            return Err(ConstraintOperationError::InfeasibleConstraint);
        }
        let decision_level = assignments.get_decision_level();
        if decision_level > 0 && expanded.propagates_below_level(assignments, decision_level) {
            warn!("Rejecting {expanded} at decision level {decision_level}: it propagates lower");
            return Err(ConstraintOperationError::PropagatesBelowCurrentLevel);
        }

        let id = constraint.header().id();
        let kind = constraint.kind();
        let reference = self.allocator.allocate(constraint);
        let mut context =
            PropagationContext::new(assignments, &mut self.watch_lists, &mut self.statistics);
        self.allocator[reference].initialize_watches(reference, &mut context);

        debug!("Added {kind} constraint {id} as {reference:?}");
        Ok(reference)
    }

    /// Notifies the watchers of every literal on the trail that has not been processed yet.
    ///
    /// On a conflict, the literal that was being processed is marked as unprocessed again, so
    /// that the watch slacks stay consistent with the assignment.
    pub fn propagate(&mut self, assignments: &mut Assignments) -> Result<(), Conflict> {
        self.grow(assignments.num_variables());

        while let Some(true_literal) = assignments.next_literal_to_process() {
            let falsified = !true_literal;

            // The watch list is taken out so that constraints can register new watches while it is
            // being iterated; entries which are kept are compacted to the front.
            let mut watchers = self.watch_lists.take(falsified);
            let mut current_index = 0;
            let mut end_index = 0;
            let mut conflict = None;

            while current_index < watchers.len() {
                let mut watcher = watchers[current_index];
                current_index += 1;
                self.statistics.num_watch_checks += 1;

                if let WatchHint::Clause { blocker } = watcher.hint {
                    if assignments.is_literal_true(blocker) {
                        watchers[end_index] = watcher;
                        end_index += 1;
                        continue;
                    }
                }

                let Some(constraint) = self.allocator.get_mut(watcher.constraint) else {
                    continue;
                };
                if constraint.header().is_marked_for_delete() {
                    continue;
                }

                self.statistics.num_propagation_checks += 1;
                let mut context = PropagationContext::new(
                    assignments,
                    &mut self.watch_lists,
                    &mut self.statistics,
                );
                let status = constraint.check_for_propagation(
                    watcher.constraint,
                    &mut watcher.hint,
                    falsified,
                    &mut context,
                );

                match status {
                    WatchStatus::KeepWatch => {
                        watchers[end_index] = watcher;
                        end_index += 1;
                    }
                    WatchStatus::DropWatch => {}
                    WatchStatus::Conflicting => {
                        watchers[end_index] = watcher;
                        end_index += 1;
                        conflict = Some(Conflict {
                            constraint: watcher.constraint,
                        });
                        break;
                    }
                }
            }

            if let Some(conflict) = conflict {
                // The literal goes back to unprocessed, so the weighted constraints that already
                // accounted for it have to give its coefficient back.
                for watcher in &watchers[..end_index] {
                    if let WatchHint::Weighted { index } = watcher.hint {
                        self.allocator[watcher.constraint].undo_falsified(index as usize);
                    }
                }
                while current_index < watchers.len() {
                    watchers[end_index] = watchers[current_index];
                    current_index += 1;
                    end_index += 1;
                }
                watchers.truncate(end_index);
                self.watch_lists.restore(falsified, watchers);
                assignments.unprocess_last_literal();

                self.statistics.num_conflicts += 1;
                trace!(
                    "Conflict on {:?} while processing {true_literal}",
                    conflict.constraint
                );
                return Err(conflict);
            }

            watchers.truncate(end_index);
            self.watch_lists.restore(falsified, watchers);
        }

        Ok(())
    }

    /// Removes every trail entry above `decision_level`.
    pub fn backtrack(&mut self, assignments: &mut Assignments, decision_level: usize) {
        pb_assert_simple!(decision_level <= assignments.get_decision_level());
        trace!(
            "Backtracking from level {} to {decision_level}",
            assignments.get_decision_level()
        );

        let target_length = assignments.trail_length_at_level(decision_level);
        while assignments.num_trail_entries() > target_length {
            let Some((literal, was_processed)) = assignments.undo_last_assignment() else {
                break;
            };
            if !was_processed {
                continue;
            }

            for watcher in self.watch_lists.watchers(!literal) {
                if let WatchHint::Weighted { index } = watcher.hint {
                    if let Some(constraint) = self.allocator.get_mut(watcher.constraint) {
                        constraint.undo_falsified(index as usize);
                    }
                }
            }
        }

        assignments.synchronise(decision_level);
    }

    /// Marks the constraint for deletion; it stops propagating immediately and is freed by the
    /// next [`ConstraintPropagator::collect_garbage`]. Locked constraints are kept.
    pub fn remove_constraint(&mut self, reference: ConstraintReference) {
        let header = self.allocator[reference].header_mut();
        if header.is_locked() {
            warn!("Refusing to remove locked constraint {}", header.id());
            return;
        }
        header.mark_for_delete();
        debug!("Marked constraint {} for deletion", header.id());
    }

    /// Drops the watchers of constraints marked for deletion and frees them, except for those
    /// which are the reason of a literal on the trail.
    ///
    /// Returns the number of freed constraints.
    pub fn collect_garbage(&mut self, assignments: &Assignments) -> usize {
        let allocator = &self.allocator;
        let num_purged_watchers = self.watch_lists.purge(|watcher| {
            allocator
                .get(watcher.constraint)
                .is_none_or(|constraint| constraint.header().is_marked_for_delete())
        });

        let reasons = (0..assignments.num_trail_entries())
            .filter_map(|position| {
                assignments.reason_of(assignments.get_trail_entry(position).variable())
            })
            .collect::<FnvHashSet<_>>();
        let to_free = self
            .allocator
            .iter()
            .filter(|(reference, constraint)| {
                constraint.header().is_marked_for_delete() && !reasons.contains(reference)
            })
            .map(|(reference, _)| reference)
            .collect::<Vec<_>>();

        for &reference in &to_free {
            let _ = self.allocator.free(reference);
        }

        debug!(
            "Freed {} constraints and {num_purged_watchers} watchers, {} bytes in use",
            to_free.len(),
            self.allocator.bytes_in_use()
        );
        to_free.len()
    }

    /// Ages every learned constraint which is not locked by raising its LBD by `amount`, up to
    /// [`PropagatorOptions::lbd_cap`].
    pub fn decay_constraint_qualities(&mut self, amount: u32) {
        let cap = self.options.lbd_cap;
        self.allocator
            .iter_mut()
            .map(Constraint::header_mut)
            .filter(|header| header.origin().is_learned() && !header.is_locked())
            .for_each(|header| header.decay_quality(amount, cap));
    }

    pub fn constraint(&self, reference: ConstraintReference) -> &Constraint {
        &self.allocator[reference]
    }

    pub fn constraint_mut(&mut self, reference: ConstraintReference) -> &mut Constraint {
        &mut self.allocator[reference]
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintReference, &Constraint)> + '_ {
        self.allocator.iter()
    }

    pub fn num_constraints(&self) -> usize {
        self.allocator.num_constraints()
    }

    pub fn bytes_in_use(&self) -> usize {
        self.allocator.bytes_in_use()
    }

    pub fn watch_lists(&self) -> &WatchLists {
        &self.watch_lists
    }

    pub fn statistics(&self) -> &PropagationStatistics {
        &self.statistics
    }

    /// Gives mutable access to the counters, e.g. for conflict analysis performed by the caller.
    pub fn statistics_mut(&mut self) -> &mut PropagationStatistics {
        &mut self.statistics
    }

    /// Logs the counters together with the size of the constraint store, see
    /// [`STATISTICS_TARGET`](crate::statistics::STATISTICS_TARGET).
    pub fn log_statistics(&self) {
        if !should_log_statistics() {
            return;
        }
        let logger = StatisticLogger::new(["propagation"]);
        self.statistics.log(&logger);
        logger
            .child("num_constraints")
            .log_statistic(self.allocator.num_constraints());
        logger
            .child("bytes_in_use")
            .log_statistic(self.allocator.bytes_in_use());
    }

    /// Checks that the watch slacks of all weighted constraints agree with the assignment and
    /// that every constraint which is not marked for deletion has at least one watcher.
    pub fn debug_check_state(&self, assignments: &Assignments) -> bool {
        pb_assert_moderate!(self.watch_lists.num_literals() >= assignments.num_literals());

        self.allocator.iter().all(|(reference, constraint)| {
            constraint.header().is_marked_for_delete()
                || (constraint.is_watch_slack_consistent(assignments)
                    && (constraint.len() == 1 || self.watch_lists.num_watchers(reference) > 0))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Literal;
    use crate::basic_types::Origin;

    fn setup(num_variables: usize) -> (ConstraintPropagator, Assignments, Vec<Literal>) {
        let mut assignments = Assignments::default();
        let literals = (0..num_variables)
            .map(|_| Literal::positive(assignments.grow()))
            .collect::<Vec<_>>();
        let mut propagator = ConstraintPropagator::default();
        propagator.grow(num_variables);
        (propagator, assignments, literals)
    }

    fn decide(assignments: &mut Assignments, literal: Literal) {
        assignments.increase_decision_level();
        assignments.enqueue_decision(literal);
    }

    #[test]
    fn clause_propagates_last_literal() {
        let (mut propagator, mut assignments, x) = setup(3);
        let clause = ExpandedConstraint::clause([x[0], x[1], x[2]], Origin::Formula);
        let reference = propagator
            .add_constraint(&clause, &mut assignments)
            .expect("clause is valid");

        decide(&mut assignments, !x[0]);
        assert!(propagator.propagate(&mut assignments).is_ok());
        decide(&mut assignments, !x[1]);
        assert!(propagator.propagate(&mut assignments).is_ok());

        assert!(assignments.is_literal_true(x[2]));
        assert_eq!(assignments.reason_of(x[2].variable()), Some(reference));
        assert_eq!(propagator.statistics().num_clause_propagations, 1);
        assert!(propagator.debug_check_state(&assignments));
    }

    #[test]
    fn conflict_leaves_the_literal_unprocessed() {
        let (mut propagator, mut assignments, x) = setup(3);
        let cardinality = ExpandedConstraint::from_terms(
            [(1, x[0]), (1, x[1]), (1, x[2])],
            2,
            Origin::Formula,
        );
        let reference = propagator
            .add_constraint(&cardinality, &mut assignments)
            .expect("constraint is valid");

        assignments.increase_decision_level();
        assignments.enqueue_decision(!x[0]);
        assignments.enqueue_decision(!x[1]);

        let conflict = propagator.propagate(&mut assignments);

        assert_eq!(
            conflict,
            Err(Conflict {
                constraint: reference
            })
        );
        assert!(!assignments.is_fully_processed());
        assert_eq!(propagator.statistics().num_conflicts, 1);
        assert!(propagator.debug_check_state(&assignments));
    }

    #[test]
    fn weighted_constraint_propagates_and_backtracks() {
        let (mut propagator, mut assignments, x) = setup(3);
        let weighted = ExpandedConstraint::from_terms(
            [(3, x[0]), (2, x[1]), (2, x[2])],
            4,
            Origin::Formula,
        );
        let _ = propagator
            .add_constraint(&weighted, &mut assignments)
            .expect("constraint is valid");

        decide(&mut assignments, !x[1]);
        assert!(propagator.propagate(&mut assignments).is_ok());

        assert!(assignments.is_literal_true(x[0]));
        assert!(assignments.is_literal_true(x[2]));
        assert!(propagator.debug_check_state(&assignments));

        propagator.backtrack(&mut assignments, 0);

        assert_eq!(assignments.num_trail_entries(), 0);
        assert!(propagator.debug_check_state(&assignments));
    }

    #[test]
    fn conflicting_and_trivial_constraints_are_rejected() {
        let (mut propagator, mut assignments, x) = setup(2);
        decide(&mut assignments, !x[0]);
        assert!(propagator.propagate(&mut assignments).is_ok());
        decide(&mut assignments, !x[1]);
        assert!(propagator.propagate(&mut assignments).is_ok());

        let falsified = ExpandedConstraint::clause([x[0], x[1]], Origin::Formula);
        let trivial = ExpandedConstraint::from_terms([(1, x[0])], 0, Origin::Formula);

        assert_eq!(
            propagator.add_constraint(&falsified, &mut assignments),
            Err(ConstraintOperationError::InfeasibleConstraint)
        );
        assert_eq!(
            propagator.add_constraint(&trivial, &mut assignments),
            Err(ConstraintOperationError::TrivialConstraint)
        );
        assert_eq!(propagator.num_constraints(), 0);
    }

    #[test]
    fn constraints_implied_by_lower_levels_are_rejected_above_the_root() {
        let (mut propagator, mut assignments, x) = setup(3);
        decide(&mut assignments, x[2]);
        assert!(propagator.propagate(&mut assignments).is_ok());

        // 2 x0 + 2 x1 >= 3 needs both literals, whatever the decisions.
        let both = ExpandedConstraint::from_terms([(2, x[0]), (2, x[1])], 3, Origin::Learned);
        let unit = ExpandedConstraint::clause([x[0]], Origin::Learned);

        assert_eq!(
            propagator.add_constraint(&both, &mut assignments),
            Err(ConstraintOperationError::PropagatesBelowCurrentLevel)
        );
        assert_eq!(
            propagator.add_constraint(&unit, &mut assignments),
            Err(ConstraintOperationError::PropagatesBelowCurrentLevel)
        );
        assert_eq!(propagator.num_constraints(), 0);

        propagator.backtrack(&mut assignments, 0);
        let reference = propagator
            .add_constraint(&both, &mut assignments)
            .expect("accepted at the root");
        decide(&mut assignments, x[2]);
        assert!(propagator.propagate(&mut assignments).is_ok());
        assert_eq!(assignments.reason_of(x[0].variable()), Some(reference));
        assert_eq!(assignments.decision_level_of(x[0].variable()), Some(0));
    }

    #[test]
    fn asserting_constraint_added_above_the_root_survives_backtracking() {
        let (mut propagator, mut assignments, x) = setup(3);
        decide(&mut assignments, !x[0]);
        assert!(propagator.propagate(&mut assignments).is_ok());
        decide(&mut assignments, !x[1]);
        assert!(propagator.propagate(&mut assignments).is_ok());

        let learned = ExpandedConstraint::clause([x[0], x[1], x[2]], Origin::Learned);
        let reference = propagator
            .add_constraint(&learned, &mut assignments)
            .expect("only propagates because of the current level");
        assert!(assignments.is_literal_true(x[2]));

        propagator.backtrack(&mut assignments, 1);
        assert!(assignments.is_literal_unassigned(x[2]));
        assert!(propagator.debug_check_state(&assignments));

        decide(&mut assignments, !x[1]);
        assert!(propagator.propagate(&mut assignments).is_ok());
        assert!(assignments.is_literal_true(x[2]));
        assert_eq!(assignments.reason_of(x[2].variable()), Some(reference));
    }

    #[test]
    fn garbage_collection_keeps_reasons() {
        let (mut propagator, mut assignments, x) = setup(3);
        let reason = propagator
            .add_constraint(
                &ExpandedConstraint::clause([x[0], x[1]], Origin::Learned),
                &mut assignments,
            )
            .expect("clause is valid");
        let unused = propagator
            .add_constraint(
                &ExpandedConstraint::clause([x[1], x[2]], Origin::Learned),
                &mut assignments,
            )
            .expect("clause is valid");

        decide(&mut assignments, !x[0]);
        assert!(propagator.propagate(&mut assignments).is_ok());
        assert_eq!(assignments.reason_of(x[1].variable()), Some(reason));

        propagator.remove_constraint(reason);
        propagator.remove_constraint(unused);
        let num_freed = propagator.collect_garbage(&assignments);

        assert_eq!(num_freed, 1);
        assert_eq!(propagator.num_constraints(), 1);
        assert_eq!(propagator.watch_lists().num_watchers(reason), 0);

        propagator.backtrack(&mut assignments, 0);
        assert_eq!(propagator.collect_garbage(&assignments), 1);
        assert_eq!(propagator.num_constraints(), 0);
        assert_eq!(propagator.bytes_in_use(), 0);
    }

    #[test]
    fn locked_constraints_are_not_removed() {
        let (mut propagator, mut assignments, x) = setup(2);
        let reference = propagator
            .add_constraint(
                &ExpandedConstraint::clause([x[0], x[1]], Origin::Formula),
                &mut assignments,
            )
            .expect("clause is valid");
        propagator.constraint_mut(reference).header_mut().lock();

        propagator.remove_constraint(reference);

        assert!(!propagator.constraint(reference).header().is_marked_for_delete());
        assert_eq!(propagator.collect_garbage(&assignments), 0);
    }

    #[test]
    fn decay_only_ages_learned_constraints() {
        let (mut propagator, mut assignments, x) = setup(3);
        let formula = propagator
            .add_constraint_with_quality(
                &ExpandedConstraint::clause([x[0], x[1]], Origin::Formula),
                2,
                1.0,
                &mut assignments,
            )
            .expect("clause is valid");
        let learned = propagator
            .add_constraint_with_quality(
                &ExpandedConstraint::clause([x[1], x[2]], Origin::Learned),
                2,
                1.0,
                &mut assignments,
            )
            .expect("clause is valid");

        propagator.decay_constraint_qualities(3);

        assert_eq!(propagator.constraint(formula).header().lbd(), 2);
        assert_eq!(propagator.constraint(learned).header().lbd(), 5);
    }
}
