use crate::basic_types::Origin;
use crate::statistic_counters;

statistic_counters!(
    /// Counters maintained by the constraints while they are watched and propagated.
    PropagationStatistics {
        /// The number of watchers visited after their literal became false
        num_watch_checks: u64,
        /// The number of times a constraint was asked to check for propagation
        num_propagation_checks: u64,
        /// The number of literals inspected while looking for a replacement watch
        num_watch_lookups: u64,
        /// The number of literals propagated by clauses
        num_clause_propagations: u64,
        /// The number of literals propagated by cardinality constraints
        num_cardinality_propagations: u64,
        /// The number of literals propagated by weighted constraints
        num_weighted_propagations: u64,
        /// The number of conflicts detected during propagation
        num_conflicts: u64,
        /// How often constraints of each origin were used during conflict analysis
        provenance: ProvenanceStatistics,
    }
);

statistic_counters!(
    /// The number of resolution steps performed with constraints of each origin.
    ProvenanceStatistics {
        formula: u64,
        symmetry_break: u64,
        learned: u64,
        bound_reformulation: u64,
        core_guided: u64,
        bottom_up: u64,
        gomory_cut: u64,
        dual: u64,
        farkas: u64,
        detected_at_most_one: u64,
        reduced: u64,
        equality: u64,
        implication: u64,
        /// The total number of resolution steps, including those with constraints of unknown
        /// origin
        resolve_steps: u64,
    }
);

impl PropagationStatistics {
    pub fn num_propagations(&self) -> u64 {
        self.num_clause_propagations
            + self.num_cardinality_propagations
            + self.num_weighted_propagations
    }
}

impl ProvenanceStatistics {
    /// Counts one use of a constraint with the provided origin.
    pub(crate) fn record(&mut self, origin: Origin) {
        self.resolve_steps += 1;
        let counter = match origin {
            Origin::Unknown => return,
            Origin::Formula => &mut self.formula,
            Origin::SymmetryBreak => &mut self.symmetry_break,
            Origin::Learned => &mut self.learned,
            Origin::BoundReformulation => &mut self.bound_reformulation,
            Origin::CoreGuided => &mut self.core_guided,
            Origin::BottomUp => &mut self.bottom_up,
            Origin::GomoryCut => &mut self.gomory_cut,
            Origin::Dual => &mut self.dual,
            Origin::Farkas => &mut self.farkas,
            Origin::DetectedAtMostOne => &mut self.detected_at_most_one,
            Origin::Reduced => &mut self.reduced,
            Origin::Equality => &mut self.equality,
            Origin::Implication => &mut self.implication,
        };
        *counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_increments_one_bucket_and_the_step_counter() {
        let mut provenance = ProvenanceStatistics::default();

        provenance.record(Origin::Farkas);
        provenance.record(Origin::Farkas);
        provenance.record(Origin::Learned);

        assert_eq!(provenance.farkas, 2);
        assert_eq!(provenance.learned, 1);
        assert_eq!(provenance.dual, 0);
        assert_eq!(provenance.resolve_steps, 3);
    }

    #[test]
    fn unknown_origin_only_counts_as_a_step() {
        let mut provenance = ProvenanceStatistics::default();

        provenance.record(Origin::Unknown);

        assert_eq!(
            provenance,
            ProvenanceStatistics {
                resolve_steps: 1,
                ..Default::default()
            }
        );
    }
}
