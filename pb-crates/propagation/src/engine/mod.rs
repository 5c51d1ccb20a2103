//! The host side of propagation: the trail, the watch lists and the owner of the constraints.
mod assignments;
pub mod conflict_analysis;
mod constraint_allocator;
mod constraint_propagator;
mod implications;
mod options;
mod propagation_context;
mod propagation_statistics;
mod watch_lists;

pub use assignments::Assignments;
pub use constraint_allocator::ConstraintAllocator;
pub use constraint_propagator::Conflict;
pub use constraint_propagator::ConstraintPropagator;
pub use implications::ImplicationGraph;
pub use implications::ImplicationOracle;
pub use options::PropagatorOptions;
pub use propagation_context::PropagationContext;
pub use propagation_statistics::PropagationStatistics;
pub use propagation_statistics::ProvenanceStatistics;
pub use watch_lists::WatchHint;
pub use watch_lists::WatchLists;
pub use watch_lists::Watcher;
