//! Arbitrary precision constraints used when building constraints and during conflict analysis.
mod expanded_constraint;

pub use expanded_constraint::ExpandedConstraint;
pub use expanded_constraint::Term;
