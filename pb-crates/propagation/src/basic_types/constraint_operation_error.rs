use thiserror::Error;

/// Errors related to building a constraint and adding it to the
/// [`ConstraintPropagator`](crate::engine::ConstraintPropagator).
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// The constraint is satisfied by every assignment (its degree is not positive).
    #[error("The constraint is trivially satisfied")]
    TrivialConstraint,
    /// The constraint cannot be satisfied, even if every literal were true.
    #[error("The constraint is infeasible")]
    InfeasibleConstraint,
    /// The constraint has no literals; together with a positive degree it is infeasible.
    #[error("The constraint does not contain any literals")]
    EmptyConstraint,
    /// The constraint has more terms than can be represented.
    #[error("The constraint has {len} literals which exceeds the supported maximum")]
    TooManyLiterals { len: usize },
    /// A coefficient or the degree does not fit the selected representation.
    #[error("A coefficient of the constraint does not fit the selected representation")]
    CoefficientOverflow,
    /// The assignments made below the current decision level already imply one of the literals,
    /// so the implication would be lost when backtracking. Backtrack before adding the constraint.
    #[error("The constraint propagates at a decision level below the current one")]
    PropagatesBelowCurrentLevel,
}
