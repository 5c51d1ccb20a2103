//! Watched-literal propagation of pseudo-Boolean constraints.
//!
//! A linear constraint `sum a_i * l_i >= d` over literals is stored in one of three
//! representations: a [clause](constraints::ClauseConstraint) when every coefficient is at least
//! the degree, a [cardinality constraint](constraints::CardinalityConstraint) when all
//! coefficients are equal, and a [weighted constraint](constraints::WeightedConstraint) otherwise.
//! The weighted representation is instantiated for a small set of integer widths, the narrowest of
//! which is chosen for every constraint.
//!
//! The [`ConstraintPropagator`] owns the constraints and their watch lists and propagates them
//! over an [`Assignments`] trail which is owned by the caller.
//!
//! ```rust
//! # use pb_propagation::*;
//! let mut assignments = Assignments::default();
//! let x = (0..3)
//!     .map(|_| Literal::positive(assignments.grow()))
//!     .collect::<Vec<_>>();
//!
//! // 3 x0 + 2 x1 + 2 x2 >= 4
//! let mut propagator = ConstraintPropagator::default();
//! let constraint =
//!     ExpandedConstraint::from_terms([(3, x[0]), (2, x[1]), (2, x[2])], 4, Origin::Formula);
//! let _ = propagator
//!     .add_constraint(&constraint, &mut assignments)
//!     .expect("the constraint can be satisfied");
//!
//! assignments.increase_decision_level();
//! assignments.enqueue_decision(!x[1]);
//! assert!(propagator.propagate(&mut assignments).is_ok());
//!
//! assert!(assignments.is_literal_true(x[0]));
//! assert!(assignments.is_literal_true(x[2]));
//! ```
pub mod basic_types;
pub mod constraints;
pub mod containers;
pub mod engine;
pub mod math;
#[doc(hidden)]
pub mod pb_asserts;
pub mod statistics;

pub use basic_types::ConstraintOperationError;
pub use basic_types::ConstraintReference;
pub use basic_types::Literal;
pub use basic_types::Origin;
pub use basic_types::Variable;
pub use basic_types::WatchStatus;
pub use constraints::Constraint;
pub use constraints::ConstraintKind;
pub use engine::conflict_analysis::ExpandedConstraint;
pub use engine::Assignments;
pub use engine::Conflict;
pub use engine::ConstraintPropagator;
pub use engine::PropagatorOptions;
pub use math::WeightedWidth;
